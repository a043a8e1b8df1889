use std::time::Duration;

use aivis_core::BrandId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("rate limited; retry in {}s", .wait.as_millis().div_ceil(1000).max(1))]
    RateLimited { wait: Duration },

    #[error("analysis already in progress for brand {brand_id}")]
    AlreadyInFlight { brand_id: BrandId },
}
