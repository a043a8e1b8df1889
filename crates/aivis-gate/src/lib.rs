//! Concurrency gate guarding calls to external text-generation providers.
//!
//! Two independent, non-blocking primitives: a [`RateLimiter`] enforcing a
//! minimum inter-call interval plus a per-minute ceiling, and an
//! [`InFlightRegistry`] allowing at most one analysis run per brand. Callers
//! poll them and decide whether to reject, queue, or wait.

pub mod clock;
pub mod error;
pub mod in_flight;
pub mod rate_limit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::GateError;
pub use in_flight::{InFlightGuard, InFlightRegistry, DEFAULT_IN_FLIGHT_TIMEOUT};
pub use rate_limit::{RateLimitStatus, RateLimiter};
