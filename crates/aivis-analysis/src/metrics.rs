use aivis_core::{BrandId, MetricSnapshot};
use chrono::{DateTime, Utc};

use crate::confidence::{estimate, HISTORY_WINDOW};
use crate::error::AnalysisError;
use crate::score::composite_score;
use crate::store::AnalysisStore;

/// Score the brand's latest run and persist the resulting snapshot.
///
/// Confidence is estimated from the snapshots stored before this one.
///
/// # Errors
///
/// Returns [`AnalysisError::Store`] if reading the run or history, or writing
/// the snapshot, fails.
pub async fn calculate_and_store_metrics(
    store: &dyn AnalysisStore,
    brand_id: BrandId,
    snapshot_date: DateTime<Utc>,
) -> Result<MetricSnapshot, AnalysisError> {
    let responses = store.latest_run_responses(brand_id).await?;
    let history: Vec<f64> = store
        .recent_snapshots(brand_id, HISTORY_WINDOW)
        .await?
        .iter()
        .map(|s| s.visibility_score)
        .collect();
    let confidence = estimate(&history);

    let snapshot = composite_score(
        brand_id,
        responses.iter().map(|r| r.mentions.as_slice()),
        snapshot_date,
        confidence,
    );
    store.store_snapshot(&snapshot).await?;

    tracing::info!(
        brand_id,
        visibility_score = snapshot.visibility_score,
        confidence = %snapshot.confidence_level,
        responses = snapshot.response_count,
        "stored metric snapshot"
    );
    Ok(snapshot)
}
