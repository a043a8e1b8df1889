//! Persistence seam for analysis runs.
//!
//! The pipeline talks to storage only through [`AnalysisStore`]. A run is
//! opened with [`AnalysisStore::begin_run`], which discards the brand's
//! previous run; responses and their mentions are written one by one, and the
//! score calculator later re-reads the whole run via
//! [`AnalysisStore::latest_run_responses`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use aivis_core::{
    BrandId, BrandProfile, DetectedMention, MetricSnapshot, Prompt, PromptId, ResponseText,
};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no open run for brand {0}")]
    NoOpenRun(BrandId),

    #[error("response {0} not found")]
    ResponseNotFound(Uuid),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// One persisted provider response and the mentions detected in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredResponse {
    pub id: Uuid,
    pub run_id: Uuid,
    pub brand_id: BrandId,
    pub prompt_id: PromptId,
    pub prompt_text: String,
    pub response: ResponseText,
    pub mentions: Vec<DetectedMention>,
}

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn brand(&self, brand_id: BrandId) -> Result<Option<BrandProfile>, StoreError>;

    /// The prompts with the given ids (unknown ids skipped), or every active
    /// prompt when `ids` is `None`. Ordered by id.
    async fn prompts(&self, ids: Option<&[PromptId]>) -> Result<Vec<Prompt>, StoreError>;

    /// Open a new run for `brand_id`, discarding the responses of its previous run.
    async fn begin_run(&self, brand_id: BrandId) -> Result<Uuid, StoreError>;

    async fn store_response(
        &self,
        run_id: Uuid,
        brand_id: BrandId,
        prompt_id: PromptId,
        prompt_text: &str,
        response: &ResponseText,
    ) -> Result<Uuid, StoreError>;

    async fn store_mentions(
        &self,
        response_id: Uuid,
        mentions: &[DetectedMention],
    ) -> Result<(), StoreError>;

    /// Every response of the brand's most recent run, in insertion order.
    async fn latest_run_responses(
        &self,
        brand_id: BrandId,
    ) -> Result<Vec<StoredResponse>, StoreError>;

    async fn store_snapshot(&self, snapshot: &MetricSnapshot) -> Result<(), StoreError>;

    /// Up to `limit` snapshots for the brand, newest first.
    async fn recent_snapshots(
        &self,
        brand_id: BrandId,
        limit: usize,
    ) -> Result<Vec<MetricSnapshot>, StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    brands: HashMap<BrandId, BrandProfile>,
    prompts: Vec<Prompt>,
    open_runs: HashMap<BrandId, Uuid>,
    responses: Vec<StoredResponse>,
    snapshots: Vec<MetricSnapshot>,
}

/// Process-local [`AnalysisStore`] used by the CLI and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(brands: Vec<BrandProfile>, prompts: Vec<Prompt>) -> Self {
        let mut state = MemoryState {
            brands: brands.into_iter().map(|b| (b.id, b)).collect(),
            prompts,
            ..MemoryState::default()
        };
        state.prompts.sort_by_key(|p| p.id);
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every stored snapshot for the brand, oldest first.
    #[must_use]
    pub fn snapshot_history(&self, brand_id: BrandId) -> Vec<MetricSnapshot> {
        self.lock()
            .snapshots
            .iter()
            .filter(|s| s.brand_id == brand_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn brand(&self, brand_id: BrandId) -> Result<Option<BrandProfile>, StoreError> {
        Ok(self.lock().brands.get(&brand_id).cloned())
    }

    async fn prompts(&self, ids: Option<&[PromptId]>) -> Result<Vec<Prompt>, StoreError> {
        let state = self.lock();
        let selected = match ids {
            Some(ids) => state
                .prompts
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect(),
            None => state.prompts.iter().filter(|p| p.active).cloned().collect(),
        };
        Ok(selected)
    }

    async fn begin_run(&self, brand_id: BrandId) -> Result<Uuid, StoreError> {
        let mut state = self.lock();
        let run_id = Uuid::new_v4();
        state.responses.retain(|r| r.brand_id != brand_id);
        state.open_runs.insert(brand_id, run_id);
        Ok(run_id)
    }

    async fn store_response(
        &self,
        run_id: Uuid,
        brand_id: BrandId,
        prompt_id: PromptId,
        prompt_text: &str,
        response: &ResponseText,
    ) -> Result<Uuid, StoreError> {
        let mut state = self.lock();
        if state.open_runs.get(&brand_id) != Some(&run_id) {
            return Err(StoreError::NoOpenRun(brand_id));
        }
        let id = Uuid::new_v4();
        state.responses.push(StoredResponse {
            id,
            run_id,
            brand_id,
            prompt_id,
            prompt_text: prompt_text.to_string(),
            response: response.clone(),
            mentions: Vec::new(),
        });
        Ok(id)
    }

    async fn store_mentions(
        &self,
        response_id: Uuid,
        mentions: &[DetectedMention],
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        let stored = state
            .responses
            .iter_mut()
            .find(|r| r.id == response_id)
            .ok_or(StoreError::ResponseNotFound(response_id))?;
        stored.mentions.extend_from_slice(mentions);
        Ok(())
    }

    async fn latest_run_responses(
        &self,
        brand_id: BrandId,
    ) -> Result<Vec<StoredResponse>, StoreError> {
        let state = self.lock();
        let Some(run_id) = state.open_runs.get(&brand_id).copied() else {
            return Ok(Vec::new());
        };
        Ok(state
            .responses
            .iter()
            .filter(|r| r.run_id == run_id)
            .cloned()
            .collect())
    }

    async fn store_snapshot(&self, snapshot: &MetricSnapshot) -> Result<(), StoreError> {
        self.lock().snapshots.push(snapshot.clone());
        Ok(())
    }

    async fn recent_snapshots(
        &self,
        brand_id: BrandId,
        limit: usize,
    ) -> Result<Vec<MetricSnapshot>, StoreError> {
        let state = self.lock();
        let mut recent: Vec<MetricSnapshot> = state
            .snapshots
            .iter()
            .filter(|s| s.brand_id == brand_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal dates; reverse makes
        // the latest insert come first among ties.
        recent.reverse();
        recent.sort_by(|a, b| b.snapshot_date.cmp(&a.snapshot_date));
        recent.truncate(limit);
        Ok(recent)
    }
}
