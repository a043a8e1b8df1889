//! Analysis runs: query the provider with each prompt, detect mentions,
//! persist, then score the run.

use std::sync::Arc;
use std::time::Duration;

use aivis_core::{AppConfig, BrandId, MetricSnapshot, PromptId, ResponseText};
use aivis_gate::{Clock, GateError, InFlightRegistry, RateLimitStatus, RateLimiter, SystemClock};
use aivis_providers::Provider;
use serde::Serialize;
use uuid::Uuid;

use crate::detector::MentionDetector;
use crate::error::AnalysisError;
use crate::metrics;
use crate::prompt::render_prompt;
use crate::store::AnalysisStore;

const RATE_LIMIT_STOP: &str = "Rate limit reached, stopping analysis";

#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    /// Prompts beyond this many are dropped from a run.
    pub max_prompts: usize,
    /// Pause between consecutive provider calls.
    pub inter_call_delay: Duration,
}

impl RunSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_prompts: config.max_prompts_per_run,
            inter_call_delay: Duration::from_millis(config.inter_call_delay_ms),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_prompts: 6,
            inter_call_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisStatus {
    pub provider_configured: bool,
    pub provider_available: bool,
    pub model: Option<String>,
    pub rate_limit: RateLimitStatus,
    /// Provider reachable and the limiter would admit a call right now.
    pub can_run_analysis: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunAnalysisResult {
    pub run_id: Option<Uuid>,
    pub brand_id: BrandId,
    pub success: bool,
    pub message: String,
    pub responses_run: usize,
    pub mentions_found: usize,
    pub errors: Vec<String>,
    pub snapshot: Option<MetricSnapshot>,
}

/// Wait out a pending minimum interval, then claim a call slot.
///
/// Hitting the per-minute ceiling is not waited out; the caller gets
/// [`GateError::RateLimited`] instead.
pub(crate) async fn pace(limiter: &RateLimiter) -> Result<(), GateError> {
    let wait = limiter.time_until_next_allowed();
    if !wait.is_zero() && wait <= limiter.min_interval() {
        tokio::time::sleep(wait).await;
    }
    limiter.try_record()
}

pub struct AnalysisService {
    provider: Option<Arc<dyn Provider>>,
    store: Arc<dyn AnalysisStore>,
    detector: MentionDetector,
    limiter: Arc<RateLimiter>,
    in_flight: Arc<InFlightRegistry>,
    clock: Arc<dyn Clock>,
    settings: RunSettings,
}

impl AnalysisService {
    #[must_use]
    pub fn new(
        provider: Option<Arc<dyn Provider>>,
        store: Arc<dyn AnalysisStore>,
        detector: MentionDetector,
        limiter: Arc<RateLimiter>,
        in_flight: Arc<InFlightRegistry>,
    ) -> Self {
        Self {
            provider,
            store,
            detector,
            limiter,
            in_flight,
            clock: Arc::new(SystemClock),
            settings: RunSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Clock used for response and snapshot timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn provider_available(&self) -> bool {
        match &self.provider {
            Some(provider) => provider.is_available().await,
            None => false,
        }
    }

    pub async fn status(&self) -> AnalysisStatus {
        let provider_available = self.provider_available().await;
        let rate_limit = self.limiter.status();
        AnalysisStatus {
            provider_configured: self.provider.is_some(),
            provider_available,
            model: self.provider.as_ref().map(|p| p.model_name().to_string()),
            can_run_analysis: provider_available && rate_limit.can_proceed,
            rate_limit,
        }
    }

    /// Time until the limiter admits the next call.
    #[must_use]
    pub fn rate_limit_wait(&self) -> Duration {
        self.limiter.time_until_next_allowed()
    }

    /// Whether a run for `brand_id` would be admitted right now.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::ProviderUnavailable`] when no provider is configured
    /// or it reports itself unavailable, then [`AnalysisError::AlreadyInFlight`]
    /// or [`AnalysisError::RateLimited`], checked in that order.
    pub async fn can_run(&self, brand_id: BrandId) -> Result<(), AnalysisError> {
        if !self.provider_available().await {
            return Err(AnalysisError::ProviderUnavailable);
        }
        if self.in_flight.is_in_flight(brand_id) {
            return Err(AnalysisError::AlreadyInFlight { brand_id });
        }
        let wait = self.limiter.time_until_next_allowed();
        if !wait.is_zero() {
            return Err(AnalysisError::RateLimited { wait });
        }
        Ok(())
    }

    /// Score the brand's latest run and store the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Store`] on persistence failures.
    pub async fn calculate_and_store_metrics(
        &self,
        brand_id: BrandId,
    ) -> Result<MetricSnapshot, AnalysisError> {
        metrics::calculate_and_store_metrics(self.store.as_ref(), brand_id, self.clock.utc_now())
            .await
    }

    /// Run every selected prompt (all active prompts when `prompt_ids` is
    /// `None`) through the provider and score the results.
    ///
    /// Per-prompt failures are collected in [`RunAnalysisResult::errors`] and
    /// do not stop the run. Metrics are recalculated whenever at least one
    /// response succeeded. The brand's in-flight slot is held for the whole
    /// run and released on every exit path, including cancellation.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::ProviderUnavailable`] when no provider is configured
    ///   or it reports itself unavailable
    /// - [`AnalysisError::AlreadyInFlight`] when a run for the brand is active
    /// - [`AnalysisError::RateLimited`] when the limiter blocks the first call
    /// - [`AnalysisError::BrandNotFound`] for an unknown brand
    /// - [`AnalysisError::Store`] when the prompts or the run cannot be set up
    pub async fn run_analysis(
        &self,
        brand_id: BrandId,
        prompt_ids: Option<&[PromptId]>,
    ) -> Result<RunAnalysisResult, AnalysisError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(AnalysisError::ProviderUnavailable)?;
        if !provider.is_available().await {
            tracing::warn!(brand_id, model = provider.model_name(), "provider unavailable");
            return Err(AnalysisError::ProviderUnavailable);
        }

        let _slot = self
            .in_flight
            .acquire(brand_id)
            .ok_or(AnalysisError::AlreadyInFlight { brand_id })?;

        let wait = self.limiter.time_until_next_allowed();
        if !wait.is_zero() {
            tracing::warn!(brand_id, wait_ms = wait.as_millis(), "analysis rate limited");
            return Err(AnalysisError::RateLimited { wait });
        }

        let brand = self
            .store
            .brand(brand_id)
            .await?
            .ok_or(AnalysisError::BrandNotFound(brand_id))?;

        let mut prompts = self.store.prompts(prompt_ids).await?;
        prompts.truncate(self.settings.max_prompts);

        let mut result = RunAnalysisResult {
            run_id: None,
            brand_id,
            success: false,
            message: String::new(),
            responses_run: 0,
            mentions_found: 0,
            errors: Vec::new(),
            snapshot: None,
        };

        if prompts.is_empty() {
            result.message = "No prompts to run".to_string();
            return Ok(result);
        }

        let run_id = self.store.begin_run(brand_id).await?;
        result.run_id = Some(run_id);
        tracing::info!(
            brand_id,
            %run_id,
            prompts = prompts.len(),
            model = provider.model_name(),
            "starting analysis run"
        );

        for (i, prompt) in prompts.iter().enumerate() {
            if i > 0 && !self.settings.inter_call_delay.is_zero() {
                tokio::time::sleep(self.settings.inter_call_delay).await;
            }

            if let Err(e) = pace(&self.limiter).await {
                tracing::warn!(brand_id, prompt_id = prompt.id, error = %e, "stopping run");
                result.errors.push(RATE_LIMIT_STOP.to_string());
                break;
            }

            let prompt_text = render_prompt(&prompt.template, &brand);
            let text = match provider.query(&prompt_text).await {
                Ok(text) => text,
                Err(e) => {
                    let e = AnalysisError::from(e);
                    tracing::warn!(brand_id, prompt_id = prompt.id, error = %e, "prompt failed");
                    result
                        .errors
                        .push(format!("Prompt {} failed: {e}", prompt.id));
                    continue;
                }
            };

            let response = ResponseText::new(text, provider.model_name(), self.clock.utc_now());
            let response_id = match self
                .store
                .store_response(run_id, brand_id, prompt.id, &prompt_text, &response)
                .await
            {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(
                        brand_id,
                        prompt_id = prompt.id,
                        error = %e,
                        "failed to store response"
                    );
                    result.errors.push(format!("Failed to store response: {e}"));
                    continue;
                }
            };

            let mentions = self.detector.detect_mentions(&response.text, &brand);
            if !mentions.is_empty() {
                if let Err(e) = self.store.store_mentions(response_id, &mentions).await {
                    result.errors.push(format!("Failed to store mentions: {e}"));
                } else {
                    result.mentions_found += mentions.len();
                }
            }
            result.responses_run += 1;
        }

        if result.responses_run > 0 {
            match self.calculate_and_store_metrics(brand_id).await {
                Ok(snapshot) => result.snapshot = Some(snapshot),
                Err(e) => {
                    tracing::warn!(brand_id, error = %e, "failed to calculate metrics");
                    result.errors.push(format!("Failed to calculate metrics: {e}"));
                }
            }
        }

        result.success = result.responses_run > 0;
        result.message = if result.responses_run == 0 {
            "All prompts failed".to_string()
        } else if result.errors.is_empty() {
            format!("Successfully processed {} prompts", result.responses_run)
        } else {
            format!("Completed with {} errors", result.errors.len())
        };

        tracing::info!(
            brand_id,
            %run_id,
            responses = result.responses_run,
            errors = result.errors.len(),
            "analysis run finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
