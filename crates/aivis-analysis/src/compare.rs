//! Multi-model comparison.
//!
//! Every selected prompt is sent to every model. Models are queried
//! concurrently for one prompt; prompts are processed one after another.
//! Each model has its own rate limiter. A comparison holds the brand's
//! in-flight slot, shared with [`crate::AnalysisService`], for its whole
//! duration. Successful responses replace the brand's latest run and the run
//! is scored as usual.

use std::sync::Arc;
use std::time::Duration;

use aivis_core::{
    AppConfig, BrandId, BrandProfile, DetectedMention, MetricSnapshot, Prompt, PromptId,
    ResponseText,
};
use aivis_gate::{Clock, InFlightRegistry, RateLimiter, SystemClock};
use aivis_providers::Provider;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use crate::detector::MentionDetector;
use crate::error::AnalysisError;
use crate::metrics;
use crate::prompt::render_prompt;
use crate::score::response_score;
use crate::service::pace;
use crate::store::AnalysisStore;

#[derive(Debug, Clone, Copy)]
pub struct CompareSettings {
    pub max_prompts: usize,
    /// Pause after all models have answered one prompt.
    pub inter_prompt_delay: Duration,
    pub min_interval: Duration,
    pub max_calls_per_minute: u32,
}

impl CompareSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_prompts: config.max_prompts_per_run,
            inter_prompt_delay: Duration::from_millis(config.inter_call_delay_ms),
            min_interval: Duration::from_millis(config.rate_min_interval_ms),
            max_calls_per_minute: config.rate_max_per_minute,
        }
    }
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            max_prompts: 6,
            inter_prompt_delay: Duration::from_millis(500),
            min_interval: Duration::from_secs(2),
            max_calls_per_minute: 10,
        }
    }
}

/// One model's answer to one prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ModelResult {
    pub model_name: String,
    pub prompt_id: PromptId,
    pub prompt_text: String,
    pub response: Option<String>,
    pub mentions: Vec<DetectedMention>,
    pub score: u32,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareModelsResult {
    pub success: bool,
    pub message: String,
    pub results: Vec<ModelResult>,
    pub total_calls: usize,
    pub success_calls: usize,
    pub errors: Vec<String>,
    pub snapshot: Option<MetricSnapshot>,
}

struct ComparedModel {
    provider: Arc<dyn Provider>,
    limiter: RateLimiter,
}

pub struct CompareService {
    models: Vec<ComparedModel>,
    store: Arc<dyn AnalysisStore>,
    detector: MentionDetector,
    in_flight: Arc<InFlightRegistry>,
    clock: Arc<dyn Clock>,
    settings: CompareSettings,
}

impl CompareService {
    #[must_use]
    pub fn new(
        providers: Vec<Arc<dyn Provider>>,
        store: Arc<dyn AnalysisStore>,
        detector: MentionDetector,
        in_flight: Arc<InFlightRegistry>,
        settings: CompareSettings,
    ) -> Self {
        Self::with_clock(
            providers,
            store,
            detector,
            in_flight,
            settings,
            Arc::new(SystemClock),
        )
    }

    #[must_use]
    pub fn with_clock(
        providers: Vec<Arc<dyn Provider>>,
        store: Arc<dyn AnalysisStore>,
        detector: MentionDetector,
        in_flight: Arc<InFlightRegistry>,
        settings: CompareSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let models = providers
            .into_iter()
            .map(|provider| ComparedModel {
                provider,
                limiter: RateLimiter::with_clock(
                    settings.min_interval,
                    settings.max_calls_per_minute,
                    Arc::clone(&clock),
                ),
            })
            .collect();
        Self {
            models,
            store,
            detector,
            in_flight,
            clock,
            settings,
        }
    }

    #[must_use]
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.provider.model_name()).collect()
    }

    /// Whether at least one configured model reports itself available.
    pub async fn is_available(&self) -> bool {
        join_all(self.models.iter().map(|m| m.provider.is_available()))
            .await
            .into_iter()
            .any(|available| available)
    }

    /// Compare the selected models (all when `model_names` is `None`) on the
    /// selected prompts (all active when `prompt_ids` is `None`).
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::ProviderUnavailable`] when no model is configured or
    ///   none matches `model_names`
    /// - [`AnalysisError::AlreadyInFlight`] when an analysis or comparison for
    ///   the brand is already running
    /// - [`AnalysisError::BrandNotFound`] for an unknown brand
    /// - [`AnalysisError::Store`] when prompts cannot be loaded
    pub async fn run_comparison(
        &self,
        brand_id: BrandId,
        prompt_ids: Option<&[PromptId]>,
        model_names: Option<&[String]>,
    ) -> Result<CompareModelsResult, AnalysisError> {
        let models: Vec<&ComparedModel> = self
            .models
            .iter()
            .filter(|m| {
                model_names.map_or(true, |names| {
                    names.iter().any(|n| n == m.provider.model_name())
                })
            })
            .collect();
        if models.is_empty() {
            return Err(AnalysisError::ProviderUnavailable);
        }

        let _slot = self
            .in_flight
            .acquire(brand_id)
            .ok_or(AnalysisError::AlreadyInFlight { brand_id })?;

        let brand = self
            .store
            .brand(brand_id)
            .await?
            .ok_or(AnalysisError::BrandNotFound(brand_id))?;
        let mut prompts = self.store.prompts(prompt_ids).await?;
        prompts.truncate(self.settings.max_prompts);

        let availability = join_all(models.iter().map(|m| m.provider.is_available())).await;
        let (ready, unavailable): (Vec<_>, Vec<_>) = models
            .iter()
            .zip(availability)
            .partition(|(_, available)| *available);

        let mut result = CompareModelsResult {
            success: true,
            message: String::new(),
            results: Vec::new(),
            total_calls: prompts.len() * models.len(),
            success_calls: 0,
            errors: Vec::new(),
            snapshot: None,
        };
        for (model, _) in &unavailable {
            let model_name = model.provider.model_name();
            tracing::warn!(brand_id, model = model_name, "model unavailable, skipping");
            result.errors.push(format!("{model_name}: model unavailable"));
        }
        let ready: Vec<&ComparedModel> = ready.into_iter().map(|(model, _)| *model).collect();
        tracing::info!(
            brand_id,
            models = models.len(),
            prompts = prompts.len(),
            "starting model comparison"
        );

        for (i, prompt) in prompts.iter().enumerate() {
            if i > 0 && !self.settings.inter_prompt_delay.is_zero() {
                tokio::time::sleep(self.settings.inter_prompt_delay).await;
            }
            let prompt_text = render_prompt(&prompt.template, &brand);
            let calls = ready
                .iter()
                .map(|model| self.query_model(model, &brand, prompt, &prompt_text));
            for model_result in join_all(calls).await {
                match &model_result.error {
                    Some(e) => result
                        .errors
                        .push(format!("{}: {e}", model_result.model_name)),
                    None => result.success_calls += 1,
                }
                result.results.push(model_result);
            }
        }

        if result.success_calls > 0 {
            match self.store_results(brand_id, &result.results).await {
                Ok(snapshot) => result.snapshot = Some(snapshot),
                Err(e) => {
                    tracing::warn!(brand_id, error = %e, "failed to store comparison results");
                    result.errors.push(format!("Failed to store results: {e}"));
                }
            }
        }

        if result.success_calls == 0 && !result.errors.is_empty() {
            result.success = false;
            result.message = "All model queries failed".to_string();
        } else if result.errors.is_empty() {
            result.message = format!(
                "Successfully compared {} models across {} prompts",
                models.len(),
                prompts.len()
            );
        } else {
            result.message = format!(
                "Completed with {}/{} successful calls",
                result.success_calls, result.total_calls
            );
        }
        Ok(result)
    }

    async fn query_model(
        &self,
        model: &ComparedModel,
        brand: &BrandProfile,
        prompt: &Prompt,
        prompt_text: &str,
    ) -> ModelResult {
        let model_name = model.provider.model_name().to_string();
        let mut out = ModelResult {
            model_name,
            prompt_id: prompt.id,
            prompt_text: prompt_text.to_string(),
            response: None,
            mentions: Vec::new(),
            score: 0,
            error: None,
            timestamp: self.clock.utc_now(),
        };

        if let Err(e) = pace(&model.limiter).await {
            out.error = Some(AnalysisError::from(e).to_string());
            return out;
        }

        match model.provider.query(prompt_text).await {
            Ok(text) => {
                let mentions = self.detector.detect_mentions(&text, brand);
                out.score = response_score(&mentions);
                out.mentions = mentions;
                out.response = Some(text);
            }
            Err(e) => {
                let e = AnalysisError::from(e);
                tracing::warn!(
                    model = %out.model_name,
                    prompt_id = prompt.id,
                    error = %e,
                    "model query failed"
                );
                out.error = Some(e.to_string());
            }
        }
        out.timestamp = self.clock.utc_now();
        out
    }

    /// Replace the brand's latest run with the successful results and score it.
    async fn store_results(
        &self,
        brand_id: BrandId,
        results: &[ModelResult],
    ) -> Result<MetricSnapshot, AnalysisError> {
        let run_id = self.store.begin_run(brand_id).await?;
        for r in results {
            let Some(text) = &r.response else { continue };
            let response = ResponseText::new(text.clone(), r.model_name.clone(), r.timestamp);
            let response_id = self
                .store
                .store_response(run_id, brand_id, r.prompt_id, &r.prompt_text, &response)
                .await?;
            if !r.mentions.is_empty() {
                self.store.store_mentions(response_id, &r.mentions).await?;
            }
        }
        metrics::calculate_and_store_metrics(self.store.as_ref(), brand_id, self.clock.utc_now())
            .await
    }
}
