//! Wiring shared by every command: config, brands, store and services.

use std::sync::Arc;
use std::time::Duration;

use aivis_analysis::{
    AnalysisService, AnalysisStore, CompareService, CompareSettings, Lexicon, MemoryStore,
    MentionDetector, RunSettings,
};
use aivis_core::{AppConfig, BrandId, BrandProfile, BrandsFile};
use aivis_gate::{InFlightRegistry, RateLimiter};

pub(crate) struct Runtime {
    pub(crate) config: AppConfig,
    pub(crate) brands: BrandsFile,
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) detector: MentionDetector,
    in_flight: Arc<InFlightRegistry>,
}

impl Runtime {
    /// Load the brands file and lexicon named by `config` and seed an
    /// in-memory store from them.
    ///
    /// # Errors
    ///
    /// Returns an error if the brands file or lexicon override cannot be loaded.
    pub(crate) fn load(config: AppConfig) -> anyhow::Result<Self> {
        let brands = aivis_core::load_brands(&config.brands_path)?;
        let lexicon = Lexicon::load_or_default(config.lexicon_path.as_deref())?;
        let store = Arc::new(MemoryStore::new(brands.profiles(), brands.prompt_list()));
        tracing::debug!(
            brands = brands.brands.len(),
            prompts = brands.prompts.len(),
            "runtime loaded"
        );
        let in_flight = Arc::new(InFlightRegistry::new(Duration::from_secs(
            config.in_flight_timeout_secs,
        )));
        Ok(Self {
            config,
            brands,
            store,
            detector: MentionDetector::new(&lexicon),
            in_flight,
        })
    }

    /// Resolve a brand slug to its profile.
    ///
    /// # Errors
    ///
    /// Returns an error if no configured brand has that slug.
    pub(crate) fn brand(&self, slug: &str) -> anyhow::Result<BrandProfile> {
        resolve_brand(&self.brands, slug)
    }

    pub(crate) fn brand_id(&self, slug: &str) -> anyhow::Result<BrandId> {
        self.brand(slug).map(|b| b.id)
    }

    fn shared_store(&self) -> Arc<dyn AnalysisStore> {
        Arc::clone(&self.store) as Arc<dyn AnalysisStore>
    }

    /// # Errors
    ///
    /// Returns an error if a provider HTTP client cannot be built.
    pub(crate) fn analysis_service(&self) -> anyhow::Result<AnalysisService> {
        let provider = aivis_providers::provider_from_config(&self.config)?;
        let limiter = Arc::new(RateLimiter::new(
            Duration::from_millis(self.config.rate_min_interval_ms),
            self.config.rate_max_per_minute,
        ));
        Ok(AnalysisService::new(
            provider,
            self.shared_store(),
            self.detector.clone(),
            limiter,
            Arc::clone(&self.in_flight),
        )
        .with_settings(RunSettings::from_app_config(&self.config)))
    }

    /// # Errors
    ///
    /// Returns an error if a provider HTTP client cannot be built.
    pub(crate) fn compare_service(&self) -> anyhow::Result<CompareService> {
        let providers = aivis_providers::comparison_providers(&self.config)?;
        Ok(CompareService::new(
            providers,
            self.shared_store(),
            self.detector.clone(),
            Arc::clone(&self.in_flight),
            CompareSettings::from_app_config(&self.config),
        ))
    }
}

pub(crate) fn resolve_brand(brands: &BrandsFile, slug: &str) -> anyhow::Result<BrandProfile> {
    brands
        .profiles()
        .into_iter()
        .zip(&brands.brands)
        .find_map(|(profile, config)| (config.slug() == slug).then_some(profile))
        .ok_or_else(|| anyhow::anyhow!("brand '{slug}' not found"))
}
