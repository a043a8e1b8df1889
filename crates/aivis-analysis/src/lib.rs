//! Response analysis pipeline.
//!
//! A generated response flows through [`scanner`] (find brand and competitor
//! names), [`sentiment`] and [`recommendation`] (annotate each hit) and
//! [`ranker`] (order brand mentions). [`MentionDetector`] wires those stages
//! together. [`score`] folds a run's mentions into a [`aivis_core::MetricSnapshot`]
//! and [`confidence`] rates how stable the score history is.
//!
//! [`AnalysisService`] drives whole runs against one provider behind the
//! concurrency gate; [`CompareService`] sends the same prompts to several
//! models at once.

pub mod compare;
pub mod confidence;
pub mod detector;
pub mod error;
pub mod lexicon;
pub mod metrics;
pub mod prompt;
pub mod ranker;
pub mod recommendation;
pub mod scanner;
pub mod score;
pub mod sentiment;
pub mod service;
pub mod store;

mod text;

pub use compare::{CompareModelsResult, CompareService, CompareSettings, ModelResult};
pub use confidence::{estimate, Confidence};
pub use detector::MentionDetector;
pub use error::AnalysisError;
pub use lexicon::Lexicon;
pub use prompt::render_prompt;
pub use score::{composite_score, response_score};
pub use service::{AnalysisService, AnalysisStatus, RunAnalysisResult, RunSettings};
pub use store::{AnalysisStore, MemoryStore, StoreError, StoredResponse};
