//! Models offered for side-by-side comparison runs.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// Identifier sent to the gateway.
    pub id: &'static str,
    /// Name recorded on responses and shown in reports.
    pub name: &'static str,
}

/// Free-tier models routed through OpenRouter.
pub const OPENROUTER_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "google/gemma-3-27b-it:free",
        name: "Gemma 3 27B",
    },
    ModelInfo {
        id: "meta-llama/llama-3.3-70b-instruct:free",
        name: "Llama 3.3 70B",
    },
    ModelInfo {
        id: "qwen/qwen3-coder:free",
        name: "Qwen3 Coder",
    },
    ModelInfo {
        id: "tngtech/deepseek-r1t2-chimera:free",
        name: "DeepSeek Chimera",
    },
];

pub const GROQ_MODEL: ModelInfo = ModelInfo {
    id: "llama-3.3-70b-versatile",
    name: "Groq Llama 3.3",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_sends_a_model_id_distinct_from_its_label() {
        for model in OPENROUTER_MODELS.iter().chain(std::iter::once(&GROQ_MODEL)) {
            assert!(!model.id.is_empty());
            assert_ne!(model.id, model.name);
        }
        assert_eq!(GROQ_MODEL.id, "llama-3.3-70b-versatile");
    }
}
