//! Confidence from the stability of recent visibility scores.

use aivis_core::ConfidenceLevel;
use serde::Serialize;

/// How many prior snapshots are considered.
pub const HISTORY_WINDOW: usize = 7;

/// Fewer prior snapshots than this yields the neutral estimate.
pub const MIN_HISTORY: usize = 3;

const HIGH_THRESHOLD: f64 = 0.8;
const LOW_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Confidence {
    pub score: f64,
    pub level: ConfidenceLevel,
}

impl Confidence {
    /// Returned while there is too little history to judge.
    pub const NEUTRAL: Self = Self {
        score: 0.5,
        level: ConfidenceLevel::Medium,
    };
}

/// Estimate confidence from prior visibility scores, newest first.
///
/// Only the first [`HISTORY_WINDOW`] scores are used. The estimate is
/// `1 - stddev / mean` (population standard deviation), clamped to `[0, 1]`.
#[must_use]
pub fn estimate(history: &[f64]) -> Confidence {
    let window = &history[..history.len().min(HISTORY_WINDOW)];
    if window.len() < MIN_HISTORY {
        return Confidence::NEUTRAL;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    if mean.abs() < f64::EPSILON {
        return Confidence {
            score: 0.0,
            level: ConfidenceLevel::Low,
        };
    }

    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let score = (1.0 - variance.sqrt() / mean).clamp(0.0, 1.0);
    let level = if score >= HIGH_THRESHOLD {
        ConfidenceLevel::High
    } else if score < LOW_THRESHOLD {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::Medium
    };
    Confidence { score, level }
}
