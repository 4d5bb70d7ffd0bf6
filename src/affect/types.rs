// Affect data types

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Valence-arousal-dominance snapshot of one piece of text
///
/// Created once per analysis and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalState {
    /// Negative (-1.0) to positive (1.0) affect
    pub valence: f64,
    /// Calm (0.0) to excited (1.0)
    pub arousal: f64,
    /// Submissive (0.0) to dominant (1.0)
    pub dominance: f64,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
    /// Share of recognized sentiment-bearing tokens (0.0-1.0)
    pub confidence: f64,
}

impl EmotionalState {
    pub const NEUTRAL_VALENCE: f64 = 0.0;
    pub const NEUTRAL_AROUSAL: f64 = 0.5;
    pub const NEUTRAL_DOMINANCE: f64 = 0.5;

    /// Build a state, clamping every axis to its declared range
    pub fn new(valence: f64, arousal: f64, dominance: f64, confidence: f64) -> Self {
        Self {
            valence: clamp_or(valence, -1.0, 1.0, Self::NEUTRAL_VALENCE),
            arousal: clamp_or(arousal, 0.0, 1.0, Self::NEUTRAL_AROUSAL),
            dominance: clamp_or(dominance, 0.0, 1.0, Self::NEUTRAL_DOMINANCE),
            timestamp: Utc::now().timestamp_millis(),
            confidence: clamp_or(confidence, 0.0, 1.0, 0.0),
        }
    }

    /// Neutral vector with zero confidence
    pub fn neutral() -> Self {
        Self::new(
            Self::NEUTRAL_VALENCE,
            Self::NEUTRAL_AROUSAL,
            Self::NEUTRAL_DOMINANCE,
            0.0,
        )
    }

    /// Override the timestamp (used when replaying recorded states)
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self::neutral()
    }
}

// NaN never survives into a state
fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
