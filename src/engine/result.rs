// Analysis result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::affect::EmotionalState;
use crate::alert::CrisisAlert;
use crate::interventions::InterventionRecommendation;
use crate::metrics::ModelMetrics;
use crate::scoring::AnalysisSource;

/// Outcome of one successful `analyze_text` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisAnalysisResult {
    /// Unique per call (UUID v4)
    pub analysis_id: String,
    pub timestamp: DateTime<Utc>,
    /// Canonical 0-100 risk
    pub risk_level: f64,
    pub confidence: f64,
    pub risk_factors: Vec<String>,
    pub emotional_state: EmotionalState,
    pub intervention_recommendations: Vec<String>,
    pub interventions: Vec<InterventionRecommendation>,
    pub cultural_context: Option<String>,
    pub immediate_action: bool,
    pub escalation_required: bool,
    pub source: AnalysisSource,
}

/// Per-call switches for `analyze_text`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Cancel any pending debounced analysis; this result supersedes it
    pub immediate: bool,
    /// Append to the history windows (`last_analysis` is updated either way)
    pub track_history: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            immediate: false,
            track_history: true,
        }
    }
}

impl AnalyzeOptions {
    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Default::default()
        }
    }

    pub fn untracked() -> Self {
        Self {
            track_history: false,
            ..Default::default()
        }
    }
}

/// Value copy of everything a session exposes to its UI collaborators
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub last_analysis: Option<CrisisAnalysisResult>,
    pub crisis_alert: CrisisAlert,
    pub emotional_history: Vec<EmotionalState>,
    pub risk_trend: Vec<f64>,
    pub analysis_history: Vec<CrisisAnalysisResult>,
    pub analysis_count: u64,
    pub model_metrics: ModelMetrics,
}
