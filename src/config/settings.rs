// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine configuration recognized by every `CrisisSession`
///
/// Field defaults match what a freshly mounted chat view would get. All
/// window sizes are entry counts, all durations are milliseconds, and all
/// risk values are on the canonical 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Call the ML analyzer when one is attached
    pub enable_ml_analysis: bool,

    /// Record emotional states in the emotional history window
    pub enable_emotional_tracking: bool,

    /// Apply cultural adjustment profiles to heuristic scores
    pub enable_cultural_context: bool,

    /// Feed monitored text input into the debounced analyzer
    pub auto_analyze: bool,

    /// Texts shorter than this many characters are ignored (default: 10)
    pub min_analysis_length: usize,

    /// Capacity of the analysis history window (default: 100)
    pub max_history_size: usize,

    /// Quiet period before a debounced analysis fires (default: 1000)
    pub debounce_ms: u64,

    /// Capacity of the emotional history window (default: 50)
    pub emotional_history_limit: usize,

    /// Capacity of the risk trend window (default: 10)
    pub risk_trend_window: usize,

    /// Analyses below this confidence are counted as low-confidence (default: 0.7)
    pub confidence_threshold: f64,

    /// Score heuristically when ML is disabled, missing, or failing
    pub allow_heuristic_fallback: bool,

    /// Upper bound on a single ML call (default: 5000)
    pub ml_timeout_ms: u64,

    /// Minimum jump between consecutive risk levels that counts as escalation (default: 20)
    pub escalation_delta: f64,

    /// Risk level at or above which `CrisisDetected` is emitted (default: 70)
    pub crisis_alert_floor: f64,

    /// HTTP endpoint of the ML analyzer, if any
    pub ml_endpoint: Option<String>,

    /// Custom affect lexicon (JSON); the built-in lexicon is used when unset
    pub lexicon_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_ml_analysis: true,
            enable_emotional_tracking: true,
            enable_cultural_context: true,
            auto_analyze: true,
            min_analysis_length: 10,
            max_history_size: 100,
            debounce_ms: 1000,
            emotional_history_limit: 50,
            risk_trend_window: 10,
            confidence_threshold: 0.7,
            allow_heuristic_fallback: true,
            ml_timeout_ms: 5000,
            escalation_delta: 20.0,
            crisis_alert_floor: 70.0,
            ml_endpoint: None,
            lexicon_path: None,
        }
    }
}

impl EngineConfig {
    /// Reject configurations that would make the windows or thresholds meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_history_size == 0 {
            bail!("max_history_size must be at least 1");
        }
        if self.emotional_history_limit == 0 {
            bail!("emotional_history_limit must be at least 1");
        }
        if self.risk_trend_window == 0 {
            bail!("risk_trend_window must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            bail!(
                "confidence_threshold must be within 0.0-1.0 (got {})",
                self.confidence_threshold
            );
        }
        if !(0.0..=100.0).contains(&self.crisis_alert_floor) {
            bail!(
                "crisis_alert_floor must be within 0-100 (got {})",
                self.crisis_alert_floor
            );
        }
        if self.escalation_delta < 0.0 {
            bail!("escalation_delta must not be negative");
        }
        if self.ml_timeout_ms == 0 {
            bail!("ml_timeout_ms must be greater than zero");
        }
        Ok(())
    }

    /// Whether any scoring path is available at all
    pub fn can_score(&self, has_analyzer: bool) -> bool {
        (self.enable_ml_analysis && has_analyzer) || self.allow_heuristic_fallback
    }
}
