// Metrics data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::AnalysisSource;

/// Per-session counters for the scoring backends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    /// Completed analyses (either source)
    pub total_analyses: u64,
    pub ml_analyses: u64,
    pub heuristic_analyses: u64,
    /// ML calls that errored or timed out
    pub ml_failures: u64,
    /// Analyses scored heuristically because the ML call failed
    pub fallbacks: u64,
    /// Analyses whose confidence fell below the configured threshold
    pub low_confidence_analyses: u64,
    /// Running mean of analysis confidence
    pub average_confidence: f64,
    /// Wall time of the most recent completed analysis
    pub last_latency_ms: u64,
    pub last_analysis_at: Option<DateTime<Utc>>,
}

impl ModelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed analysis
    pub fn record_analysis(
        &mut self,
        source: AnalysisSource,
        confidence: f64,
        latency_ms: u64,
        confidence_threshold: f64,
    ) {
        self.total_analyses += 1;
        match source {
            AnalysisSource::Ml => self.ml_analyses += 1,
            AnalysisSource::Heuristic => self.heuristic_analyses += 1,
        }
        if confidence < confidence_threshold {
            self.low_confidence_analyses += 1;
        }

        // Incremental mean avoids keeping every value
        self.average_confidence +=
            (confidence - self.average_confidence) / self.total_analyses as f64;
        self.last_latency_ms = latency_ms;
        self.last_analysis_at = Some(Utc::now());
    }

    pub fn record_ml_failure(&mut self) {
        self.ml_failures += 1;
    }

    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    /// Share of completed analyses that came from the ML backend
    pub fn ml_share(&self) -> f64 {
        if self.total_analyses == 0 {
            return 0.0;
        }
        self.ml_analyses as f64 / self.total_analyses as f64
    }
}
