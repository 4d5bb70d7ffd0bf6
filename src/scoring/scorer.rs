// Risk scorer: ML pass-through or heuristic fallback

use std::sync::Arc;

use super::types::{
    clamp_risk, from_heuristic, AnalysisSource, InterventionUrgency, MlAnalysis, RiskScore,
};
use crate::affect::EmotionalState;
use crate::crisis::{CrisisDetector, DEFAULT_DETECTOR};
use crate::culture;
use crate::errors::AnalysisError;

/// Heuristic score (0-10) at or above which immediate action is flagged
pub const IMMEDIATE_ACTION_THRESHOLD: f64 = 7.0;
/// Heuristic score (0-10) at or above which escalation is flagged
pub const ESCALATION_THRESHOLD: f64 = 8.0;

pub const STRONG_NEGATIVE_AFFECT: &str = "strong_negative_affect";
pub const HIGH_AROUSAL: &str = "high_arousal";
pub const LOW_DOMINANCE: &str = "low_dominance";

/// Combines the affect vector and/or an ML result into a `RiskScore`
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    detector: Option<Arc<CrisisDetector>>,
}

impl RiskScorer {
    pub fn new() -> Self {
        Self { detector: None }
    }

    /// Use a custom crisis keyword table for risk factors
    pub fn with_detector(detector: CrisisDetector) -> Self {
        Self {
            detector: Some(Arc::new(detector)),
        }
    }

    fn detector(&self) -> &CrisisDetector {
        self.detector.as_deref().unwrap_or(&*DEFAULT_DETECTOR)
    }

    /// Score with the ML result when present, heuristically otherwise
    pub fn score(
        &self,
        text: &str,
        state: &EmotionalState,
        ml: Option<&MlAnalysis>,
        cultural_context: Option<&str>,
    ) -> RiskScore {
        match ml {
            Some(analysis) => self.score_ml(text, analysis),
            None => self.score_heuristic(text, state, cultural_context),
        }
    }

    /// Heuristic fallback
    ///
    /// `|valence| * 5 + (arousal > 0.8 ? 3 : 0) + (dominance < 0.2 ? 2 : 0)`,
    /// clamped to 0-10 and scaled to 0-100. A known cultural profile scales
    /// the result before the urgency thresholds are applied.
    pub fn score_heuristic(
        &self,
        text: &str,
        state: &EmotionalState,
        cultural_context: Option<&str>,
    ) -> RiskScore {
        let raw = heuristic_score(state);
        let risk_level = culture::adjust_risk(from_heuristic(raw), cultural_context);

        let mut risk_factors = self.detector().risk_factors(text);
        if state.valence < -0.5 {
            risk_factors.push(STRONG_NEGATIVE_AFFECT.to_string());
        }
        if state.arousal > 0.8 {
            risk_factors.push(HIGH_AROUSAL.to_string());
        }
        if state.dominance < 0.2 {
            risk_factors.push(LOW_DOMINANCE.to_string());
        }

        RiskScore {
            risk_level,
            confidence: state.confidence,
            risk_factors,
            immediate_action: risk_level >= from_heuristic(IMMEDIATE_ACTION_THRESHOLD),
            escalation_required: risk_level >= from_heuristic(ESCALATION_THRESHOLD),
            source: AnalysisSource::Heuristic,
            ml_interventions: Vec::new(),
        }
    }

    /// ML pass-through
    ///
    /// Risk and confidence are taken as reported; urgency flags come from the
    /// analyzer's own `interventionUrgency`. A result without `realTimeRisk`
    /// carries no risk data and scores 0.
    pub fn score_ml(&self, text: &str, analysis: &MlAnalysis) -> RiskScore {
        let mut risk_factors = analysis.risk_factors.clone();
        for factor in self.detector().risk_factors(text) {
            if !risk_factors.contains(&factor) {
                risk_factors.push(factor);
            }
        }

        let Some(real_time) = analysis.real_time_risk.as_ref() else {
            let violation =
                AnalysisError::InvariantViolation("ML result is missing realTimeRisk".to_string());
            tracing::warn!(
                error = %violation,
                has_crisis_indicators = analysis.has_crisis_indicators,
                "Treating ML result as carrying no risk data"
            );
            return RiskScore {
                risk_level: 0.0,
                confidence: analysis.reported_confidence(),
                risk_factors,
                immediate_action: false,
                escalation_required: false,
                source: AnalysisSource::Ml,
                ml_interventions: Vec::new(),
            };
        };

        let urgency = real_time.intervention_urgency;
        RiskScore {
            risk_level: clamp_risk(real_time.immediate_risk),
            confidence: analysis.reported_confidence(),
            risk_factors,
            immediate_action: urgency >= InterventionUrgency::High,
            escalation_required: urgency == InterventionUrgency::Immediate,
            source: AnalysisSource::Ml,
            ml_interventions: real_time.recommended_interventions.clone(),
        }
    }
}

/// Raw heuristic score on the 0-10 scale
pub fn heuristic_score(state: &EmotionalState) -> f64 {
    let mut score = state.valence.abs() * 5.0;
    if state.arousal > 0.8 {
        score += 3.0;
    }
    if state.dominance < 0.2 {
        score += 2.0;
    }
    score.clamp(0.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::types::RealTimeRisk;

    fn state(valence: f64, arousal: f64, dominance: f64) -> EmotionalState {
        EmotionalState::new(valence, arousal, dominance, 0.5)
    }

    #[test]
    fn test_heuristic_formula() {
        assert_eq!(heuristic_score(&state(0.0, 0.5, 0.5)), 0.0);
        assert_eq!(heuristic_score(&state(-1.0, 0.5, 0.5)), 5.0);
        assert_eq!(heuristic_score(&state(-1.0, 0.9, 0.5)), 8.0);
        assert_eq!(heuristic_score(&state(-1.0, 0.9, 0.1)), 10.0);
        // Boundaries are strict
        assert_eq!(heuristic_score(&state(0.0, 0.8, 0.2)), 0.0);
    }

    #[test]
    fn test_heuristic_thresholds() {
        let scorer = RiskScorer::new();

        // 5 + 2 = 7: immediate action, no escalation
        let score = scorer.score_heuristic("", &state(-1.0, 0.5, 0.1), None);
        assert_eq!(score.risk_level, 70.0);
        assert!(score.immediate_action);
        assert!(!score.escalation_required);

        // 5 + 3 = 8: both
        let score = scorer.score_heuristic("", &state(-1.0, 0.9, 0.5), None);
        assert_eq!(score.risk_level, 80.0);
        assert!(score.immediate_action);
        assert!(score.escalation_required);

        // 3 + 3 = 6: neither
        let score = scorer.score_heuristic("", &state(-0.6, 0.9, 0.5), None);
        assert!(!score.immediate_action);
        assert!(!score.escalation_required);
    }

    #[test]
    fn test_heuristic_confidence_and_factors() {
        let scorer = RiskScorer::new();
        let text = "I feel completely hopeless and see no way out";
        let st = EmotionalState::new(-1.0, 0.5, 0.0, 0.2);
        let score = scorer.score_heuristic(text, &st, None);

        assert_eq!(score.confidence, 0.2);
        assert_eq!(score.source, AnalysisSource::Heuristic);
        assert_eq!(
            score.risk_factors,
            vec!["hopelessness", STRONG_NEGATIVE_AFFECT, LOW_DOMINANCE]
        );
    }

    #[test]
    fn test_cultural_adjustment_only_on_heuristic() {
        let scorer = RiskScorer::new();
        let st = state(-1.0, 0.5, 0.5);
        let score = scorer.score_heuristic("", &st, Some("east_asian"));
        assert!((score.risk_level - 60.0).abs() < 1e-9);

        let ml = MlAnalysis {
            real_time_risk: Some(RealTimeRisk {
                immediate_risk: 50.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let score = scorer.score("", &st, Some(&ml), Some("east_asian"));
        assert_eq!(score.risk_level, 50.0);
    }

    #[test]
    fn test_ml_passthrough() {
        let scorer = RiskScorer::new();
        let ml = MlAnalysis {
            has_crisis_indicators: true,
            ml_confidence: Some(0.9),
            risk_factors: vec!["self_harm".to_string()],
            real_time_risk: Some(RealTimeRisk {
                immediate_risk: 95.0,
                intervention_urgency: InterventionUrgency::Immediate,
                recommended_interventions: vec!["Call 988".to_string()],
            }),
            ..Default::default()
        };

        // The affect vector is neutral; ML must not be second-guessed
        let score = scorer.score("hopeless", &EmotionalState::neutral(), Some(&ml), None);
        assert_eq!(score.risk_level, 95.0);
        assert_eq!(score.confidence, 0.9);
        assert!(score.immediate_action);
        assert!(score.escalation_required);
        assert_eq!(score.source, AnalysisSource::Ml);
        assert_eq!(score.risk_factors, vec!["self_harm", "hopelessness"]);
        assert_eq!(score.ml_interventions, vec!["Call 988"]);
    }

    #[test]
    fn test_ml_urgency_drives_flags() {
        let scorer = RiskScorer::new();
        let ml = MlAnalysis {
            real_time_risk: Some(RealTimeRisk {
                immediate_risk: 95.0,
                intervention_urgency: InterventionUrgency::Medium,
                recommended_interventions: vec![],
            }),
            ..Default::default()
        };
        let score = scorer.score_ml("", &ml);
        assert_eq!(score.risk_level, 95.0);
        assert!(!score.immediate_action);
        assert!(!score.escalation_required);
    }

    #[test]
    fn test_ml_missing_real_time_risk() {
        let scorer = RiskScorer::new();
        let ml = MlAnalysis {
            has_crisis_indicators: true,
            risk_level: Some(90.0),
            ..Default::default()
        };
        let score = scorer.score_ml("", &ml);
        assert_eq!(score.risk_level, 0.0);
        assert!(!score.immediate_action);
    }
}
