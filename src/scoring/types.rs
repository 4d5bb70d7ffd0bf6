// Risk scoring types and the ML analyzer wire format
//
// Risk levels are always carried on the canonical 0-100 scale. The heuristic
// scorer works in 0-10 internally and converts at the boundary.

use serde::{Deserialize, Serialize};

/// Highest canonical risk level
pub const MAX_RISK: f64 = 100.0;

/// Factor between the heuristic 0-10 scale and the canonical 0-100 scale
pub const HEURISTIC_SCALE: f64 = 10.0;

/// Convert a heuristic 0-10 score to the canonical scale
pub fn from_heuristic(score: f64) -> f64 {
    clamp_risk(score * HEURISTIC_SCALE)
}

/// Convert a canonical risk level back to the heuristic 0-10 scale
pub fn to_heuristic(risk_level: f64) -> f64 {
    clamp_risk(risk_level) / HEURISTIC_SCALE
}

/// Clamp to 0-100, mapping NaN to 0
pub fn clamp_risk(risk_level: f64) -> f64 {
    if risk_level.is_nan() {
        0.0
    } else {
        risk_level.clamp(0.0, MAX_RISK)
    }
}

/// Caller-supplied context for one analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContext {
    pub user_id: Option<String>,
    pub language_code: Option<String>,
    pub cultural_context: Option<String>,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_language(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    pub fn with_cultural_context(mut self, cultural_context: impl Into<String>) -> Self {
        self.cultural_context = Some(cultural_context.into());
        self
    }
}

/// Which path produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Ml,
    Heuristic,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSource::Ml => "ml",
            AnalysisSource::Heuristic => "heuristic",
        }
    }
}

/// Urgency reported by the ML analyzer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionUrgency {
    // Explicit discriminants keep `Unknown` ranking below `Low` in the derived
    // `Ord`, while serde requires the `other` variant to be declared last.
    #[default]
    Low = 1,
    Medium = 2,
    High = 3,
    #[serde(alias = "critical")]
    Immediate = 4,
    /// Any urgency string this crate does not recognize; ranks below `Low`
    #[serde(other)]
    Unknown = 0,
}

/// Real-time risk block of an ML result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeRisk {
    /// Canonical 0-100 risk
    pub immediate_risk: f64,
    #[serde(default)]
    pub intervention_urgency: InterventionUrgency,
    #[serde(default)]
    pub recommended_interventions: Vec<String>,
}

/// Corrections the ML analyzer reports having applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasAdjustments {
    #[serde(default)]
    pub cultural_factors: Vec<String>,
    #[serde(default)]
    pub adjustment_factor: Option<f64>,
}

/// Result returned by an external ML analyzer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlAnalysis {
    #[serde(default)]
    pub has_crisis_indicators: bool,
    #[serde(default)]
    pub risk_level: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub ml_confidence: Option<f64>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub real_time_risk: Option<RealTimeRisk>,
    #[serde(default)]
    pub bias_adjustments: Option<BiasAdjustments>,
}

impl MlAnalysis {
    /// Confidence as reported, preferring `mlConfidence`
    pub fn reported_confidence(&self) -> f64 {
        self.ml_confidence
            .or(self.confidence)
            .filter(|c| !c.is_nan())
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }
}

/// Output of the risk scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    /// Canonical 0-100 risk
    pub risk_level: f64,
    pub confidence: f64,
    pub risk_factors: Vec<String>,
    pub immediate_action: bool,
    pub escalation_required: bool,
    pub source: AnalysisSource,
    /// Interventions suggested by the ML analyzer, if any
    pub ml_interventions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_conversion() {
        assert_eq!(from_heuristic(7.0), 70.0);
        assert_eq!(from_heuristic(12.0), 100.0);
        assert_eq!(to_heuristic(80.0), 8.0);
        assert_eq!(clamp_risk(f64::NAN), 0.0);
        assert_eq!(clamp_risk(-5.0), 0.0);
    }

    #[test]
    fn test_ml_analysis_parses_camel_case() {
        let json = r#"{
            "hasCrisisIndicators": true,
            "mlConfidence": 0.92,
            "riskFactors": ["hopelessness"],
            "realTimeRisk": {
                "immediateRisk": 95,
                "interventionUrgency": "critical",
                "recommendedInterventions": ["Call 988"]
            },
            "biasAdjustments": {"culturalFactors": ["western"]}
        }"#;
        let analysis: MlAnalysis = serde_json::from_str(json).unwrap();

        assert!(analysis.has_crisis_indicators);
        let risk = analysis.real_time_risk.as_ref().unwrap();
        assert_eq!(risk.immediate_risk, 95.0);
        assert_eq!(risk.intervention_urgency, InterventionUrgency::Immediate);
        assert!((analysis.reported_confidence() - 0.92).abs() < 1e-9);
    }

    #[test]
    fn test_unrecognized_urgency_keeps_risk_data() {
        let json = r#"{
            "hasCrisisIndicators": true,
            "mlConfidence": 0.7,
            "realTimeRisk": {"immediateRisk": 55, "interventionUrgency": "moderate"}
        }"#;
        let analysis: MlAnalysis = serde_json::from_str(json).unwrap();

        let risk = analysis.real_time_risk.as_ref().unwrap();
        assert_eq!(risk.immediate_risk, 55.0);
        assert_eq!(risk.intervention_urgency, InterventionUrgency::Unknown);
        assert!(InterventionUrgency::Unknown < InterventionUrgency::High);
    }

    #[test]
    fn test_reported_confidence_fallbacks() {
        let analysis = MlAnalysis {
            confidence: Some(0.4),
            ..Default::default()
        };
        assert_eq!(analysis.reported_confidence(), 0.4);
        assert_eq!(MlAnalysis::default().reported_confidence(), 0.0);
    }

    #[test]
    fn test_context_builder() {
        let context = AnalysisContext::new()
            .with_user_id("u1")
            .with_language("es")
            .with_cultural_context("latin_american");
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["languageCode"], "es");
        assert_eq!(json["culturalContext"], "latin_american");
    }
}
