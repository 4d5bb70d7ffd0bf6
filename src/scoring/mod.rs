// Risk scoring
//
// Turns an affect vector, optionally backed by an external ML analysis, into
// a canonical 0-100 risk level with urgency flags and risk factors.

mod analyzer;
mod scorer;
mod types;

pub use analyzer::{HttpMlAnalyzer, MlAnalyzer};
pub use scorer::{
    heuristic_score, RiskScorer, ESCALATION_THRESHOLD, HIGH_AROUSAL, IMMEDIATE_ACTION_THRESHOLD,
    LOW_DOMINANCE, STRONG_NEGATIVE_AFFECT,
};
pub use types::{
    clamp_risk, from_heuristic, to_heuristic, AnalysisContext, AnalysisSource, BiasAdjustments,
    InterventionUrgency, MlAnalysis, RealTimeRisk, RiskScore, HEURISTIC_SCALE, MAX_RISK,
};
