// crisiswatch - Crisis risk scoring and emotional state tracking
// Library exports

pub mod affect; // Valence/arousal/dominance estimation
pub mod alert; // Severity bands, alert banner, escalation
pub mod config;
pub mod crisis; // Keyword risk-factor detection
pub mod culture;
pub mod engine; // Per-conversation orchestration
pub mod errors;
pub mod history; // Bounded windows and trends
pub mod interventions;
pub mod metrics;
pub mod scoring; // Heuristic and ML risk scoring
pub mod screening; // PHQ-9 / GAD-7
