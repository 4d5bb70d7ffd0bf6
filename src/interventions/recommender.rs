// Rule-table intervention recommender

use serde::{Deserialize, Serialize};

use super::resources::ResourceDirectory;
use crate::affect::EmotionalState;

/// Canonical risk at or above which a crisis line is recommended
pub const CRISIS_LINE_RISK: f64 = 70.0;
/// Canonical risk at or above which professional support is recommended
pub const PROFESSIONAL_SUPPORT_RISK: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    Immediate,
    ShortTerm,
    LongTerm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// One suggested action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionRecommendation {
    #[serde(rename = "type")]
    pub kind: InterventionType,
    pub priority: InterventionPriority,
    pub description: String,
    pub action: String,
    pub resources: Vec<String>,
    /// Rough expected benefit (0.0-1.0)
    pub estimated_effectiveness: f64,
}

/// Evaluates every rule in table order; all matching rules contribute
#[derive(Debug, Clone, Copy, Default)]
pub struct InterventionRecommender {
    directory: ResourceDirectory,
}

impl InterventionRecommender {
    pub fn new() -> Self {
        Self {
            directory: ResourceDirectory::new(),
        }
    }

    /// Recommendations for a canonical risk level and affect vector
    ///
    /// A neutral state with zero risk yields an empty list.
    pub fn recommend(
        &self,
        risk_level: f64,
        state: &EmotionalState,
        language_code: Option<&str>,
    ) -> Vec<InterventionRecommendation> {
        let mut recommendations = Vec::new();

        if risk_level >= CRISIS_LINE_RISK {
            recommendations.push(InterventionRecommendation {
                kind: InterventionType::Immediate,
                priority: InterventionPriority::Critical,
                description: "Reach out to a crisis line now".to_string(),
                action: "contact_crisis_line".to_string(),
                resources: self.directory.hotline_labels(language_code),
                estimated_effectiveness: 0.9,
            });
        }

        if state.valence < -0.5 {
            recommendations.push(InterventionRecommendation {
                kind: InterventionType::ShortTerm,
                priority: InterventionPriority::High,
                description: "Try a small mood-lifting activity: a short walk, music, or \
                              messaging someone you trust"
                    .to_string(),
                action: "mood_improvement".to_string(),
                resources: vec![
                    "Behavioral activation worksheet".to_string(),
                    "Peer support chat".to_string(),
                ],
                estimated_effectiveness: 0.6,
            });
        }

        if state.arousal > 0.8 {
            recommendations.push(InterventionRecommendation {
                kind: InterventionType::Immediate,
                priority: InterventionPriority::High,
                description: "Slow your breathing: in for 4, hold for 4, out for 6".to_string(),
                action: "calming_technique".to_string(),
                resources: vec![
                    "Guided breathing exercise".to_string(),
                    "5-4-3-2-1 grounding exercise".to_string(),
                ],
                estimated_effectiveness: 0.7,
            });
        }

        if risk_level >= PROFESSIONAL_SUPPORT_RISK {
            recommendations.push(InterventionRecommendation {
                kind: InterventionType::LongTerm,
                priority: InterventionPriority::Medium,
                description: "Consider talking with a licensed mental health professional"
                    .to_string(),
                action: "professional_support".to_string(),
                resources: vec![
                    "Therapist directory".to_string(),
                    "Primary care provider".to_string(),
                ],
                estimated_effectiveness: 0.8,
            });
        }

        recommendations
    }
}
