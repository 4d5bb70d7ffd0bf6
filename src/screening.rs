// PHQ-9 and GAD-7 questionnaire scoring
//
// Questionnaire totals feed the same severity/recommendation path as text
// analysis: each band maps onto a canonical risk level.

use serde::{Deserialize, Serialize};

use crate::alert::CrisisSeverity;
use crate::errors::AnalysisError;

/// Highest score a single item can take
pub const MAX_ITEM_SCORE: u8 = 3;
pub const PHQ9_ITEMS: usize = 9;
pub const GAD7_ITEMS: usize = 7;

/// Canonical risk used when PHQ-9 item 9 (thoughts of self-harm) is endorsed
pub const SELF_HARM_ITEM_RISK: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Questionnaire {
    Phq9,
    Gad7,
}

impl Questionnaire {
    pub fn item_count(&self) -> usize {
        match self {
            Questionnaire::Phq9 => PHQ9_ITEMS,
            Questionnaire::Gad7 => GAD7_ITEMS,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Questionnaire::Phq9 => "PHQ-9",
            Questionnaire::Gad7 => "GAD-7",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningBand {
    Minimal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

impl ScreeningBand {
    /// Canonical risk level for the band
    pub fn risk_level(&self) -> f64 {
        match self {
            ScreeningBand::Minimal => 10.0,
            ScreeningBand::Mild => 25.0,
            ScreeningBand::Moderate => 45.0,
            ScreeningBand::ModeratelySevere => 65.0,
            ScreeningBand::Severe => 75.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningResult {
    pub questionnaire: Questionnaire,
    pub total: u32,
    pub band: ScreeningBand,
    /// PHQ-9 item 9 answered above zero
    pub self_harm_flag: bool,
    pub risk_level: f64,
    pub severity: CrisisSeverity,
    pub recommendations: Vec<String>,
}

/// Score a completed questionnaire
pub fn score(questionnaire: Questionnaire, items: &[u8]) -> Result<ScreeningResult, AnalysisError> {
    if items.len() != questionnaire.item_count() {
        return Err(AnalysisError::rejected(format!(
            "{} expects {} items, got {}",
            questionnaire.name(),
            questionnaire.item_count(),
            items.len()
        )));
    }
    if let Some(bad) = items.iter().find(|v| **v > MAX_ITEM_SCORE) {
        return Err(AnalysisError::rejected(format!(
            "item scores must be 0-{}, got {}",
            MAX_ITEM_SCORE, bad
        )));
    }

    let total: u32 = items.iter().map(|v| u32::from(*v)).sum();
    let band = match questionnaire {
        Questionnaire::Phq9 => phq9_band(total),
        Questionnaire::Gad7 => gad7_band(total),
    };
    let self_harm_flag = questionnaire == Questionnaire::Phq9 && items[PHQ9_ITEMS - 1] > 0;

    let risk_level = if self_harm_flag {
        band.risk_level().max(SELF_HARM_ITEM_RISK)
    } else {
        band.risk_level()
    };
    let severity = CrisisSeverity::from_risk(risk_level);

    Ok(ScreeningResult {
        questionnaire,
        total,
        band,
        self_harm_flag,
        risk_level,
        severity,
        recommendations: recommendations_for(band, self_harm_flag),
    })
}

fn phq9_band(total: u32) -> ScreeningBand {
    match total {
        0..=4 => ScreeningBand::Minimal,
        5..=9 => ScreeningBand::Mild,
        10..=14 => ScreeningBand::Moderate,
        15..=19 => ScreeningBand::ModeratelySevere,
        _ => ScreeningBand::Severe,
    }
}

fn gad7_band(total: u32) -> ScreeningBand {
    match total {
        0..=4 => ScreeningBand::Minimal,
        5..=9 => ScreeningBand::Mild,
        10..=14 => ScreeningBand::Moderate,
        _ => ScreeningBand::Severe,
    }
}

fn recommendations_for(band: ScreeningBand, self_harm_flag: bool) -> Vec<String> {
    let mut recommendations = Vec::new();
    if self_harm_flag {
        recommendations.push("Contact a crisis line today to talk through thoughts of self-harm".to_string());
    }
    match band {
        ScreeningBand::Minimal => {
            recommendations.push("Keep up self-care routines and check in again in a few weeks".to_string());
        }
        ScreeningBand::Mild => {
            recommendations.push("Watchful waiting; repeat the screening in two weeks".to_string());
            recommendations.push("Peer support groups can help".to_string());
        }
        ScreeningBand::Moderate => {
            recommendations.push("Consider talking with a counselor or therapist".to_string());
        }
        ScreeningBand::ModeratelySevere | ScreeningBand::Severe => {
            recommendations.push("Schedule an appointment with a mental health professional soon".to_string());
            recommendations.push("Share these results with your primary care provider".to_string());
        }
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phq9_bands() {
        let result = score(Questionnaire::Phq9, &[0; 9]).unwrap();
        assert_eq!(result.band, ScreeningBand::Minimal);
        assert_eq!(result.severity, CrisisSeverity::None);

        let result = score(Questionnaire::Phq9, &[2, 2, 2, 2, 2, 2, 2, 1, 0]).unwrap();
        assert_eq!(result.total, 15);
        assert_eq!(result.band, ScreeningBand::ModeratelySevere);
        assert_eq!(result.severity, CrisisSeverity::High);

        let result = score(Questionnaire::Phq9, &[3, 3, 3, 3, 3, 3, 3, 0, 0]).unwrap();
        assert_eq!(result.band, ScreeningBand::Severe);
    }

    #[test]
    fn test_phq9_item_nine_flags_self_harm() {
        let result = score(Questionnaire::Phq9, &[0, 0, 0, 0, 0, 0, 0, 0, 1]).unwrap();
        assert_eq!(result.band, ScreeningBand::Minimal);
        assert!(result.self_harm_flag);
        assert_eq!(result.risk_level, SELF_HARM_ITEM_RISK);
        assert!(result.severity.is_emergency());
        assert!(result.recommendations[0].contains("crisis line"));
    }

    #[test]
    fn test_gad7_bands() {
        assert_eq!(score(Questionnaire::Gad7, &[1; 7]).unwrap().band, ScreeningBand::Mild);
        assert_eq!(score(Questionnaire::Gad7, &[2; 7]).unwrap().band, ScreeningBand::Moderate);
        let result = score(Questionnaire::Gad7, &[3; 7]).unwrap();
        assert_eq!(result.band, ScreeningBand::Severe);
        assert!(!result.self_harm_flag);
    }

    #[test]
    fn test_invalid_input_rejected() {
        assert!(matches!(
            score(Questionnaire::Gad7, &[1; 9]),
            Err(AnalysisError::InputRejected { .. })
        ));
        assert!(score(Questionnaire::Phq9, &[4, 0, 0, 0, 0, 0, 0, 0, 0]).is_err());
    }
}
