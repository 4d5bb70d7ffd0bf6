// Crisis alert built from the current severity tier

use serde::{Deserialize, Serialize};

use super::severity::CrisisSeverity;
use crate::culture;
use crate::interventions::ResourceDirectory;

/// What the alert banner should show
///
/// Rebuilt wholesale on every analysis. `show` mirrors `severity != None`
/// until the alert is dismissed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisAlert {
    pub show: bool,
    pub severity: CrisisSeverity,
    pub message: String,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
    pub emergency_mode: bool,
    pub culturally_appropriate: bool,
}

impl CrisisAlert {
    /// Build the alert for a canonical risk level
    pub fn for_risk(
        risk_level: f64,
        language_code: Option<&str>,
        cultural_context: Option<&str>,
    ) -> Self {
        let severity = CrisisSeverity::from_risk(risk_level);
        let directory = ResourceDirectory::new();

        let resources: Vec<String> = match severity {
            CrisisSeverity::None => Vec::new(),
            CrisisSeverity::Low => vec!["Peer support chat".to_string()],
            CrisisSeverity::Medium | CrisisSeverity::High => {
                directory.hotline_labels(language_code)
            }
            CrisisSeverity::Critical | CrisisSeverity::Immediate => directory
                .emergency(language_code)
                .iter()
                .map(|r| r.label())
                .collect(),
        };

        let culturally_appropriate = severity != CrisisSeverity::None
            && cultural_context
                .and_then(culture::profile)
                .is_some_and(|p| p.adapted_resources)
            && language_code.map_or(true, |code| directory.has_language(code));

        Self {
            show: severity != CrisisSeverity::None,
            severity,
            message: message_for(severity).to_string(),
            actions: actions_for(severity),
            resources,
            emergency_mode: severity.is_emergency(),
            culturally_appropriate,
        }
    }

    /// Hide the banner, keeping everything else for inspection
    pub fn dismiss(&mut self) {
        self.show = false;
    }
}

fn message_for(severity: CrisisSeverity) -> &'static str {
    match severity {
        CrisisSeverity::None => "",
        CrisisSeverity::Low => "It sounds like things are a bit heavy right now. We're here if you want to talk.",
        CrisisSeverity::Medium => "You seem to be going through a hard time. Support is available whenever you need it.",
        CrisisSeverity::High => "We're concerned about how you're feeling. Please consider reaching out to someone now.",
        CrisisSeverity::Critical => "Your safety matters. Please contact a crisis line right now.",
        CrisisSeverity::Immediate => "You don't have to face this alone. Please call a crisis line or emergency services immediately.",
    }
}

fn actions_for(severity: CrisisSeverity) -> Vec<String> {
    let actions: &[&str] = match severity {
        CrisisSeverity::None => &[],
        CrisisSeverity::Low => &["Take a short break", "Talk to a peer supporter"],
        CrisisSeverity::Medium => &["Talk to a peer supporter", "Try a grounding exercise"],
        CrisisSeverity::High => &["Contact a crisis line", "Reach out to someone you trust"],
        CrisisSeverity::Critical => &[
            "Contact a crisis line now",
            "Stay with someone you trust",
            "Remove access to anything you could use to hurt yourself",
        ],
        CrisisSeverity::Immediate => &[
            "Call emergency services",
            "Contact a crisis line now",
            "Stay with someone you trust",
        ],
    };
    actions.iter().map(|a| a.to_string()).collect()
}
