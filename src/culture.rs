// Cultural adjustment profiles
//
// Some communities systematically under-report distress in text, so the
// heuristic score is scaled by a per-profile factor before severity mapping.
// ML results are never adjusted.

use serde::Serialize;

/// A cultural-context profile and its scoring correction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CulturalProfile {
    /// Canonical profile key
    pub key: &'static str,
    /// Multiplier applied to heuristic risk levels
    pub risk_multiplier: f64,
    /// Whether adapted crisis resources exist for this profile
    pub adapted_resources: bool,
}

const PROFILES: &[CulturalProfile] = &[
    CulturalProfile {
        key: "western",
        risk_multiplier: 1.0,
        adapted_resources: true,
    },
    CulturalProfile {
        key: "east_asian",
        risk_multiplier: 1.2,
        adapted_resources: true,
    },
    CulturalProfile {
        key: "south_asian",
        risk_multiplier: 1.15,
        adapted_resources: true,
    },
    CulturalProfile {
        key: "latin_american",
        risk_multiplier: 1.1,
        adapted_resources: true,
    },
    CulturalProfile {
        key: "middle_eastern",
        risk_multiplier: 1.15,
        adapted_resources: false,
    },
    CulturalProfile {
        key: "african",
        risk_multiplier: 1.1,
        adapted_resources: false,
    },
];

/// Look up a profile by name ("East Asian", "east-asian" and "EAST_ASIAN" all match)
pub fn profile(name: &str) -> Option<&'static CulturalProfile> {
    let key: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();
    PROFILES.iter().find(|p| p.key == key)
}

/// All known profiles
pub fn profiles() -> &'static [CulturalProfile] {
    PROFILES
}

/// Scale a canonical (0-100) risk level by the named profile
///
/// Unknown or absent profiles leave the score unchanged.
pub fn adjust_risk(risk_level: f64, cultural_context: Option<&str>) -> f64 {
    let multiplier = cultural_context
        .and_then(profile)
        .map(|p| p.risk_multiplier)
        .unwrap_or(1.0);
    (risk_level * multiplier).clamp(0.0, 100.0)
}
