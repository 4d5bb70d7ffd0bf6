// Severity tiers on the canonical risk scale
//
// Half-open bands, contiguous over 0-100:
//   [0, 20) none | [20, 40) low | [40, 60) medium | [60, 80) high
//   [80, 90) critical | [90, 100] immediate

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bounds of each tier above `None`, in ascending order
const TIERS: &[(f64, CrisisSeverity)] = &[
    (20.0, CrisisSeverity::Low),
    (40.0, CrisisSeverity::Medium),
    (60.0, CrisisSeverity::High),
    (80.0, CrisisSeverity::Critical),
    (90.0, CrisisSeverity::Immediate),
];

/// Discrete alert level, totally ordered from `None` to `Immediate`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CrisisSeverity {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
    Immediate,
}

impl CrisisSeverity {
    /// Map a canonical risk level to its tier
    pub fn from_risk(risk_level: f64) -> Self {
        if risk_level.is_nan() {
            return CrisisSeverity::None;
        }
        TIERS
            .iter()
            .rev()
            .find(|(floor, _)| risk_level >= *floor)
            .map(|(_, severity)| *severity)
            .unwrap_or(CrisisSeverity::None)
    }

    /// Whether this tier engages emergency mode
    pub fn is_emergency(&self) -> bool {
        matches!(self, CrisisSeverity::Critical | CrisisSeverity::Immediate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CrisisSeverity::None => "none",
            CrisisSeverity::Low => "low",
            CrisisSeverity::Medium => "medium",
            CrisisSeverity::High => "high",
            CrisisSeverity::Critical => "critical",
            CrisisSeverity::Immediate => "immediate",
        }
    }
}

impl fmt::Display for CrisisSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
