// Trend and short-horizon prediction over the history windows
//
// Both calculations are pure functions of the window contents so a snapshot
// can be re-evaluated later with identical results.

use serde::{Deserialize, Serialize};

use crate::affect::EmotionalState;
use crate::scoring::clamp_risk;

/// Minimum emotional states before a trend is reported
pub const MIN_EMOTIONAL_SAMPLES: usize = 2;
/// Minimum risk levels before a prediction is made
pub const MIN_RISK_SAMPLES: usize = 3;
/// Valence change (mean of later half minus earlier half) treated as noise
pub const VALENCE_NOISE: f64 = 0.1;
/// Risk slope (canonical points per analysis) treated as noise
pub const RISK_SLOPE_NOISE: f64 = 5.0;

/// Direction of the emotional trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Deteriorating,
    Stable,
    InsufficientData,
}

/// Emotional trend with confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalTrend {
    pub trend: Trend,
    pub confidence: f64,
}

/// Direction of the risk trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskDirection {
    Increasing,
    Decreasing,
    Stable,
    Unknown,
}

/// One-step-ahead risk extrapolation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPrediction {
    pub current_risk: f64,
    pub predicted_risk: f64,
    pub confidence: f64,
    pub trend: RiskDirection,
}

/// Compare mean valence of the later half of the window with the earlier half
pub fn emotional_trend(states: &[EmotionalState]) -> EmotionalTrend {
    if states.len() < MIN_EMOTIONAL_SAMPLES {
        return EmotionalTrend {
            trend: Trend::InsufficientData,
            confidence: 0.0,
        };
    }

    let mid = states.len() / 2;
    let first_avg = mean(states[..mid].iter().map(|s| s.valence));
    let second_avg = mean(states[mid..].iter().map(|s| s.valence));

    let diff = second_avg - first_avg;

    // Use threshold to avoid noise
    let trend = if diff > VALENCE_NOISE {
        Trend::Improving
    } else if diff < -VALENCE_NOISE {
        Trend::Deteriorating
    } else {
        Trend::Stable
    };

    EmotionalTrend {
        trend,
        confidence: (states.len() as f64 / 10.0).min(1.0),
    }
}

/// Least-squares extrapolation of the next risk level
///
/// `window` is the configured window size; confidence grows as the window
/// fills and as consecutive steps agree with the fitted direction.
pub fn risk_prediction(levels: &[f64], window: usize) -> RiskPrediction {
    let current_risk = levels.last().copied().unwrap_or(0.0);

    if levels.len() < MIN_RISK_SAMPLES {
        return RiskPrediction {
            current_risk,
            predicted_risk: 0.0,
            confidence: 0.0,
            trend: RiskDirection::Unknown,
        };
    }

    let slope = least_squares_slope(levels);
    let trend = if slope > RISK_SLOPE_NOISE {
        RiskDirection::Increasing
    } else if slope < -RISK_SLOPE_NOISE {
        RiskDirection::Decreasing
    } else {
        RiskDirection::Stable
    };

    let deltas: Vec<f64> = levels.windows(2).map(|w| w[1] - w[0]).collect();
    let agreeing = deltas
        .iter()
        .filter(|d| match trend {
            RiskDirection::Increasing => **d > 0.0,
            RiskDirection::Decreasing => **d < 0.0,
            _ => d.abs() <= RISK_SLOPE_NOISE,
        })
        .count();
    let consistency = agreeing as f64 / deltas.len() as f64;
    let fill = (levels.len() as f64 / window.max(1) as f64).min(1.0);

    RiskPrediction {
        current_risk,
        predicted_risk: clamp_risk(current_risk + slope),
        confidence: fill * consistency,
        trend,
    }
}

fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values.iter().copied());

    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });

    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valences(values: &[f64]) -> Vec<EmotionalState> {
        values
            .iter()
            .map(|v| EmotionalState::new(*v, 0.5, 0.5, 0.5))
            .collect()
    }

    #[test]
    fn test_insufficient_emotional_data() {
        let trend = emotional_trend(&valences(&[0.3]));
        assert_eq!(trend.trend, Trend::InsufficientData);
        assert_eq!(trend.confidence, 0.0);

        let trend = emotional_trend(&[]);
        assert_eq!(trend.trend, Trend::InsufficientData);
    }

    #[test]
    fn test_improving_trend() {
        let trend = emotional_trend(&valences(&[-0.8, -0.7, -0.6, -0.5, 0.2, 0.3, 0.4, 0.5]));
        assert_eq!(trend.trend, Trend::Improving);
        assert!((trend.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_deteriorating_trend() {
        let trend = emotional_trend(&valences(&[0.5, 0.4, -0.6, -0.7]));
        assert_eq!(trend.trend, Trend::Deteriorating);
    }

    #[test]
    fn test_stable_trend() {
        let trend = emotional_trend(&valences(&[0.1; 12]));
        assert_eq!(trend.trend, Trend::Stable);
        assert_eq!(trend.confidence, 1.0);
    }

    #[test]
    fn test_insufficient_risk_data() {
        let prediction = risk_prediction(&[40.0, 60.0], 10);
        assert_eq!(prediction.trend, RiskDirection::Unknown);
        assert_eq!(prediction.predicted_risk, 0.0);
        assert_eq!(prediction.confidence, 0.0);
        assert_eq!(prediction.current_risk, 60.0);

        let prediction = risk_prediction(&[], 10);
        assert_eq!(prediction.current_risk, 0.0);
    }

    #[test]
    fn test_increasing_risk() {
        let prediction = risk_prediction(&[10.0, 20.0, 30.0, 40.0], 10);
        assert_eq!(prediction.trend, RiskDirection::Increasing);
        assert!((prediction.predicted_risk - 50.0).abs() < 1e-9);
        assert!((prediction.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_decreasing_risk_clamped() {
        let prediction = risk_prediction(&[60.0, 30.0, 5.0], 3);
        assert_eq!(prediction.trend, RiskDirection::Decreasing);
        assert_eq!(prediction.predicted_risk, 0.0);
        assert_eq!(prediction.confidence, 1.0);
    }

    #[test]
    fn test_stable_risk() {
        let prediction = risk_prediction(&[50.0, 52.0, 49.0, 51.0], 4);
        assert_eq!(prediction.trend, RiskDirection::Stable);
        assert_eq!(prediction.confidence, 1.0);
    }

    #[test]
    fn test_inconsistent_steps_lower_confidence() {
        // Net upward fit, but one step goes down
        let prediction = risk_prediction(&[10.0, 40.0, 30.0, 70.0], 4);
        assert_eq!(prediction.trend, RiskDirection::Increasing);
        assert!((prediction.confidence - 2.0 / 3.0).abs() < 1e-9);
    }
}
