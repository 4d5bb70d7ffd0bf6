// History module
// Bounded rolling windows and the trend statistics computed over them

mod trends;
mod window;

pub use trends::{
    emotional_trend, risk_prediction, EmotionalTrend, RiskDirection, RiskPrediction, Trend,
    MIN_EMOTIONAL_SAMPLES, MIN_RISK_SAMPLES, RISK_SLOPE_NOISE, VALENCE_NOISE,
};
pub use window::BoundedHistory;
