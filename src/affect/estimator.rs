// Keyword-based valence/arousal/dominance estimation

use super::lexicon::{AffectLexicon, DEFAULT_LEXICON};
use super::types::EmotionalState;
use std::collections::HashSet;
use std::sync::Arc;

/// Number of sentiment tokens at which confidence saturates
const CONFIDENCE_SATURATION: f64 = 10.0;

/// Estimates an `EmotionalState` from raw text
///
/// Pure: the same text always yields the same axes and confidence (only the
/// timestamp differs).
#[derive(Debug, Clone)]
pub struct EmotionEstimator {
    lexicon: Option<Arc<AffectLexicon>>,
}

impl EmotionEstimator {
    /// Estimator backed by the built-in lexicon
    pub fn new() -> Self {
        Self { lexicon: None }
    }

    /// Estimator backed by a custom lexicon
    pub fn with_lexicon(lexicon: AffectLexicon) -> Self {
        Self {
            lexicon: Some(Arc::new(lexicon)),
        }
    }

    fn lexicon(&self) -> &AffectLexicon {
        self.lexicon.as_deref().unwrap_or(&*DEFAULT_LEXICON)
    }

    /// Derive the affect vector for `text`
    pub fn estimate(&self, text: &str) -> EmotionalState {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return EmotionalState::neutral();
        }

        let lexicon = self.lexicon();
        let count = |set: &HashSet<String>| tokens.iter().filter(|t| set.contains(*t)).count();

        let valence = axis(count(&lexicon.positive), count(&lexicon.negative))
            .unwrap_or(EmotionalState::NEUTRAL_VALENCE);
        let arousal = axis(count(&lexicon.high_arousal), count(&lexicon.low_arousal))
            .map(to_unit_range)
            .unwrap_or(EmotionalState::NEUTRAL_AROUSAL);
        let dominance = axis(count(&lexicon.dominant), count(&lexicon.submissive))
            .map(to_unit_range)
            .unwrap_or(EmotionalState::NEUTRAL_DOMINANCE);

        let sentiment_tokens = tokens
            .iter()
            .filter(|t| lexicon.is_sentiment_token(t))
            .count();
        let confidence = (sentiment_tokens as f64 / CONFIDENCE_SATURATION).min(1.0);

        EmotionalState::new(valence, arousal, dominance, confidence)
    }
}

impl Default for EmotionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// `(a - b) / (a + b)` in [-1, 1], or None when neither side matched
fn axis(a: usize, b: usize) -> Option<f64> {
    let total = a + b;
    if total == 0 {
        return None;
    }
    Some((a as f64 - b as f64) / total as f64)
}

fn to_unit_range(raw: f64) -> f64 {
    (raw + 1.0) / 2.0
}

/// Lowercase whitespace tokens with surrounding punctuation stripped
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}
