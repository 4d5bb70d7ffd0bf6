// Affect module
// Emotional state estimation from raw text

mod estimator;
mod lexicon;
mod types;

pub use estimator::EmotionEstimator;
pub use lexicon::{AffectLexicon, LexiconFile, DEFAULT_LEXICON};
pub use types::EmotionalState;
