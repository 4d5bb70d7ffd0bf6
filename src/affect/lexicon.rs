// Keyword sets for the three affect axes

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const POSITIVE: &[&str] = &[
    "happy", "glad", "good", "great", "better", "calm", "hopeful", "hope", "grateful",
    "thankful", "love", "loved", "joy", "joyful", "proud", "relieved", "excited",
    "peaceful", "safe", "supported", "optimistic", "content", "fine", "okay", "wonderful",
    "amazing", "confident", "strong", "cheerful", "motivated",
];

const NEGATIVE: &[&str] = &[
    "sad", "depressed", "hopeless", "worthless", "alone", "lonely", "empty", "miserable",
    "anxious", "scared", "afraid", "angry", "hate", "hurt", "pain", "terrible", "awful",
    "tired", "exhausted", "numb", "broken", "guilty", "ashamed", "useless", "lost",
    "trapped", "desperate", "suicidal", "die", "dead", "cry", "crying", "worse",
    "panic", "overwhelmed", "helpless",
];

const HIGH_AROUSAL: &[&str] = &[
    "angry", "furious", "panic", "panicking", "anxious", "terrified", "excited",
    "frantic", "scared", "racing", "shaking", "screaming", "rage", "desperate",
    "overwhelmed", "urgent", "can't", "cannot", "stressed", "restless", "agitated",
];

const LOW_AROUSAL: &[&str] = &[
    "tired", "exhausted", "numb", "calm", "relaxed", "sleepy", "bored", "empty",
    "drained", "peaceful", "quiet", "slow", "heavy", "flat", "content",
];

const DOMINANT: &[&str] = &[
    "control", "strong", "confident", "decide", "decided", "capable", "able", "will",
    "handle", "manage", "powerful", "ready", "determined", "choose", "safe",
];

const SUBMISSIVE: &[&str] = &[
    "helpless", "hopeless", "trapped", "powerless", "weak", "stuck", "can't", "cannot",
    "useless", "worthless", "lost", "victim", "defeated", "nothing", "burden",
    "overwhelmed", "out",
];

/// Built-in lexicon shared by every estimator that does not load its own
pub static DEFAULT_LEXICON: Lazy<AffectLexicon> = Lazy::new(AffectLexicon::builtin);

/// Raw keyword lists, as stored in a lexicon JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconFile {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub high_arousal: Vec<String>,
    pub low_arousal: Vec<String>,
    pub dominant: Vec<String>,
    pub submissive: Vec<String>,
}

/// Lowercased keyword sets ready for token lookup
#[derive(Debug, Clone)]
pub struct AffectLexicon {
    pub(crate) positive: HashSet<String>,
    pub(crate) negative: HashSet<String>,
    pub(crate) high_arousal: HashSet<String>,
    pub(crate) low_arousal: HashSet<String>,
    pub(crate) dominant: HashSet<String>,
    pub(crate) submissive: HashSet<String>,
}

impl AffectLexicon {
    /// The lexicon compiled into the crate
    pub fn builtin() -> Self {
        Self {
            positive: to_set(POSITIVE.iter().copied()),
            negative: to_set(NEGATIVE.iter().copied()),
            high_arousal: to_set(HIGH_AROUSAL.iter().copied()),
            low_arousal: to_set(LOW_AROUSAL.iter().copied()),
            dominant: to_set(DOMINANT.iter().copied()),
            submissive: to_set(SUBMISSIVE.iter().copied()),
        }
    }

    /// Load a lexicon from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file: {}", path.display()))?;

        let file: LexiconFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse lexicon file: {}", path.display()))?;

        Ok(Self::from(file))
    }

    /// Whether the token appears in any of the six sets
    pub fn is_sentiment_token(&self, token: &str) -> bool {
        self.positive.contains(token)
            || self.negative.contains(token)
            || self.high_arousal.contains(token)
            || self.low_arousal.contains(token)
            || self.dominant.contains(token)
            || self.submissive.contains(token)
    }
}

impl From<LexiconFile> for AffectLexicon {
    fn from(file: LexiconFile) -> Self {
        Self {
            positive: to_set(file.positive.iter().map(String::as_str)),
            negative: to_set(file.negative.iter().map(String::as_str)),
            high_arousal: to_set(file.high_arousal.iter().map(String::as_str)),
            low_arousal: to_set(file.low_arousal.iter().map(String::as_str)),
            dominant: to_set(file.dominant.iter().map(String::as_str)),
            submissive: to_set(file.submissive.iter().map(String::as_str)),
        }
    }
}

impl Default for AffectLexicon {
    fn default() -> Self {
        DEFAULT_LEXICON.clone()
    }
}

fn to_set<'a>(words: impl Iterator<Item = &'a str>) -> HashSet<String> {
    words.map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty()).collect()
}
