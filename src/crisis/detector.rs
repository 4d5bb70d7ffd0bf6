// Crisis keyword detector
// Names the risk-factor categories present in a piece of text

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Shared detector built from the default keyword table
pub static DEFAULT_DETECTOR: Lazy<CrisisDetector> = Lazy::new(CrisisDetector::default);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisKeywords {
    pub self_harm: Vec<String>,
    pub hopelessness: Vec<String>,
    pub isolation: Vec<String>,
    pub violence: Vec<String>,
    pub abuse: Vec<String>,
    #[serde(default)]
    pub substance_use: Vec<String>,
}

impl Default for CrisisKeywords {
    fn default() -> Self {
        fn list(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            self_harm: list(&[
                "suicide",
                "suicidal",
                "kill myself",
                "end my life",
                "hurt myself",
                "self harm",
                "self-harm",
                "cut myself",
                "want to die",
                "better off dead",
            ]),
            hopelessness: list(&[
                "hopeless",
                "no way out",
                "no point",
                "give up",
                "nothing matters",
                "can't go on",
                "no future",
            ]),
            isolation: list(&[
                "alone",
                "lonely",
                "no one cares",
                "nobody cares",
                "no friends",
                "burden",
            ]),
            violence: list(&["kill someone", "hurt someone", "hurt them"]),
            abuse: list(&["being abused", "hits me", "abusing me", "unsafe at home"]),
            substance_use: list(&["overdose", "drinking again", "relapse", "pills"]),
        }
    }
}

/// Risk-factor category names as they appear in analysis results
pub const SELF_HARM: &str = "self_harm";
pub const HOPELESSNESS: &str = "hopelessness";
pub const ISOLATION: &str = "isolation";
pub const VIOLENCE: &str = "violence";
pub const ABUSE: &str = "abuse";
pub const SUBSTANCE_USE: &str = "substance_use";

#[derive(Debug, Clone)]
struct Category {
    name: &'static str,
    keywords: Vec<String>,
    pattern: Option<Regex>,
}

#[derive(Debug, Clone)]
pub struct CrisisDetector {
    categories: Vec<Category>,
}

impl CrisisDetector {
    /// Build a detector from a keyword table
    pub fn new(keywords: CrisisKeywords) -> Self {
        let categories = vec![
            Category::new(SELF_HARM, keywords.self_harm),
            Category::new(HOPELESSNESS, keywords.hopelessness),
            Category::new(ISOLATION, keywords.isolation),
            Category::new(VIOLENCE, keywords.violence),
            Category::new(ABUSE, keywords.abuse),
            Category::new(SUBSTANCE_USE, keywords.substance_use),
        ];
        Self { categories }
    }

    /// Load crisis keywords from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read crisis keywords file: {}", path.display()))?;

        let keywords: CrisisKeywords =
            serde_json::from_str(&contents).context("Failed to parse crisis keywords JSON")?;

        Ok(Self::new(keywords))
    }

    /// Categories whose keywords appear in the text, in table order
    pub fn risk_factors(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut found = Vec::new();

        for category in &self.categories {
            if category.matches(&lower) {
                tracing::debug!(category = category.name, "Crisis keyword category matched");
                found.push(category.name.to_string());
            }
        }

        found
    }

    /// Detect if the text contains any crisis keyword
    pub fn detect_crisis(&self, text: &str) -> bool {
        !self.risk_factors(text).is_empty()
    }

    /// Get all keywords (for display purposes)
    pub fn all_keywords(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|c| c.keywords.iter().cloned())
            .collect()
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(CrisisKeywords::default())
    }
}

impl Category {
    fn new(name: &'static str, keywords: Vec<String>) -> Self {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .map(|k| regex::escape(&k))
            .collect();

        // Word boundaries keep "skill" from matching "kill"
        let pattern = if alternatives.is_empty() {
            None
        } else {
            match Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!(category = name, error = %e, "Invalid crisis keyword pattern");
                    None
                }
            }
        };

        Self {
            name,
            keywords,
            pattern,
        }
    }

    fn matches(&self, lower: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_detector() -> CrisisDetector {
        let keywords = CrisisKeywords {
            self_harm: vec!["suicide".to_string(), "kill myself".to_string()],
            hopelessness: vec!["no way out".to_string()],
            isolation: vec![],
            violence: vec!["kill someone".to_string()],
            abuse: vec!["being abused".to_string()],
            substance_use: vec![],
        };
        CrisisDetector::new(keywords)
    }

    #[test]
    fn test_crisis_detection() {
        let detector = create_test_detector();

        assert!(detector.detect_crisis("I'm thinking about suicide"));
        assert!(detector.detect_crisis("I want to kill myself"));
        assert!(!detector.detect_crisis("What is the meaning of life?"));
    }

    #[test]
    fn test_case_insensitive() {
        let detector = create_test_detector();

        assert!(detector.detect_crisis("SUICIDE"));
        assert!(detector.detect_crisis("SuIcIdE"));
    }

    #[test]
    fn test_word_boundaries() {
        let detector = create_test_detector();
        assert!(!detector.detect_crisis("I want to improve my skills"));
    }

    #[test]
    fn test_risk_factors_in_table_order() {
        let detector = CrisisDetector::default();
        let factors = detector.risk_factors("I feel hopeless and alone, I want to die");
        assert_eq!(factors, vec![SELF_HARM, HOPELESSNESS, ISOLATION]);
    }

    #[test]
    fn test_missing_substance_list_defaults_empty() {
        let json = r#"{"self_harm":["suicide"],"hopelessness":[],"isolation":[],
                       "violence":[],"abuse":[]}"#;
        let keywords: CrisisKeywords = serde_json::from_str(json).unwrap();
        assert!(keywords.substance_use.is_empty());
        let detector = CrisisDetector::new(keywords);
        assert_eq!(detector.all_keywords(), vec!["suicide".to_string()]);
    }
}
