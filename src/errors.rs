// Error taxonomy for the analysis engine
//
// Engine-internal failures are typed so the orchestration boundary can decide
// whether to fall back, log, or drop a result. Plumbing code (config files,
// lexicons, HTTP) keeps using anyhow with context; the helpers at the bottom
// turn those into actionable messages for the CLI.

use anyhow::{Context, Result};
use thiserror::Error;

/// Failures that can occur while analyzing a piece of text
///
/// None of these ever escape `CrisisSession::analyze_text`: each one is
/// logged and degrades to "no new information".
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Text was too short, or ML is disabled with no fallback allowed
    #[error("input rejected: {reason}")]
    InputRejected { reason: String },

    /// The ML analyzer returned an error
    #[error("ML backend '{backend}' failed: {source}")]
    BackendFailure {
        backend: String,
        #[source]
        source: anyhow::Error,
    },

    /// The ML analyzer did not answer in time
    #[error("ML backend '{backend}' timed out after {timeout_ms}ms")]
    BackendTimeout { backend: String, timeout_ms: u64 },

    /// A result was structurally unusable (e.g. missing risk data)
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The session was disposed while the analysis was running
    #[error("session disposed")]
    Disposed,
}

impl AnalysisError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        AnalysisError::InputRejected {
            reason: reason.into(),
        }
    }

    /// Whether a heuristic fallback may replace the failed analysis
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::BackendFailure { .. } | AnalysisError::BackendTimeout { .. }
        )
    }

    /// Short machine-friendly label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InputRejected { .. } => "input_rejected",
            AnalysisError::BackendFailure { .. } => "backend_failure",
            AnalysisError::BackendTimeout { .. } => "backend_timeout",
            AnalysisError::InvariantViolation(_) => "invariant_violation",
            AnalysisError::Disposed => "disposed",
        }
    }
}

/// Wrap an error with user-friendly context
pub trait UserFriendlyError {
    /// Add user-friendly context to this error
    fn user_context(self, message: &str) -> Self;

    /// Add user-friendly context with a suggestion
    fn user_context_with_suggestion(self, problem: &str, suggestion: &str) -> Self;
}

impl<T> UserFriendlyError for Result<T> {
    fn user_context(self, message: &str) -> Self {
        self.with_context(|| message.to_string())
    }

    fn user_context_with_suggestion(self, problem: &str, suggestion: &str) -> Self {
        self.with_context(|| {
            format!(
                "{}\n\n\x1b[1;33mSuggestion:\x1b[0m {}",
                problem, suggestion
            )
        })
    }
}

/// Format a config parse error with helpful suggestions
pub fn config_parse_error(path: &str, error: &str) -> String {
    format!(
        "Failed to parse config file {}\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Print the effective configuration:\n\
           \x1b[36mcrisiswatch config\x1b[0m\n\n\
        2. Backup and remove the broken file to fall back to defaults:\n\
           \x1b[36mmv {} {}.backup\x1b[0m\n\n\
        3. Common mistakes:\n\
           • Missing quotes around strings\n\
           • Negative numbers for window sizes\n\
           • Unknown keys (check spelling)",
        path, error, path, path
    )
}

/// Format a lexicon load error with helpful suggestions
pub fn lexicon_load_error(path: &str, error: &str) -> String {
    format!(
        "Failed to load affect lexicon from {}\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check the file is valid JSON with the six keyword arrays:\n\
           positive, negative, high_arousal, low_arousal, dominant, submissive\n\n\
        2. Remove the custom lexicon path to use the built-in lexicon",
        path, error
    )
}

/// Format an ML endpoint error with helpful suggestions
pub fn ml_endpoint_error(endpoint: &str) -> String {
    format!(
        "Could not reach ML analyzer at {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Analyzer service is not running\n\
        • Wrong endpoint URL\n\
        • Request timed out\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Unset the endpoint to use heuristic scoring only:\n\
           \x1b[36munset CRISISWATCH_ML_ENDPOINT\x1b[0m\n\n\
        2. Increase ml_timeout_ms in ~/.crisiswatch/config.toml",
        endpoint
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_are_fallback_eligible() {
        let failure = AnalysisError::BackendFailure {
            backend: "mock".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        let timeout = AnalysisError::BackendTimeout {
            backend: "mock".to_string(),
            timeout_ms: 50,
        };

        assert!(failure.is_backend_error());
        assert!(timeout.is_backend_error());
        assert!(!AnalysisError::rejected("too short").is_backend_error());
        assert!(!AnalysisError::Disposed.is_backend_error());
    }

    #[test]
    fn test_error_display() {
        let err = AnalysisError::BackendTimeout {
            backend: "http".to_string(),
            timeout_ms: 5000,
        };
        assert_eq!(err.to_string(), "ML backend 'http' timed out after 5000ms");
        assert_eq!(err.kind(), "backend_timeout");
    }

    #[test]
    fn test_config_parse_error_has_suggestions() {
        let msg = config_parse_error("/tmp/config.toml", "expected a value");
        assert!(msg.contains("crisiswatch config"));
        assert!(msg.contains("/tmp/config.toml.backup"));
    }

    #[test]
    fn test_user_context_with_suggestion() {
        let result: Result<()> = Err(anyhow::anyhow!("root cause"));
        let err = result
            .user_context_with_suggestion("Lexicon missing", "use the default")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("use the default"));
    }
}
