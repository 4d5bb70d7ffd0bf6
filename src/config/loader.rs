// Configuration loader
// Loads engine settings from ~/.crisiswatch/config.toml with environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::EngineConfig;
use crate::errors::config_parse_error;

/// Environment variable that overrides `ml_endpoint`
pub const ML_ENDPOINT_ENV: &str = "CRISISWATCH_ML_ENDPOINT";

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".crisiswatch/config.toml"))
}

/// Load configuration from the default location, falling back to defaults
pub fn load_config() -> Result<EngineConfig> {
    let config = match default_config_path() {
        Some(path) if path.exists() => load_config_from(&path)?,
        _ => {
            tracing::debug!("No config file found, using defaults");
            EngineConfig::default()
        }
    };

    finish(config)
}

/// Load configuration from an explicit path
pub fn load_config_from_path(path: &Path) -> Result<EngineConfig> {
    finish(load_config_from(path)?)
}

fn load_config_from(path: &Path) -> Result<EngineConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: EngineConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!(config_parse_error(&path.display().to_string(), &e.to_string())))?;

    tracing::info!(path = %path.display(), "Loaded engine configuration");
    Ok(config)
}

fn finish(mut config: EngineConfig) -> Result<EngineConfig> {
    apply_env_overrides(&mut config);
    config.validate().context("Invalid engine configuration")?;
    Ok(config)
}

fn apply_env_overrides(config: &mut EngineConfig) {
    if let Ok(endpoint) = std::env::var(ML_ENDPOINT_ENV) {
        if !endpoint.is_empty() {
            tracing::debug!(endpoint = %endpoint, "ML endpoint overridden from environment");
            config.ml_endpoint = Some(endpoint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_analysis_length = 25\ndebounce_ms = 250").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.min_analysis_length, 25);
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.max_history_size, 100);
        assert!(config.enable_ml_analysis);
    }

    #[test]
    fn test_invalid_toml_has_helpful_message() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_analysis_length = \"ten\"").unwrap();

        let err = load_config_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "confidence_threshold = 1.5").unwrap();

        assert!(load_config_from_path(file.path()).is_err());
    }
}
