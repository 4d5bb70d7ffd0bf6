// Configuration module
// Public interface for configuration loading

mod loader;
mod settings;

pub use loader::{default_config_path, load_config, load_config_from_path, ML_ENDPOINT_ENV};
pub use settings::EngineConfig;
