pub mod app_config;
pub mod config;
pub mod preferences;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use preferences::{FontPreference, PreferenceError, PreferenceStore};
pub use types::{Category, Coordinate, Ownership, OwnershipFilter};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("invalid ownership filter: {0}")]
    InvalidOwnershipFilter(String),
}
