//! Unified error types for cowmap.
//!
//! Map operations themselves never fail; their outcomes are `Option` and
//! `bool` flags. Errors only arise when building a map from configuration.

use thiserror::Error;

/// All cowmap errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration values rejected by validation
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed
    #[error("config parse error: {0}")]
    ConfigParse(String),
}

/// Result type for cowmap construction.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a configuration validation error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Error::InvalidConfig(_))
    }
}

// Convert from toml errors
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::ConfigParse(e.to_string())
    }
}
