//! Structured error types for cmdpal-core.
//!
//! The overlay state machine has no failure paths; everything here comes
//! from loading and validating palette configuration. The `cmdpal` binary
//! wraps these in `anyhow` for reporting.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cmdpal-core operations
#[derive(Error, Debug)]
pub enum PaletteError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file is not valid TOML (or does not match the schema)
    #[error("Invalid TOML in {path:?}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Config could not be serialized back to TOML
    #[error("Failed to serialize config: {source}")]
    TomlSerialize {
        #[from]
        source: toml::ser::Error,
    },

    /// No config file at the expected location
    #[error("Config not found at {path:?}\n\nRun: cmdpal config init")]
    ConfigNotFound { path: PathBuf },

    /// Two entries share an identifier
    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    /// An item definition is unusable
    #[error("Invalid item '{id}': {reason}")]
    InvalidItem { id: String, reason: String },

    /// A key binding string could not be parsed
    #[error("Invalid key binding '{binding}': {reason}")]
    InvalidKey { binding: String, reason: String },

    /// Any other configuration problem
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for cmdpal-core operations
pub type Result<T> = std::result::Result<T, PaletteError>;

impl PaletteError {
    /// Create a TOML parse error for a file
    pub fn toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Toml {
            path: path.into(),
            source,
        }
    }

    /// Create a config-not-found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create a duplicate id error
    pub fn duplicate_id(kind: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            kind,
            id: id.into(),
        }
    }

    /// Create an invalid item error
    pub fn invalid_item(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidItem {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid key binding error
    pub fn invalid_key(binding: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            binding: binding.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
