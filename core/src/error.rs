use std::path::PathBuf;

use tempora_types::ModifierCategory;
use thiserror::Error;

/// Rejected modifier construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModifierError {
    #[error("modifier id must not be empty")]
    EmptyId,

    #[error("modifier '{id}' has an empty target")]
    EmptyTarget { id: String },

    #[error("modifier '{id}' has invalid duration {secs}s (must be positive and finite)")]
    InvalidDuration { id: String, secs: f64 },

    #[error("modifier '{id}' has max_stacks of zero")]
    InvalidMaxStacks { id: String },

    #[error("modifier '{id}' parameter '{key}' is not a finite number")]
    InvalidParameter { id: String, key: String },
}

/// Handler composition failure. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a handler is already registered for category '{category}'")]
    DuplicateHandler { category: ModifierCategory },
}

/// Errors that can occur while loading engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}
