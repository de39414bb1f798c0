use std::path::PathBuf;

use tempora_core::{ConfigError, ModifierError, RegistryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
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

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("step {step}: {source}")]
    Modifier {
        step: usize,
        #[source]
        source: ModifierError,
    },

    #[error("step {step}: {reason}")]
    InvalidStep { step: usize, reason: String },

    #[error("step {step} runs at {at}s, before the previous step at {previous}s")]
    TimeWentBackwards { step: usize, at: f64, previous: f64 },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}
