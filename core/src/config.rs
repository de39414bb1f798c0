//! Engine configuration loading.
//!
//! Config files are TOML documents deserialized into
//! [`EngineConfig`]. Missing fields keep their defaults; values are checked
//! after parsing so a bad table is reported before an engine is built.

use std::fs;
use std::path::Path;

use tempora_types::{EngineConfig, TagGroup};

use crate::error::ConfigError;

/// Load and validate an engine config file
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config = parse_config(&contents, path)?;
    tracing::info!(path = %path.display(), "loaded engine config");
    Ok(config)
}

/// Parse and validate config text. `path` is only used in error messages.
pub fn parse_config(contents: &str, path: &Path) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    let diminishing = &config.diminishing;
    if !(0.0..=tempora_types::DEFAULT_MAX_REDUCTION).contains(&diminishing.max_reduction) {
        return Err(invalid(format!(
            "diminishing.max_reduction must be within [0, {}], got {}",
            tempora_types::DEFAULT_MAX_REDUCTION,
            diminishing.max_reduction
        )));
    }

    for group in TagGroup::ALL {
        let derating = diminishing.group(group);
        if !derating.base_reduction.is_finite() || derating.base_reduction < 0.0 {
            return Err(invalid(format!(
                "{group:?} base_reduction must be a non-negative number, got {}",
                derating.base_reduction
            )));
        }
        if derating.max_stacks == 0 {
            return Err(invalid(format!("{group:?} max_stacks must be positive")));
        }
    }

    if config.default_max_stacks == 0 {
        return Err(invalid("default_max_stacks must be positive".to_string()));
    }
    Ok(())
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}
