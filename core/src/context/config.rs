use std::fs;
use std::path::{Path, PathBuf};

use eqlog_types::EngineConfig;

/// Errors that can occur during config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Path reported for configuration parsed from memory.
const INLINE_SOURCE: &str = "<inline>";

/// Load engine configuration from a TOML file. Missing sections and keys
/// fall back to their defaults.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = parse(&contents, path)?;
    tracing::info!(path = %path.display(), "Loaded engine config");
    Ok(config)
}

/// Parse engine configuration from an in-memory TOML document.
pub fn load_config_str(contents: &str) -> Result<EngineConfig, ConfigError> {
    parse(contents, Path::new(INLINE_SOURCE))
}

fn parse(contents: &str, path: &Path) -> Result<EngineConfig, ConfigError> {
    toml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}
