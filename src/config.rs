use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::throttle::DEFAULT_CEILING;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    pub opcodes_path: PathBuf,
    pub diagnostic_ceiling: usize,
    /// Pins the client version instead of probing for it.
    pub version: Option<String>,
    /// Client version file read by `FileVersionProbe` when `version` is unset.
    pub version_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            opcodes_path: PathBuf::from("resources").join("opcodes.jsonc"),
            diagnostic_ceiling: DEFAULT_CEILING,
            version: None,
            version_file: None,
            log_level: "info".to_string(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Unreadable { path: String, source: std::io::Error },

    #[error("ignoring malformed {path}: {source}")]
    Malformed { path: String, source: serde_json::Error },
}

/// Reads the config without any fallback. A missing file is created with
/// the defaults so operators have something to edit.
pub fn read_config(path: &Path) -> Result<ResolverConfig, ConfigError> {
    if !path.exists() {
        let default_config = ResolverConfig::default();
        save_config(path, &default_config);
        return Ok(default_config);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Malformed {
        path: path.display().to_string(),
        source,
    })
}

/// Like `read_config` but never fails. Callers that set up logging from the
/// config should use `read_config` and report the error once a logger exists.
pub fn load_config(path: &Path) -> ResolverConfig {
    read_config(path).unwrap_or_else(|e| {
        log::warn!("[Config] {}", e);
        ResolverConfig::default()
    })
}

pub fn save_config(path: &Path, config: &ResolverConfig) {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            let _ = fs::create_dir_all(dir);
        }
    }
    if let Ok(json) = serde_json::to_string_pretty(config) {
        let _ = fs::write(path, json);
    }
}
