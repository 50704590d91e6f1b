//! studydash configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::statistics::DEFAULT_REQUIRED_ECTS;

/// Environment variable that overrides [`StudydashConfig::data_file`].
pub const DATA_FILE_ENV: &str = "STUDYDASH_DATA_FILE";

/// Top-level studydash configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudydashConfig {
    /// Record file to read.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Credits required for degree completion.
    #[serde(default = "default_required_ects")]
    pub required_ects: f64,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("db.md")
}
fn default_required_ects() -> f64 {
    DEFAULT_REQUIRED_ECTS
}

impl Default for StudydashConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            required_ects: default_required_ects(),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `studydash.toml` in the current directory
/// 2. `~/.config/studydash/config.toml`
///
/// Environment variable override: `STUDYDASH_DATA_FILE`.
pub fn load_config() -> Result<StudydashConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudydashConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("studydash.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => StudydashConfig::default(),
    };

    if let Ok(data_file) = std::env::var(DATA_FILE_ENV) {
        if !data_file.is_empty() {
            config.data_file = PathBuf::from(data_file);
        }
    }

    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config_str(content: &str) -> Result<StudydashConfig> {
    let config: StudydashConfig = toml::from_str(content)?;
    if !config.required_ects.is_finite() || config.required_ects < 0.0 {
        anyhow::bail!(
            "required_ects must be a non-negative number, got {}",
            config.required_ects
        );
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studydash"))
}
