//! Configuration loaded from a TOML file.
//!
//! Every section has defaults, so an empty file (or no file at all) is a valid
//! configuration:
//!
//! ```toml
//! [logging]
//! level = "debug"
//! file = "/var/log/longtang.log"
//!
//! [id3]
//! offline = true
//! overrides = { album = "Compilation" }
//!
//! [packaging]
//! target = "/music/library"
//! template = "{artist}/{album}/{track} - {title}.{ext}"
//! cover_art = true
//!
//! [inflate]
//! program = "7z"
//!
//! [runtime]
//! ask_timeout_ms = 600000
//! ```

use crate::collaborators::DEFAULT_TEMPLATE;
use crate::model::TagOverrides;
use crate::protocol::Severity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongtangConfig {
    pub logging: LoggingConfig,
    pub id3: Id3Config,
    pub packaging: PackagingConfig,
    pub inflate: InflateConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum severity the logger actor renders.
    pub level: Severity,
    /// Append log lines to this file instead of the console.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Id3Config {
    /// Never look metadata up remotely.
    pub offline: bool,
    pub overrides: TagOverrides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagingConfig {
    pub target: PathBuf,
    pub template: String,
    pub cover_art: bool,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            target: PathBuf::from("organized"),
            template: DEFAULT_TEMPLATE.to_string(),
            cover_art: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InflateConfig {
    /// Extractor invoked as `<program> x -y -o<dir> <archive>`.
    pub program: String,
    /// Where archives are extracted; a temporary directory when unset.
    pub workdir: Option<PathBuf>,
}

impl Default for InflateConfig {
    fn default() -> Self {
        Self {
            program: "7z".to_string(),
            workdir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How long `organize` waits for a run to finish.
    pub ask_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ask_timeout_ms: 60 * 60 * 1000,
        }
    }
}

impl RuntimeConfig {
    pub fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.ask_timeout_ms)
    }
}

impl LongtangConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Directory archives are extracted into.
    pub fn inflate_workdir(&self) -> PathBuf {
        self.inflate
            .workdir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("longtang-inflate"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LongtangConfig::from_toml_str("").unwrap();
        assert_eq!(config, LongtangConfig::default());
        assert_eq!(config.logging.level, Severity::Information);
        assert_eq!(config.packaging.template, DEFAULT_TEMPLATE);
        assert_eq!(config.inflate.program, "7z");
    }

    #[test]
    fn test_partial_sections() {
        let config = LongtangConfig::from_toml_str(
            r#"
            [logging]
            level = "debug"

            [id3]
            offline = true
            overrides = { album = "Compilation", track_number = 1 }

            [packaging]
            target = "/library"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, Severity::Debug);
        assert!(config.id3.offline);
        assert_eq!(config.id3.overrides.album.as_deref(), Some("Compilation"));
        assert_eq!(config.id3.overrides.track_number, Some(1));
        assert_eq!(config.packaging.target, PathBuf::from("/library"));
        assert!(!config.packaging.cover_art);
        assert_eq!(config.runtime, RuntimeConfig::default());
    }

    #[test]
    fn test_invalid_severity_is_rejected() {
        let result = LongtangConfig::from_toml_str("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = LongtangConfig::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
