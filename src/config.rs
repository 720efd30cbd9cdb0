//! @ai:module:intent Configuration loaded from annotate.toml
//! @ai:module:layer infrastructure
//! @ai:module:public_api AnnotateConfig, LoadConfig, NoCacheConfig, FilesConfig
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::no_cache::VersionToken;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "annotate.toml";

/// @ai:intent Main configuration for annotate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotateConfig {
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub no_cache: NoCacheConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

/// @ai:intent Settings for //@Load expansion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Directory globs and `base` options are resolved against.
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

/// @ai:intent Settings for //@NoCache rewriting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoCacheConfig {
    /// Fixed version token; the process start time is used when absent.
    pub version: Option<String>,
}

/// @ai:intent Which files are picked up when walking directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    ["js", "mjs", "ts", "html", "css"]
        .iter()
        .map(|e| e.to_string())
        .collect()
}

impl AnnotateConfig {
    /// @ai:intent Parse a TOML configuration file
    /// @ai:effects fs:read
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// @ai:intent Use the explicit file, else ./annotate.toml if present, else defaults
    /// @ai:effects fs:read
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            tracing::debug!("using {}", default_path.display());
            return Self::from_file(default_path);
        }

        Ok(Self::default())
    }

    /// @ai:intent Version token for this run, fixed once per process unless configured
    pub fn version_token(&self) -> VersionToken {
        match &self.no_cache.version {
            Some(version) => VersionToken::fixed(version.clone()),
            None => VersionToken::process_start(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AnnotateConfig::default();
        assert_eq!(config.load.root, PathBuf::from("."));
        assert!(config.files.extensions.contains(&"js".to_string()));
        assert_eq!(config.version_token(), VersionToken::process_start());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"[no_cache]
version = "42"

[files]
extensions = ["js"]"#
        )
        .unwrap();

        let config = AnnotateConfig::from_file(file.path()).unwrap();
        assert_eq!(config.version_token(), VersionToken::fixed("42"));
        assert_eq!(config.files.extensions, vec!["js".to_string()]);
        assert_eq!(config.load.root, PathBuf::from("."));
    }

    #[test]
    fn test_invalid_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[load\nroot = 3").unwrap();

        let err = AnnotateConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
