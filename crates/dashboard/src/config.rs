//! Dashboard configuration
//!
//! Resolution order: built-in defaults, then a TOML file, then `GIZI_*`
//! environment variables. Command-line flags are applied last by the binary.

use gizi_core::report::{ReportOptions, MAX_HISTOGRAM_BINS};
use gizi_core::ArtifactPaths;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Loaded when no `--config` is given and the file exists.
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub model_path: PathBuf,
    pub label_encoders_path: PathBuf,
    pub dataset_path: PathBuf,
    pub bind_addr: String,
    pub preview_rows: usize,
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model/gizi_model.json"),
            label_encoders_path: PathBuf::from("model/label_encoders.json"),
            dataset_path: PathBuf::from("data/data_balita.csv"),
            bind_addr: "127.0.0.1:8501".to_string(),
            preview_rows: 5,
            histogram_bins: 10,
        }
    }
}

impl DashboardConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_PATH`] when it exists, then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from: {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply `GIZI_*` overrides from any key lookup. Blank or unparseable
    /// values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = get("GIZI_MODEL_PATH") {
            self.model_path = PathBuf::from(value);
        }
        if let Some(value) = get("GIZI_LABEL_ENCODERS_PATH") {
            self.label_encoders_path = PathBuf::from(value);
        }
        if let Some(value) = get("GIZI_DATASET_PATH") {
            self.dataset_path = PathBuf::from(value);
        }
        if let Some(value) = get("GIZI_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(parsed) = get("GIZI_PREVIEW_ROWS").and_then(|v| v.parse().ok()) {
            self.preview_rows = parsed;
        }
        if let Some(parsed) = get("GIZI_HISTOGRAM_BINS").and_then(|v| v.parse().ok()) {
            self.histogram_bins = parsed;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_HISTOGRAM_BINS).contains(&self.histogram_bins) {
            return Err(ConfigError::Invalid(format!(
                "histogram_bins must be between 1 and {}, got {}",
                MAX_HISTOGRAM_BINS, self.histogram_bins
            )));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr.parse().map_err(|e| {
            ConfigError::Invalid(format!("bind_addr '{}': {}", self.bind_addr, e))
        })
    }

    pub fn artifacts(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model_path.clone(),
            label_encoders: self.label_encoders_path.clone(),
            dataset: self.dataset_path.clone(),
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            preview_rows: self.preview_rows,
            histogram_bins: self.histogram_bins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.report_options(), ReportOptions::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        fs::write(&path, "bind_addr = \"0.0.0.0:9000\"\npreview_rows = 10\n").unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.model_path, PathBuf::from("model/gizi_model.json"));
    }

    #[test]
    fn test_bad_toml_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        fs::write(&path, "preview_rows = \"many\"").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GIZI_MODEL_PATH", "/srv/model.json"),
            ("GIZI_BIND_ADDR", "  "),
            ("GIZI_PREVIEW_ROWS", "8"),
            ("GIZI_HISTOGRAM_BINS", "lots"),
        ]
        .into_iter()
        .collect();

        let mut config = DashboardConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(config.bind_addr, "127.0.0.1:8501");
        assert_eq!(config.preview_rows, 8);
        assert_eq!(config.histogram_bins, 10);
    }

    #[test]
    fn test_histogram_bins_cap() {
        let mut config = DashboardConfig::default();
        config.apply_overrides(|key| {
            (key == "GIZI_HISTOGRAM_BINS").then(|| usize::MAX.to_string())
        });
        assert_eq!(config.histogram_bins, usize::MAX);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.histogram_bins = MAX_HISTOGRAM_BINS;
        assert!(config.validate().is_ok());
        config.histogram_bins = MAX_HISTOGRAM_BINS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_failures() {
        let config = DashboardConfig {
            histogram_bins: 0,
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DashboardConfig {
            bind_addr: "localhost".to_string(),
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
