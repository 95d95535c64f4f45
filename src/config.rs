//! Analysis Configuration
//! Optional JSON file in the working directory; every field has a default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "covid_explorer.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Observation CSV.
    pub data_path: PathBuf,
    /// GeoJSON FeatureCollection of country boundaries.
    pub geometry_path: PathBuf,
    /// Rows per ranking table.
    pub top_n: usize,
    /// Trend window size in logical points.
    pub trend_window: [f32; 2],
    /// Rendered map size in pixels.
    pub map_size: (u32, u32),
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("owid-covid-data.csv"),
            geometry_path: PathBuf::from("countries.geojson"),
            top_n: 5,
            trend_window: [1000.0, 560.0],
            map_size: (1200, 640),
        }
    }
}

impl AnalysisConfig {
    /// Read the config file if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.top_n, 5);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "data_path": "data/covid.csv", "top_n": 10 }"#).unwrap();

        let config = AnalysisConfig::load_or_default(&path).unwrap();
        assert_eq!(config.data_path, PathBuf::from("data/covid.csv"));
        assert_eq!(config.top_n, 10);
        assert_eq!(config.geometry_path, PathBuf::from("countries.geojson"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ top_n: ").unwrap();

        let err = AnalysisConfig::load_or_default(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
