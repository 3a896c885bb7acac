use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{error::WeatherError, model::Units};

/// Environment variable holding the OpenWeather API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Settings stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// country = "GB"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub units: Option<Units>,
    /// Default country code applied when `--country` is not given.
    pub country: Option<String>,
}

impl Config {
    /// Load config from `path`, or an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Store or replace the API key. Blank keys clear it.
    pub fn set_api_key(&mut self, api_key: &str) {
        self.api_key = non_blank(Some(api_key));
    }

    /// Resolve the credential, preferring `env_value` over the stored key.
    pub fn resolve_api_key(&self, env_value: Option<&str>) -> Result<String, WeatherError> {
        if let Some(key) = non_blank(env_value) {
            debug!("using API key from {API_KEY_ENV}");
            return Ok(key);
        }

        if let Some(key) = non_blank(self.api_key.as_deref()) {
            debug!("using API key from config file");
            return Ok(key);
        }

        Err(WeatherError::MissingCredential)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_when_nothing_configured() {
        let cfg = Config::default();
        let err = cfg.resolve_api_key(None).unwrap_err();

        assert!(matches!(err, WeatherError::MissingCredential));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut cfg = Config::default();
        cfg.api_key = Some("   ".into());

        let err = cfg.resolve_api_key(Some("")).unwrap_err();
        assert!(matches!(err, WeatherError::MissingCredential));
    }

    #[test]
    fn env_value_wins_over_config_file() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY");

        assert_eq!(cfg.resolve_api_key(Some("ENV_KEY")).unwrap(), "ENV_KEY");
        assert_eq!(cfg.resolve_api_key(None).unwrap(), "FILE_KEY");
    }

    #[test]
    fn load_from_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_roundtrip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            units: Some(Units::Imperial),
            country: Some("GB".into()),
        };
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "units = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
