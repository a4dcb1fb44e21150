//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Driving detection thresholds and sampling interval
//! - Voice guidance toggle
//! - Media storage location
//! - Theme and orientation preferences
//!
//! Configuration is stored at `~/.config/calmdrive/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::app_state::ThemePreference;
use crate::driving::{RestrictionPolicy, BASIC_RESTRICT_KMH, DRIVING_THRESHOLD_KMH};
use crate::error::ConfigError;
use crate::exercise::DEFAULT_EXERCISE_ID;

/// Driving detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrivingConfig {
    #[serde(default = "default_true")]
    pub detection_enabled: bool,
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: u64,
    #[serde(default = "default_driving_threshold")]
    pub driving_threshold_kmh: f64,
    #[serde(default = "default_basic_restrict")]
    pub basic_restrict_kmh: f64,
    /// Simulation only: chance that a sample draws a new velocity.
    #[serde(default = "default_change_probability")]
    pub change_probability: f64,
    /// Simulation only: upper bound for drawn velocities.
    #[serde(default = "default_max_velocity")]
    pub max_velocity_kmh: f64,
}

/// Voice guidance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_storage_url")]
    pub storage_url: String,
    #[serde(default = "default_audio_bucket")]
    pub audio_bucket: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: ThemePreference,
    #[serde(default)]
    pub lock_landscape: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/calmdrive/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub driving: DrivingConfig,
    #[serde(default)]
    pub guidance: GuidanceConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default = "default_exercise")]
    pub default_exercise: String,
    /// Local user id for the session log; generated on first run.
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_true() -> bool {
    true
}
fn default_sample_interval_secs() -> u64 {
    10
}
fn default_driving_threshold() -> f64 {
    DRIVING_THRESHOLD_KMH
}
fn default_basic_restrict() -> f64 {
    BASIC_RESTRICT_KMH
}
fn default_change_probability() -> f64 {
    0.1
}
fn default_max_velocity() -> f64 {
    60.0
}
fn default_storage_url() -> String {
    "http://localhost:54321".into()
}
fn default_audio_bucket() -> String {
    "audio".into()
}
fn default_exercise() -> String {
    DEFAULT_EXERCISE_ID.into()
}

impl Default for DrivingConfig {
    fn default() -> Self {
        Self {
            detection_enabled: true,
            sample_interval_secs: default_sample_interval_secs(),
            driving_threshold_kmh: default_driving_threshold(),
            basic_restrict_kmh: default_basic_restrict(),
            change_probability: default_change_probability(),
            max_velocity_kmh: default_max_velocity(),
        }
    }
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            storage_url: default_storage_url(),
            audio_bucket: default_audio_bucket(),
            api_key: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: ThemePreference::System,
            lock_landscape: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driving: DrivingConfig::default(),
            guidance: GuidanceConfig::default(),
            media: MediaConfig::default(),
            ui: UiConfig::default(),
            default_exercise: default_exercise(),
            user_id: None,
        }
    }
}

impl DrivingConfig {
    pub fn sample_interval_ms(&self) -> u64 {
        self.sample_interval_secs.saturating_mul(1000)
    }

    pub fn policy(&self) -> RestrictionPolicy {
        RestrictionPolicy::new(self.basic_restrict_kmh)
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without persisting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value has the wrong type.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a value by key and save to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.driving.sample_interval_secs, 10);
        assert_eq!(parsed.ui.theme, ThemePreference::System);
        assert_eq!(parsed.default_exercise, "quick-calm");
    }

    #[test]
    fn missing_sections_use_defaults() {
        let parsed: Config = toml::from_str("[driving]\nbasic_restrict_kmh = 30.0\n").unwrap();
        assert_eq!(parsed.driving.basic_restrict_kmh, 30.0);
        assert_eq!(parsed.driving.driving_threshold_kmh, 5.0);
        assert!(parsed.guidance.enabled);
        assert_eq!(parsed.media.audio_bucket, "audio");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("guidance.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("driving.sample_interval_secs").as_deref(), Some("10"));
        assert_eq!(cfg.get("ui.theme").as_deref(), Some("system"));
        assert!(cfg.get("ui.missing_key").is_none());
    }

    #[test]
    fn set_value_updates_nested_fields() {
        let mut cfg = Config::default();
        cfg.set_value("guidance.enabled", "false").unwrap();
        cfg.set_value("driving.basic_restrict_kmh", "35.5").unwrap();
        cfg.set_value("ui.theme", "dark").unwrap();
        assert!(!cfg.guidance.enabled);
        assert_eq!(cfg.driving.basic_restrict_kmh, 35.5);
        assert_eq!(cfg.ui.theme, ThemePreference::Dark);
    }

    #[test]
    fn set_value_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set_value("ui.nonexistent_key", "value"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_value_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("guidance.enabled", "not_a_bool").is_err());
        assert!(cfg.set_value("ui.theme", "sepia").is_err());
        assert!(cfg.guidance.enabled);
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.set_value("default_exercise", "deep-focus").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().default_exercise, "deep-focus");
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "driving = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn driving_policy_uses_config_limit() {
        let mut cfg = Config::default();
        cfg.driving.basic_restrict_kmh = 40.0;
        assert_eq!(cfg.driving.policy().basic_limit_kmh, 40.0);
        assert_eq!(cfg.driving.sample_interval_ms(), 10_000);
    }
}
