//! Persisted handicap parameters.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use atomic_write_file::AtomicWriteFile;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No parameter has this name.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
    /// The text is not a valid value for the parameter.
    #[error("invalid value '{text}' for '{key}': {reason}")]
    Invalid {
        /// Parameter.
        key: ConfigKey,
        /// Rejected text.
        text: String,
        /// What the parameter requires.
        reason: &'static str,
    },
    /// The file could not be read or written.
    #[error("configuration file {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The values could not be serialized.
    #[error("configuration serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Name of one handicap parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Added to the coefficient for a retractable landing gear.
    GearHandicap,
    /// Added to the coefficient for winglets.
    WingletsHandicap,
    /// Added per started overweight step.
    OverweightHandicap,
    /// Kilograms per overweight step.
    OverweightStep,
    /// Subtracted per full underweight step.
    UnderweightHandicap,
    /// Kilograms per underweight step.
    UnderweightStep,
    /// Tolerated tow bar weight difference, kg.
    AllowedDifference,
}

impl ConfigKey {
    /// Every key in file order.
    pub const ALL: [ConfigKey; 7] = [
        ConfigKey::GearHandicap,
        ConfigKey::WingletsHandicap,
        ConfigKey::OverweightHandicap,
        ConfigKey::OverweightStep,
        ConfigKey::UnderweightHandicap,
        ConfigKey::UnderweightStep,
        ConfigKey::AllowedDifference,
    ];

    /// Key name as written to the file and the archive.
    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::GearHandicap => "gear_handicap",
            ConfigKey::WingletsHandicap => "winglets_handicap",
            ConfigKey::OverweightHandicap => "overweight_handicap",
            ConfigKey::OverweightStep => "overweight_step",
            ConfigKey::UnderweightHandicap => "underweight_handicap",
            ConfigKey::UnderweightStep => "underweight_step",
            ConfigKey::AllowedDifference => "allowed_difference",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// Typed handicap parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandicapConfig {
    /// See [`ConfigKey::GearHandicap`].
    pub gear_handicap: Decimal,
    /// See [`ConfigKey::WingletsHandicap`].
    pub winglets_handicap: Decimal,
    /// See [`ConfigKey::OverweightHandicap`].
    pub overweight_handicap: Decimal,
    /// See [`ConfigKey::OverweightStep`]. Always positive.
    pub overweight_step: u32,
    /// See [`ConfigKey::UnderweightHandicap`].
    pub underweight_handicap: Decimal,
    /// See [`ConfigKey::UnderweightStep`]. Always positive.
    pub underweight_step: u32,
    /// See [`ConfigKey::AllowedDifference`].
    pub allowed_difference: u32,
}

impl Default for HandicapConfig {
    fn default() -> Self {
        Self {
            gear_handicap: Decimal::new(2, 2),
            winglets_handicap: Decimal::new(1, 2),
            overweight_handicap: Decimal::new(5, 3),
            overweight_step: 10,
            underweight_handicap: Decimal::new(5, 3),
            underweight_step: 10,
            allowed_difference: 2,
        }
    }
}

impl HandicapConfig {
    /// Parameter rendered as neutral text.
    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::GearHandicap => self.gear_handicap.to_string(),
            ConfigKey::WingletsHandicap => self.winglets_handicap.to_string(),
            ConfigKey::OverweightHandicap => self.overweight_handicap.to_string(),
            ConfigKey::OverweightStep => self.overweight_step.to_string(),
            ConfigKey::UnderweightHandicap => self.underweight_handicap.to_string(),
            ConfigKey::UnderweightStep => self.underweight_step.to_string(),
            ConfigKey::AllowedDifference => self.allowed_difference.to_string(),
        }
    }

    /// Parses neutral text into a parameter. Nothing changes on error.
    pub fn set(&mut self, key: ConfigKey, text: &str) -> Result<(), ConfigError> {
        let text = text.trim();
        match key {
            ConfigKey::GearHandicap => self.gear_handicap = parse_decimal(key, text)?,
            ConfigKey::WingletsHandicap => self.winglets_handicap = parse_decimal(key, text)?,
            ConfigKey::OverweightHandicap => self.overweight_handicap = parse_decimal(key, text)?,
            ConfigKey::OverweightStep => self.overweight_step = parse_step(key, text)?,
            ConfigKey::UnderweightHandicap => {
                self.underweight_handicap = parse_decimal(key, text)?
            }
            ConfigKey::UnderweightStep => self.underweight_step = parse_step(key, text)?,
            ConfigKey::AllowedDifference => {
                self.allowed_difference = text.parse().map_err(|_| ConfigError::Invalid {
                    key,
                    text: text.to_string(),
                    reason: "expected a non-negative whole number",
                })?
            }
        }
        Ok(())
    }

    fn to_toml(self) -> Result<String, ConfigError> {
        let table: IndexMap<&str, String> = ConfigKey::ALL
            .into_iter()
            .map(|k| (k.name(), self.get(k)))
            .collect();
        Ok(toml::to_string(&table)?)
    }

    /// Reads the file text. Values may be TOML strings or plain numbers; an
    /// invalid or unknown entry is skipped with a warning and the other entries
    /// still apply. Only unparsable TOML is an error.
    fn from_toml(text: &str) -> Result<Self, String> {
        let table: IndexMap<String, toml::Value> =
            toml::from_str(text).map_err(|e| e.to_string())?;
        let mut values = Self::default();
        for (name, value) in &table {
            let Ok(key) = name.parse::<ConfigKey>() else {
                warn!(key = %name, "ignoring unknown configuration key");
                continue;
            };
            let text = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => {
                    warn!(%key, value = %other, "ignoring non-numeric configuration value");
                    continue;
                }
            };
            if let Err(e) = values.set(key, &text) {
                warn!(%key, error = %e, "ignoring invalid configuration value");
            }
        }
        Ok(values)
    }
}

fn parse_decimal(key: ConfigKey, text: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(text).map_err(|_| ConfigError::Invalid {
        key,
        text: text.to_string(),
        reason: "expected a decimal number",
    })
}

fn parse_step(key: ConfigKey, text: &str) -> Result<u32, ConfigError> {
    match text.parse::<u32>() {
        Ok(step) if step > 0 => Ok(step),
        _ => Err(ConfigError::Invalid {
            key,
            text: text.to_string(),
            reason: "expected a positive whole number",
        }),
    }
}

/// Handicap parameters bound to their file.
#[derive(Debug, Clone)]
pub struct Configuration {
    path: Option<PathBuf>,
    values: HandicapConfig,
}

impl Configuration {
    /// Defaults that are never written anywhere.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: HandicapConfig::default(),
        }
    }

    /// Loads the file at `path`.
    ///
    /// A missing file is created with the defaults. A file that cannot be
    /// parsed yields the defaults and is left untouched until the next save.
    /// Keys absent from the file, and keys with an invalid value, keep their
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let config = Self {
                path: Some(path),
                values: HandicapConfig::default(),
            };
            config.save()?;
            debug!(path = %config.display_path(), "wrote default configuration");
            return Ok(config);
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let values = match HandicapConfig::from_toml(&text) {
            Ok(values) => values,
            Err(reason) => {
                warn!(path = %path.display(), %reason, "corrupt configuration file, using defaults");
                HandicapConfig::default()
            }
        };
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// File the configuration is saved to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn display_path(&self) -> String {
        self.path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    /// Typed parameters.
    pub fn values(&self) -> &HandicapConfig {
        &self.values
    }

    /// Parameter as neutral text.
    pub fn get(&self, key: ConfigKey) -> String {
        self.values.get(key)
    }

    /// Sets a parameter from neutral text, validating it first.
    pub fn set(&mut self, key: ConfigKey, text: &str) -> Result<(), ConfigError> {
        self.values.set(key, text)
    }

    /// Every parameter as `(name, text)` in file order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        ConfigKey::ALL
            .into_iter()
            .map(|k| (k.name(), self.values.get(k)))
            .collect()
    }

    /// Current values, for a later [`Configuration::restore`].
    pub fn snapshot(&self) -> HandicapConfig {
        self.values
    }

    /// Replaces every value with a snapshot.
    pub fn restore(&mut self, snapshot: HandicapConfig) {
        self.values = snapshot;
    }

    /// Replaces every value with its default.
    pub fn reset_to_defaults(&mut self) {
        self.values = HandicapConfig::default();
    }

    /// Atomically rewrites the file. A no-op for in-memory configurations.
    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = self.values.to_toml()?;
        let mut file = AtomicWriteFile::open(path).map_err(io_err)?;
        file.write_all(text.as_bytes()).map_err(io_err)?;
        file.commit().map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_must_be_positive() {
        let mut values = HandicapConfig::default();
        assert!(values.set(ConfigKey::OverweightStep, "0").is_err());
        assert!(values.set(ConfigKey::UnderweightStep, "-5").is_err());
        assert_eq!(values.overweight_step, 10);
    }

    #[test]
    fn allowed_difference_may_be_zero() {
        let mut values = HandicapConfig::default();
        values.set(ConfigKey::AllowedDifference, "0").unwrap();
        assert_eq!(values.allowed_difference, 0);
        assert!(values.set(ConfigKey::AllowedDifference, "-1").is_err());
    }

    #[test]
    fn toml_round_trip_keeps_values() {
        let mut values = HandicapConfig::default();
        values.set(ConfigKey::GearHandicap, "0.025").unwrap();
        let text = values.to_toml().unwrap();
        assert!(text.contains("gear_handicap = \"0.025\""));
        assert_eq!(HandicapConfig::from_toml(&text).unwrap(), values);
    }

    #[test]
    fn plain_numbers_are_accepted() {
        let values =
            HandicapConfig::from_toml("gear_handicap = 0.05\noverweight_step = 20\n").unwrap();
        assert_eq!(values.gear_handicap, Decimal::new(5, 2));
        assert_eq!(values.overweight_step, 20);
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let values = HandicapConfig::from_toml("overweight_step = \"20\"\n").unwrap();
        assert_eq!(values.overweight_step, 20);
        assert_eq!(values.gear_handicap, Decimal::new(2, 2));
    }
}
