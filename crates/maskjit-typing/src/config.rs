//! Typing configuration (maskjit.toml)

use std::path::Path;

use maskjit_types::{PrimitiveType, TimeUnit};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to write TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Knobs that change how user functions are typed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TypingConfig {
    /// Units the `Masked` constructor accepts for temporal values
    pub time_units: Vec<TimeUnit>,

    /// Type of a bare integer literal
    pub literal_int: PrimitiveType,

    /// Type of a bare float literal
    pub literal_float: PrimitiveType,

    /// Type string operations on masked strings
    pub string_udfs: bool,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            time_units: TimeUnit::ALL.to_vec(),
            literal_int: PrimitiveType::Int64,
            literal_float: PrimitiveType::Float64,
            string_udfs: true,
        }
    }
}

impl TypingConfig {
    /// Load from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: TypingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_units.is_empty() {
            return Err(ConfigError::ValidationError(
                "time_units cannot be empty".to_string(),
            ));
        }

        if !self.literal_int.is_integer() {
            return Err(ConfigError::ValidationError(format!(
                "literal_int must be an integer type, got {}",
                self.literal_int
            )));
        }

        if !self.literal_float.is_float() {
            return Err(ConfigError::ValidationError(format!(
                "literal_float must be a float type, got {}",
                self.literal_float
            )));
        }

        Ok(())
    }

    /// Check if temporal values at `unit` may be masked
    pub fn accepts_unit(&self, unit: TimeUnit) -> bool {
        self.time_units.contains(&unit)
    }
}
