//! # Configuration Management
//!
//! Centralized configuration for the packet decoder.
//!
//! This module provides structured configuration for decoding limits, logging and
//! output, with defaults that decode any well-formed transmission.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()`
//!
//! ## Safety Limits
//! - Nesting depth is bounded (default 64) so hostile input cannot exhaust the stack
//! - Length-field overruns are rejected unless `strict_length` is turned off

use crate::core::serialization::SerializationFormat;
use crate::error::{DecodeError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Default maximum packet nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hard ceiling accepted for `max_depth`
pub const MAX_DEPTH_LIMIT: usize = 1024;

/// Whether length-type-0 overruns are rejected by default
pub const STRICT_LENGTH: bool = true;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DecoderConfig {
    /// Decoding limits
    #[serde(default)]
    pub decoder: DecodeSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl DecoderConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| DecodeError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| DecodeError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| DecodeError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load defaults, then apply environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `PACKET_DECODER_*` environment overrides on top of this configuration
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(depth) = std::env::var("PACKET_DECODER_MAX_DEPTH") {
            self.decoder.max_depth = depth.parse::<usize>().map_err(|e| {
                DecodeError::ConfigError(format!("Invalid PACKET_DECODER_MAX_DEPTH '{depth}': {e}"))
            })?;
        }

        if let Ok(strict) = std::env::var("PACKET_DECODER_STRICT_LENGTH") {
            self.decoder.strict_length = strict.parse::<bool>().map_err(|e| {
                DecodeError::ConfigError(format!(
                    "Invalid PACKET_DECODER_STRICT_LENGTH '{strict}': {e}"
                ))
            })?;
        }

        if let Ok(level) = std::env::var("PACKET_DECODER_LOG_LEVEL") {
            self.logging.log_level = level.parse::<Level>().map_err(|_| {
                DecodeError::ConfigError(format!("Invalid PACKET_DECODER_LOG_LEVEL '{level}'"))
            })?;
        }

        Ok(())
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.decoder.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Limits applied while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecodeSettings {
    /// Deepest packet nesting accepted; the outermost packet is depth 1
    pub max_depth: usize,

    /// Reject sub-packets that overrun a declared total bit length
    pub strict_length: bool,
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_length: STRICT_LENGTH,
        }
    }
}

impl DecodeSettings {
    /// Validate decoding limits
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_depth == 0 {
            errors.push("Max depth must be greater than 0".to_string());
        } else if self.max_depth > MAX_DEPTH_LIMIT {
            errors.push(format!(
                "Max depth too large: {} (maximum: {MAX_DEPTH_LIMIT})",
                self.max_depth
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("packet-decoder"),
            log_level: Level::WARN,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print the decoded packet tree before the answers
    pub print_tree: bool,

    /// Format used when dumping the decoded tree to a file
    pub dump_format: SerializationFormat,
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
