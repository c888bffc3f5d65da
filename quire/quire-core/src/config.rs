//! Configuration for the Quire resource layer.
//!
//! Configuration is read from a TOML file and may be overridden through
//! environment variables:
//!
//! ```toml
//! [general]
//! log_level = "info"
//! json_logs = false
//!
//! [resource]
//! default_encoding = "utf8"
//! event_capacity = 16
//! untitled_extension = ".txt"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use quire_core::config::QuireConfig;
//! use std::path::Path;
//!
//! # async fn example() -> quire_core::Result<()> {
//! let mut config = QuireConfig::load_from_path(Path::new("quire.toml")).await?;
//! config.general_mut().log_level = "debug".to_string();
//! config.save_to_path(Path::new("quire.toml")).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{ResourceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

// Environment variable names
pub const ENV_LOG_LEVEL: &str = "QUIRE_LOG_LEVEL";
pub const ENV_DEFAULT_ENCODING: &str = "QUIRE_DEFAULT_ENCODING";
pub const ENV_EVENT_CAPACITY: &str = "QUIRE_EVENT_CAPACITY";

/// Log levels accepted by [`GeneralConfig::log_level`].
pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Encoding labels accepted by [`ResourceSection::default_encoding`].
pub const KNOWN_ENCODINGS: [&str; 6] = [
    "utf8",
    "utf8bom",
    "utf16le",
    "utf16be",
    "windows1252",
    "iso88591",
];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuireConfig {
    #[serde(default)]
    general: GeneralConfig,
    #[serde(default)]
    resource: ResourceSection,
}

/// General configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines instead of human readable text
    #[serde(default)]
    pub json_logs: bool,
}

/// Settings shared by the resource backing stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSection {
    /// Encoding label reported when a store cannot detect one
    #[serde(default = "default_encoding")]
    pub default_encoding: String,
    /// Capacity of each resource's change notification channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Extension appended to generated untitled resource names
    #[serde(default)]
    pub untitled_extension: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_encoding() -> String {
    "utf8".to_string()
}

fn default_event_capacity() -> usize {
    16
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

impl Default for ResourceSection {
    fn default() -> Self {
        Self {
            default_encoding: default_encoding(),
            event_capacity: default_event_capacity(),
            untitled_extension: None,
        }
    }
}

impl QuireConfig {
    /// Parse configuration from a TOML string, applying environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be parsed or is invalid
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| ResourceError::config(format!("Failed to parse config file: {}", e)))?;

        config.merge_env_vars()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ResourceError::config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml_str(&content)?;

        info!("Configuration loaded successfully from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a specific path atomically
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or written
    pub async fn save_to_path(&self, path: &Path) -> Result<()> {
        debug!("Saving configuration to: {}", path.display());

        self.validate()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ResourceError::config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResourceError::config(format!("Failed to serialize config: {}", e)))?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("toml.tmp");

        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|e| ResourceError::config(format!("Failed to write config file: {}", e)))?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| ResourceError::config(format!("Failed to rename config file: {}", e)))?;

        info!("Configuration saved successfully to {}", path.display());
        Ok(())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(ResourceError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.general.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        if !KNOWN_ENCODINGS.contains(&self.resource.default_encoding.as_str()) {
            return Err(ResourceError::config(format!(
                "Unknown default encoding '{}'. Must be one of: {}",
                self.resource.default_encoding,
                KNOWN_ENCODINGS.join(", ")
            )));
        }

        if self.resource.event_capacity == 0 {
            return Err(ResourceError::config(
                "Event capacity must be greater than zero",
            ));
        }

        if let Some(ext) = &self.resource.untitled_extension {
            if !ext.is_empty() && !ext.starts_with('.') {
                return Err(ResourceError::config(format!(
                    "Untitled extension '{}' must start with '.'",
                    ext
                )));
            }
        }

        Ok(())
    }

    /// Merge environment variable overrides into the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    pub fn merge_env_vars(&mut self) -> Result<()> {
        debug!("Merging environment variable overrides");

        if let Ok(log_level) = std::env::var(ENV_LOG_LEVEL) {
            debug!("Overriding log_level from environment: {}", log_level);
            self.general.log_level = log_level;
        }

        if let Ok(encoding) = std::env::var(ENV_DEFAULT_ENCODING) {
            debug!("Overriding default encoding from environment: {}", encoding);
            self.resource.default_encoding = encoding;
        }

        if let Ok(capacity) = std::env::var(ENV_EVENT_CAPACITY) {
            let capacity = capacity.parse::<usize>().map_err(|e| {
                ResourceError::config(format!("Invalid event capacity in environment: {}", e))
            })?;
            debug!("Overriding event capacity from environment: {}", capacity);
            self.resource.event_capacity = capacity;
        }

        Ok(())
    }

    /// Get general configuration
    pub fn general(&self) -> &GeneralConfig {
        &self.general
    }

    /// Get mutable general configuration
    pub fn general_mut(&mut self) -> &mut GeneralConfig {
        &mut self.general
    }

    /// Get resource configuration
    pub fn resource(&self) -> &ResourceSection {
        &self.resource
    }

    /// Get mutable resource configuration
    pub fn resource_mut(&mut self) -> &mut ResourceSection {
        &mut self.resource
    }
}
