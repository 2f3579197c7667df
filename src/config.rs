//! Configuration management for the `VoyageMind` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::VoyageMindError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `VoyageMind` application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoyageMindConfig {
    /// Generative model API configuration
    pub model: ModelConfig,
    /// Image search API configuration
    pub images: ImageSearchConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Default application settings
    pub defaults: DefaultsConfig,
}

/// Generative model API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model API key (required to construct the client, not to load config)
    pub api_key: Option<String>,
    /// Base URL for the model API
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    /// Model identifier to request
    #[serde(default = "default_model_name")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u32,
    /// Maximum model requests per minute
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

/// Image search API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSearchConfig {
    /// Image search API key (absent disables image enrichment)
    pub api_key: Option<String>,
    /// Base URL for the image search API
    #[serde(default = "default_images_base_url")]
    pub base_url: String,
    /// Maximum number of destination images to fetch
    #[serde(default = "default_max_images")]
    pub max_images: u32,
    /// Request timeout in seconds
    #[serde(default = "default_images_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed image requests
    #[serde(default = "default_images_max_retries")]
    pub max_retries: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum chat transcript entries kept per session
    #[serde(default = "default_chat_history_limit")]
    pub chat_history_limit: u32,
    /// HTTP port for the web surface
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_model_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model_name() -> String {
    "gemini-1.5-pro-latest".to_string()
}

fn default_model_timeout() -> u32 {
    60
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_images_base_url() -> String {
    "https://serpapi.com".to_string()
}

fn default_max_images() -> u32 {
    3
}

fn default_images_timeout() -> u32 {
    20
}

fn default_images_max_retries() -> u32 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_chat_history_limit() -> u32 {
    50
}

fn default_port() -> u16 {
    3000
}

impl Default for VoyageMindConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                api_key: None,
                base_url: default_model_base_url(),
                model: default_model_name(),
                timeout_seconds: default_model_timeout(),
                requests_per_minute: default_requests_per_minute(),
            },
            images: ImageSearchConfig {
                api_key: None,
                base_url: default_images_base_url(),
                max_images: default_max_images(),
                timeout_seconds: default_images_timeout(),
                max_retries: default_images_max_retries(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
            defaults: DefaultsConfig {
                chat_history_limit: default_chat_history_limit(),
                port: default_port(),
            },
        }
    }
}

impl VoyageMindConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with VOYAGEMIND_ prefix
        builder = builder.add_source(
            Environment::with_prefix("VOYAGEMIND")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: VoyageMindConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voyagemind").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.model.base_url.is_empty() {
            self.model.base_url = default_model_base_url();
        }
        if self.model.model.is_empty() {
            self.model.model = default_model_name();
        }
        if self.model.timeout_seconds == 0 {
            self.model.timeout_seconds = default_model_timeout();
        }
        if self.model.requests_per_minute == 0 {
            self.model.requests_per_minute = default_requests_per_minute();
        }
        if self.images.base_url.is_empty() {
            self.images.base_url = default_images_base_url();
        }
        if self.images.timeout_seconds == 0 {
            self.images.timeout_seconds = default_images_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.chat_history_limit == 0 {
            self.defaults.chat_history_limit = default_chat_history_limit();
        }
        if self.defaults.port == 0 {
            self.defaults.port = default_port();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.model.api_key {
            if api_key.is_empty() {
                return Err(VoyageMindError::config(
                    "Model API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(VoyageMindError::config(
                    "Model API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
        }

        if let Some(api_key) = &self.images.api_key {
            if api_key.is_empty() {
                return Err(VoyageMindError::config(
                    "Image search API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.model.timeout_seconds > 300 {
            return Err(
                VoyageMindError::config("Model API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.model.requests_per_minute > 600 {
            return Err(
                VoyageMindError::config("Model requests per minute cannot exceed 600").into(),
            );
        }

        if self.images.timeout_seconds > 300 {
            return Err(
                VoyageMindError::config("Image search timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.images.max_retries > 10 {
            return Err(
                VoyageMindError::config("Image search max retries cannot exceed 10").into(),
            );
        }

        if self.images.max_images > 10 {
            return Err(VoyageMindError::config("Maximum images cannot exceed 10").into());
        }

        if self.defaults.chat_history_limit > 1000 {
            return Err(VoyageMindError::config("Chat history limit cannot exceed 1000").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(VoyageMindError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(VoyageMindError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.model.base_url.starts_with("http://") && !self.model.base_url.starts_with("https://")
        {
            return Err(VoyageMindError::config(
                "Model API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if !self.images.base_url.starts_with("http://")
            && !self.images.base_url.starts_with("https://")
        {
            return Err(VoyageMindError::config(
                "Image search base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    /// Create configuration directory if it doesn't exist
    pub fn ensure_config_dir() -> Result<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            let voyagemind_config_dir = config_dir.join("voyagemind");
            std::fs::create_dir_all(&voyagemind_config_dir).with_context(|| {
                format!(
                    "Failed to create config directory: {}",
                    voyagemind_config_dir.display()
                )
            })?;
            Ok(voyagemind_config_dir)
        } else {
            Err(VoyageMindError::config("Unable to determine config directory").into())
        }
    }
}
