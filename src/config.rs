//! Configuration management for the CWA open-data utilities
//!
//! Every value the original scripts hardcoded lives here as a serde default,
//! so both binaries run unconfigured while tests and deployments can override
//! any of them through a TOML file or `CWA_*` environment variables.

use crate::CwaError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure shared by both binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CwaConfig {
    /// Location Lookup settings
    #[serde(default)]
    pub lookup: LookupConfig,
    /// Township Fetcher settings
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the `check-locations` binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Path of the cached hiking-forecast dataset
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
    /// Substrings to look for in location names
    #[serde(default = "default_name_filters")]
    pub name_filters: Vec<String>,
}

/// Settings for the `fetch-township` binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// CWA open-data datastore endpoint for the township forecast
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Static API credential passed as the `Authorization` query parameter
    #[serde(default = "default_authorization")]
    pub authorization: String,
    /// Township queried via the `locationName` parameter
    #[serde(default = "default_location_name")]
    pub location_name: String,
    /// Weather element codes, comma-joined into the `elementName` parameter
    #[serde(default = "default_element_names")]
    pub element_names: Vec<String>,
    /// Where the pretty-printed response body is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Skip TLS certificate verification. Insecure; kept on by default to
    /// match the behavior of the original script.
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    /// Optional request timeout in seconds. `None` means no timeout, which
    /// is what the original script did.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions: the literals from the original scripts
fn default_dataset_path() -> PathBuf {
    PathBuf::from("weather_hiking_daynight.json")
}

fn default_name_filters() -> Vec<String> {
    vec!["三叉".to_string(), "池上".to_string(), "向陽".to_string()]
}

fn default_base_url() -> String {
    "https://opendata.cwa.gov.tw/api/v1/rest/datastore/F-D0047-039".to_string()
}

fn default_authorization() -> String {
    "CWA-25948A02-C4DE-4AA8-9BAC-0AB177BA9854".to_string()
}

fn default_location_name() -> String {
    "池上鄉".to_string()
}

fn default_element_names() -> Vec<String> {
    vec![
        "MinT".to_string(),
        "MaxT".to_string(),
        "PoP12h".to_string(),
        "Wx".to_string(),
    ]
}

fn default_output_path() -> PathBuf {
    PathBuf::from("township_utf8.json")
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            name_filters: default_name_filters(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            authorization: default_authorization(),
            location_name: default_location_name(),
            element_names: default_element_names(),
            output_path: default_output_path(),
            accept_invalid_certs: default_accept_invalid_certs(),
            timeout_seconds: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for CwaConfig {
    fn default() -> Self {
        Self {
            lookup: LookupConfig::default(),
            fetch: FetchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl FetchConfig {
    /// The `elementName` query parameter value: element codes comma-joined
    #[must_use]
    pub fn element_list(&self) -> String {
        self.element_names.join(",")
    }
}

impl CwaConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default locations
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config/default.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with CWA_ prefix,
        // e.g. CWA_FETCH__BASE_URL for fetch.base_url. The prefix separator
        // must stay "_" or the nesting separator below would shadow it.
        builder = builder.add_source(
            Environment::with_prefix("CWA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: CwaConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cwa-tools").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_lookup()?;
        self.validate_fetch()?;
        self.validate_logging()?;
        Ok(())
    }

    fn validate_lookup(&self) -> Result<()> {
        if self.lookup.dataset_path.as_os_str().is_empty() {
            return Err(CwaError::config("Dataset path cannot be empty").into());
        }

        if self.lookup.name_filters.is_empty() {
            return Err(CwaError::config("At least one name filter is required").into());
        }

        if self.lookup.name_filters.iter().any(String::is_empty) {
            return Err(CwaError::config("Name filters cannot be empty strings").into());
        }

        Ok(())
    }

    fn validate_fetch(&self) -> Result<()> {
        if !self.fetch.base_url.starts_with("http://") && !self.fetch.base_url.starts_with("https://")
        {
            return Err(
                CwaError::config("Base URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        if self.fetch.authorization.is_empty() {
            return Err(CwaError::config("Authorization token cannot be empty").into());
        }

        if self.fetch.location_name.is_empty() {
            return Err(CwaError::config("Township name cannot be empty").into());
        }

        if self.fetch.element_names.is_empty() {
            return Err(CwaError::config("At least one weather element is required").into());
        }

        if self.fetch.output_path.as_os_str().is_empty() {
            return Err(CwaError::config("Output path cannot be empty").into());
        }

        Ok(())
    }

    fn validate_logging(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(CwaError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(CwaError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
