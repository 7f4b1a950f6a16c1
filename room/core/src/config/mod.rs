//! TOML Configuration File Support
//!
//! Centralized configuration loading for the telehealth room, supporting a
//! TOML file at `~/.config/telehealth-room/room.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://api.example.org"
//! set_cookie_url = "http://localhost:3000/api/set-cookie"
//! next_app_url = "http://localhost:3000"
//! request_timeout_secs = 30
//! treatment_path = "/treatment"
//!
//! [session]
//! token_query_param = "access-token"
//! token_cookie_name = "access-token"
//!
//! [overlay]
//! base_z_index = 10
//! enter_transition_ms = 300
//! ```

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::overlay::DEFAULT_OVERLAY_BASE_Z;

/// Application directory name under the XDG config/data dirs
pub const APP_DIR_NAME: &str = "telehealth-room";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// API section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Base URL of the booking/treatment API
    pub base_url: Option<String>,

    /// Cookie-exchange endpoint that sets the access-token cookie
    pub set_cookie_url: Option<String>,

    /// Web app to send the user back to when the exchange fails
    pub next_app_url: Option<String>,

    /// Request timeout in seconds
    pub request_timeout_secs: Option<u64>,

    /// Path (relative to `base_url`) that accepts treatment records
    pub treatment_path: Option<String>,
}

/// Session section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Query parameter carrying the access token in the room URL
    pub token_query_param: Option<String>,

    /// Cookie name set by the cookie-exchange endpoint
    pub token_cookie_name: Option<String>,

    /// File the access token is persisted to
    pub token_file: Option<PathBuf>,
}

/// Overlay section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayToml {
    /// Z-index offset between page content and the lowest overlay
    pub base_z_index: Option<i32>,

    /// Enter transition length in milliseconds (0 = none)
    pub enter_transition_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomToml {
    /// API configuration section
    pub api: ApiToml,

    /// Session configuration section
    pub session: SessionToml,

    /// Overlay configuration section
    pub overlay: OverlayToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for the room
///
/// Use [`load_config`] to load with proper priority handling.
#[derive(Clone, Debug)]
pub struct RoomConfig {
    /// Base URL of the booking/treatment API
    pub base_url: String,

    /// Cookie-exchange endpoint
    pub set_cookie_url: String,

    /// Web app fallback when the exchange fails
    pub next_app_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Path that accepts treatment records
    pub treatment_path: String,

    /// Query parameter carrying the access token
    pub token_query_param: String,

    /// Cookie carrying the access token
    pub token_cookie_name: String,

    /// File the access token is persisted to (`None` = in memory only)
    pub token_file: Option<PathBuf>,

    /// Z-index offset for overlays
    pub overlay_base_z: i32,

    /// Enter transition length for overlay layers
    pub enter_transition: Duration,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            set_cookie_url: "http://localhost:3000/api/set-cookie".to_string(),
            next_app_url: "http://localhost:3000".to_string(),
            request_timeout: Duration::from_secs(30),
            treatment_path: "/treatment".to_string(),
            token_query_param: "access-token".to_string(),
            token_cookie_name: "access-token".to_string(),
            token_file: default_token_path(),
            overlay_base_z: DEFAULT_OVERLAY_BASE_Z,
            enter_transition: Duration::from_millis(300),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl RoomConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check values that would otherwise fail later at runtime
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for unparseable URLs or an
    /// overlay base that does not sit above page content.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.is_empty() {
            check_url("api.base_url", &self.base_url)?;
        }
        check_url("api.set_cookie_url", &self.set_cookie_url)?;
        check_url("api.next_app_url", &self.next_app_url)?;

        if self.overlay_base_z < 1 {
            return Err(ConfigError::ValidationError(format!(
                "overlay.base_z_index must be at least 1, got {}",
                self.overlay_base_z
            )));
        }
        if self.token_query_param.is_empty() || self.token_cookie_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "session token parameter and cookie names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::ValidationError(format!("{field} = {value:?}: {e}")))
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/telehealth-room/room.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR_NAME).join("room.toml"))
}

/// Get the default access-token file path
///
/// Returns `$XDG_DATA_HOME/telehealth-room/access-token`.
#[must_use]
pub fn default_token_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_DIR_NAME).join("access-token"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// resulting values fail validation. A missing file is not an error.
pub fn load_config() -> Result<RoomConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// if the resulting values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<RoomConfig, ConfigError> {
    let mut config = RoomConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: RoomToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut RoomConfig, toml: &RoomToml) {
    if let Some(ref url) = toml.api.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(ref url) = toml.api.set_cookie_url {
        config.set_cookie_url.clone_from(url);
    }
    if let Some(ref url) = toml.api.next_app_url {
        config.next_app_url.clone_from(url);
    }
    if let Some(secs) = toml.api.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(ref path) = toml.api.treatment_path {
        config.treatment_path.clone_from(path);
    }

    if let Some(ref param) = toml.session.token_query_param {
        config.token_query_param.clone_from(param);
    }
    if let Some(ref name) = toml.session.token_cookie_name {
        config.token_cookie_name.clone_from(name);
    }
    if toml.session.token_file.is_some() {
        config.token_file.clone_from(&toml.session.token_file);
    }

    if let Some(base) = toml.overlay.base_z_index {
        config.overlay_base_z = base;
    }
    if let Some(ms) = toml.overlay.enter_transition_ms {
        config.enter_transition = Duration::from_millis(ms);
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut RoomConfig) {
    if let Ok(url) = std::env::var("TELEHEALTH_BASE_URL") {
        config.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Ok(url) = std::env::var("TELEHEALTH_URL_SET_COOKIE") {
        config.set_cookie_url = url;
        config.source = ConfigSource::Env;
    }
    if let Ok(url) = std::env::var("TELEHEALTH_URL_NEXT_APP") {
        config.next_app_url = url;
        config.source = ConfigSource::Env;
    }
    if let Ok(timeout) = std::env::var("TELEHEALTH_REQUEST_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(path) = std::env::var("TELEHEALTH_TREATMENT_PATH") {
        config.treatment_path = path;
        config.source = ConfigSource::Env;
    }
    if let Ok(path) = std::env::var("TELEHEALTH_TOKEN_FILE") {
        config.token_file = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// API base URL override
    pub base_url: Option<String>,

    /// Token file override
    pub token_file: Option<PathBuf>,

    /// Enter transition override (milliseconds)
    pub enter_transition_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create empty overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the token file override
    #[must_use]
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Set the enter transition override
    #[must_use]
    pub fn with_enter_transition_ms(mut self, ms: u64) -> Self {
        self.enter_transition_ms = Some(ms);
        self
    }

    /// Check if any override is set
    #[must_use]
    pub fn has_overrides(&self) -> bool {
        self.base_url.is_some() || self.token_file.is_some() || self.enter_transition_ms.is_some()
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the overridden values fail validation.
    pub fn apply(&self, config: &mut RoomConfig) -> Result<(), ConfigError> {
        if let Some(ref url) = self.base_url {
            config.base_url.clone_from(url);
        }
        if let Some(ref path) = self.token_file {
            config.token_file = Some(path.clone());
        }
        if let Some(ms) = self.enter_transition_ms {
            config.enter_transition = Duration::from_millis(ms);
        }
        if self.has_overrides() {
            config.source = ConfigSource::Cli;
        }
        config.validate()
    }
}
