//! Settings file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dispatch::dispatcher::{DEFAULT_CLOCK_SKEW_SEC, DEFAULT_KEYSERVER_URL};
use crate::dispatch::DispatcherConfig;
use crate::errors::ServiceError;
use crate::logs::LogLevel;

/// Environment variable naming the settings file
pub const SETTINGS_ENV_VAR: &str = "SMARTAPP_CONFIG";

/// Service settings. Every field is optional in the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub smartapp: SmartAppSettings,
}

impl Settings {
    /// Read settings from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ServiceError::ConfigError(format!(
                "Unable to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Lifecycle dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartAppSettings {
    #[serde(default = "default_true")]
    pub check_signatures: bool,

    /// Omitted means 300 seconds; `null` disables the date check
    #[serde(default = "default_clock_skew")]
    pub clock_skew_sec: Option<i64>,

    #[serde(default = "default_keyserver_url")]
    pub keyserver_url: String,

    #[serde(default)]
    pub log_json: bool,

    /// JSON file holding the SmartApp definition
    #[serde(default = "default_definition_file")]
    pub definition_file: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_clock_skew() -> Option<i64> {
    Some(DEFAULT_CLOCK_SKEW_SEC)
}

fn default_keyserver_url() -> String {
    DEFAULT_KEYSERVER_URL.to_string()
}

fn default_definition_file() -> PathBuf {
    PathBuf::from("smartapp.json")
}

impl Default for SmartAppSettings {
    fn default() -> Self {
        Self {
            check_signatures: true,
            clock_skew_sec: default_clock_skew(),
            keyserver_url: default_keyserver_url(),
            log_json: false,
            definition_file: default_definition_file(),
        }
    }
}

impl SmartAppSettings {
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            check_signatures: self.check_signatures,
            clock_skew_sec: self.clock_skew_sec,
            keyserver_url: self.keyserver_url.clone(),
            log_json: self.log_json,
        }
    }
}
