//! Application options

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::public_key::DEFAULT_CAPACITY;
use crate::dispatch::DispatcherConfig;
use crate::storage::settings::Settings;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Server configuration
    pub server: ServerOptions,

    /// Lifecycle dispatch
    pub dispatcher: DispatcherConfig,

    /// JSON file holding the SmartApp definition
    pub definition_file: PathBuf,

    /// Key cache and key server client
    pub keys: KeyOptions,

    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            server: ServerOptions::default(),
            dispatcher: DispatcherConfig::default(),
            definition_file: PathBuf::from("smartapp.json"),
            keys: KeyOptions::default(),
            max_shutdown_delay: Duration::from_secs(10),
        }
    }
}

impl From<&Settings> for AppOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
            },
            dispatcher: settings.smartapp.dispatcher_config(),
            definition_file: settings.smartapp.definition_file.clone(),
            ..Default::default()
        }
    }
}

/// Public key retrieval options
#[derive(Debug, Clone, Copy)]
pub struct KeyOptions {
    /// Maximum cached keys
    pub cache_capacity: usize,

    /// Timeout of a single request to the key server
    pub request_timeout: Duration,
}

impl Default for KeyOptions {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CAPACITY,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}
