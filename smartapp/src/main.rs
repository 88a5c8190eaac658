//! SmartApp webhook - Entry Point
//!
//! Serves the lifecycle webhook of a SmartThings SmartApp over HTTP.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use smartapp::app::options::AppOptions;
use smartapp::app::run::run;
use smartapp::dispatch::LoggingEventHandler;
use smartapp::logs::{init_logging, LogOptions};
use smartapp::storage::settings::{Settings, SETTINGS_ENV_VAR};
use smartapp::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let mut cli_args: HashMap<String, String> = HashMap::new();
    for arg in env::args().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            cli_args.insert(key.trim_start_matches('-').to_string(), value.to_string());
        } else if arg.starts_with("--") {
            cli_args.insert(arg.trim_start_matches('-').to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", version.version),
        }
        return;
    }

    // Settings file from --config, then the environment, else defaults
    let settings_path = cli_args
        .get("config")
        .cloned()
        .or_else(|| env::var(SETTINGS_ENV_VAR).ok());
    let settings = match &settings_path {
        Some(path) => match Settings::load(path).await {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level,
        json_format: settings.json_logs,
    };
    if let Err(e) = init_logging(&log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let options = AppOptions::from(&settings);
    info!(
        version = %version.version,
        git_hash = %version.git_hash,
        "Running SmartApp webhook with options: {:?}",
        options
    );

    let handler = Arc::new(LoggingEventHandler);
    if let Err(e) = run(options, handler, await_shutdown_signal()).await {
        error!("Failed to run the webhook: {e}");
        std::process::exit(1);
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Unable to install signal handlers, waiting for Ctrl+C only");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}
