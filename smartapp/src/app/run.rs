//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::cache::public_key::PublicKeyCache;
use crate::dispatch::{EventHandler, LifecycleDispatcher};
use crate::errors::ServiceError;
use crate::http::keyserver::KeyServerClient;
use crate::models::definition::SmartAppDefinition;
use crate::server::serve::serve;
use crate::server::state::ServerState;

/// Run the webhook until `shutdown_signal` resolves
pub async fn run(
    options: AppOptions,
    handler: Arc<dyn EventHandler>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServiceError> {
    info!("Initializing SmartApp webhook...");

    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), &options);

    if let Err(e) = init(&options, handler, &shutdown_tx, &mut shutdown_manager).await {
        error!("Failed to start webhook: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

async fn init(
    options: &AppOptions,
    handler: Arc<dyn EventHandler>,
    shutdown_tx: &broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), ServiceError> {
    let dispatcher = init_dispatcher(options, handler).await?;

    info!("Initializing HTTP server...");
    let mut shutdown_rx = shutdown_tx.subscribe();
    let server_state = Arc::new(ServerState::new(dispatcher));
    let server_handle = serve(&options.server, server_state, async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    shutdown_manager.with_server_handle(server_handle)
}

async fn init_dispatcher(
    options: &AppOptions,
    handler: Arc<dyn EventHandler>,
) -> Result<Arc<LifecycleDispatcher>, ServiceError> {
    let definition = SmartAppDefinition::load(&options.definition_file).await?;
    info!(
        app_id = %definition.id,
        target_url = %definition.target_url,
        pages = definition.config_pages.len(),
        "Loaded SmartApp definition from {}",
        options.definition_file.display()
    );

    if !options.dispatcher.check_signatures {
        info!("Signature checks are disabled");
    }

    let client = KeyServerClient::new(options.keys.request_timeout)?;
    let keys = Arc::new(PublicKeyCache::new(client, options.keys.cache_capacity));

    Ok(Arc::new(LifecycleDispatcher::new(
        definition,
        options.dispatcher.clone(),
        handler,
        keys,
    )))
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    max_shutdown_delay: std::time::Duration,
    server_handle: Option<JoinHandle<Result<(), ServiceError>>>,
}

impl ShutdownManager {
    fn new(shutdown_tx: broadcast::Sender<()>, options: &AppOptions) -> Self {
        Self {
            shutdown_tx,
            max_shutdown_delay: options.max_shutdown_delay,
            server_handle: None,
        }
    }

    fn with_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), ServiceError>>,
    ) -> Result<(), ServiceError> {
        if self.server_handle.is_some() {
            return Err(ServiceError::ShutdownError("server_handle already set".to_string()));
        }
        self.server_handle = Some(handle);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), ServiceError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(self.max_shutdown_delay, self.shutdown_impl()).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), ServiceError> {
        info!("Shutting down SmartApp webhook...");

        if let Some(handle) = self.server_handle.take() {
            handle
                .await
                .map_err(|e| ServiceError::ShutdownError(e.to_string()))??;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
