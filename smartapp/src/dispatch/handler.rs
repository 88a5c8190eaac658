//! Lifecycle event handler

use async_trait::async_trait;
use tracing::info;

use crate::models::lifecycle::{
    ConfigurationRequest, ConfirmationRequest, EventRequest, InstallRequest,
    OauthCallbackRequest, UninstallRequest, UpdateRequest,
};

/// Application callbacks, one per lifecycle phase.
///
/// Each is invoked with the request's correlation id before the dispatcher
/// builds its response. Returning an error fails the request with an
/// internal error.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_confirmation(
        &self,
        correlation_id: Option<&str>,
        request: &ConfirmationRequest,
    ) -> anyhow::Result<()>;

    async fn handle_configuration(
        &self,
        correlation_id: Option<&str>,
        request: &ConfigurationRequest,
    ) -> anyhow::Result<()>;

    async fn handle_install(
        &self,
        correlation_id: Option<&str>,
        request: &InstallRequest,
    ) -> anyhow::Result<()>;

    async fn handle_update(
        &self,
        correlation_id: Option<&str>,
        request: &UpdateRequest,
    ) -> anyhow::Result<()>;

    async fn handle_uninstall(
        &self,
        correlation_id: Option<&str>,
        request: &UninstallRequest,
    ) -> anyhow::Result<()>;

    async fn handle_oauth_callback(
        &self,
        correlation_id: Option<&str>,
        request: &OauthCallbackRequest,
    ) -> anyhow::Result<()>;

    async fn handle_event(
        &self,
        correlation_id: Option<&str>,
        request: &EventRequest,
    ) -> anyhow::Result<()>;
}

/// Handler that only logs what it receives
#[derive(Debug, Default, Clone)]
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle_confirmation(
        &self,
        correlation_id: Option<&str>,
        request: &ConfirmationRequest,
    ) -> anyhow::Result<()> {
        info!(
            correlation_id,
            app_id = %request.app_id,
            "Received CONFIRMATION request"
        );
        Ok(())
    }

    async fn handle_configuration(
        &self,
        correlation_id: Option<&str>,
        request: &ConfigurationRequest,
    ) -> anyhow::Result<()> {
        let data = &request.configuration_data;
        info!(
            correlation_id,
            installed_app_id = %data.installed_app_id,
            phase = ?data.phase,
            page_id = %data.page_id,
            "Received CONFIGURATION request"
        );
        Ok(())
    }

    async fn handle_install(
        &self,
        correlation_id: Option<&str>,
        request: &InstallRequest,
    ) -> anyhow::Result<()> {
        let app = &request.install_data.installed_app;
        info!(
            correlation_id,
            installed_app_id = %app.installed_app_id,
            location_id = %app.location_id,
            "Received INSTALL request"
        );
        Ok(())
    }

    async fn handle_update(
        &self,
        correlation_id: Option<&str>,
        request: &UpdateRequest,
    ) -> anyhow::Result<()> {
        let app = &request.update_data.installed_app;
        info!(
            correlation_id,
            installed_app_id = %app.installed_app_id,
            location_id = %app.location_id,
            "Received UPDATE request"
        );
        Ok(())
    }

    async fn handle_uninstall(
        &self,
        correlation_id: Option<&str>,
        request: &UninstallRequest,
    ) -> anyhow::Result<()> {
        let app = &request.uninstall_data.installed_app;
        info!(
            correlation_id,
            installed_app_id = %app.installed_app_id,
            location_id = %app.location_id,
            "Received UNINSTALL request"
        );
        Ok(())
    }

    async fn handle_oauth_callback(
        &self,
        correlation_id: Option<&str>,
        request: &OauthCallbackRequest,
    ) -> anyhow::Result<()> {
        info!(
            correlation_id,
            installed_app_id = %request.oauth_callback_data.installed_app_id,
            "Received OAUTH_CALLBACK request"
        );
        Ok(())
    }

    async fn handle_event(
        &self,
        correlation_id: Option<&str>,
        request: &EventRequest,
    ) -> anyhow::Result<()> {
        let data = &request.event_data;
        let event_types: Vec<&str> = data
            .events
            .iter()
            .map(|event| event.event_type().as_str())
            .collect();
        info!(
            correlation_id,
            installed_app_id = %data.installed_app.installed_app_id,
            events = ?event_types,
            "Received EVENT request"
        );
        Ok(())
    }
}
