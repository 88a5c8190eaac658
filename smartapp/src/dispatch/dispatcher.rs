//! Lifecycle dispatcher
//!
//! Verifies, parses and routes a lifecycle request to the event handler,
//! then builds the response the platform expects for that phase.

use std::sync::Arc;

use tracing::{debug, info};

use crate::authn::signature::SignatureVerifier;
use crate::cache::public_key::PublicKeySource;
use crate::context::RequestContext;
use crate::dispatch::handler::EventHandler;
use crate::errors::SmartAppError;
use crate::models::definition::SmartAppDefinition;
use crate::models::lifecycle::{
    ConfigInit, ConfigInitData, ConfigPage, ConfigPageData, ConfigPhase, ConfigurationInitResponse,
    ConfigurationPageResponse, ConfigurationRequest, ConfirmationResponse, EventResponse,
    InstallResponse, LifecycleRequest, LifecycleResponse, OauthCallbackResponse,
    UninstallResponse, UpdateResponse,
};
use crate::wire;

pub const DEFAULT_KEYSERVER_URL: &str = "https://key.smartthings.com";
pub const DEFAULT_CLOCK_SKEW_SEC: i64 = 300;

/// Id of the first configuration page
const FIRST_PAGE_ID: &str = "1";

/// Dispatcher options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Verify the HTTP signature on every request
    pub check_signatures: bool,

    /// Allowed difference between the `Date` header and now; `None`
    /// disables the check
    pub clock_skew_sec: Option<i64>,

    /// Base URL of the signing key server
    pub keyserver_url: String,

    /// Log request and response JSON at debug level. Exposes tokens, so
    /// only for development.
    pub log_json: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            check_signatures: true,
            clock_skew_sec: Some(DEFAULT_CLOCK_SKEW_SEC),
            keyserver_url: DEFAULT_KEYSERVER_URL.to_string(),
            log_json: false,
        }
    }
}

/// Routes lifecycle requests for one SmartApp definition
pub struct LifecycleDispatcher {
    definition: SmartAppDefinition,
    config: DispatcherConfig,
    handler: Arc<dyn EventHandler>,
    keys: Arc<dyn PublicKeySource>,
}

impl LifecycleDispatcher {
    pub fn new(
        definition: SmartAppDefinition,
        config: DispatcherConfig,
        handler: Arc<dyn EventHandler>,
        keys: Arc<dyn PublicKeySource>,
    ) -> Self {
        Self {
            definition,
            config,
            handler,
            keys,
        }
    }

    pub fn definition(&self) -> &SmartAppDefinition {
        &self.definition
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Handle one lifecycle request and return the response JSON
    pub async fn dispatch(&self, context: &RequestContext) -> Result<String, SmartAppError> {
        let correlation_id = context.correlation_id();

        if self.config.check_signatures {
            let verifier = SignatureVerifier::new(context, &self.config, &self.definition.target_url)?;
            verifier.verify(self.keys.as_ref()).await?;
        }

        if self.config.log_json {
            debug!(correlation_id, "Request JSON:\n{}", context.body());
        }

        let request = wire::parse_request(context.body()).map_err(|e| {
            SmartAppError::bad_request(format!("Invalid lifecycle request: {}", e), correlation_id)
        })?;

        info!(
            correlation_id,
            lifecycle = %request.phase(),
            execution_id = request.execution_id(),
            "Dispatching lifecycle request"
        );

        let response = self.route(correlation_id, &request).await?;

        let json = wire::to_json(&response).map_err(|e| {
            SmartAppError::internal(format!("Unable to serialize response: {}", e), correlation_id)
        })?;

        if self.config.log_json {
            debug!(correlation_id, "Response JSON:\n{}", json);
        }

        Ok(json)
    }

    async fn route(
        &self,
        correlation_id: Option<&str>,
        request: &LifecycleRequest,
    ) -> Result<LifecycleResponse, SmartAppError> {
        let handler_error = |e: anyhow::Error| {
            SmartAppError::internal(format!("Event handler failed: {:#}", e), correlation_id)
        };

        let response = match request {
            LifecycleRequest::Confirmation(r) => {
                info!(
                    correlation_id,
                    app_id = %r.app_id,
                    confirmation_url = %r.confirmation_data.confirmation_url,
                    "SmartApp confirmation requested"
                );
                self.handler
                    .handle_confirmation(correlation_id, r)
                    .await
                    .map_err(handler_error)?;
                LifecycleResponse::Confirmation(ConfirmationResponse {
                    target_url: self.definition.target_url.clone(),
                })
            }
            LifecycleRequest::Configuration(r) => {
                self.handler
                    .handle_configuration(correlation_id, r)
                    .await
                    .map_err(handler_error)?;
                match r.configuration_data.phase {
                    ConfigPhase::Initialize => LifecycleResponse::ConfigurationInit(self.config_init()),
                    ConfigPhase::Page => {
                        LifecycleResponse::ConfigurationPage(self.config_page(correlation_id, r)?)
                    }
                }
            }
            LifecycleRequest::Install(r) => {
                self.handler
                    .handle_install(correlation_id, r)
                    .await
                    .map_err(handler_error)?;
                LifecycleResponse::Install(InstallResponse::default())
            }
            LifecycleRequest::Update(r) => {
                self.handler
                    .handle_update(correlation_id, r)
                    .await
                    .map_err(handler_error)?;
                LifecycleResponse::Update(UpdateResponse::default())
            }
            LifecycleRequest::Uninstall(r) => {
                self.handler
                    .handle_uninstall(correlation_id, r)
                    .await
                    .map_err(handler_error)?;
                LifecycleResponse::Uninstall(UninstallResponse::default())
            }
            LifecycleRequest::OauthCallback(r) => {
                self.handler
                    .handle_oauth_callback(correlation_id, r)
                    .await
                    .map_err(handler_error)?;
                LifecycleResponse::OauthCallback(OauthCallbackResponse::default())
            }
            LifecycleRequest::Event(r) => {
                self.handler
                    .handle_event(correlation_id, r)
                    .await
                    .map_err(handler_error)?;
                LifecycleResponse::Event(EventResponse::default())
            }
        };

        Ok(response)
    }

    fn config_init(&self) -> ConfigurationInitResponse {
        ConfigurationInitResponse {
            configuration_data: ConfigInitData {
                initialize: ConfigInit {
                    id: self.definition.id.clone(),
                    name: self.definition.name.clone(),
                    description: self.definition.description.clone(),
                    permissions: self.definition.permissions.clone(),
                    first_page_id: FIRST_PAGE_ID.to_string(),
                },
            },
        }
    }

    fn config_page(
        &self,
        correlation_id: Option<&str>,
        request: &ConfigurationRequest,
    ) -> Result<ConfigurationPageResponse, SmartAppError> {
        let page_id = &request.configuration_data.page_id;
        let not_found =
            || SmartAppError::bad_request(format!("Page not found: {}", page_id), correlation_id);

        let current: usize = page_id.trim().parse().map_err(|_| not_found())?;
        let page = self.definition.page(current).ok_or_else(not_found)?;
        let total = self.definition.config_pages.len();

        let previous_page_id = (current > 1).then(|| (current - 1).to_string());
        let next_page_id = (current < total).then(|| (current + 1).to_string());

        Ok(ConfigurationPageResponse {
            configuration_data: ConfigPageData {
                page: ConfigPage {
                    page_id: page_id.clone(),
                    name: page.page_name.clone(),
                    previous_page_id,
                    next_page_id,
                    complete: current >= total,
                    sections: page.sections.clone(),
                },
            },
        })
    }
}
