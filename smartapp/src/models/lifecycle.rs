//! Lifecycle requests and responses
//!
//! Requests are a union discriminated by the top-level `lifecycle` field.
//! Responses carry no discriminator; each is recognized by its single
//! payload field. Field names on the wire are the camelCase form of the
//! Rust names, except the OAuth callback payload, which the platform spells
//! `oAuthCallbackData`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::config::{ConfigMap, ConfigSection};
use crate::models::event::Event;
use crate::models::secret::Token;

/// Free-form settings attached to most requests
pub type Settings = Map<String, Value>;

/// The seven lifecycle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecyclePhase {
    Confirmation,
    Configuration,
    Install,
    Update,
    Uninstall,
    OauthCallback,
    Event,
}

impl LifecyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::Confirmation => "CONFIRMATION",
            LifecyclePhase::Configuration => "CONFIGURATION",
            LifecyclePhase::Install => "INSTALL",
            LifecyclePhase::Update => "UPDATE",
            LifecyclePhase::Uninstall => "UNINSTALL",
            LifecyclePhase::OauthCallback => "OAUTH_CALLBACK",
            LifecyclePhase::Event => "EVENT",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-phases of the CONFIGURATION phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigPhase {
    Initialize,
    Page,
}

// ===== SHARED REQUEST PAYLOADS ===== //

/// The installed instance of the SmartApp a request refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub installed_app_id: String,
    pub location_id: String,
    #[serde(default)]
    pub config: ConfigMap,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationData {
    pub app_id: String,
    pub confirmation_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRequestData {
    pub installed_app_id: String,
    pub phase: ConfigPhase,
    /// Decimal page number, 1-based; empty during INITIALIZE
    #[serde(default)]
    pub page_id: String,
    #[serde(default)]
    pub previous_page_id: String,
    #[serde(default)]
    pub config: ConfigMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallData {
    pub auth_token: Token,
    pub refresh_token: Token,
    pub installed_app: InstalledApp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateData {
    pub auth_token: Token,
    pub refresh_token: Token,
    pub installed_app: InstalledApp,
    #[serde(default)]
    pub previous_config: Option<ConfigMap>,
    #[serde(default)]
    pub previous_permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallData {
    pub installed_app: InstalledApp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthCallbackData {
    pub installed_app_id: String,
    pub url_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    pub auth_token: Token,
    pub installed_app: InstalledApp,
    #[serde(default)]
    pub events: Vec<Event>,
}

// ===== REQUESTS ===== //

/// A lifecycle request, discriminated by `lifecycle`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "lifecycle", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleRequest {
    Confirmation(ConfirmationRequest),
    Configuration(ConfigurationRequest),
    Install(InstallRequest),
    Update(UpdateRequest),
    Uninstall(UninstallRequest),
    OauthCallback(OauthCallbackRequest),
    Event(EventRequest),
}

impl LifecycleRequest {
    pub fn phase(&self) -> LifecyclePhase {
        match self {
            LifecycleRequest::Confirmation(_) => LifecyclePhase::Confirmation,
            LifecycleRequest::Configuration(_) => LifecyclePhase::Configuration,
            LifecycleRequest::Install(_) => LifecyclePhase::Install,
            LifecycleRequest::Update(_) => LifecyclePhase::Update,
            LifecycleRequest::Uninstall(_) => LifecyclePhase::Uninstall,
            LifecycleRequest::OauthCallback(_) => LifecyclePhase::OauthCallback,
            LifecycleRequest::Event(_) => LifecyclePhase::Event,
        }
    }

    pub fn execution_id(&self) -> &str {
        match self {
            LifecycleRequest::Confirmation(r) => &r.execution_id,
            LifecycleRequest::Configuration(r) => &r.execution_id,
            LifecycleRequest::Install(r) => &r.execution_id,
            LifecycleRequest::Update(r) => &r.execution_id,
            LifecycleRequest::Uninstall(r) => &r.execution_id,
            LifecycleRequest::OauthCallback(r) => &r.execution_id,
            LifecycleRequest::Event(r) => &r.execution_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub execution_id: String,
    pub locale: String,
    pub version: String,
    pub app_id: String,
    pub confirmation_data: ConfirmationData,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRequest {
    pub execution_id: String,
    pub locale: String,
    pub version: String,
    pub configuration_data: ConfigRequestData,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRequest {
    pub execution_id: String,
    pub locale: String,
    pub version: String,
    pub install_data: InstallData,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub execution_id: String,
    pub locale: String,
    pub version: String,
    pub update_data: UpdateData,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallRequest {
    pub execution_id: String,
    pub locale: String,
    pub version: String,
    pub uninstall_data: UninstallData,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthCallbackRequest {
    pub execution_id: String,
    pub locale: String,
    pub version: String,
    #[serde(rename = "oAuthCallbackData")]
    pub oauth_callback_data: OauthCallbackData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub execution_id: String,
    pub locale: String,
    pub version: String,
    pub event_data: EventData,
    #[serde(default)]
    pub settings: Settings,
}

// ===== RESPONSES ===== //

/// The payload of every response that has nothing to say; always `{}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// A lifecycle response, recognized by shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LifecycleResponse {
    Confirmation(ConfirmationResponse),
    ConfigurationInit(ConfigurationInitResponse),
    ConfigurationPage(ConfigurationPageResponse),
    Install(InstallResponse),
    Update(UpdateResponse),
    Uninstall(UninstallResponse),
    OauthCallback(OauthCallbackResponse),
    Event(EventResponse),
}

impl LifecycleResponse {
    pub fn phase(&self) -> LifecyclePhase {
        match self {
            LifecycleResponse::Confirmation(_) => LifecyclePhase::Confirmation,
            LifecycleResponse::ConfigurationInit(_) | LifecycleResponse::ConfigurationPage(_) => {
                LifecyclePhase::Configuration
            }
            LifecycleResponse::Install(_) => LifecyclePhase::Install,
            LifecycleResponse::Update(_) => LifecyclePhase::Update,
            LifecycleResponse::Uninstall(_) => LifecyclePhase::Uninstall,
            LifecycleResponse::OauthCallback(_) => LifecyclePhase::OauthCallback,
            LifecycleResponse::Event(_) => LifecyclePhase::Event,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResponse {
    pub target_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInit {
    pub id: String,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub first_page_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigInitData {
    pub initialize: ConfigInit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationInitResponse {
    pub configuration_data: ConfigInitData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPage {
    pub page_id: String,
    pub name: String,
    pub previous_page_id: Option<String>,
    pub next_page_id: Option<String>,
    pub complete: bool,
    pub sections: Vec<ConfigSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigPageData {
    pub page: ConfigPage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationPageResponse {
    pub configuration_data: ConfigPageData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallResponse {
    pub install_data: Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub update_data: Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallResponse {
    pub uninstall_data: Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OauthCallbackResponse {
    #[serde(rename = "oAuthCallbackData")]
    pub oauth_callback_data: Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event_data: Empty,
}
