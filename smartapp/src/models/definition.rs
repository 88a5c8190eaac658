//! Static SmartApp definition

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::models::config::ConfigSection;

/// A page of configuration offered to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartAppConfigPage {
    pub page_name: String,
    pub sections: Vec<ConfigSection>,
}

/// The definition of the SmartApp.
///
/// Static for a given version of the application. On disk it uses the same
/// camelCase names as the lifecycle API (`targetUrl`, `configPages`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartAppDefinition {
    /// Identifier for this SmartApp
    pub id: String,

    /// Name shown to users
    pub name: String,

    /// Description shown to users
    pub description: String,

    /// The URL registered with the platform; also the source of the
    /// `(request-target)` path when verifying signatures
    pub target_url: String,

    /// Permissions the SmartApp requires
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Configuration pages, in order; page ids are 1-based positions
    #[serde(default)]
    pub config_pages: Vec<SmartAppConfigPage>,
}

impl SmartAppDefinition {
    /// Load a definition from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ServiceError::ConfigError(format!(
                "Unable to read SmartApp definition {}: {}",
                path.display(),
                e
            ))
        })?;
        let definition = serde_json::from_str(&contents)?;
        Ok(definition)
    }

    /// The 1-based page, if it exists
    pub fn page(&self, page_id: usize) -> Option<&SmartAppConfigPage> {
        page_id
            .checked_sub(1)
            .and_then(|index| self.config_pages.get(index))
    }
}
