//! Key server client
//!
//! Signing keys are published by the platform's key server at
//! `{keyserver_url}/{key_id}` as PEM text. The key id is URL-safe per the
//! platform documentation, so it is not encoded.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::errors::{KeyFetchError, ServiceError};
use crate::utils::{calc_exp_backoff, CooldownOptions};

/// Retry options for key retrieval
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Backoff between attempts
    pub cooldown: CooldownOptions,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            cooldown: CooldownOptions::default(),
        }
    }
}

/// HTTP client for the signing key server
pub struct KeyServerClient {
    client: Client,
    retry: RetryOptions,
}

impl KeyServerClient {
    /// Create a new client; `timeout` bounds each attempt
    pub fn new(timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            retry: RetryOptions::default(),
        })
    }

    /// Replace the retry options
    pub fn with_retry(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    /// URL of a key on the key server
    pub fn key_url(keyserver_url: &str, key_id: &str) -> String {
        format!(
            "{}/{}",
            keyserver_url.trim_end_matches('/'),
            key_id.trim_start_matches('/')
        )
    }

    /// Fetch a key, retrying transient failures with exponential backoff
    pub async fn fetch(&self, keyserver_url: &str, key_id: &str) -> Result<String, KeyFetchError> {
        let url = Self::key_url(keyserver_url, key_id);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.fetch_once(&url).await {
                Ok(pem) => return Ok(pem),
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = calc_exp_backoff(&self.retry.cooldown, attempt - 1);
                    warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Key retrieval failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, KeyFetchError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(KeyFetchError::StatusError {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(body)
    }
}
