//! HTTP signature verification for lifecycle requests
//!
//! The platform signs every lifecycle request using Joyent's HTTP signature
//! scheme. Only `rsa-sha256` is accepted. Everything that goes into the
//! signing string is derived when the verifier is built and exposed
//! read-only, so a request can be checked step by step.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Public};
use openssl::rsa::Rsa;
use openssl::sign::Verifier;
use openssl::x509::X509;
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use crate::cache::public_key::PublicKeySource;
use crate::context::{RequestContext, AUTHORIZATION_HEADER, DATE_HEADER};
use crate::dispatch::DispatcherConfig;
use crate::errors::SignatureError;
use crate::utils::sha256_base64;

pub const SUPPORTED_ALGORITHM: &str = "rsa-sha256";
const SIGNATURE_PREFIX: &str = "Signature ";
const DEFAULT_SIGNING_HEADERS: &str = "Date";
const REQUEST_TARGET: &str = "(request-target)";
const DIGEST: &str = "digest";

// Lifecycle requests are always POSTed
const METHOD: &str = "POST";

// In the order they are checked
static ATTRIBUTE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    ["keyId", "headers", "algorithm", "signature"]
        .into_iter()
        .map(|name| {
            let pattern = format!(r#"({}=")([^"]+?)(")"#, name);
            (name, Regex::new(&pattern).expect("attribute regex is valid"))
        })
        .collect()
});

/// Verifier for the signature on a single lifecycle request
pub struct SignatureVerifier {
    correlation_id: Option<String>,
    path: String,
    request_target: String,
    date: DateTime<Utc>,
    authorization: String,
    signing_attributes: BTreeMap<String, String>,
    signing_headers: Vec<String>,
    keyserver_url: String,
    clock_skew_sec: Option<i64>,
    signing_string: String,
}

impl SignatureVerifier {
    /// Derive the signing inputs of a request.
    ///
    /// `target_url` is the app's registered URL. Its path is used for
    /// `(request-target)` rather than the path the server saw, since a
    /// reverse proxy may have rewritten the latter.
    pub fn new(
        context: &RequestContext,
        config: &DispatcherConfig,
        target_url: &str,
    ) -> Result<Self, SignatureError> {
        let correlation_id = context.correlation_id().map(str::to_string);
        let fail = |message: String| SignatureError::new(message, correlation_id.as_deref());

        let authorization = context
            .authorization()
            .ok_or_else(|| fail(format!("Header not found: {}", AUTHORIZATION_HEADER)))?
            .to_string();
        if !authorization.starts_with(SIGNATURE_PREFIX) {
            return Err(fail("Authorization header is not a signature".to_string()));
        }

        let signing_attributes = parse_attributes(&authorization).map_err(fail)?;

        let algorithm = &signing_attributes["algorithm"];
        if algorithm != SUPPORTED_ALGORITHM {
            return Err(fail(format!("Algorithm not supported: {}", algorithm)));
        }

        let signing_headers: Vec<String> = signing_attributes["headers"]
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let path = request_path(target_url);
        let request_target = format!("{} {}", METHOD.to_lowercase(), path);

        let mut components = Vec::with_capacity(signing_headers.len());
        for name in &signing_headers {
            if name.eq_ignore_ascii_case(REQUEST_TARGET) {
                components.push(format!("{}: {}", REQUEST_TARGET, request_target));
            } else if name.eq_ignore_ascii_case(DIGEST) {
                components.push(format!("{}: SHA-256={}", DIGEST, sha256_base64(context.body().as_bytes())));
            } else {
                let value = context
                    .header(name)
                    .ok_or_else(|| fail(format!("Header not found: {}", name)))?;
                components.push(format!("{}: {}", name.to_lowercase(), value));
            }
        }
        let signing_string = components.join("\n");

        let date_header = context
            .date()
            .ok_or_else(|| fail(format!("Header not found: {}", DATE_HEADER)))?;
        let date = parse_date(date_header).ok_or_else(|| fail("Date header is not valid".to_string()))?;

        Ok(Self {
            correlation_id,
            path,
            request_target,
            date,
            authorization,
            signing_attributes,
            signing_headers,
            keyserver_url: config.keyserver_url.clone(),
            clock_skew_sec: config.clock_skew_sec,
            signing_string,
        })
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn method(&self) -> &str {
        METHOD
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn request_target(&self) -> &str {
        &self.request_target
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    pub fn signing_attributes(&self) -> &BTreeMap<String, String> {
        &self.signing_attributes
    }

    pub fn signing_headers(&self) -> &[String] {
        &self.signing_headers
    }

    pub fn key_id(&self) -> &str {
        &self.signing_attributes["keyId"]
    }

    pub fn keyserver_url(&self) -> &str {
        &self.keyserver_url
    }

    pub fn algorithm(&self) -> &str {
        &self.signing_attributes["algorithm"]
    }

    /// Base64 signature, as sent
    pub fn signature(&self) -> &str {
        &self.signing_attributes["signature"]
    }

    pub fn signing_string(&self) -> &str {
        &self.signing_string
    }

    /// Check that the request date is within the allowed skew of `now`
    pub fn verify_date_at(&self, now: DateTime<Utc>) -> Result<(), SignatureError> {
        let Some(max_skew) = self.clock_skew_sec else {
            return Ok(());
        };

        let skew = (now - self.date).num_seconds().abs();
        if skew > max_skew {
            return Err(self.error(format!("Request date is not current, skew of {} seconds", skew)));
        }

        Ok(())
    }

    pub fn verify_date(&self) -> Result<(), SignatureError> {
        self.verify_date_at(Utc::now())
    }

    /// Check the signature against the public key named by `keyId`
    pub async fn verify_signature(&self, keys: &dyn PublicKeySource) -> Result<(), SignatureError> {
        let pem = keys
            .retrieve(&self.keyserver_url, self.key_id())
            .await
            .map_err(|e| {
                warn!(
                    correlation_id = self.correlation_id(),
                    key_id = self.key_id(),
                    "Key retrieval failed: {}",
                    e
                );
                self.error(format!("Failed to retrieve key [{}]", self.key_id()))
            })?;

        debug!(
            correlation_id = self.correlation_id(),
            "Signing string:\n{}", self.signing_string
        );

        match rsa_sha256_verify(&pem, self.signing_string.as_bytes(), self.signature()) {
            Some(true) => Ok(()),
            _ => Err(self.error("Signature is not valid".to_string())),
        }
    }

    /// Check the request date, then the signature
    pub async fn verify(&self, keys: &dyn PublicKeySource) -> Result<(), SignatureError> {
        self.verify_date()?;
        self.verify_signature(keys).await
    }

    fn error(&self, message: String) -> SignatureError {
        SignatureError::new(message, self.correlation_id())
    }
}

// The Authorization header carries the key, so it is left out.
impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("correlation_id", &self.correlation_id)
            .field("request_target", &self.request_target)
            .field("date", &self.date)
            .field("signing_headers", &self.signing_headers)
            .field("key_id", &self.key_id())
            .field("keyserver_url", &self.keyserver_url)
            .finish()
    }
}

fn parse_attributes(authorization: &str) -> Result<BTreeMap<String, String>, String> {
    let mut attributes = BTreeMap::new();

    for (name, pattern) in ATTRIBUTE_PATTERNS.iter() {
        let value = match pattern.captures(authorization).and_then(|c| c.get(2)) {
            Some(m) => m.as_str().to_string(),
            None if *name == "headers" => DEFAULT_SIGNING_HEADERS.to_string(),
            None => return Err(format!("Signature does not contain: {}", name)),
        };
        attributes.insert(name.to_string(), value);
    }

    Ok(attributes)
}

/// Parse an IMF-fixdate such as `Thu, 05 Jan 2014 21:31:40 GMT`.
///
/// The weekday is dropped before parsing: it is redundant, and senders
/// don't always get it right.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.split_once(',').map_or(value, |(_, rest)| rest).trim();
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Path and query of the registered target URL
fn request_path(target_url: &str) -> String {
    match Url::parse(target_url) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        // A bare path is allowed in place of a full URL
        Err(_) => target_url.to_string(),
    }
}

fn load_public_key(pem: &str) -> Result<PKey<Public>, openssl::error::ErrorStack> {
    let bytes = pem.as_bytes();
    if pem.contains("BEGIN CERTIFICATE") {
        X509::from_pem(bytes)?.public_key()
    } else if pem.contains("BEGIN RSA PUBLIC KEY") {
        PKey::from_rsa(Rsa::public_key_from_pem_pkcs1(bytes)?)
    } else {
        PKey::public_key_from_pem(bytes)
    }
}

/// RSA PKCS#1 v1.5 over SHA-256. `None` if the key or signature can't be decoded.
fn rsa_sha256_verify(pem: &str, data: &[u8], signature: &str) -> Option<bool> {
    let signature = STANDARD.decode(signature).ok()?;
    let key = load_public_key(pem).ok()?;
    let mut verifier = Verifier::new(MessageDigest::sha256(), &key).ok()?;
    verifier.update(data).ok()?;
    verifier.verify(&signature).ok()
}
