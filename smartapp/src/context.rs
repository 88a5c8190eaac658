//! Inbound request context

use std::fmt;

use http::HeaderMap;

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const CORRELATION_ID_HEADER: &str = "x-st-correlation";
pub const DATE_HEADER: &str = "date";

/// Headers and body of a lifecycle POST, as received by the HTTP layer.
///
/// Header lookup is case-insensitive. A header that is present but empty or
/// whitespace-only is treated as absent.
#[derive(Clone, Default)]
pub struct RequestContext {
    headers: HeaderMap,
    body: String,
}

impl RequestContext {
    pub fn new(headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// The named header, or `None` if it is missing, blank, or not text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
    }

    /// Correlation id the platform attaches to every request, for tracing
    pub fn correlation_id(&self) -> Option<&str> {
        self.header(CORRELATION_ID_HEADER)
    }

    pub fn authorization(&self) -> Option<&str> {
        self.header(AUTHORIZATION_HEADER)
    }

    pub fn date(&self) -> Option<&str> {
        self.header(DATE_HEADER)
    }
}

// The body can carry auth tokens, so it is left out.
impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("correlation_id", &self.correlation_id())
            .field("content_length", &self.body.len())
            .finish()
    }
}
