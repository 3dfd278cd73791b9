use serde_json::Value;
use smallvec::SmallVec;
use std::io::Cursor;
use std::sync::Arc;
use tracing::warn;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage
///
/// Header names use `Arc<str>`: they repeat across responses (Content-Type,
/// Content-Length, ...) and clone in O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

const TRANSPORT_HEADERS: [&str; 3] = ["content-length", "connection", "transfer-encoding"];

/// HTTP response produced by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers
    pub headers: HeaderVec,
    /// Response body
    pub body: Vec<u8>,
}

pub(crate) fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

impl Response {
    /// Create a response with the given status, content type and body
    #[must_use]
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), content_type.to_string()));
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body.into())
    }

    #[must_use]
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, "text/html; charset=utf-8", body.into())
    }

    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, "application/json", body.to_string())
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::text(404, status_reason(404))
    }

    #[must_use]
    pub fn internal_error(message: &str) -> Self {
        Self::text(500, message)
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Convert into a `tiny_http` response for the transport
    ///
    /// `Content-Length`, `Connection` and `Transfer-Encoding` are managed by
    /// the transport; handler-supplied values for them are dropped.
    #[must_use]
    pub fn into_transport(self) -> tiny_http::Response<Cursor<Vec<u8>>> {
        let Response {
            status,
            headers,
            body,
        } = self;
        let mut out = tiny_http::Response::from_data(body).with_status_code(status);
        for (name, value) in &headers {
            if TRANSPORT_HEADERS
                .iter()
                .any(|managed| name.eq_ignore_ascii_case(managed))
            {
                continue;
            }
            match tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(header) => out.add_header(header),
                Err(()) => warn!(header = %name, "Dropping header with invalid characters"),
            }
        }
        out
    }
}
