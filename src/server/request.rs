use http::Method;
use std::collections::HashMap;
use tracing::debug;

use crate::error::RequestParseError;

/// Maximum number of headers accepted in a raw request head
pub const MAX_HEADERS: usize = 64;

/// Parsed HTTP request handed to route handlers.
///
/// `path` is percent-decoded and carries no query string; the raw request
/// target is kept in `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request target as received (path plus query string)
    pub target: String,
    /// Percent-decoded path without query string
    pub path: String,
    /// Parsed query string parameters
    pub query_params: HashMap<String, String>,
    /// Protocol version, e.g. `HTTP/1.1`
    pub version: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl Request {
    /// Parse a complete request from raw bytes
    ///
    /// The head is parsed with `httparse`; the bytes after it are the body,
    /// truncated to `content-length` when that header is present.
    ///
    /// # Errors
    ///
    /// Returns [`RequestParseError::Incomplete`] if the head has not ended
    /// yet, and another [`RequestParseError`] for anything malformed.
    pub fn parse(raw: &[u8]) -> Result<Self, RequestParseError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(RequestParseError::Empty);
        }

        let mut header_buf = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut head = httparse::Request::new(&mut header_buf);
        let head_len = match head.parse(raw) {
            Ok(httparse::Status::Complete(len)) => len,
            Ok(httparse::Status::Partial) => return Err(RequestParseError::Incomplete),
            Err(err) => {
                return Err(RequestParseError::Malformed {
                    reason: err.to_string(),
                })
            }
        };
        let (Some(method), Some(target), Some(minor)) = (head.method, head.path, head.version)
        else {
            return Err(RequestParseError::Incomplete);
        };

        let headers = head
            .headers
            .iter()
            .map(|h| {
                std::str::from_utf8(h.value)
                    .map(|value| (h.name.to_string(), value.to_string()))
                    .map_err(|_| RequestParseError::InvalidHeaderValue {
                        name: h.name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut request = Self::from_parts(
            method,
            target,
            format!("HTTP/1.{}", minor),
            headers,
            raw[head_len..].to_vec(),
        )?;
        if let Some(len) = request
            .header("content-length")
            .and_then(|v| v.parse::<usize>().ok())
        {
            request.body.truncate(len);
        }
        Ok(request)
    }

    /// Build a request from already separated parts
    ///
    /// Used by the transport, which reads the head and body itself. Header
    /// names are lower-cased and values trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`RequestParseError::InvalidMethod`] or
    /// [`RequestParseError::InvalidPathEncoding`].
    pub fn from_parts<I>(
        method: &str,
        target: &str,
        version: String,
        headers: I,
        body: Vec<u8>,
    ) -> Result<Self, RequestParseError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let method =
            Method::from_bytes(method.as_bytes()).map_err(|_| RequestParseError::InvalidMethod {
                method: method.to_string(),
            })?;

        let raw_path = target.split_once('?').map_or(target, |(p, _)| p);
        let path = urlencoding::decode(raw_path)
            .map_err(|_| RequestParseError::InvalidPathEncoding {
                path: raw_path.to_string(),
            })?
            .into_owned();

        let headers: HashMap<String, String> = headers
            .into_iter()
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();

        debug!(
            method = %method,
            path = %path,
            header_count = headers.len(),
            body_size = body.len(),
            "Parsed HTTP request"
        );

        Ok(Self {
            method,
            target: target.to_string(),
            path,
            query_params: parse_query_params(target),
            version,
            headers,
            body,
        })
    }

    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Body as UTF-8 text, if it is valid UTF-8
    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// The content type to route on
    ///
    /// Takes the first media range of the `Accept` header, without
    /// parameters. A missing header, an empty value or `*/*` yields `default`.
    #[must_use]
    pub fn accepted_content_type<'a>(&'a self, default: &'a str) -> &'a str {
        self.header("accept")
            .and_then(|accept| accept.split(',').next())
            .map(|range| range.split(';').next().unwrap_or("").trim())
            .filter(|range| !range.is_empty() && *range != "*/*")
            .unwrap_or(default)
    }
}

/// Parse query string parameters from a request target
///
/// Extracts everything after the `?` character and URL-decodes parameter names and values.
///
/// # Arguments
///
/// * `target` - The full request target (e.g., `/users?limit=10&offset=20`)
///
/// # Returns
///
/// A map of query parameter names to values
#[must_use]
pub fn parse_query_params(target: &str) -> HashMap<String, String> {
    if let Some(pos) = target.find('?') {
        let query_str = &target[pos + 1..];
        url::form_urlencoded::parse(query_str.as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    } else {
        HashMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_with_headers_and_query() {
        let raw = b"GET /users/42?expand=posts&limit=10 HTTP/1.1\r\nHost: localhost\r\nAccept: application/json\r\n\r\n";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "/users/42");
        assert_eq!(req.target, "/users/42?expand=posts&limit=10");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.header("HOST"), Some("localhost"));
        assert_eq!(req.query("expand"), Some("posts"));
        assert_eq!(req.query("limit"), Some("10"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_parse_percent_decodes_path() {
        let req = Request::parse(b"GET /hello/J%C3%BCrgen%20M HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path, "/hello/Jürgen M");
    }

    #[test]
    fn test_parse_body_truncated_to_content_length() {
        let raw = b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello world";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body_str(), Some("hello"));
    }

    #[test]
    fn test_parse_accepts_bare_newlines() {
        let req = Request::parse(b"GET / HTTP/1.0\nAccept: text/plain\n\n").unwrap();
        assert_eq!(req.path, "/");
        assert_eq!(req.version, "HTTP/1.0");
        assert_eq!(req.header("accept"), Some("text/plain"));
    }

    #[test]
    fn test_parse_split_head_is_incomplete() {
        assert_eq!(
            Request::parse(b"GET /hello/x HTTP/1.1\r\nAcc"),
            Err(RequestParseError::Incomplete)
        );
        assert!(Request::parse(b"GET /hello/x HTTP/1.1\r\nAccept: text/plain\r\n\r\n").is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Request::parse(b""), Err(RequestParseError::Empty));
        assert_eq!(Request::parse(b"  \r\n"), Err(RequestParseError::Empty));
        assert!(matches!(
            Request::parse(b"GET /only-two\r\n\r\n"),
            Err(RequestParseError::Malformed { .. })
        ));
        assert!(matches!(
            Request::parse(b"GE(T / HTTP/1.1\r\n\r\n"),
            Err(RequestParseError::Malformed { .. })
        ));
        assert!(matches!(
            Request::parse(b"GET / HTTP/1.1\r\nno-colon-here\r\n\r\n"),
            Err(RequestParseError::Malformed { .. })
        ));
        assert!(matches!(
            Request::parse(b"GET /%FF HTTP/1.1\r\n\r\n"),
            Err(RequestParseError::InvalidPathEncoding { .. })
        ));
    }

    #[test]
    fn test_from_parts_normalizes_headers() {
        let req = Request::from_parts(
            "PUT",
            "/items/1?dry_run=true",
            "HTTP/1.1".to_string(),
            vec![("Content-Type".to_string(), " application/json ".to_string())],
            b"{}".to_vec(),
        )
        .unwrap();
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.path, "/items/1");
        assert_eq!(req.query("dry_run"), Some("true"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body_str(), Some("{}"));

        assert!(matches!(
            Request::from_parts("G@T", "/", "HTTP/1.1".to_string(), Vec::new(), Vec::new()),
            Err(RequestParseError::InvalidMethod { .. })
        ));
    }

    #[test]
    fn test_accepted_content_type() {
        let req = Request::parse(
            b"GET / HTTP/1.1\r\nAccept: application/json;q=0.9, text/html\r\n\r\n",
        )
        .unwrap();
        assert_eq!(req.accepted_content_type("text/html"), "application/json");

        let req = Request::parse(b"GET / HTTP/1.1\r\nAccept: */*\r\n\r\n").unwrap();
        assert_eq!(req.accepted_content_type("text/html"), "text/html");

        let req = Request::parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.accepted_content_type("text/plain"), "text/plain");
    }

    #[test]
    fn test_parse_query_params_without_query() {
        assert!(parse_query_params("/users").is_empty());
    }
}
