//! Transport request and response values for the host-does-IO boundary.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! assembles an `HttpRequest` and hands it to a [`Domain`](crate::Domain),
//! which performs the actual network call and returns the body bytes plus a
//! `TransportResponse`. Nothing in this module performs I/O.
//!
//! Header collections are ordered `(name, value)` pairs rather than maps so
//! the assembled order is observable and stable in tests.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use url::Url;

/// HTTP method for a request.
///
/// An open set: the common verbs are provided as constants and any other
/// token can be built with [`Method::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method(Cow<'static, str>);

impl Method {
    pub const GET: Method = Method(Cow::Borrowed("GET"));
    pub const POST: Method = Method(Cow::Borrowed("POST"));
    pub const PUT: Method = Method(Cow::Borrowed("PUT"));
    pub const PATCH: Method = Method(Cow::Borrowed("PATCH"));
    pub const UPDATE: Method = Method(Cow::Borrowed("UPDATE"));
    pub const DELETE: Method = Method(Cow::Borrowed("DELETE"));

    pub fn new(method: impl Into<String>) -> Self {
        Self(Cow::Owned(method.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::GET
    }
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        Method::new(value)
    }
}

impl From<String> for Method {
    fn from(value: String) -> Self {
        Method::new(value)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caching behaviour requested from the transport.
///
/// The core never interprets this value; it is passed through verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    #[default]
    UseProtocolCachePolicy,
    ReloadIgnoringLocalCacheData,
    ReloadIgnoringLocalAndRemoteCacheData,
    ReturnCacheDataElseLoad,
    ReturnCacheDataDontLoad,
    ReloadRevalidatingCacheData,
}

/// A fully assembled transport request.
///
/// Built by [`Request::assemble`](crate::Request::assemble). The domain is
/// responsible for executing it and honouring the timeout, cache policy and
/// network-access flags.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub cache_policy: CachePolicy,
    pub timeout: Duration,
    pub allows_cellular_access: bool,
    pub allows_expensive_network_access: bool,
    pub allows_constrained_network_access: bool,
}

impl HttpRequest {
    /// Look up a header value by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Metadata of an HTTP response: final URL, status code and headers.
///
/// The body travels separately as raw bytes so the same value describes the
/// response whether or not it was decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub url: Url,
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl HttpResponse {
    pub fn new(url: Url, status: u16) -> Self {
        Self {
            url,
            status,
            headers: Vec::new(),
        }
    }

    /// Whether the status code lies in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header value by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Human-readable reason used when this response is rejected.
    pub fn failure_message(&self) -> String {
        match self.status {
            401 => "Authentication Required".to_string(),
            404 => "Resource not found".to_string(),
            status => format!("Bad response: {status} {}", self.url),
        }
    }
}

/// A response that did not come from an HTTP exchange (e.g. a `file:` or
/// `data:` fetch), described by whatever the transport could report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpaqueResponse {
    pub url: Option<Url>,
    pub mime_type: Option<String>,
    pub expected_content_length: Option<u64>,
}

impl fmt::Display for OpaqueResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "{url}")?,
            None => f.write_str("<no url>")?,
        }
        if let Some(mime) = &self.mime_type {
            write!(f, " ({mime})")?;
        }
        if let Some(length) = self.expected_content_length {
            write!(f, " {length} bytes")?;
        }
        Ok(())
    }
}

/// What a domain's transport call produced alongside the body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportResponse {
    Http(HttpResponse),
    Other(OpaqueResponse),
}

impl From<HttpResponse> for TransportResponse {
    fn from(response: HttpResponse) -> Self {
        TransportResponse::Http(response)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> HttpResponse {
        HttpResponse::new(Url::parse("https://api.example.com/gists").unwrap(), status)
    }

    #[test]
    fn custom_methods_keep_their_token() {
        let method = Method::new("PROPFIND");
        assert_eq!(method.as_str(), "PROPFIND");
        assert_eq!(Method::from("GET"), Method::GET);
        assert_eq!(Method::default(), Method::GET);
        assert_eq!(Method::UPDATE.to_string(), "UPDATE");
    }

    #[test]
    fn success_range_is_half_open() {
        assert!(response(200).is_success());
        assert!(response(299).is_success());
        assert!(!response(199).is_success());
        assert!(!response(300).is_success());
    }

    #[test]
    fn failure_messages_distinguish_auth_and_missing() {
        assert_eq!(response(401).failure_message(), "Authentication Required");
        assert_eq!(response(404).failure_message(), "Resource not found");
        assert_eq!(
            response(500).failure_message(),
            "Bad response: 500 https://api.example.com/gists"
        );
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut response = response(200);
        response
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("accept"), None);
    }

    #[test]
    fn opaque_response_renders_known_fields() {
        let opaque = OpaqueResponse {
            url: Some(Url::parse("file:///tmp/gist.json").unwrap()),
            mime_type: Some("application/json".to_string()),
            expected_content_length: Some(12),
        };
        assert_eq!(opaque.to_string(), "file:///tmp/gist.json (application/json) 12 bytes");
        assert_eq!(OpaqueResponse::default().to_string(), "<no url>");
    }
}
