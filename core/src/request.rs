//! The request descriptor and its assembly into a transport request.
//!
//! # Design
//! `Request` is a plain value built per call site. Defaults mirror what most
//! JSON APIs want (GET, 60 s timeout, JSON `Content-Type`/`Accept`, every
//! network interface allowed) and the `with_*` methods return modified
//! copies so descriptors compose without mutation.
//!
//! [`Request::assemble`] is pure: it resolves the URL against a base
//! address, applies the query and header conflict rules, and copies the
//! transport settings. It never performs I/O.

use std::fmt;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::combinator::Contribution;
use crate::error::EndpointError;
use crate::header::{Accept, ContentType, Header};
use crate::http::{CachePolicy, HttpRequest, Method};
use crate::query::Query;

/// Characters escaped inside a query name or value.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Declarative description of one HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Appended to the domain's base address as additional path segments.
    pub path: String,
    pub queries: Vec<Query>,
    pub headers: Vec<Header>,
    pub cache_policy: CachePolicy,
    pub timeout: Duration,
    /// Only a cellular interface may be available. Defaults to `true`.
    pub allows_cellular_access: bool,
    /// Only expensive interfaces (e.g. a hotspot) may be available. Defaults to `true`.
    pub allows_expensive_network_access: bool,
    /// The user may have a low-data mode enabled. Defaults to `true`.
    pub allows_constrained_network_access: bool,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            queries: Vec::new(),
            headers: Self::default_headers(),
            cache_policy: CachePolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            allows_cellular_access: true,
            allows_expensive_network_access: true,
            allows_constrained_network_access: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `Content-Type: application/json` and `Accept: application/json`.
    pub fn default_headers() -> Vec<Header> {
        vec![
            Header::content_type(ContentType::JSON),
            Header::accept(Accept::JSON),
        ]
    }

    pub fn with_queries(mut self, queries: impl Contribution<Query>) -> Self {
        self.queries.clear();
        queries.contribute(&mut self.queries);
        self
    }

    /// Replaces the headers, defaults included. Prepend an entry to
    /// [`Request::default_headers`] to override one default and keep the rest.
    pub fn with_headers(mut self, headers: impl Contribution<Header>) -> Self {
        self.headers.clear();
        headers.contribute(&mut self.headers);
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cellular_access(mut self, allowed: bool) -> Self {
        self.allows_cellular_access = allowed;
        self
    }

    pub fn with_expensive_network_access(mut self, allowed: bool) -> Self {
        self.allows_expensive_network_access = allowed;
        self
    }

    pub fn with_constrained_network_access(mut self, allowed: bool) -> Self {
        self.allows_constrained_network_access = allowed;
        self
    }

    /// Build the transport request for this descriptor against `base_url`.
    ///
    /// Queries with a value are appended after any query already on the base
    /// address. The path is appended to the base path, never replacing it.
    /// For headers, entries without a value are dropped and the first
    /// occurrence of each name (compared case-insensitively) wins.
    pub fn assemble(&self, base_url: &str) -> Result<HttpRequest, EndpointError> {
        let mut url = Url::parse(base_url).map_err(|e| self.bad_endpoint(base_url, e))?;

        let items: Vec<String> = self
            .queries
            .iter()
            .filter_map(|query| {
                let value = query.value.as_deref()?;
                Some(format!(
                    "{}={}",
                    utf8_percent_encode(&query.name, QUERY_COMPONENT),
                    utf8_percent_encode(value, QUERY_COMPONENT)
                ))
            })
            .collect();
        if !items.is_empty() {
            let joined = match url.query().filter(|existing| !existing.is_empty()) {
                Some(existing) => format!("{existing}&{}", items.join("&")),
                None => items.join("&"),
            };
            url.set_query(Some(&joined));
        }

        let path = self.path.trim_start_matches('/');
        if !path.is_empty() {
            url.path_segments_mut()
                .map_err(|()| self.bad_endpoint(base_url, "base address cannot carry a path"))?
                .pop_if_empty()
                .extend(path.split('/'));
        }

        Ok(HttpRequest {
            method: self.method.clone(),
            url,
            headers: self.header_fields(),
            body: None,
            cache_policy: self.cache_policy,
            timeout: self.timeout,
            allows_cellular_access: self.allows_cellular_access,
            allows_expensive_network_access: self.allows_expensive_network_access,
            allows_constrained_network_access: self.allows_constrained_network_access,
        })
    }

    fn header_fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = Vec::with_capacity(self.headers.len());
        for header in &self.headers {
            let Some(value) = &header.value else { continue };
            if fields.iter().any(|(name, _)| name.eq_ignore_ascii_case(&header.name)) {
                continue;
            }
            fields.push((header.name.clone(), value.clone()));
        }
        fields
    }

    fn bad_endpoint(&self, base_url: &str, cause: impl fmt::Display) -> EndpointError {
        EndpointError::BadEndpoint(format!(
            "Unable to construct URL from endpoint: {self} - base URL: {base_url} ({cause})"
        ))
    }
}

impl Default for Request {
    fn default() -> Self {
        Request::new(Method::GET, "")
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.method, self.path.trim_start_matches('/'))?;
        for (i, query) in self.queries.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            write!(f, "{query}")?;
        }
        Ok(())
    }
}

impl Request {
    /// Multi-line rendering listing every query and header.
    pub fn describe(&self) -> String {
        let mut out = format!("{} /{}", self.method, self.path.trim_start_matches('/'));
        if !self.queries.is_empty() {
            out.push_str("\nQueries:");
            for query in &self.queries {
                out.push_str(&format!("\n\t{query}"));
            }
        }
        if !self.headers.is_empty() {
            out.push_str("\nHeaders:");
            for header in &self.headers {
                out.push_str(&format!("\n\t- {header}"));
            }
        }
        out
    }
}
