//! cURL rendering of an assembled request, for debugging.

use std::fmt;

use crate::http::HttpRequest;

impl HttpRequest {
    pub fn curl(&self) -> Curl<'_> {
        Curl { request: self }
    }
}

/// Displays as `METHOD /path`; [`Curl::command`] gives the full command line.
#[derive(Debug, Clone, Copy)]
pub struct Curl<'a> {
    request: &'a HttpRequest,
}

impl Curl<'_> {
    /// A `curl` invocation reproducing the request. `Cookie` headers are left out.
    pub fn command(&self) -> String {
        let request = self.request;
        let mut base = format!("curl \"{}\"", request.url);
        if request.method.as_str() == "HEAD" {
            base.push_str(" --head");
        }

        let mut parts = vec![base, format!("-X {}", request.method)];
        parts.extend(
            request
                .headers
                .iter()
                .filter(|(name, _)| !name.eq_ignore_ascii_case("cookie"))
                .map(|(name, value)| format!("-H '{name}: {value}'")),
        );
        if let Some(body) = request.body.as_deref().and_then(|b| std::str::from_utf8(b).ok()) {
            parts.push(format!("-d '{body}'"));
        }
        parts.join(" \\\n\t")
    }
}

impl fmt::Display for Curl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.request.method, self.request.url.path())
    }
}
