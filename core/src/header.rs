//! Headers contributed by a request descriptor, plus typed values for the
//! headers most endpoints set.

use std::borrow::Cow;
use std::fmt;

use base64ct::{Base64, Encoding};

use crate::combinator::{Combinator, Contribution};

/// A single header. A `None` value is dropped at assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: Option<String>,
}

/// An ordered sequence of headers.
pub type Headers = Vec<Header>;

/// Builder for [`Headers`].
pub type HeaderBuilder = Combinator<Header>;

impl Header {
    pub fn new(name: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            value: Some(value.to_string()),
        }
    }

    pub fn optional<V: fmt::Display>(name: impl Into<String>, value: Option<V>) -> Self {
        Self {
            name: name.into(),
            value: value.map(|v| v.to_string()),
        }
    }

    pub fn content_type(value: ContentType) -> Self {
        Self::new("Content-Type", value)
    }

    pub fn accept(value: Accept) -> Self {
        Self::new("Accept", value)
    }

    pub fn accept_encoding(value: AcceptEncoding) -> Self {
        Self::new("Accept-Encoding", value)
    }

    pub fn authorization(value: Authorization) -> Self {
        Self::new("Authorization", value)
    }

    pub fn user_agent(value: impl fmt::Display) -> Self {
        Self::new("User-Agent", value)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {value}", self.name),
            None => write!(f, "{}: <none>", self.name),
        }
    }
}

impl Contribution<Header> for Header {
    fn contribute(self, into: &mut Vec<Header>) {
        into.push(self);
    }
}

macro_rules! header_value {
    ($(#[$meta:meta])* $name:ident { $($constant:ident => $value:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            $(pub const $constant: $name = $name(Cow::Borrowed($value));)*

            pub fn new(value: impl Into<String>) -> Self {
                Self(Cow::Owned(value.into()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

header_value!(
    /// Value of the `Content-Type` header.
    ContentType {
        TEXT => "text/plain",
        XML => "application/xml",
        JSON => "application/json",
        URL_ENCODED => "application/x-www-form-urlencoded",
    }
);

header_value!(
    /// Value of the `Accept` header.
    Accept {
        HTML => "text/html",
        XHTML => "application/xhtml",
        XML => "application/xml",
        JSON => "application/json",
    }
);

header_value!(
    /// Value of the `Accept-Encoding` header.
    AcceptEncoding {
        GZIP => "gzip",
        DEFLATE => "deflate",
        IDENTITY => "identity",
    }
);

/// Value of the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization(String);

impl Authorization {
    /// `Basic <base64(username:password)>`
    pub fn basic(username: &str, password: &str) -> Self {
        let credentials = format!("{username}:{password}");
        Self(format!("Basic {}", Base64::encode_string(credentials.as_bytes())))
    }

    /// `Bearer <token>`
    pub fn bearer(token: &str) -> Self {
        Self(format!("Bearer {token}"))
    }
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_headers_use_canonical_names() {
        assert_eq!(
            Header::content_type(ContentType::JSON).to_string(),
            "Content-Type: application/json"
        );
        assert_eq!(Header::accept(Accept::XML).to_string(), "Accept: application/xml");
        assert_eq!(
            Header::accept_encoding(AcceptEncoding::GZIP).to_string(),
            "Accept-Encoding: gzip"
        );
        assert_eq!(
            Header::user_agent("endpoints/0.1").to_string(),
            "User-Agent: endpoints/0.1"
        );
    }

    #[test]
    fn basic_authorization_is_base64_encoded() {
        let auth = Authorization::basic("Aladdin", "open sesame");
        assert_eq!(auth.to_string(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn bearer_authorization_carries_token() {
        let header = Header::authorization(Authorization::bearer("abc123"));
        assert_eq!(header.value.as_deref(), Some("Bearer abc123"));
    }

    #[test]
    fn custom_values_are_open() {
        let custom = ContentType::new("application/vnd.api+json");
        assert_eq!(custom.as_str(), "application/vnd.api+json");
        assert_ne!(custom, ContentType::JSON);
    }

    #[test]
    fn missing_value_renders_placeholder() {
        let header = Header::optional::<&str>("X-Trace", None);
        assert_eq!(header.to_string(), "X-Trace: <none>");
    }
}
