//! Query items contributed by a request descriptor.

use std::fmt;

use crate::combinator::{Combinator, Contribution};

/// A single `name=value` query item.
///
/// A `None` value is allowed so optional parameters can be declared
/// unconditionally; such items are dropped when the URL is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    pub value: Option<String>,
}

/// An ordered sequence of queries. The empty sequence is the identity.
pub type Queries = Vec<Query>;

/// Builder for [`Queries`].
pub type QueryBuilder = Combinator<Query>;

impl Query {
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

    /// `limit=<n>`
    pub fn limit(limit: u64) -> Self {
        Self::new("limit", limit)
    }

    /// `offset=<n>`
    pub fn offset(offset: u64) -> Self {
        Self::new("offset", offset)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => write!(f, "{}=<none>", self.name),
        }
    }
}

impl Contribution<Query> for Query {
    fn contribute(self, into: &mut Vec<Query>) {
        into.push(self);
    }
}
