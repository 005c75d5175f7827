//! Declarative HTTP endpoints and the service that performs them.
//!
//! # Overview
//! An [`Endpoint`] describes one request: a [`Request`] descriptor (method,
//! path, queries, headers, transport settings) plus, optionally, a body to
//! encode and a response type to decode. A [`Domain`] resolves the base
//! address and executes the transport call. The [`Service`] ties them
//! together: it encodes, assembles, notifies observers, executes, validates
//! the status code, decodes, and notifies again.
//!
//! # Design
//! - The core never performs I/O itself; the domain owns the network
//!   (host-does-IO pattern).
//! - Endpoint capabilities are traits, so the four shapes (plain,
//!   encode-only, decode-only, codable) are resolved at compile time.
//! - Observers are held weakly by the service's registry.
//! - Failures classified by the pipeline are [`EndpointError`]s, converted
//!   into the domain's error type; transport errors pass through untouched.

pub mod coding;
pub mod combinator;
pub mod curl;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod header;
pub mod http;
pub mod observer;
pub mod query;
pub mod request;
pub mod service;

pub use async_trait::async_trait;
pub use coding::{CodingContext, CodingError, CodingErrorKind};
pub use combinator::{merge, Combinator, Contribution, Either, Empty};
pub use curl::Curl;
pub use domain::Domain;
pub use endpoint::{CodableEndpoint, DataEndpoint, DecodableEndpoint, EncodableEndpoint, Endpoint};
pub use error::EndpointError;
pub use header::{Accept, AcceptEncoding, Authorization, ContentType, Header, HeaderBuilder, Headers};
pub use http::{CachePolicy, HttpRequest, HttpResponse, Method, OpaqueResponse, TransportResponse};
pub use observer::{Observer, ObserverRegistry, TracingObserver, WeakObserver};
pub use query::{Queries, Query, QueryBuilder};
pub use request::Request;
pub use service::{Service, ServiceConfig};
