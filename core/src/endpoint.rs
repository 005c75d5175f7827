//! Endpoint shapes.
//!
//! # Design
//! Every endpoint exposes a [`Request`] descriptor. Request bodies and typed
//! responses are opt-in capabilities layered on top as separate traits, so
//! the four shapes are expressed statically:
//!
//! | Shape | Traits | Service entry point |
//! |-------|--------|---------------------|
//! | plain | `Endpoint` | [`Service::perform`](crate::Service::perform) |
//! | encode-only | `EncodableEndpoint` | [`Service::perform_encodable`](crate::Service::perform_encodable) |
//! | decode-only | `DecodableEndpoint` | [`Service::perform_decodable`](crate::Service::perform_decodable) |
//! | both | [`CodableEndpoint`] | [`Service::perform_codable`](crate::Service::perform_codable) |
//!
//! JSON is the default body format; override `encode` or `decode` to plug in
//! another one. Raw `Vec<u8>` output skips decoding altogether.

use std::any;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::coding::{self, CodingError};
use crate::request::Request;

/// Describes one request shape.
pub trait Endpoint: Send + Sync {
    fn request(&self) -> Request;
}

/// An endpoint that sends a body.
pub trait EncodableEndpoint: Endpoint {
    type Input: Serialize + Send + Sync;

    fn body(&self) -> &Self::Input;

    fn encode(&self) -> Result<Vec<u8>, CodingError> {
        coding::encode_json(self.body())
    }

    fn input_type(&self) -> &'static str {
        any::type_name::<Self::Input>()
    }
}

/// An endpoint whose response body is decoded into `Output`.
///
/// `Output = Vec<u8>` asks for the raw body: the service returns it as
/// received and never calls `decode`.
pub trait DecodableEndpoint: Endpoint {
    type Output: DeserializeOwned + Send + 'static;

    fn decode(&self, data: &[u8]) -> Result<Self::Output, CodingError> {
        coding::decode_json(data)
    }

    fn output_type(&self) -> &'static str {
        any::type_name::<Self::Output>()
    }
}

/// An endpoint that both sends a body and decodes its response.
pub trait CodableEndpoint: EncodableEndpoint + DecodableEndpoint {}

impl<E: EncodableEndpoint + DecodableEndpoint> CodableEndpoint for E {}

/// A descriptor on its own is a plain endpoint.
impl Endpoint for Request {
    fn request(&self) -> Request {
        self.clone()
    }
}

/// A decode-agnostic copy of another endpoint's descriptor.
///
/// The service erases decodable endpoints to this shape before the transport
/// call, so the transport side only ever deals in raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEndpoint {
    request: Request,
}

impl DataEndpoint {
    pub fn new<E: Endpoint + ?Sized>(endpoint: &E) -> Self {
        Self {
            request: endpoint.request(),
        }
    }

    pub fn descriptor(&self) -> &Request {
        &self.request
    }

    pub fn into_descriptor(self) -> Request {
        self.request
    }
}

impl Endpoint for DataEndpoint {
    fn request(&self) -> Request {
        self.request.clone()
    }
}
