//! Error taxonomy of the endpoint pipeline.
//!
//! # Design
//! `EndpointError` is closed: every failure the pipeline itself classifies
//! lands in one of five variants. Transport failures are not part of it; they
//! belong to the domain's own error type and pass through unchanged (see
//! [`Domain::Error`](crate::Domain::Error)).
//!
//! `BadResponse` keeps the whole response so 401 and 404 can be told apart
//! from other statuses without re-reading anything.

use thiserror::Error;

use crate::coding::{short_type_name, CodingContext};
use crate::http::{HttpResponse, OpaqueResponse};

/// Errors raised while assembling, validating, encoding or decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// No valid URL could be built from the base address and descriptor.
    #[error("{0}")]
    BadEndpoint(String),

    /// The transport returned something that is not an HTTP response.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(OpaqueResponse),

    /// The status code is outside `[200, 300)`.
    #[error("{}", .0.failure_message())]
    BadResponse(HttpResponse),

    /// The request body could not be encoded.
    #[error("{} - {}", short_type_name(.input_type), .context.description)]
    Encoding {
        input_type: &'static str,
        context: CodingContext,
    },

    /// The response body could not be decoded.
    #[error("{}.{} - {}", short_type_name(.output_type), .context.path(), .context.description)]
    Decoding {
        output_type: &'static str,
        context: CodingContext,
    },
}

impl EndpointError {
    /// HTTP status reported to observers: the real code for `BadResponse`,
    /// `None` for every failure that has no status.
    pub fn status(&self) -> Option<u16> {
        match self {
            EndpointError::BadResponse(response) => Some(response.status),
            _ => None,
        }
    }
}
