//! The boundary between the pipeline and the network.
//!
//! # Design
//! A `Domain` knows where an API lives and how to talk to it. The core asks
//! it for a base address, assembles the transport request itself (unless the
//! domain overrides [`Domain::url_request`]) and hands the result back for
//! execution. TLS, pooling, authentication and retries all live behind this
//! trait.

use async_trait::async_trait;

use crate::error::EndpointError;
use crate::http::{HttpRequest, TransportResponse};
use crate::request::Request;

#[async_trait]
pub trait Domain: Send + Sync {
    /// Error returned by this domain's transport. Taxonomy failures are
    /// converted into it; transport failures are returned as they are.
    type Error: From<EndpointError> + std::error::Error + Send + Sync + 'static;

    /// Base address the descriptor's path is appended to.
    async fn base_url(&self, request: &Request) -> Result<String, Self::Error>;

    /// Fully assembled transport request for `request`.
    async fn url_request(&self, request: &Request) -> Result<HttpRequest, Self::Error> {
        let base = self.base_url(request).await?;
        Ok(request.assemble(&base)?)
    }

    /// Execute the transport call, returning the body bytes and the response.
    async fn execute(
        &self,
        request: HttpRequest,
    ) -> Result<(Vec<u8>, TransportResponse), Self::Error>;
}
