//! Request/response orchestration against a [`Domain`].
//!
//! # Design
//! `Service` holds only its domain and the observer registry; each `perform*`
//! call is independent. One call runs:
//!
//! ```text
//! [encode] -> assemble -> will_begin -> execute -> validate -> [decode] -> did_finish | did_fail
//! ```
//!
//! The optional phases are chosen statically by entry point, one per
//! endpoint shape, and all four share the same private exchange core.
//! Every failure is broadcast exactly once to `did_fail` and then returned
//! unchanged; transport errors are not reclassified.
//!
//! Dropping a `perform*` future cancels the call. Nothing is notified
//! afterwards and no registry lock is held across an await point.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::debug;

use crate::coding;
use crate::domain::Domain;
use crate::endpoint::{CodableEndpoint, DataEndpoint, DecodableEndpoint, EncodableEndpoint, Endpoint};
use crate::error::EndpointError;
use crate::http::{HttpResponse, TransportResponse};
use crate::observer::{Observer, ObserverRegistry, TracingObserver, WeakObserver};
use crate::request::Request;

/// Service-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Register a [`TracingObserver`] owned by the service.
    pub log_lifecycle: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_lifecycle: true,
        }
    }
}

/// Performs endpoint requests against one domain.
#[derive(Debug)]
pub struct Service<D> {
    domain: D,
    observers: ObserverRegistry,
    logger: Option<Arc<TracingObserver>>,
}

/// Raw outcome of a validated transport call.
struct Exchange {
    data: Vec<u8>,
    response: HttpResponse,
    started: Instant,
}

impl<D: Domain> Service<D> {
    pub fn new(domain: D) -> Self {
        Self::with_config(domain, ServiceConfig::default())
    }

    pub fn with_config(domain: D, config: ServiceConfig) -> Self {
        let observers = ObserverRegistry::new();
        let logger = config.log_lifecycle.then(|| Arc::new(TracingObserver));
        if let Some(logger) = &logger {
            observers.register(logger);
        }
        Self {
            domain,
            observers,
            logger,
        }
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Register `observer` without taking ownership of it.
    pub fn register<O: WeakObserver + ?Sized>(&self, observer: &Arc<O>) {
        self.observers.register(observer);
    }

    pub fn unregister<O: Observer + ?Sized>(&self, observer: &Arc<O>) {
        self.observers.unregister(observer);
    }

    /// Whether the built-in tracing observer is active.
    pub fn logs_lifecycle(&self) -> bool {
        self.logger.is_some()
    }

    /// Plain endpoint: no body, raw response bytes.
    pub async fn perform<E>(&self, endpoint: &E) -> Result<(Vec<u8>, HttpResponse), D::Error>
    where
        E: Endpoint + ?Sized,
    {
        let request = endpoint.request();
        let exchange = self.exchange(&request, None).await?;
        self.finish(&request, exchange.started);
        Ok((exchange.data, exchange.response))
    }

    /// Encode-only endpoint: encoded body, raw response bytes.
    pub async fn perform_encodable<E>(
        &self,
        endpoint: &E,
    ) -> Result<(Vec<u8>, HttpResponse), D::Error>
    where
        E: EncodableEndpoint + ?Sized,
    {
        let request = endpoint.request();
        let body = self.encode(endpoint, &request)?;
        let exchange = self.exchange(&request, Some(body)).await?;
        self.finish(&request, exchange.started);
        Ok((exchange.data, exchange.response))
    }

    /// Decode-only endpoint: no body, decoded response.
    pub async fn perform_decodable<E>(
        &self,
        endpoint: &E,
    ) -> Result<(E::Output, HttpResponse), D::Error>
    where
        E: DecodableEndpoint + ?Sized,
    {
        let data_endpoint = DataEndpoint::new(endpoint);
        let request = data_endpoint.descriptor();
        let exchange = self.exchange(request, None).await?;
        self.finish_decoded(endpoint, request, exchange)
    }

    /// Codable endpoint: encoded body, decoded response.
    pub async fn perform_codable<E>(&self, endpoint: &E) -> Result<(E::Output, HttpResponse), D::Error>
    where
        E: CodableEndpoint + ?Sized,
    {
        let request = endpoint.request();
        let body = self.encode(endpoint, &request)?;
        let exchange = self.exchange(&request, Some(body)).await?;
        self.finish_decoded(endpoint, &request, exchange)
    }

    fn encode<E>(&self, endpoint: &E, request: &Request) -> Result<Vec<u8>, D::Error>
    where
        E: EncodableEndpoint + ?Sized,
    {
        match endpoint.encode() {
            Ok(body) => {
                self.observers
                    .broadcast(|o| o.did_encode(request, endpoint.input_type()));
                Ok(body)
            }
            Err(e) => Err(self.fail(
                request,
                EndpointError::Encoding {
                    input_type: endpoint.input_type(),
                    context: e.context,
                },
            )),
        }
    }

    /// Decode the body, then report success. `Vec<u8>` output is handed
    /// back as received: no decoder runs and `did_decode` is not sent.
    fn finish_decoded<E>(
        &self,
        endpoint: &E,
        request: &Request,
        exchange: Exchange,
    ) -> Result<(E::Output, HttpResponse), D::Error>
    where
        E: DecodableEndpoint + ?Sized,
    {
        let Exchange {
            data,
            response,
            started,
        } = exchange;
        let output = match coding::raw_body::<E::Output>(data) {
            Ok(raw) => raw,
            Err(data) => self.decode(endpoint, request, &data)?,
        };
        self.finish(request, started);
        Ok((output, response))
    }

    fn decode<E>(&self, endpoint: &E, request: &Request, data: &[u8]) -> Result<E::Output, D::Error>
    where
        E: DecodableEndpoint + ?Sized,
    {
        match endpoint.decode(data) {
            Ok(output) => {
                self.observers
                    .broadcast(|o| o.did_decode(request, endpoint.output_type()));
                Ok(output)
            }
            Err(e) => Err(self.fail(
                request,
                EndpointError::Decoding {
                    output_type: endpoint.output_type(),
                    context: e.context,
                },
            )),
        }
    }

    /// Assemble, notify, execute and validate. Shared by every shape.
    async fn exchange(&self, request: &Request, body: Option<Vec<u8>>) -> Result<Exchange, D::Error> {
        let started = Instant::now();

        let mut transport = match self.domain.url_request(request).await {
            Ok(transport) => transport,
            Err(e) => return Err(self.notify_failure(request, None, e)),
        };
        transport.body = body;
        debug!(method = %transport.method, url = %transport.url, "assembled transport request");

        self.observers.broadcast(|o| o.will_begin(request));

        let (data, response) = match self.domain.execute(transport).await {
            Ok(result) => result,
            Err(e) => return Err(self.notify_failure(request, None, e)),
        };

        let response = match response {
            TransportResponse::Http(response) => response,
            TransportResponse::Other(raw) => {
                return Err(self.fail(request, EndpointError::UnexpectedResponse(raw)));
            }
        };
        debug!(status = response.status, bytes = data.len(), "received response");

        if !response.is_success() {
            return Err(self.fail(request, EndpointError::BadResponse(response)));
        }

        Ok(Exchange {
            data,
            response,
            started,
        })
    }

    fn finish(&self, request: &Request, started: Instant) {
        let duration = started.elapsed();
        self.observers.broadcast(|o| o.did_finish(request, duration));
    }

    fn fail(&self, request: &Request, error: EndpointError) -> D::Error {
        let status = error.status();
        self.notify_failure(request, status, D::Error::from(error))
    }

    fn notify_failure(&self, request: &Request, status: Option<u16>, error: D::Error) -> D::Error {
        self.observers
            .broadcast(|o| o.did_fail(request, status, &error));
        error
    }
}
