//! End-to-end scenarios against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and drives it through a `Domain`
//! backed by ureq. ureq is blocking, so each call runs on tokio's blocking
//! pool. Status codes are returned as data (`http_status_as_error(false)`,
//! redirects not followed) so the service, not the transport, decides what
//! counts as a failure.

use std::net::SocketAddr;

use serde::Serialize;

use endpoints_core::{
    async_trait, DecodableEndpoint, Domain, EncodableEndpoint, Endpoint, EndpointError, Header,
    HttpRequest, HttpResponse, Method, Query, Request, Service, ServiceConfig, TransportResponse,
};
use mock_server::{Echo, Gist};

#[derive(Debug, thiserror::Error)]
enum LiveError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error("transport: {0}")]
    Transport(#[from] ureq::Error),
    #[error("request: {0}")]
    Http(#[from] ureq::http::Error),
    #[error("blocking task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

struct LiveDomain {
    base: String,
    agent: ureq::Agent,
}

impl LiveDomain {
    fn new(addr: SocketAddr) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .new_agent();
        Self {
            base: format!("http://{addr}"),
            agent,
        }
    }
}

/// Execute `request` with ureq, returning the body and the response head.
fn send(agent: &ureq::Agent, request: HttpRequest) -> Result<(Vec<u8>, HttpResponse), LiveError> {
    let mut builder = ureq::http::Request::builder()
        .method(request.method.as_str())
        .uri(request.url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let mut response = match request.body {
        Some(body) => agent.run(builder.body(body)?)?,
        None => agent.run(builder.body(())?)?,
    };

    let mut head = HttpResponse::new(request.url, response.status().as_u16());
    head.headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let data = response.body_mut().read_to_vec()?;
    Ok((data, head))
}

#[async_trait]
impl Domain for LiveDomain {
    type Error = LiveError;

    async fn base_url(&self, _request: &Request) -> Result<String, LiveError> {
        Ok(self.base.clone())
    }

    async fn execute(&self, request: HttpRequest) -> Result<(Vec<u8>, TransportResponse), LiveError> {
        let agent = self.agent.clone();
        let (data, response) = tokio::task::spawn_blocking(move || send(&agent, request)).await??;
        Ok((data, response.into()))
    }
}

async fn start_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    addr
}

fn live_service(addr: SocketAddr) -> Service<LiveDomain> {
    Service::with_config(LiveDomain::new(addr), ServiceConfig { log_lifecycle: false })
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct NewGist {
    description: String,
}

struct CreateGist(NewGist);

impl Endpoint for CreateGist {
    fn request(&self) -> Request {
        Request::post("gists")
    }
}

impl EncodableEndpoint for CreateGist {
    type Input = NewGist;

    fn body(&self) -> &NewGist {
        &self.0
    }
}

impl DecodableEndpoint for CreateGist {
    type Output = Gist;
}

struct ListGists {
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Endpoint for ListGists {
    fn request(&self) -> Request {
        Request::get("gists").with_queries(vec![
            Query::optional("limit", self.limit),
            Query::optional("offset", self.offset),
        ])
    }
}

impl DecodableEndpoint for ListGists {
    type Output = Vec<Gist>;
}

struct GetGist(uuid::Uuid);

impl Endpoint for GetGist {
    fn request(&self) -> Request {
        Request::get(format!("gists/{}", self.0))
    }
}

impl DecodableEndpoint for GetGist {
    type Output = Gist;
}

/// Any request against `/echo`, decoded as what the server saw.
struct EchoRequest(Request);

impl Endpoint for EchoRequest {
    fn request(&self) -> Request {
        self.0.clone()
    }
}

impl DecodableEndpoint for EchoRequest {
    type Output = Echo;
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn gist_lifecycle() {
    let service = live_service(start_server().await);

    // Empty to start with.
    let (gists, _) = service
        .perform_decodable(&ListGists { limit: None, offset: None })
        .await
        .unwrap();
    assert!(gists.is_empty());

    let mut ids = Vec::new();
    for description in ["one", "two", "three"] {
        let (gist, response) = service
            .perform_codable(&CreateGist(NewGist {
                description: description.to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(gist.description, description);
        ids.push(gist.id);
    }

    // Skip one, take one.
    let (page, _) = service
        .perform_decodable(&ListGists { limit: Some(1), offset: Some(1) })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].description, "two");

    let (fetched, _) = service.perform_decodable(&GetGist(ids[0])).await.unwrap();
    assert_eq!(fetched.description, "one");

    let delete = Request::new(Method::DELETE, format!("gists/{}", ids[0]));
    let (data, response) = service.perform(&delete).await.unwrap();
    assert_eq!(response.status, 204);
    assert!(data.is_empty());

    let err = service.perform_decodable(&GetGist(ids[0])).await.unwrap_err();
    match err {
        LiveError::Endpoint(EndpointError::BadResponse(response)) => {
            assert_eq!(response.status, 404)
        }
        other => panic!("expected BadResponse, got {other:?}"),
    }

    let (gists, _) = service
        .perform_decodable(&ListGists { limit: None, offset: None })
        .await
        .unwrap();
    assert_eq!(gists.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn server_sees_assembled_request() {
    let service = live_service(start_server().await);
    let request = Request::new(Method::PATCH, "echo")
        .with_queries(vec![
            Query::new("q", "two words"),
            Query::optional::<u8>("skipped", None),
            Query::limit(3),
        ])
        .with_headers(vec![
            Header::new("X-Probe", "first"),
            Header::new("x-probe", "second"),
            Header::optional::<&str>("X-Absent", None),
            Header::accept(endpoints_core::Accept::JSON),
        ]);

    let (echo, _) = service.perform_decodable(&EchoRequest(request)).await.unwrap();

    assert_eq!(echo.method, "PATCH");
    assert_eq!(echo.query.as_deref(), Some("q=two%20words&limit=3"));
    let probes: Vec<_> = echo
        .headers
        .iter()
        .filter(|(name, _)| name == "x-probe")
        .map(|(_, value)| value.as_str())
        .collect();
    assert_eq!(probes, ["first"]);
    assert!(echo.headers.iter().all(|(name, _)| name != "x-absent"));
    assert!(echo.headers.contains(&("accept".to_string(), "application/json".to_string())));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_standard_method_reaches_server() {
    let service = live_service(start_server().await);
    let request = Request::new(Method::UPDATE, "echo");

    let (echo, _) = service.perform_decodable(&EchoRequest(request)).await.unwrap();

    assert_eq!(echo.method, "UPDATE");
}

#[tokio::test(flavor = "multi_thread")]
async fn status_codes_are_validated() {
    let service = live_service(start_server().await);

    for code in [200u16, 204, 299] {
        let (_, response) = service.perform(&Request::get(format!("status/{code}"))).await.unwrap();
        assert_eq!(response.status, code);
    }

    for (code, message) in [
        (401u16, "Authentication Required".to_string()),
        (404, "Resource not found".to_string()),
    ] {
        let err = service
            .perform(&Request::get(format!("status/{code}")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    let err = service.perform(&Request::get("status/300")).await.unwrap_err();
    let url = format!("{}/status/300", service.domain().base);
    assert_eq!(err.to_string(), format!("Bad response: 300 {url}"));
}

#[tokio::test(flavor = "multi_thread")]
async fn broken_bodies_are_decoding_errors() {
    let service = live_service(start_server().await);

    let err = service
        .perform_decodable(&Fixture("corrupt"))
        .await
        .unwrap_err();
    assert!(matches!(err, LiveError::Endpoint(EndpointError::Decoding { .. })));

    let err = service
        .perform_decodable(&Fixture("mistype"))
        .await
        .unwrap_err();
    match err {
        LiveError::Endpoint(EndpointError::Decoding { context, .. }) => {
            assert_eq!(context.path(), "updated")
        }
        other => panic!("expected Decoding, got {other:?}"),
    }
}

struct Fixture(&'static str);

impl Endpoint for Fixture {
    fn request(&self) -> Request {
        Request::get(format!("fixtures/{}", self.0))
    }
}

impl DecodableEndpoint for Fixture {
    type Output = Gist;
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_connections_pass_through() {
    // Reserve a port, then free it so nothing is listening.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let service = live_service(addr);

    let err = service.perform(&Request::get("gists")).await.unwrap_err();

    assert!(matches!(err, LiveError::Transport(_)), "got {err:?}");
}
