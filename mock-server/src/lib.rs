//! In-process mock server backing `mock_fetch`.
//!
//! # Overview
//! Stores request handlers, answers `fetch` calls without touching the
//! network, and can serve the same handlers over HTTP through an axum
//! `Router` when a real socket is needed.
//!
//! # Design
//! - Handlers registered at runtime are prepended, so the latest
//!   registration for a method and path wins. `reset_handlers` restores the
//!   handlers the server was created with.
//! - URL matching is exact on the path: scheme, authority and query string
//!   are ignored and there are no path parameters.
//! - A resolver that yields nothing lets the next matching handler answer.

pub mod config;
pub mod handler;

use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::LengthLimitError;
use mock_fetch::{EngineError, HttpMethod, MockRequest, MockResponse, MockServerApi, Reply, Resolver};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub use config::{MockServerConfig, UnhandledRequest};
pub use handler::{HandlerInfo, RequestHandler};

/// Why an in-process `fetch` produced no response.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A resolver asked for the request to fail at the network level.
    #[error("network error")]
    Network,

    /// The mock engine refused the request.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Largest request body accepted over HTTP, matching axum's default limit.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Mock server holding the registered request handlers.
#[derive(Debug)]
pub struct MockServer {
    config: MockServerConfig,
    initial: Vec<Arc<RequestHandler>>,
    registry: RwLock<Registry>,
}

/// Handlers in match order and the size of each batch that added them.
/// Kept under one lock so readers never see one without the other.
#[derive(Debug)]
struct Registry {
    handlers: Vec<Arc<RequestHandler>>,
    batches: Vec<usize>,
}

impl MockServer {
    pub fn new(config: MockServerConfig) -> Self {
        Self::with_handlers(config, Vec::new())
    }

    /// Create a server whose baseline handlers survive `reset_handlers`.
    pub fn with_handlers(config: MockServerConfig, initial: Vec<RequestHandler>) -> Self {
        let initial: Vec<Arc<RequestHandler>> = initial.into_iter().map(Arc::new).collect();
        Self {
            config,
            registry: RwLock::new(Registry {
                handlers: initial.clone(),
                batches: Vec::new(),
            }),
            initial,
        }
    }

    pub fn config(&self) -> &MockServerConfig {
        &self.config
    }

    /// Prepend a batch of handlers in one registration.
    pub fn register(&self, handlers: Vec<RequestHandler>) {
        let count = handlers.len();
        let batch = handlers.into_iter().map(Arc::new);
        {
            let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
            registry.handlers.splice(0..0, batch);
            registry.batches.push(count);
        }
        debug!(count, "registered handlers");
    }

    /// Drop runtime handlers, keeping only the ones given at creation.
    pub fn reset_handlers(&self) {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry.handlers = self.initial.clone();
        registry.batches.clear();
    }

    /// The current handlers, in match order.
    pub fn handlers(&self) -> Vec<HandlerInfo> {
        self.snapshot().iter().map(|handler| handler.info()).collect()
    }

    /// Size of every batch registered since creation or the last reset.
    pub fn registrations(&self) -> Vec<usize> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .batches
            .clone()
    }

    /// Answer `request` from the registered handlers.
    pub async fn fetch(&self, request: MockRequest) -> Result<MockResponse, FetchError> {
        let candidates: Vec<Arc<RequestHandler>> = self
            .snapshot()
            .into_iter()
            .filter(|handler| handler.matches(&request.method, &request.url))
            .collect();

        for handler in candidates {
            let Some(reply) = handler.run(request.clone()).await else {
                continue;
            };
            if reply.is_network_error() {
                return Err(FetchError::Network);
            }
            return match reply {
                Reply::Response(response) => Ok(response),
                Reply::Value(value) => Ok(MockResponse::json(value)),
                Reply::NetworkError => Err(FetchError::Network),
            };
        }

        self.unhandled(&request)
    }

    /// Build a router that serves every request through `fetch`.
    pub fn app(self: &Arc<Self>) -> Router {
        Router::new().fallback(dispatch).with_state(Arc::clone(self))
    }

    pub async fn listen(self: &Arc<Self>, listener: TcpListener) -> Result<(), std::io::Error> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "mock server listening");
        }
        axum::serve(listener, self.app()).await
    }

    fn snapshot(&self) -> Vec<Arc<RequestHandler>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .clone()
    }

    fn unhandled(&self, request: &MockRequest) -> Result<MockResponse, FetchError> {
        match self.config.on_unhandled_request {
            UnhandledRequest::Bypass => Ok(MockResponse::empty(404)),
            UnhandledRequest::Warn => {
                warn!(method = %request.method, url = %request.url, "request has no matching handler");
                Ok(MockResponse::empty(404))
            }
            UnhandledRequest::Error => Err(EngineError::internal(format!(
                "Cannot bypass a request when using the \"error\" strategy for the \"onUnhandledRequest\" option. ({} {})",
                request.method, request.url
            ))
            .into()),
        }
    }

    fn build(method: HttpMethod, url: &str, resolver: Resolver) -> RequestHandler {
        RequestHandler::new(method, url, resolver)
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new(MockServerConfig::default())
    }
}

impl MockServerApi for MockServer {
    type Handler = RequestHandler;

    fn get(&self, url: &str, resolver: Resolver) -> RequestHandler {
        Self::build(HttpMethod::Get, url, resolver)
    }

    fn post(&self, url: &str, resolver: Resolver) -> RequestHandler {
        Self::build(HttpMethod::Post, url, resolver)
    }

    fn put(&self, url: &str, resolver: Resolver) -> RequestHandler {
        Self::build(HttpMethod::Put, url, resolver)
    }

    fn delete(&self, url: &str, resolver: Resolver) -> RequestHandler {
        Self::build(HttpMethod::Delete, url, resolver)
    }

    fn patch(&self, url: &str, resolver: Resolver) -> RequestHandler {
        Self::build(HttpMethod::Patch, url, resolver)
    }

    fn head(&self, url: &str, resolver: Resolver) -> RequestHandler {
        Self::build(HttpMethod::Head, url, resolver)
    }

    fn options(&self, url: &str, resolver: Resolver) -> RequestHandler {
        Self::build(HttpMethod::Options, url, resolver)
    }

    fn use_handlers(&self, handlers: Vec<RequestHandler>) {
        self.register(handlers);
    }
}

async fn dispatch(State(server): State<Arc<MockServer>>, request: Request) -> Response {
    let request = match into_mock_request(request).await {
        Ok(request) => request,
        Err(status) => return status.into_response(),
    };

    match server.fetch(request).await {
        Ok(response) => into_response(response),
        Err(FetchError::Network) => StatusCode::BAD_GATEWAY.into_response(),
        Err(FetchError::Engine(err)) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

async fn into_mock_request(request: Request) -> Result<MockRequest, StatusCode> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| {
            if err.into_inner().is::<LengthLimitError>() {
                StatusCode::PAYLOAD_TOO_LARGE
            } else {
                StatusCode::BAD_REQUEST
            }
        })?;

    let mut mock = MockRequest::new(parts.method.as_str(), parts.uri.to_string());
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            mock = mock.with_header(name.as_str(), value);
        }
    }
    if !bytes.is_empty() {
        let body = String::from_utf8(bytes.to_vec()).map_err(|_| StatusCode::BAD_REQUEST)?;
        mock = mock.with_body(body);
    }
    Ok(mock)
}

fn into_response(response: MockResponse) -> Response {
    let Ok(status) = StatusCode::from_u16(response.status) else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let mut builder = axum::http::Response::builder().status(status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Body::from(response.body.unwrap_or_default()))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Bind-address helper for the binary and tests.
pub fn local_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}
