//! The mock-server collaborator seen from the adapter.
//!
//! # Design
//! The adapter never matches requests or owns handlers. It only asks the
//! collaborator to build one handler per method and then hands the whole
//! batch over in a single `use_handlers` call. Handler lifetime after that
//! (reset between tests, teardown) belongs to the collaborator.

use crate::http::{MockResponse, Reply};
use crate::resolver::Resolver;

/// Operations the adapter needs from a mock server.
pub trait MockServerApi {
    /// A registerable handler, owned by the server once submitted.
    type Handler;

    fn get(&self, url: &str, resolver: Resolver) -> Self::Handler;
    fn post(&self, url: &str, resolver: Resolver) -> Self::Handler;
    fn put(&self, url: &str, resolver: Resolver) -> Self::Handler;
    fn delete(&self, url: &str, resolver: Resolver) -> Self::Handler;
    fn patch(&self, url: &str, resolver: Resolver) -> Self::Handler;
    fn head(&self, url: &str, resolver: Resolver) -> Self::Handler;
    fn options(&self, url: &str, resolver: Resolver) -> Self::Handler;

    /// Register a batch of handlers in one call, keeping their order.
    fn use_handlers(&self, handlers: Vec<Self::Handler>);

    /// Build a response without a body.
    fn empty_response(
        &self,
        status: u16,
        status_text: Option<&str>,
        headers: Option<&[(String, String)]>,
    ) -> MockResponse {
        let mut response = MockResponse::empty(status);
        if let Some(status_text) = status_text {
            response.status_text = status_text.to_string();
        }
        if let Some(headers) = headers {
            response.headers = headers.to_vec();
        }
        response
    }

    /// The canonical network-error reply.
    fn network_error(&self) -> Reply {
        Reply::NetworkError
    }
}
