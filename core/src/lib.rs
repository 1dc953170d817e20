//! Terse handler registration for an HTTP mock server.
//!
//! # Overview
//! `MockFetch` registers fake endpoints with a `(methods, url, resolver)`
//! call instead of building each handler by hand. One call may cover one
//! URL for several methods, or a whole batch of endpoints; either way the
//! mock server receives all resulting handlers in a single registration.
//!
//! # Design
//! - The mock server is reached only through `MockServerApi`; this crate
//!   does no I/O and keeps no state between calls.
//! - HEAD handlers wrap the caller's resolver so the reply keeps status,
//!   status text and headers but never a body.
//! - Invalid calls fail with `MockFetchError` before anything is
//!   registered.
//! - `is_engine_error` recognizes errors raised by the mock engine.

pub mod error;
pub mod fetch;
pub mod guards;
pub mod handlers;
pub mod http;
pub mod resolver;
pub mod server;

#[cfg(test)]
mod testing;

pub use error::{MockFetchError, ParseMethodError};
pub use fetch::{create_mock_fetch, Call, CreateMockFetchOptions, Endpoint, MethodSpec, MockFetch};
pub use guards::{is_engine_error, is_engine_error_value, EngineError};
pub use crate::http::{HttpMethod, MockRequest, MockResponse, Reply};
pub use resolver::Resolver;
pub use server::MockServerApi;
