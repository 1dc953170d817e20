//! Error types for the mock-fetch adapter.
//!
//! # Design
//! Both adapter errors are raised before any handler reaches the mock
//! server, so a failed call never leaves partial registrations behind.
//! Their messages are fixed strings callers may match on.

use thiserror::Error;

/// Errors returned when building or calling a `MockFetch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockFetchError {
    /// The call matched neither the single-endpoint nor the batch form.
    #[error("invalid arguments for mockFetch")]
    InvalidArguments,

    /// No mock server was supplied when creating the adapter.
    #[error("mock server instance is required to create mockFetch")]
    MissingServer,
}

/// A string that does not name a supported HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP method: {0}")]
pub struct ParseMethodError(pub String);
