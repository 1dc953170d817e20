//! Recognizing errors raised by the mock engine itself.
//!
//! The engine names its internal errors `InternalError` and prefixes its
//! messages with `[MSW]`. Anything else, including values that are not
//! errors at all, is not an engine error.

use std::any::Any;
use std::error::Error;

pub const INTERNAL_ERROR_NAME: &str = "InternalError";
pub const ENGINE_MESSAGE_PREFIX: &str = "[MSW]";

/// An error raised by the mock engine, carrying a name and a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    pub name: String,
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_name("Error", message)
    }

    pub fn with_name(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// An `InternalError` with the engine prefix on its message.
    pub fn internal(message: impl AsRef<str>) -> Self {
        Self::with_name(
            INTERNAL_ERROR_NAME,
            format!("{ENGINE_MESSAGE_PREFIX} {}", message.as_ref()),
        )
    }
}

/// True if `error` came out of the mock engine.
///
/// Matches an `EngineError` named `InternalError`, or any error whose
/// message starts with `[MSW]`. A prefix appearing later in the message
/// does not count.
pub fn is_engine_error(error: &(dyn Error + 'static)) -> bool {
    if let Some(engine) = error.downcast_ref::<EngineError>() {
        if engine.name == INTERNAL_ERROR_NAME {
            return true;
        }
    }
    error.to_string().starts_with(ENGINE_MESSAGE_PREFIX)
}

/// Like `is_engine_error`, for values of unknown type.
///
/// `&dyn Any` can only be inspected for known types: `EngineError`,
/// `std::io::Error` and boxed errors are checked, every other value is
/// rejected. Concrete error types outside that list should go through
/// `is_engine_error` instead.
pub fn is_engine_error_value(value: &dyn Any) -> bool {
    if let Some(error) = value.downcast_ref::<EngineError>() {
        return is_engine_error(error);
    }
    if let Some(error) = value.downcast_ref::<std::io::Error>() {
        return is_engine_error(error);
    }
    if let Some(error) = value.downcast_ref::<Box<dyn Error + Send + Sync>>() {
        return is_engine_error(&**error);
    }
    if let Some(error) = value.downcast_ref::<Box<dyn Error>>() {
        return is_engine_error(&**error);
    }
    false
}
