//! Mock server configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do with a request no handler answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnhandledRequest {
    /// Answer 404 silently.
    Bypass,
    /// Answer 404 and log a warning.
    #[default]
    Warn,
    /// Fail the request with an engine error.
    Error,
}

impl FromStr for UnhandledRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bypass" => Ok(UnhandledRequest::Bypass),
            "warn" => Ok(UnhandledRequest::Warn),
            "error" => Ok(UnhandledRequest::Error),
            other => Err(format!("unknown unhandled-request strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockServerConfig {
    #[serde(default)]
    pub on_unhandled_request: UnhandledRequest,
}
