//! HTTP types exchanged between resolvers and the mock server.
//!
//! # Design
//! Requests and responses are plain data with owned fields, the same shape
//! on both sides of the collaborator boundary. A resolver never sees a
//! socket: it receives a `MockRequest` and answers with a `Reply`, and the
//! mock server decides what that reply means on the wire.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ParseMethodError;

/// HTTP methods a handler can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// True if `method` names this verb, ignoring ASCII case.
    pub fn matches(&self, method: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(method)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.matches(s))
            .ok_or_else(|| ParseMethodError(s.to_string()))
    }
}

/// An inbound request as handed to a resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl MockRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Decode the request body as JSON. A missing body decodes like `""`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.body.as_deref().unwrap_or_default())
    }
}

/// A response produced by a resolver or by the mock server.
///
/// `body: None` means the response carries no body at all, which is what
/// every HEAD response ends up as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl MockResponse {
    /// A bodiless response with the canonical reason phrase for `status`.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            status_text: canonical_reason(status).to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A 200 response carrying `value` serialized as JSON.
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            body: Some(value.to_string()),
            ..Self::empty(200)
        }
        .with_header("content-type", "application/json")
    }

    /// A 200 response carrying a plain-text body.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::empty(200)
        }
        .with_header("content-type", "text/plain;charset=UTF-8")
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self.status_text = canonical_reason(status).to_string();
        self
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The body as text; empty when the response is bodiless.
    pub fn text_body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.text_body())
    }

    pub fn is_bodiless(&self) -> bool {
        self.body.is_none()
    }
}

/// What a resolver produced.
///
/// A resolver that produces nothing returns `None` instead of a `Reply`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A full response with status metadata, headers and an optional body.
    Response(MockResponse),

    /// The request should fail at the network level.
    NetworkError,

    /// Some other value that is not a response.
    Value(serde_json::Value),
}

impl Reply {
    pub fn json(value: serde_json::Value) -> Self {
        Reply::Response(MockResponse::json(value))
    }

    pub fn error() -> Self {
        Reply::NetworkError
    }

    /// True for a network error, or for a value carrying `"type": "error"`.
    pub fn is_network_error(&self) -> bool {
        match self {
            Reply::NetworkError => true,
            Reply::Value(value) => value.get("type").and_then(|t| t.as_str()) == Some("error"),
            Reply::Response(_) => false,
        }
    }
}

impl From<MockResponse> for Reply {
    fn from(response: MockResponse) -> Self {
        Reply::Response(response)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn canonical_reason(status: u16) -> &'static str {
    ::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}
