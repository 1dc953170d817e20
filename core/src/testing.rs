//! A recording mock server for unit tests.

use std::sync::Mutex;

use crate::http::HttpMethod;
use crate::resolver::Resolver;
use crate::server::MockServerApi;

#[derive(Debug, Clone)]
pub(crate) struct RecordedHandler {
    pub method: HttpMethod,
    pub url: String,
    pub resolver: Resolver,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingServer {
    pub batches: Mutex<Vec<Vec<RecordedHandler>>>,
}

impl RecordingServer {
    pub fn batches(&self) -> Vec<Vec<RecordedHandler>> {
        self.batches.lock().unwrap().clone()
    }

    fn build(method: HttpMethod, url: &str, resolver: Resolver) -> RecordedHandler {
        RecordedHandler {
            method,
            url: url.to_string(),
            resolver,
        }
    }
}

impl MockServerApi for RecordingServer {
    type Handler = RecordedHandler;

    fn get(&self, url: &str, resolver: Resolver) -> RecordedHandler {
        Self::build(HttpMethod::Get, url, resolver)
    }

    fn post(&self, url: &str, resolver: Resolver) -> RecordedHandler {
        Self::build(HttpMethod::Post, url, resolver)
    }

    fn put(&self, url: &str, resolver: Resolver) -> RecordedHandler {
        Self::build(HttpMethod::Put, url, resolver)
    }

    fn delete(&self, url: &str, resolver: Resolver) -> RecordedHandler {
        Self::build(HttpMethod::Delete, url, resolver)
    }

    fn patch(&self, url: &str, resolver: Resolver) -> RecordedHandler {
        Self::build(HttpMethod::Patch, url, resolver)
    }

    fn head(&self, url: &str, resolver: Resolver) -> RecordedHandler {
        Self::build(HttpMethod::Head, url, resolver)
    }

    fn options(&self, url: &str, resolver: Resolver) -> RecordedHandler {
        Self::build(HttpMethod::Options, url, resolver)
    }

    fn use_handlers(&self, handlers: Vec<RecordedHandler>) {
        self.batches.lock().unwrap().push(handlers);
    }
}
