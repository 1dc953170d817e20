//! The `mockFetch` registration entry point.
//!
//! # Design
//! The two call forms are explicit variants of `Call` rather than shapes
//! sniffed at runtime: `Single` registers one URL for one or more methods,
//! `Batch` registers a list of endpoints. Every call is validated in full
//! before any handler is built, then submitted to the mock server in one
//! `use_handlers` call, so a rejected call registers nothing.

use std::sync::Arc;

use tracing::debug;

use crate::error::MockFetchError;
use crate::handlers::build_handlers;
use crate::http::HttpMethod;
use crate::resolver::Resolver;
use crate::server::MockServerApi;

/// One method or a list of methods for the same endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSpec {
    One(HttpMethod),
    Many(Vec<HttpMethod>),
}

impl MethodSpec {
    /// Normalize into a non-empty list, preserving order.
    pub fn into_methods(self) -> Result<Vec<HttpMethod>, MockFetchError> {
        match self {
            MethodSpec::One(method) => Ok(vec![method]),
            MethodSpec::Many(methods) if methods.is_empty() => Err(MockFetchError::InvalidArguments),
            MethodSpec::Many(methods) => Ok(methods),
        }
    }
}

impl From<HttpMethod> for MethodSpec {
    fn from(method: HttpMethod) -> Self {
        MethodSpec::One(method)
    }
}

impl From<Vec<HttpMethod>> for MethodSpec {
    fn from(methods: Vec<HttpMethod>) -> Self {
        MethodSpec::Many(methods)
    }
}

impl From<&[HttpMethod]> for MethodSpec {
    fn from(methods: &[HttpMethod]) -> Self {
        MethodSpec::Many(methods.to_vec())
    }
}

impl<const N: usize> From<[HttpMethod; N]> for MethodSpec {
    fn from(methods: [HttpMethod; N]) -> Self {
        MethodSpec::Many(methods.to_vec())
    }
}

/// A `(methods, url, resolver)` registration.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub methods: MethodSpec,
    pub url: String,
    pub resolver: Resolver,
}

impl Endpoint {
    pub fn new(methods: impl Into<MethodSpec>, url: impl Into<String>, resolver: Resolver) -> Self {
        Self {
            methods: methods.into(),
            url: url.into(),
            resolver,
        }
    }
}

impl<M, U> From<(M, U, Resolver)> for Endpoint
where
    M: Into<MethodSpec>,
    U: Into<String>,
{
    fn from((methods, url, resolver): (M, U, Resolver)) -> Self {
        Endpoint::new(methods, url, resolver)
    }
}

/// The argument of a `MockFetch::call`.
#[derive(Debug, Clone)]
pub enum Call {
    /// One URL, one or more methods. `url` and `resolver` are both required.
    Single {
        methods: MethodSpec,
        url: Option<String>,
        resolver: Option<Resolver>,
    },

    /// Several endpoints registered together. Must not be empty.
    Batch(Vec<Endpoint>),
}

impl Call {
    pub fn single(methods: impl Into<MethodSpec>, url: impl Into<String>, resolver: Resolver) -> Self {
        Call::Single {
            methods: methods.into(),
            url: Some(url.into()),
            resolver: Some(resolver),
        }
    }

    /// A single-endpoint call naming only its methods. Rejected when called.
    pub fn methods(methods: impl Into<MethodSpec>) -> Self {
        Call::Single {
            methods: methods.into(),
            url: None,
            resolver: None,
        }
    }

    pub fn batch<I, E>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Endpoint>,
    {
        Call::Batch(endpoints.into_iter().map(Into::into).collect())
    }

    /// Check the call and expand it into `(methods, url, resolver)` groups.
    fn into_groups(self) -> Result<Vec<(Vec<HttpMethod>, String, Resolver)>, MockFetchError> {
        match self {
            Call::Batch(endpoints) if endpoints.is_empty() => Err(MockFetchError::InvalidArguments),
            Call::Batch(endpoints) => endpoints
                .into_iter()
                .map(|endpoint| -> Result<_, MockFetchError> {
                    Ok((endpoint.methods.into_methods()?, endpoint.url, endpoint.resolver))
                })
                .collect(),
            Call::Single {
                methods,
                url: Some(url),
                resolver: Some(resolver),
            } if !url.is_empty() => Ok(vec![(methods.into_methods()?, url, resolver)]),
            Call::Single { .. } => Err(MockFetchError::InvalidArguments),
        }
    }
}

impl From<Endpoint> for Call {
    fn from(endpoint: Endpoint) -> Self {
        Call::Single {
            methods: endpoint.methods,
            url: Some(endpoint.url),
            resolver: Some(endpoint.resolver),
        }
    }
}

impl From<Vec<Endpoint>> for Call {
    fn from(endpoints: Vec<Endpoint>) -> Self {
        Call::Batch(endpoints)
    }
}

/// Options for `create_mock_fetch`.
#[derive(Debug)]
pub struct CreateMockFetchOptions<S> {
    pub mock_server: Option<Arc<S>>,
}

/// Build a `MockFetch` bound to the given mock server.
pub fn create_mock_fetch<S>(options: CreateMockFetchOptions<S>) -> Result<MockFetch<S>, MockFetchError>
where
    S: MockServerApi + Send + Sync + 'static,
{
    let server = options.mock_server.ok_or(MockFetchError::MissingServer)?;
    Ok(MockFetch::new(server))
}

/// Registers endpoint handlers on a mock server with a terse call syntax.
#[derive(Debug)]
pub struct MockFetch<S> {
    server: Arc<S>,
}

impl<S> Clone for MockFetch<S> {
    fn clone(&self) -> Self {
        Self {
            server: Arc::clone(&self.server),
        }
    }
}

impl<S> MockFetch<S>
where
    S: MockServerApi + Send + Sync + 'static,
{
    pub fn new(server: Arc<S>) -> Self {
        Self { server }
    }

    pub fn server(&self) -> &Arc<S> {
        &self.server
    }

    /// Register every handler implied by `call` in one batch.
    pub fn call(&self, call: impl Into<Call>) -> Result<(), MockFetchError> {
        let groups = call.into().into_groups()?;

        let handlers: Vec<S::Handler> = groups
            .iter()
            .flat_map(|(methods, url, resolver)| build_handlers(&self.server, methods, url, resolver))
            .collect();

        debug!(endpoints = groups.len(), handlers = handlers.len(), "registering mock handlers");
        self.server.use_handlers(handlers);
        Ok(())
    }

    /// Register `resolver` at `url` for one or more methods.
    pub fn single(
        &self,
        methods: impl Into<MethodSpec>,
        url: impl Into<String>,
        resolver: Resolver,
    ) -> Result<(), MockFetchError> {
        self.call(Call::single(methods, url, resolver))
    }

    /// Register several endpoints together.
    pub fn batch<I, E>(&self, endpoints: I) -> Result<(), MockFetchError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Endpoint>,
    {
        self.call(Call::batch(endpoints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod::*;
    use crate::http::{MockRequest, Reply};
    use crate::testing::RecordingServer;
    use serde_json::json;

    fn setup() -> (Arc<RecordingServer>, MockFetch<RecordingServer>) {
        let server = Arc::new(RecordingServer::default());
        let mock_fetch = create_mock_fetch(CreateMockFetchOptions {
            mock_server: Some(Arc::clone(&server)),
        })
        .unwrap();
        (server, mock_fetch)
    }

    fn echo_method() -> Resolver {
        Resolver::from_fn(|request| Some(Reply::json(json!({ "method": request.method }))))
    }

    fn methods_and_urls(server: &RecordingServer) -> Vec<Vec<(HttpMethod, String)>> {
        server
            .batches()
            .into_iter()
            .map(|batch| batch.into_iter().map(|h| (h.method, h.url)).collect())
            .collect()
    }

    #[test]
    fn missing_server_is_rejected() {
        let err = create_mock_fetch::<RecordingServer>(CreateMockFetchOptions { mock_server: None }).unwrap_err();
        assert_eq!(err, MockFetchError::MissingServer);
        assert_eq!(err.to_string(), "mock server instance is required to create mockFetch");
    }

    #[test]
    fn single_method_registers_one_handler() {
        let (server, mock_fetch) = setup();
        mock_fetch.single(Get, "/api/a", echo_method()).unwrap();

        assert_eq!(methods_and_urls(&server), vec![vec![(Get, "/api/a".to_string())]]);
    }

    #[test]
    fn method_list_registers_one_handler_per_method() {
        let (server, mock_fetch) = setup();
        mock_fetch.single([Get, Post], "/api/b", echo_method()).unwrap();

        assert_eq!(
            methods_and_urls(&server),
            vec![vec![(Get, "/api/b".to_string()), (Post, "/api/b".to_string())]]
        );
    }

    #[test]
    fn batch_concatenates_in_tuple_then_method_order() {
        let (server, mock_fetch) = setup();
        mock_fetch
            .batch(vec![
                Endpoint::new(Get, "/batch/a", echo_method()),
                Endpoint::new([Get, Delete], "/batch/b", echo_method()),
                Endpoint::new(vec![Put], "/batch/c", echo_method()),
            ])
            .unwrap();

        assert_eq!(
            methods_and_urls(&server),
            vec![vec![
                (Get, "/batch/a".to_string()),
                (Get, "/batch/b".to_string()),
                (Delete, "/batch/b".to_string()),
                (Put, "/batch/c".to_string()),
            ]]
        );
    }

    #[test]
    fn batch_accepts_tuples() {
        let (server, mock_fetch) = setup();
        mock_fetch
            .batch([([Get, Head], "/batch/one", echo_method())])
            .unwrap();

        let batches = server.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn empty_batch_is_invalid() {
        let (server, mock_fetch) = setup();
        let err = mock_fetch.call(Vec::<Endpoint>::new()).unwrap_err();

        assert_eq!(err, MockFetchError::InvalidArguments);
        assert_eq!(err.to_string(), "invalid arguments for mockFetch");
        assert!(server.batches().is_empty());
    }

    #[test]
    fn methods_without_url_or_resolver_are_invalid() {
        let (server, mock_fetch) = setup();
        let err = mock_fetch.call(Call::methods(Get)).unwrap_err();

        assert_eq!(err.to_string(), "invalid arguments for mockFetch");
        assert!(server.batches().is_empty());
    }

    #[test]
    fn missing_resolver_is_invalid() {
        let (_, mock_fetch) = setup();
        let call = Call::Single {
            methods: Get.into(),
            url: Some("/api/a".to_string()),
            resolver: None,
        };
        assert_eq!(mock_fetch.call(call), Err(MockFetchError::InvalidArguments));
    }

    #[test]
    fn empty_url_is_invalid() {
        let (_, mock_fetch) = setup();
        assert_eq!(
            mock_fetch.single(Get, "", echo_method()),
            Err(MockFetchError::InvalidArguments)
        );
    }

    #[test]
    fn empty_method_list_is_invalid() {
        let (server, mock_fetch) = setup();
        assert_eq!(
            mock_fetch.single(Vec::<HttpMethod>::new(), "/api/a", echo_method()),
            Err(MockFetchError::InvalidArguments)
        );
        assert!(server.batches().is_empty());
    }

    #[test]
    fn one_bad_endpoint_rejects_the_whole_batch() {
        let (server, mock_fetch) = setup();
        let err = mock_fetch
            .batch(vec![
                Endpoint::new(Get, "/ok", echo_method()),
                Endpoint::new(Vec::<HttpMethod>::new(), "/bad", echo_method()),
            ])
            .unwrap_err();

        assert_eq!(err, MockFetchError::InvalidArguments);
        assert!(server.batches().is_empty());
    }

    #[test]
    fn resolvers_are_not_invoked_at_registration() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let (_, mock_fetch) = setup();
        let invoked = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&invoked);
        let resolver = Resolver::from_fn(move |_| {
            flag.store(true, Ordering::SeqCst);
            None
        });

        mock_fetch.single(HttpMethod::ALL, "/all", resolver).unwrap();
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn registered_handlers_answer_per_method() {
        let (server, mock_fetch) = setup();
        mock_fetch.single([Get, Post], "/api/b", echo_method()).unwrap();

        let batch = server.batches().remove(0);
        for handler in batch {
            let reply = handler
                .resolver
                .call(MockRequest::new(handler.method.as_str(), "/api/b"))
                .await;
            let Some(Reply::Response(response)) = reply else {
                panic!("expected a response");
            };
            assert_eq!(response.status, 200);
            let body: serde_json::Value = response.json_body().unwrap();
            assert_eq!(body, json!({ "method": handler.method.as_str() }));
        }
    }
}
