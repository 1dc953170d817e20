//! Resolvers: the caller's function answering a matched request.
//!
//! # Design
//! A resolver is an `Arc`'d async function from `MockRequest` to
//! `Option<Reply>`. Synchronous closures are lifted into a ready future so
//! the mock server only ever awaits one shape.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::http::{MockRequest, Reply};

type ResolveFn = dyn Fn(MockRequest) -> BoxFuture<'static, Option<Reply>> + Send + Sync;

/// Caller-supplied function computing the mock reply for a matched request.
///
/// Cloning is cheap: every handler built from one registration shares the
/// same underlying function. The function runs only when the mock server
/// matches a request, never at registration time.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<ResolveFn>,
}

impl Resolver {
    /// Wrap an async function.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<Reply>> + Send + 'static,
    {
        let inner: Arc<ResolveFn> =
            Arc::new(move |request: MockRequest| -> BoxFuture<'static, Option<Reply>> { f(request).boxed() });
        Self { inner }
    }

    /// Wrap a synchronous function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&MockRequest) -> Option<Reply> + Send + Sync + 'static,
    {
        let inner: Arc<ResolveFn> =
            Arc::new(move |request: MockRequest| -> BoxFuture<'static, Option<Reply>> {
                futures::future::ready(f(&request)).boxed()
            });
        Self { inner }
    }

    pub fn call(&self, request: MockRequest) -> BoxFuture<'static, Option<Reply>> {
        (self.inner)(request)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockResponse;

    #[tokio::test]
    async fn async_resolver_sees_request() {
        let resolver = Resolver::new(|request: MockRequest| async move {
            tokio::task::yield_now().await;
            Some(Reply::json(serde_json::json!({ "method": request.method })))
        });

        let reply = resolver.call(MockRequest::new("PUT", "/x")).await;
        let Some(Reply::Response(response)) = reply else {
            panic!("expected a response");
        };
        assert_eq!(response.text_body(), r#"{"method":"PUT"}"#);
    }

    #[tokio::test]
    async fn sync_resolver_runs_once_per_call() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let resolver = Resolver::from_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(MockResponse::empty(204).into())
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let cloned = resolver.clone();
        cloned.call(MockRequest::new("GET", "/")).await;
        resolver.call(MockRequest::new("GET", "/")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
