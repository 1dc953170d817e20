//! Handler construction and the HEAD normalization policy.
//!
//! # Design
//! Every method except HEAD is forwarded to the matching collaborator
//! primitive with the caller's resolver untouched. HEAD handlers get a
//! wrapped resolver instead: the caller's resolver is often shared with a
//! GET handler and builds a body, and a HEAD response must never carry one.
//! The wrapper keeps status, status text and headers and drops the body.
//! It holds the server weakly: the server owns its handlers, so a strong
//! reference from a handler back to the server would never be freed.

use std::sync::{Arc, Weak};

use tracing::{trace, warn};

use crate::http::{HttpMethod, MockRequest, Reply};
use crate::resolver::Resolver;
use crate::server::MockServerApi;

type Primitive<S> = fn(&S, &str, Resolver) -> <S as MockServerApi>::Handler;

/// The collaborator primitive registering `method`.
fn primitive<S: MockServerApi>(method: HttpMethod) -> Primitive<S> {
    match method {
        HttpMethod::Get => S::get,
        HttpMethod::Post => S::post,
        HttpMethod::Put => S::put,
        HttpMethod::Delete => S::delete,
        HttpMethod::Patch => S::patch,
        HttpMethod::Head => S::head,
        HttpMethod::Options => S::options,
    }
}

/// Build one handler per method, in the order given.
pub fn build_handlers<S>(
    server: &Arc<S>,
    methods: &[HttpMethod],
    url: &str,
    resolver: &Resolver,
) -> Vec<S::Handler>
where
    S: MockServerApi + Send + Sync + 'static,
{
    methods
        .iter()
        .map(|&method| {
            let resolver = match method {
                HttpMethod::Head => head_resolver(Arc::downgrade(server), resolver.clone()),
                _ => resolver.clone(),
            };
            primitive::<S>(method)(&**server, url, resolver)
        })
        .collect()
}

/// Wrap `resolver` so whatever it yields becomes a bodiless HEAD reply.
///
/// Once the server is dropped the wrapper yields nothing.
pub fn head_resolver<S>(server: Weak<S>, resolver: Resolver) -> Resolver
where
    S: MockServerApi + Send + Sync + 'static,
{
    Resolver::new(move |request: MockRequest| {
        let server = Weak::clone(&server);
        let reply = resolver.call(request);
        async move {
            let reply = reply.await;
            let Some(server) = server.upgrade() else {
                return None;
            };
            Some(normalize_head(&*server, reply))
        }
    })
}

/// Project a resolver result onto a HEAD reply.
///
/// Absent results and unrecognized values become an empty 200. Network
/// errors pass through as the server's canonical error. Responses keep
/// their status, status text and headers verbatim.
pub fn normalize_head<S>(server: &S, reply: Option<Reply>) -> Reply
where
    S: MockServerApi + ?Sized,
{
    match reply {
        None => Reply::Response(server.empty_response(200, None, None)),
        Some(reply) if reply.is_network_error() => server.network_error(),
        Some(Reply::Response(response)) => {
            trace!(status = response.status, "stripping body from HEAD response");
            Reply::Response(server.empty_response(
                response.status,
                Some(&response.status_text),
                Some(&response.headers),
            ))
        }
        Some(other) => {
            warn!(reply = ?other, "HEAD resolver returned a non-response value, answering 200");
            Reply::Response(server.empty_response(200, None, None))
        }
    }
}
