use mock_fetch::{HttpMethod, MockRequest, Reply, Resolver};
use serde::Serialize;
use uuid::Uuid;

/// A registered `(method, url, resolver)` unit.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    id: Uuid,
    method: HttpMethod,
    url: String,
    resolver: Resolver,
}

/// Serializable summary of a registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerInfo {
    pub id: Uuid,
    pub method: HttpMethod,
    pub url: String,
}

impl RequestHandler {
    pub fn new(method: HttpMethod, url: &str, resolver: Resolver) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            url: url.to_string(),
            resolver,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn info(&self) -> HandlerInfo {
        HandlerInfo {
            id: self.id,
            method: self.method,
            url: self.url.clone(),
        }
    }

    /// True if this handler should see a request with `method` and `url`.
    pub fn matches(&self, method: &str, url: &str) -> bool {
        self.method.matches(method) && path_of(&self.url) == path_of(url)
    }

    pub async fn run(&self, request: MockRequest) -> Option<Reply> {
        self.resolver.call(request).await
    }
}

/// The path of `url`, without scheme, authority, query or fragment.
fn path_of(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(scheme_end) => {
            let after = &url[scheme_end + 3..];
            after.find('/').map_or("/", |slash| &after[slash..])
        }
        None => url,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    match &rest[..end] {
        "" => "/",
        path => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(method: HttpMethod, url: &str) -> RequestHandler {
        RequestHandler::new(method, url, Resolver::from_fn(|_| None))
    }

    #[test]
    fn path_strips_origin_and_query() {
        assert_eq!(path_of("http://localhost/api/a"), "/api/a");
        assert_eq!(path_of("http://localhost:8080/api/a?x=1"), "/api/a");
        assert_eq!(path_of("https://example.com"), "/");
        assert_eq!(path_of("/api/a#frag"), "/api/a");
        assert_eq!(path_of(""), "/");
    }

    #[test]
    fn matches_method_and_path() {
        let h = handler(HttpMethod::Get, "http://localhost/api/users");
        assert!(h.matches("GET", "/api/users"));
        assert!(h.matches("get", "http://127.0.0.1:3000/api/users?page=2"));
        assert!(!h.matches("POST", "/api/users"));
        assert!(!h.matches("GET", "/api/users/"));
        assert!(!h.matches("GET", "/api/users/1"));
    }

    #[test]
    fn handlers_get_distinct_ids() {
        let a = handler(HttpMethod::Get, "/a");
        let b = handler(HttpMethod::Get, "/a");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.info().url, "/a");
    }

    #[test]
    fn info_serializes_method_upper_case() {
        let info = handler(HttpMethod::Delete, "/x").info();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["method"], "DELETE");
        assert_eq!(json["url"], "/x");
    }
}
