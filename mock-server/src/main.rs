use std::sync::Arc;

use mock_fetch::{create_mock_fetch, CreateMockFetchOptions, HttpMethod, Reply, Resolver};
use mock_server::{local_addr, MockServer, MockServerConfig, UnhandledRequest};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port: u16 = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse()?;
    let on_unhandled_request = match std::env::var("ON_UNHANDLED_REQUEST") {
        Ok(value) => value.parse::<UnhandledRequest>()?,
        Err(_) => UnhandledRequest::default(),
    };

    let server = Arc::new(MockServer::new(MockServerConfig { on_unhandled_request }));
    let mock_fetch = create_mock_fetch(CreateMockFetchOptions {
        mock_server: Some(Arc::clone(&server)),
    })?;
    mock_fetch.single(
        [HttpMethod::Get, HttpMethod::Head],
        "/health",
        Resolver::from_fn(|_| Some(Reply::json(serde_json::json!({ "status": "ok" })))),
    )?;

    let listener = TcpListener::bind(local_addr(port)).await?;
    server.listen(listener).await?;
    Ok(())
}
