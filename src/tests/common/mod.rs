// tests/common/mod.rs
pub use axum::http::StatusCode;
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use httpmock::MockServer;
use tokio_stream::StreamExt;

use crate::config::settings::ClientConfig;
use crate::error::ApiResult;
use crate::paging::PageStream;
use crate::sources::fetch::AuthenticatedFetcher;

pub const AUTH_PATH: &str = "/api/v1/auth/token";
pub const CATEGORIES_PATH: &str = "/api/v1/apis/categories";
pub const ENTRY_PATH: &str = "/api/v1/apis/entry";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// GET route answering `respond(n)` for the n-th call (0-based); returns the call counter
pub fn counting_route<F>(path: &str, respond: F) -> (Router, Arc<AtomicUsize>)
where
    F: Fn(usize) -> (StatusCode, String) + Clone + Send + Sync + 'static,
{
    let counter = Arc::new(AtomicUsize::new(0));
    let calls = counter.clone();
    let router = Router::new().route(
        path,
        get(move || {
            let calls = calls.clone();
            let respond = respond.clone();
            async move { respond(calls.fetch_add(1, Ordering::SeqCst)) }
        }),
    );
    (router, counter)
}

pub fn hits(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

pub fn mock_host(server: &MockServer) -> String {
    format!("{}:{}", server.host(), server.port())
}

/// Plain-http config with millisecond backoff
pub fn test_config(host: impl Into<String>) -> ClientConfig {
    ClientConfig::new("http", host)
        .with_backoff_unit(Duration::from_millis(10))
        .with_max_attempts(5)
}

pub fn build_fetcher(config: &ClientConfig) -> Arc<AuthenticatedFetcher> {
    Arc::new(AuthenticatedFetcher::from_config(config).expect("fetcher"))
}

/// Read a stream to its end
pub async fn drain<T>(mut stream: PageStream<T>) -> Vec<ApiResult<T>> {
    let mut items = Vec::new();
    while let Some(item) = stream.next().await {
        items.push(item);
    }
    items
}
