use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use crate::error::ApiResult;
use crate::observability::metrics::get_metrics;

/// Single GET round trip, no retry logic
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> ApiResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Send a GET, attaching `Authorization: Bearer <token>` when a token is given.
    /// Connection failures come back as `ApiError::Transport`.
    pub async fn get(&self, url: &Url, bearer: Option<&str>) -> ApiResult<Response> {
        let metrics = get_metrics().await;
        metrics.fetch_requests.with_label_values(&[url.path()]).inc();
        debug!("Get Request: {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        metrics
            .fetch_responses
            .with_label_values(&[response.status().as_str()])
            .inc();
        Ok(response)
    }
}
