//! Authenticated fetch
//!
//! One logical GET: bearer token attached, 429 answered with exponential
//! backoff, any other non-200 answered with a reauthentication.

use std::sync::Arc;

use reqwest::StatusCode;
use tokio::time::Instant;
use tracing::{debug, error, warn};
use url::Url;

use crate::auth::TokenManager;
use crate::config::settings::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::observability::metrics::get_metrics;
use crate::resilience::retry::RetrySettings;
use crate::sources::http::HttpTransport;

#[derive(Debug, Clone)]
pub struct AuthenticatedFetcher {
    transport: HttpTransport,
    tokens: Arc<TokenManager>,
    retry: RetrySettings,
    max_reauthentications: u32,
}

impl AuthenticatedFetcher {
    pub fn new(
        transport: HttpTransport,
        tokens: Arc<TokenManager>,
        retry: RetrySettings,
        max_reauthentications: u32,
    ) -> Self {
        Self {
            transport,
            tokens,
            retry,
            max_reauthentications,
        }
    }

    /// Build the transport, token manager and fetcher described by `config`.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let transport = HttpTransport::new()?;
        let retry = RetrySettings::new(config.max_attempts, config.backoff_unit());
        let tokens = TokenManager::new(
            config.endpoint_url(&config.endpoints.auth)?,
            config.min_token_refresh_interval(),
            retry,
            transport.clone(),
        );
        Ok(Self::new(
            transport,
            Arc::new(tokens),
            retry,
            config.max_reauthentications,
        ))
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub async fn fetch(&self, url: &Url) -> ApiResult<Vec<u8>> {
        let start = Instant::now();
        let result = self.fetch_with_retry(url).await;
        get_metrics()
            .await
            .fetch_duration
            .observe(start.elapsed().as_secs_f64());
        result
    }

    async fn fetch_with_retry(&self, url: &Url) -> ApiResult<Vec<u8>> {
        let metrics = get_metrics().await;
        let mut backoff = self.retry.backoff();
        let mut reauthentications = 0u32;

        while !backoff.exhausted() {
            let token = self.tokens.token().await.into_option();
            let response = self.transport.get(url, token.as_deref()).await?;

            match response.status() {
                StatusCode::TOO_MANY_REQUESTS => {
                    metrics.rate_limited.inc();
                    drop(response);
                    backoff.wait().await;
                }
                StatusCode::OK => {
                    debug!("Status OK, returning response");
                    let body = response.bytes().await?;
                    return Ok(body.to_vec());
                }
                status => {
                    drop(response);
                    if reauthentications >= self.max_reauthentications {
                        error!(
                            "{} still answers {} after {} reauthentications",
                            url, status, reauthentications
                        );
                        return Err(ApiError::Rejected {
                            status,
                            reauthentications,
                        });
                    }
                    reauthentications += 1;
                    metrics.reauthentications.inc();
                    warn!(
                        "{} answered {}: unauthorized or token expired, reauthenticating",
                        url, status
                    );
                    self.tokens.ensure_token().await?;
                }
            }
        }

        error!(
            "{} rate limited {} times, slept {:?} in total",
            url,
            backoff.attempts(),
            backoff.total_delay()
        );
        Err(backoff.exceeded())
    }
}
