use reqwest::StatusCode;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info};
use url::Url;

use crate::auth::token::{decode_token, TokenState};
use crate::error::{ApiError, ApiResult};
use crate::observability::metrics::get_metrics;
use crate::resilience::retry::RetrySettings;
use crate::result::Optional;
use crate::sources::http::HttpTransport;

/// Owns the bearer token shared by every fetch of one client.
///
/// Reads and the refresh decision both happen under one mutex, so callers
/// racing on a rejected token produce a single physical refresh per
/// staleness window.
#[derive(Debug)]
pub struct TokenManager {
    auth_url: Url,
    min_refresh_interval: Duration,
    retry: RetrySettings,
    transport: HttpTransport,
    state: Mutex<TokenState>,
}

impl TokenManager {
    pub fn new(
        auth_url: Url,
        min_refresh_interval: Duration,
        retry: RetrySettings,
        transport: HttpTransport,
    ) -> Self {
        Self {
            auth_url,
            min_refresh_interval,
            retry,
            transport,
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Current token, empty until the first successful refresh
    pub async fn token(&self) -> Optional<String> {
        self.state.lock().await.token.clone().into()
    }

    pub async fn last_refresh(&self) -> Option<Instant> {
        self.state.lock().await.refreshed_at
    }

    /// Refresh the token unless it was refreshed less than the minimum
    /// interval ago. On failure the state stays stale.
    pub async fn ensure_token(&self) -> ApiResult<()> {
        let mut state = self.state.lock().await;
        if state.is_fresh(self.min_refresh_interval) {
            debug!("Token already refreshed, skipping re-auth");
            return Ok(());
        }

        let metrics = get_metrics().await;
        match self.fetch_token().await {
            Ok(token) => {
                state.refresh(token);
                metrics.token_refreshes.inc();
                info!("auth token refreshed from {}", self.auth_url);
                Ok(())
            }
            Err(e) => {
                metrics.token_refresh_failures.inc();
                error!("auth token refresh failed: {}", e);
                Err(e)
            }
        }
    }

    // Goes straight to the transport: the auth request itself never
    // triggers another reauthentication.
    async fn fetch_token(&self) -> ApiResult<String> {
        let mut backoff = self.retry.backoff();
        while !backoff.exhausted() {
            let response = self.transport.get(&self.auth_url, None).await?;
            match response.status() {
                StatusCode::TOO_MANY_REQUESTS => {
                    get_metrics().await.rate_limited.inc();
                    backoff.wait().await;
                }
                StatusCode::OK => {
                    let body = response.bytes().await?;
                    return decode_token(&body);
                }
                status => return Err(ApiError::AuthRejected(status)),
            }
        }
        Err(backoff.exceeded())
    }
}
