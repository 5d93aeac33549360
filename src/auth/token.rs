use serde::Deserialize;
use tokio::time::{Duration, Instant};

use crate::error::ApiResult;

/// Bearer token plus the moment it was last refreshed
#[derive(Debug, Clone, Default)]
pub struct TokenState {
    pub token: Option<String>,
    pub refreshed_at: Option<Instant>,
}

impl TokenState {
    /// Fresh while younger than the refresh interval; never refreshed is stale.
    pub fn is_fresh(&self, min_refresh_interval: Duration) -> bool {
        self.refreshed_at
            .map(|at| at.elapsed() < min_refresh_interval)
            .unwrap_or(false)
    }

    pub fn refresh(&mut self, token: String) {
        self.token = Some(token);
        self.refreshed_at = Some(Instant::now());
    }
}

/// Auth endpoint payload: `{"token": "..."}`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

pub fn decode_token(payload: &[u8]) -> ApiResult<String> {
    let response: TokenResponse = serde_json::from_slice(payload)?;
    Ok(response.token)
}
