use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ApiResult;

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_MIN_TOKEN_REFRESH_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_BACKOFF_UNIT_MS: u64 = 1_000;
pub const DEFAULT_MAX_REAUTHENTICATIONS: u32 = 3;

pub const DEFAULT_AUTH_PATH: &str = "/api/v1/auth/token";
pub const DEFAULT_CATEGORIES_PATH: &str = "/api/v1/apis/categories";
pub const DEFAULT_ENTRY_PATH: &str = "/api/v1/apis/entry";

/// ================================
/// Client configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    pub host: String,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    /// 429 responses tolerated per fetch before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// a token younger than this is never refreshed again
    #[serde(default = "default_min_token_refresh_interval_ms")]
    pub min_token_refresh_interval_ms: u64,
    /// first backoff delay, doubled on every 429
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,
    /// reauthentication cycles allowed per fetch
    #[serde(default = "default_max_reauthentications")]
    pub max_reauthentications: u32,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Relative resource path, e.g. `/api/v1/auth/token`
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Endpoint {
    pub path: String,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EndpointsConfig {
    #[serde(default = "default_auth_endpoint")]
    pub auth: Endpoint,
    #[serde(default = "default_categories_endpoint")]
    pub categories: Endpoint,
    #[serde(default = "default_entry_endpoint")]
    pub entry: Endpoint,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            auth: default_auth_endpoint(),
            categories: default_categories_endpoint(),
            entry: default_entry_endpoint(),
        }
    }
}

impl ClientConfig {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            endpoints: EndpointsConfig::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_token_refresh_interval_ms: DEFAULT_MIN_TOKEN_REFRESH_INTERVAL_MS,
            backoff_unit_ms: DEFAULT_BACKOFF_UNIT_MS,
            max_reauthentications: DEFAULT_MAX_REAUTHENTICATIONS,
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_auth_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.auth = endpoint;
        self
    }

    pub fn with_categories_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.categories = endpoint;
        self
    }

    pub fn with_entry_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.entry = endpoint;
        self
    }

    /// Millisecond granularity; a non-zero sub-millisecond interval becomes 1ms
    pub fn with_min_token_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_token_refresh_interval_ms = whole_millis(interval);
        self
    }

    /// Millisecond granularity, rounded up like the refresh interval
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit_ms = whole_millis(unit);
        self
    }

    pub fn with_max_reauthentications(mut self, max_reauthentications: u32) -> Self {
        self.max_reauthentications = max_reauthentications;
        self
    }

    pub fn min_token_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.min_token_refresh_interval_ms)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    /// `{scheme}://{host}{endpoint}` without a query
    pub fn endpoint_url(&self, endpoint: &Endpoint) -> ApiResult<Url> {
        let mut url = Url::parse(&format!("{}://{}", self.scheme, self.host))?;
        url.set_path(&endpoint.path);
        Ok(url)
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_owned()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_min_token_refresh_interval_ms() -> u64 {
    DEFAULT_MIN_TOKEN_REFRESH_INTERVAL_MS
}

fn default_backoff_unit_ms() -> u64 {
    DEFAULT_BACKOFF_UNIT_MS
}

fn default_max_reauthentications() -> u32 {
    DEFAULT_MAX_REAUTHENTICATIONS
}

fn default_auth_endpoint() -> Endpoint {
    Endpoint::new(DEFAULT_AUTH_PATH)
}

fn default_categories_endpoint() -> Endpoint {
    Endpoint::new(DEFAULT_CATEGORIES_PATH)
}

fn default_entry_endpoint() -> Endpoint {
    Endpoint::new(DEFAULT_ENTRY_PATH)
}

fn default_log_level() -> String {
    "info".to_owned()
}

/// Milliseconds in `d`, rounded up and saturating at `u64::MAX`
fn whole_millis(d: Duration) -> u64 {
    let millis = d.as_nanos().div_ceil(1_000_000);
    u64::try_from(millis).unwrap_or(u64::MAX)
}
