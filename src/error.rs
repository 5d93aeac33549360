use reqwest::StatusCode;

/// Errors surfaced by the fetch, paging and orchestration layers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection, DNS, TLS or body read failure. Not retried.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Scheme/host/endpoint combination is not a valid URL
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Payload is not valid JSON or has an unexpected shape
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Auth endpoint answered with something other than 200 or 429
    #[error("authentication failed with status {0}")]
    AuthRejected(StatusCode),

    /// Endpoint kept rejecting the request after reauthenticating
    #[error("request rejected with status {status} after {reauthentications} reauthentications")]
    Rejected {
        status: StatusCode,
        reauthentications: u32,
    },

    #[error("Max attempts: {0} reached!")]
    MaxAttemptsExceeded(u32),

    /// End of a paginated sequence, not a failure
    #[error("no more data")]
    NoMoreData,

    /// Error slot of an empty `Optional`
    #[error("optional value is empty")]
    Empty,
}

impl ApiError {
    pub fn is_no_more_data(&self) -> bool {
        matches!(self, ApiError::NoMoreData)
    }

    /// Out-of-band markers that must never be reported as failures
    pub fn is_sentinel(&self) -> bool {
        matches!(self, ApiError::NoMoreData | ApiError::Empty)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
