//! Value-or-error containers shared by every layer.
//!
//! `ApiResult<T>` is the plain result type; the helpers here give it the small
//! vocabulary the producers use (`ok`, `err`, `map_ok`, `split`, `branch`).
//! `Optional<T>` is the same container whose error slot can only ever hold
//! [`ApiError::Empty`].

pub mod optional;

pub use optional::Optional;

use crate::error::{ApiError, ApiResult};

pub fn ok<T>(value: T) -> ApiResult<T> {
    Ok(value)
}

pub fn err<T>(error: ApiError) -> ApiResult<T> {
    Err(error)
}

/// Apply `f` to a success value, passing an existing error through untouched.
pub fn map_ok<T, U, F>(f: F, result: ApiResult<T>) -> ApiResult<U>
where
    F: FnOnce(T) -> U,
{
    match result {
        Ok(value) => Ok(f(value)),
        Err(e) => Err(e),
    }
}

pub trait ResultExt<T> {
    /// Break the result into a `(value, error)` pair; exactly one side is `Some`.
    fn split(self) -> (Option<T>, Option<ApiError>);

    /// Invoke exactly one of the callbacks.
    fn branch<F, G>(self, on_ok: F, on_err: G)
    where
        F: FnOnce(T),
        G: FnOnce(ApiError);
}

impl<T> ResultExt<T> for ApiResult<T> {
    fn split(self) -> (Option<T>, Option<ApiError>) {
        match self {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e)),
        }
    }

    fn branch<F, G>(self, on_ok: F, on_err: G)
    where
        F: FnOnce(T),
        G: FnOnce(ApiError),
    {
        match self {
            Ok(value) => on_ok(value),
            Err(e) => on_err(e),
        }
    }
}
