use crate::error::{ApiError, ApiResult};
use crate::result::{map_ok, ResultExt};

/// A value that may be absent. Absence is carried as [`ApiError::Empty`],
/// never as an operational error.
#[derive(Debug)]
pub struct Optional<T>(ApiResult<T>);

impl<T> Optional<T> {
    pub fn some(value: T) -> Self {
        Self(Ok(value))
    }

    pub fn none() -> Self {
        Self(Err(ApiError::Empty))
    }

    pub fn is_some(&self) -> bool {
        self.0.is_ok()
    }

    pub fn split(self) -> (Option<T>, Option<ApiError>) {
        self.0.split()
    }

    pub fn map<U, F>(self, f: F) -> Optional<U>
    where
        F: FnOnce(T) -> U,
    {
        Optional(map_ok(f, self.0))
    }

    pub fn branch<F, G>(self, on_some: F, on_none: G)
    where
        F: FnOnce(T),
        G: FnOnce(ApiError),
    {
        self.0.branch(on_some, on_none)
    }

    pub fn into_option(self) -> Option<T> {
        self.0.ok()
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Optional::some(v),
            None => Optional::none(),
        }
    }
}
