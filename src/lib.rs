//! # Public APIs Client Library
//!
//! Resilient client for a paginated, token-authenticated REST API.
//! Fetches the category list and, for each category, its paginated
//! entries, and exposes everything as one ordered stream.
//!
//! Modules:
//! - `config`: client configuration, YAML loading and validation
//! - `auth`: bearer token state and throttled refresh
//! - `sources`: HTTP transport and the authenticated, retrying fetcher
//! - `resilience`: exponential backoff
//! - `paging`: page-by-page streams and payload converters
//! - `api`: categories/entries orchestration
//! - `result`: result/optional helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod observability;
pub mod paging;
pub mod resilience;
pub mod result;
pub mod sources;
pub mod tests;
pub mod utils;

pub use crate::api::{ApiClient, ApiStream};
pub use crate::config::settings::{ClientConfig, Endpoint};
pub use crate::error::{ApiError, ApiResult};
pub use crate::paging::CategoryEntry;
