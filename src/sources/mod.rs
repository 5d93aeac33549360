pub mod fetch;
pub mod http;

pub use fetch::AuthenticatedFetcher;
pub use http::HttpTransport;
