pub mod client;
pub mod orchestrator;

pub use client::ApiClient;
pub use orchestrator::ApiStream;
