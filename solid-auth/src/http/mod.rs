//! HTTP client used for provider token and profile requests.

mod client;

pub use client::{HttpClientBuilder, HttpClientConfig};
