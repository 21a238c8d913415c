//! HTTP client builder for provider requests.

use std::time::Duration;

use crate::error::Error;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout. Unset by default; request-level timeouts belong to the caller.
    pub timeout: Option<Duration>,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: format!("solid-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for the client strategies use to reach provider endpoints.
///
/// Provider failures are terminal for an authentication attempt, so no retry
/// middleware is installed.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder().user_agent(self.config.user_agent);
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
