//! HTTP adapter for `solid-auth`: an axum router translating entry point requests
//! into [`Authenticator`] calls, and a client for calling that entry point.

use std::sync::Arc;

use log::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use service::config::Config;
use solid_auth::{AuthenticateOptions, Authenticator};
use url::Url;

pub mod client;
mod controller;
pub mod error;
pub mod response;
pub mod router;
pub mod utils;

pub use client::{AuthClient, ClientResponse};
pub use error::{Error, Result, WebErrorKind};
pub use router::create_auth_handler;
pub use utils::e_to_string;

/// State shared by the authentication handlers.
pub struct AppState<User> {
    pub authenticator: Arc<Authenticator<User>>,
    /// Origin the server is reached at; request URLs and redirects resolve against it.
    pub site_url: Url,
    /// Options applied to every provider callback.
    pub callback_options: AuthenticateOptions,
}

// Derived Clone would require User: Clone
impl<User> Clone for AppState<User> {
    fn clone(&self) -> Self {
        Self {
            authenticator: Arc::clone(&self.authenticator),
            site_url: self.site_url.clone(),
            callback_options: self.callback_options.clone(),
        }
    }
}

impl<User> AppState<User> {
    /// Callbacks redirect to `/` on success unless configured otherwise.
    pub fn new(authenticator: Arc<Authenticator<User>>, site_url: Url) -> Self {
        Self {
            authenticator,
            site_url,
            callback_options: AuthenticateOptions::default().success_redirect("/"),
        }
    }

    pub fn with_callback_options(mut self, callback_options: AuthenticateOptions) -> Self {
        self.callback_options = callback_options;
        self
    }
}

/// Callback options as configured for this deployment.
pub fn callback_options(config: &Config) -> AuthenticateOptions {
    let options = AuthenticateOptions::default()
        .success_redirect(config.callback_success_redirect.clone());
    match &config.callback_failure_redirect {
        Some(to) => options.failure_redirect(to.clone()),
        None => options,
    }
}

pub async fn init_server<User>(
    config: &Config,
    authenticator: Arc<Authenticator<User>>,
) -> std::io::Result<()>
where
    User: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let site_url = Url::parse(config.site_url())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let app_state =
        AppState::new(authenticator, site_url).with_callback_options(callback_options(config));

    let app = router::define_routes(app_state, &config.auth_path())
        .layer(router::cors_layer(&config.allowed_origins));

    let host = config.interface.as_deref().unwrap_or("127.0.0.1");
    let listener = tokio::net::TcpListener::bind((host, config.port)).await?;

    info!(
        "Server starting... listening for connections on http://{}:{} (auth at {})",
        host,
        config.port,
        config.auth_path()
    );

    axum::serve(listener, app).await
}
