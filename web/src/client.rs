//! Client for the authentication entry point.

use log::*;
use serde_json::{json, Value};
use solid_auth::{AuthenticateOptions, LogoutOptions};
use url::Url;

use crate::error::{Error, WebErrorKind};
use crate::utils::e_to_string;

/// What the entry point answered, once error shapes are ruled out.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientResponse {
    /// The caller should navigate to this URL.
    Redirect(String),
    Json(Value),
}

/// Calls a remote authentication entry point the way a front end would.
pub struct AuthClient {
    http_client: reqwest::Client,
    auth_url: Url,
}

impl AuthClient {
    pub fn new(auth_url: &str) -> Result<Self, Error> {
        let auth_url = Url::parse(auth_url)
            .map_err(|e| Error::Web(WebErrorKind::Input(format!("Invalid auth URL: {e}"))))?;
        Ok(Self {
            http_client: reqwest::Client::new(),
            auth_url,
        })
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub async fn login(
        &self,
        provider: &str,
        opts: &AuthenticateOptions,
    ) -> Result<ClientResponse, Error> {
        let opts = serde_json::to_value(opts).map_err(solid_auth::Error::from)?;
        self.send("login", Some(provider), opts).await
    }

    pub async fn logout(&self, opts: &LogoutOptions) -> Result<ClientResponse, Error> {
        let opts = serde_json::to_value(opts).map_err(solid_auth::Error::from)?;
        self.send("logout", None, opts).await
    }

    async fn send(
        &self,
        action: &str,
        provider: Option<&str>,
        opts: Value,
    ) -> Result<ClientResponse, Error> {
        let mut url = self.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("type", action)
                .append_pair("opts", &opts.to_string());
            if let Some(provider) = provider {
                query.append_pair("provider", provider);
            }
        }

        let mut body = json!({ "type": action, "opts": opts });
        if let Some(provider) = provider {
            body["provider"] = json!(provider);
        }

        debug!("Sending {action} request to {}", self.auth_url);
        let response = self
            .http_client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(solid_auth::Error::from)?;
        let value: Value = response.json().await.map_err(solid_auth::Error::from)?;

        interpret(value)
    }
}

fn interpret(value: Value) -> Result<ClientResponse, Error> {
    if let Some(redirect) = value.get("redirect") {
        return Ok(ClientResponse::Redirect(e_to_string(redirect)));
    }
    if let Some(error) = value.get("error") {
        return Err(Error::Web(WebErrorKind::Remote(e_to_string(error))));
    }
    if let Some(message) = value.get("message") {
        return Err(Error::Web(WebErrorKind::Remote(e_to_string(message))));
    }
    Ok(ClientResponse::Json(value))
}
