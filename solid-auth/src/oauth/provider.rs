//! OAuth provider trait and types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::profile::Profile;
use super::token::TokenSet;
use crate::error::Error;

/// Known OAuth providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Discord,
    #[serde(rename = "github")]
    GitHub,
    Google,
    Facebook,
    Microsoft,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Discord => "discord",
            ProviderKind::GitHub => "github",
            ProviderKind::Google => "google",
            ProviderKind::Facebook => "facebook",
            ProviderKind::Microsoft => "microsoft",
        }
    }
}

/// Endpoint URLs a provider talks to.
///
/// Each provider ships its public endpoints as defaults; tests and self-hosted
/// deployments swap them with `with_endpoints`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorization_url: String,
    pub token_url: String,
    pub user_info_url: String,
}

/// Provider-specific half of the authorization-code flow.
///
/// [`OAuth2Strategy`](super::OAuth2Strategy) drives the generic flow and calls into
/// the provider for:
/// - Extra authorization URL parameters (scope, prompt, ...)
/// - Parsing the token endpoint response
/// - Fetching and normalizing the user profile
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    fn endpoints(&self) -> &Endpoints;

    /// Parameters added to the authorization URL after the standard ones.
    fn authorization_params(&self) -> Vec<(String, String)>;

    /// Parse the token endpoint response body.
    ///
    /// Defaults to a JSON object carrying at least `access_token`.
    fn parse_token_response(&self, body: &str) -> Result<TokenSet, Error> {
        TokenSet::from_json(body)
    }

    /// Fetch the user profile with an access token.
    async fn user_profile(
        &self,
        http_client: &reqwest::Client,
        access_token: &str,
    ) -> Result<Profile, Error>;
}
