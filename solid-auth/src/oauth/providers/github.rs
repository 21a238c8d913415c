//! GitHub OAuth provider implementation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{fetch_json, parse_profile, scope_param};
use crate::error::{authorization_error, AuthorizationErrorKind, Error};
use crate::oauth::{Endpoints, Profile, ProfileName, ProfileValue, ProviderKind, TokenSet};

pub const DEFAULT_SCOPES: &[&str] = &["user"];
pub const SCOPE_SEPARATOR: &str = " ";
pub const DEFAULT_USER_AGENT: &str = "solid-auth";

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

/// GitHub OAuth provider.
///
/// GitHub answers the token exchange form-encoded unless asked otherwise, and does
/// not issue refresh tokens for OAuth apps.
pub struct Provider {
    scopes: Vec<String>,
    allow_signup: bool,
    user_agent: String,
    endpoints: Endpoints,
}

impl Provider {
    pub fn new() -> Self {
        Self {
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            allow_signup: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoints: Endpoints {
                authorization_url: "https://github.com/login/oauth/authorize".to_string(),
                token_url: "https://github.com/login/oauth/access_token".to_string(),
                user_info_url: "https://api.github.com/user".to_string(),
            },
        }
    }

    pub fn with_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allow_signup(mut self, allow_signup: bool) -> Self {
        self.allow_signup = allow_signup;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn authorization_params(&self) -> Vec<(String, String)> {
        vec![
            scope_param(&self.scopes, SCOPE_SEPARATOR),
            ("allow_signup".to_string(), self.allow_signup.to_string()),
        ]
    }

    fn parse_token_response(&self, body: &str) -> Result<TokenSet, Error> {
        let mut tokens = if body.trim_start().starts_with('{') {
            TokenSet::from_json(body)?
        } else {
            TokenSet::from_form(body)?
        };

        let token_type = match tokens.extra_params.remove("token_type") {
            Some(Value::String(token_type)) if !token_type.is_empty() => token_type,
            _ => {
                return Err(authorization_error(
                    AuthorizationErrorKind::MissingTokenType,
                    "Missing token type.",
                ))
            }
        };
        tokens
            .extra_params
            .insert("tokenType".to_string(), Value::String(token_type));

        Ok(tokens)
    }

    async fn user_profile(
        &self,
        http_client: &reqwest::Client,
        access_token: &str,
    ) -> Result<Profile, Error> {
        let request = http_client
            .get(&self.endpoints.user_info_url)
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
            .header(reqwest::header::AUTHORIZATION, format!("token {access_token}"))
            .header(reqwest::header::USER_AGENT, &self.user_agent);
        let raw = fetch_json(request, "GitHub").await?;
        let user: GitHubUser = parse_profile(&raw, "GitHub")?;

        Ok(Profile {
            provider: ProviderKind::GitHub.as_str().to_string(),
            id: user.id.to_string(),
            display_name: user.login,
            name: user.name.map(|name| ProfileName {
                family_name: Some(name.clone()),
                given_name: Some(name.clone()),
                middle_name: Some(name),
            }),
            emails: user.email.map(ProfileValue::new).into_iter().collect(),
            photos: user.avatar_url.map(ProfileValue::new).into_iter().collect(),
            raw,
        })
    }
}
