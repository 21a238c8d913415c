//! Microsoft identity platform OAuth provider implementation.

use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_json, parse_profile, scope_param};
use crate::error::Error;
use crate::oauth::{Endpoints, Profile, ProfileName, ProfileValue, ProviderKind};

pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email"];
pub const SCOPE_SEPARATOR: &str = " ";
pub const DEFAULT_TENANT: &str = "common";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Login,
    None,
    Consent,
    SelectAccount,
}

#[derive(Debug, Deserialize)]
struct MicrosoftUserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Microsoft OAuth provider.
///
/// The tenant (`common`, `organizations`, `consumers` or a directory id) is part of
/// the endpoint URLs.
pub struct Provider {
    tenant: String,
    scopes: Vec<String>,
    prompt: Option<Prompt>,
    endpoints: Endpoints,
}

impl Provider {
    pub fn new() -> Self {
        Self::for_tenant(DEFAULT_TENANT)
    }

    pub fn for_tenant(tenant: impl Into<String>) -> Self {
        let tenant = tenant.into();
        let base = format!("https://login.microsoftonline.com/{tenant}/oauth2/v2.0");
        Self {
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            prompt: None,
            endpoints: Endpoints {
                authorization_url: format!("{base}/authorize"),
                token_url: format!("{base}/token"),
                user_info_url: "https://graph.microsoft.com/oidc/userinfo".to_string(),
            },
            tenant,
        }
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn with_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompt = Some(prompt);
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
        ProviderKind::Microsoft
    }

    fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn authorization_params(&self) -> Vec<(String, String)> {
        let mut params = vec![scope_param(&self.scopes, SCOPE_SEPARATOR)];
        if let Some(prompt) = self.prompt {
            let prompt = match prompt {
                Prompt::Login => "login",
                Prompt::None => "none",
                Prompt::Consent => "consent",
                Prompt::SelectAccount => "select_account",
            };
            params.push(("prompt".to_string(), prompt.to_string()));
        }
        params
    }

    async fn user_profile(
        &self,
        http_client: &reqwest::Client,
        access_token: &str,
    ) -> Result<Profile, Error> {
        let request = http_client
            .get(&self.endpoints.user_info_url)
            .bearer_auth(access_token);
        let raw = fetch_json(request, "Microsoft").await?;
        let info: MicrosoftUserInfo = parse_profile(&raw, "Microsoft")?;

        Ok(Profile {
            provider: ProviderKind::Microsoft.as_str().to_string(),
            display_name: info.name.clone().unwrap_or_default(),
            id: info.sub,
            name: Some(ProfileName {
                family_name: info.family_name,
                given_name: info.given_name,
                middle_name: None,
            }),
            emails: info.email.map(ProfileValue::new).into_iter().collect(),
            photos: Vec::new(),
            raw,
        })
    }
}
