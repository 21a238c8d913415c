//! Google OAuth provider implementation.

use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_json, parse_profile, scope_param};
use crate::error::Error;
use crate::oauth::{Endpoints, Profile, ProfileName, ProfileValue, ProviderKind};

pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email"];
pub const SCOPE_SEPARATOR: &str = " ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    None,
    Consent,
    SelectAccount,
}

/// OpenID Connect userinfo claims.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Google OAuth provider.
///
/// Handles sign-in with Google accounts, including:
/// - Online or offline access (the latter yields a refresh token)
/// - Incremental authorization via `include_granted_scopes`
/// - Restricting the account chooser to a hosted domain
pub struct Provider {
    scopes: Vec<String>,
    access_type: AccessType,
    include_granted_scopes: bool,
    prompt: Option<Prompt>,
    hosted_domain: Option<String>,
    login_hint: Option<String>,
    endpoints: Endpoints,
}

impl Provider {
    pub fn new() -> Self {
        Self {
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            access_type: AccessType::Online,
            include_granted_scopes: false,
            prompt: None,
            hosted_domain: None,
            login_hint: None,
            endpoints: Endpoints {
                authorization_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
                token_url: "https://oauth2.googleapis.com/token".to_string(),
                user_info_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
            },
        }
    }

    pub fn with_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_access_type(mut self, access_type: AccessType) -> Self {
        self.access_type = access_type;
        self
    }

    pub fn with_include_granted_scopes(mut self, include: bool) -> Self {
        self.include_granted_scopes = include;
        self
    }

    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn with_hosted_domain(mut self, domain: impl Into<String>) -> Self {
        self.hosted_domain = Some(domain.into());
        self
    }

    pub fn with_login_hint(mut self, hint: impl Into<String>) -> Self {
        self.login_hint = Some(hint.into());
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
        ProviderKind::Google
    }

    fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn authorization_params(&self) -> Vec<(String, String)> {
        let access_type = match self.access_type {
            AccessType::Online => "online",
            AccessType::Offline => "offline",
        };
        let mut params = vec![
            scope_param(&self.scopes, SCOPE_SEPARATOR),
            ("access_type".to_string(), access_type.to_string()),
            (
                "include_granted_scopes".to_string(),
                self.include_granted_scopes.to_string(),
            ),
        ];
        if let Some(prompt) = self.prompt {
            let prompt = match prompt {
                Prompt::None => "none",
                Prompt::Consent => "consent",
                Prompt::SelectAccount => "select_account",
            };
            params.push(("prompt".to_string(), prompt.to_string()));
        }
        if let Some(domain) = &self.hosted_domain {
            params.push(("hd".to_string(), domain.clone()));
        }
        if let Some(hint) = &self.login_hint {
            params.push(("login_hint".to_string(), hint.clone()));
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
        let raw = fetch_json(request, "Google").await?;
        let info: GoogleUserInfo = parse_profile(&raw, "Google")?;

        Ok(Profile {
            provider: ProviderKind::Google.as_str().to_string(),
            display_name: info.name.clone().unwrap_or_default(),
            id: info.sub,
            name: Some(ProfileName {
                family_name: info.family_name,
                given_name: info.given_name,
                middle_name: None,
            }),
            emails: info.email.map(ProfileValue::new).into_iter().collect(),
            photos: info.picture.map(ProfileValue::new).into_iter().collect(),
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::Provider as _;
    use mockito::Server;
    use serde_json::json;

    #[test]
    fn test_default_authorization_params() {
        assert_eq!(
            Provider::new().authorization_params(),
            vec![
                ("scope".to_string(), "openid profile email".to_string()),
                ("access_type".to_string(), "online".to_string()),
                ("include_granted_scopes".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_optional_authorization_params() {
        let params = Provider::new()
            .with_access_type(AccessType::Offline)
            .with_prompt(Prompt::SelectAccount)
            .with_hosted_domain("example.com")
            .with_login_hint("ada@example.com")
            .authorization_params();
        assert!(params.contains(&("access_type".to_string(), "offline".to_string())));
        assert!(params.contains(&("prompt".to_string(), "select_account".to_string())));
        assert!(params.contains(&("hd".to_string(), "example.com".to_string())));
        assert!(params.contains(&("login_hint".to_string(), "ada@example.com".to_string())));
    }

    #[tokio::test]
    async fn test_user_profile() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/oauth2/v3/userinfo")
            .match_header("authorization", "Bearer ya29.token")
            .with_status(200)
            .with_body(
                json!({
                    "sub": "1090000000000",
                    "name": "Ada Lovelace",
                    "given_name": "Ada",
                    "family_name": "Lovelace",
                    "picture": "https://lh3.googleusercontent.com/a/ada",
                    "email": "ada@example.com",
                    "email_verified": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = Provider::new().with_endpoints(Endpoints {
            authorization_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: format!("{}/token", server.url()),
            user_info_url: format!("{}/oauth2/v3/userinfo", server.url()),
        });
        let profile = provider
            .user_profile(&reqwest::Client::new(), "ya29.token")
            .await
            .unwrap();

        assert_eq!(profile.provider, "google");
        assert_eq!(profile.id, "1090000000000");
        assert_eq!(profile.display_name, "Ada Lovelace");
        assert_eq!(profile.email(), Some("ada@example.com"));
        assert_eq!(profile.photo(), Some("https://lh3.googleusercontent.com/a/ada"));
        assert_eq!(profile.name.unwrap().family_name, Some("Lovelace".to_string()));
        assert_eq!(profile.raw["email_verified"], json!(true));
    }
}
