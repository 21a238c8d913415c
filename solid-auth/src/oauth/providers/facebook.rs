//! Facebook OAuth provider implementation.

use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_json, parse_profile, scope_param};
use crate::error::Error;
use crate::oauth::{Endpoints, Profile, ProfileName, ProfileValue, ProviderKind};

pub const DEFAULT_SCOPES: &[&str] = &["public_profile", "email"];
pub const SCOPE_SEPARATOR: &str = ",";

/// Graph API fields requested for the profile.
pub const PROFILE_FIELDS: &str = "id,email,name,first_name,middle_name,last_name,picture";

const GRAPH_URL: &str = "https://graph.facebook.com/v15.0";

#[derive(Debug, Deserialize)]
struct PictureData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct Picture {
    data: PictureData,
}

#[derive(Debug, Deserialize)]
struct FacebookUser {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    middle_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<Picture>,
}

/// Facebook OAuth provider.
pub struct Provider {
    scopes: Vec<String>,
    endpoints: Endpoints,
}

impl Provider {
    pub fn new() -> Self {
        Self {
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            endpoints: Endpoints {
                authorization_url: "https://www.facebook.com/v15.0/dialog/oauth".to_string(),
                token_url: format!("{GRAPH_URL}/oauth/access_token"),
                user_info_url: format!("{GRAPH_URL}/me"),
            },
        }
    }

    /// Scopes requested in addition to `public_profile` and `email`.
    pub fn with_extra_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        for scope in scopes {
            let scope = scope.into();
            if !self.scopes.contains(&scope) {
                self.scopes.push(scope);
            }
        }
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
        ProviderKind::Facebook
    }

    fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn authorization_params(&self) -> Vec<(String, String)> {
        vec![scope_param(&self.scopes, SCOPE_SEPARATOR)]
    }

    async fn user_profile(
        &self,
        http_client: &reqwest::Client,
        access_token: &str,
    ) -> Result<Profile, Error> {
        let request = http_client
            .get(&self.endpoints.user_info_url)
            .query(&[("fields", PROFILE_FIELDS), ("access_token", access_token)]);
        let raw = fetch_json(request, "Facebook").await?;
        let user: FacebookUser = parse_profile(&raw, "Facebook")?;

        Ok(Profile {
            provider: ProviderKind::Facebook.as_str().to_string(),
            id: user.id,
            display_name: user.name.unwrap_or_default(),
            name: Some(ProfileName {
                family_name: user.last_name,
                given_name: user.first_name,
                middle_name: user.middle_name,
            }),
            emails: user.email.map(ProfileValue::new).into_iter().collect(),
            photos: user
                .picture
                .map(|picture| ProfileValue::new(picture.data.url))
                .into_iter()
                .collect(),
            raw,
        })
    }
}
