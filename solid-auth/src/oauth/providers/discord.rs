//! Discord OAuth provider implementation.

use async_trait::async_trait;
use log::*;
use serde::Deserialize;
use serde_json::Value;

use super::{fetch_json, parse_profile, scope_param};
use crate::error::Error;
use crate::oauth::{Endpoints, Profile, ProfileValue, ProviderKind, TokenSet};

/// Scopes requested when none are configured.
///
/// See <https://discord.com/developers/docs/topics/oauth2#shared-resources-oauth2-scopes>.
pub const DEFAULT_SCOPES: &[&str] = &["identify", "email"];
pub const SCOPE_SEPARATOR: &str = " ";

const CDN_URL: &str = "https://cdn.discordapp.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    None,
    Consent,
}

impl Prompt {
    fn as_str(&self) -> &'static str {
        match self {
            Prompt::None => "none",
            Prompt::Consent => "consent",
        }
    }
}

/// Discord user object, as returned by `/users/@me`.
#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    #[serde(default)]
    discriminator: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Discord OAuth provider.
pub struct Provider {
    scopes: Vec<String>,
    prompt: Option<Prompt>,
    endpoints: Endpoints,
}

impl Provider {
    pub fn new() -> Self {
        Self {
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            prompt: None,
            endpoints: Endpoints {
                authorization_url: "https://discord.com/api/oauth2/authorize".to_string(),
                token_url: "https://discord.com/api/oauth2/token".to_string(),
                user_info_url: "https://discord.com/api/users/@me".to_string(),
            },
        }
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

/// Resolve the CDN URL of a user's avatar, falling back to one of the default
/// avatars when the user has none.
fn avatar_url(id: &str, avatar: Option<&str>, discriminator: Option<&str>) -> String {
    match avatar {
        Some(hash) => {
            let extension = if hash.starts_with("a_") { "gif" } else { "png" };
            format!("{CDN_URL}/avatars/{id}/{hash}.{extension}")
        }
        None => {
            let index = discriminator
                .and_then(|d| d.parse::<u64>().ok())
                .unwrap_or(0)
                % 5;
            format!("{CDN_URL}/embed/avatars/{index}.png")
        }
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Discord
    }

    fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn authorization_params(&self) -> Vec<(String, String)> {
        let mut params = vec![scope_param(&self.scopes, SCOPE_SEPARATOR)];
        if let Some(prompt) = self.prompt {
            params.push(("prompt".to_string(), prompt.as_str().to_string()));
        }
        params
    }

    fn parse_token_response(&self, body: &str) -> Result<TokenSet, Error> {
        let mut tokens = TokenSet::from_json(body)?;
        if let Some(Value::String(scope)) = tokens.extra_params.remove("scope") {
            let scopes = scope
                .split(SCOPE_SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect();
            tokens
                .extra_params
                .insert("scope".to_string(), Value::Array(scopes));
        }
        Ok(tokens)
    }

    async fn user_profile(
        &self,
        http_client: &reqwest::Client,
        access_token: &str,
    ) -> Result<Profile, Error> {
        let request = http_client
            .get(&self.endpoints.user_info_url)
            .bearer_auth(access_token);
        let mut raw = fetch_json(request, "Discord").await?;
        let user: DiscordUser = parse_profile(&raw, "Discord")?;

        let avatar = avatar_url(&user.id, user.avatar.as_deref(), user.discriminator.as_deref());
        if let Value::Object(fields) = &mut raw {
            fields.insert("avatar".to_string(), Value::String(avatar.clone()));
        }
        trace!("Resolved Discord avatar for {}", user.id);

        Ok(Profile {
            provider: ProviderKind::Discord.as_str().to_string(),
            id: user.id,
            display_name: user.username,
            name: None,
            emails: user.email.map(ProfileValue::new).into_iter().collect(),
            photos: vec![ProfileValue::new(avatar)],
            raw,
        })
    }
}
