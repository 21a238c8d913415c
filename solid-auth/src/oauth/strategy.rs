//! Generic OAuth 2.0 authorization-code strategy.

use std::future::Future;

use async_trait::async_trait;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{json, Map, Value};
use url::Url;

use super::profile::Profile;
use super::provider::Provider;
use super::state::{generate_state, SESSION_STATE_KEY};
use super::token::TokenSet;
use crate::error::{
    authorization_error, config_error, AuthorizationErrorKind, ConfigErrorKind, Error, ErrorKind,
};
use crate::http::HttpClientBuilder;
use crate::request::AuthRequest;
use crate::session::{Session, SessionStorage};
use crate::strategy::{failure, success, Outcome, Redirect, Strategy, StrategyOptions};

/// Everything the verify callback gets to map a provider identity to a user.
#[derive(Debug, Clone)]
pub struct VerifyParams {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub extra_params: Map<String, Value>,
    pub profile: Profile,
    pub context: Option<Value>,
}

/// Application callback turning a verified provider identity into a `User`.
///
/// Implemented for any `Fn(VerifyParams) -> impl Future<Output = Result<User, Error>>`.
/// Rejections are reported as authorization failures.
#[async_trait]
pub trait Verify<User>: Send + Sync {
    async fn verify(&self, params: VerifyParams) -> Result<User, Error>;
}

#[async_trait]
impl<User, F, Fut> Verify<User> for F
where
    F: Fn(VerifyParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<User, Error>> + Send,
    User: Send + 'static,
{
    async fn verify(&self, params: VerifyParams) -> Result<User, Error> {
        (self)(params).await
    }
}

/// Client credentials registered with the provider.
#[derive(Debug, Clone)]
pub struct OAuth2Options {
    pub client_id: String,
    pub client_secret: SecretString,
    pub callback_url: String,
}

impl OAuth2Options {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            callback_url: callback_url.into(),
        }
    }
}

/// Drives the authorization-code flow for one provider.
///
/// One `authenticate` entry point serves both legs: a request without `code` and
/// `state` starts the flow with a redirect to the provider, a request carrying them
/// is treated as the provider's callback.
pub struct OAuth2Strategy<P, User> {
    name: String,
    options: OAuth2Options,
    provider: P,
    verify: Box<dyn Verify<User>>,
    http_client: reqwest::Client,
}

impl<P: Provider, User> OAuth2Strategy<P, User> {
    pub fn new(
        options: OAuth2Options,
        provider: P,
        verify: impl Verify<User> + 'static,
    ) -> Result<Self, Error> {
        if options.client_id.trim().is_empty() {
            return Err(config_error(
                ConfigErrorKind::MissingOption,
                "clientID is required",
            ));
        }
        if options.client_secret.expose_secret().trim().is_empty() {
            return Err(config_error(
                ConfigErrorKind::MissingOption,
                "clientSecret is required",
            ));
        }
        Url::parse(&options.callback_url).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Config(ConfigErrorKind::InvalidOption),
        })?;

        Ok(Self {
            name: provider.provider().as_str().to_string(),
            options,
            provider,
            verify: Box::new(verify),
            http_client: HttpClientBuilder::new().build()?,
        })
    }

    /// Register under a different name than the provider's.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Build the provider authorization URL for a state token.
    pub fn authorization_url(&self, state: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&self.provider.endpoints().authorization_url).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Config(ConfigErrorKind::InvalidOption),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.options.client_id)
                .append_pair("redirect_uri", &self.options.callback_url)
                .append_pair("response_type", "code");
            for (key, value) in self.provider.authorization_params() {
                query.append_pair(&key, &value);
            }
            query.append_pair("state", state);
        }

        Ok(url)
    }

    /// Exchange an authorization code at the token endpoint.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, Error> {
        let params = [
            ("code", code),
            ("client_id", self.options.client_id.as_str()),
            ("client_secret", self.options.client_secret.expose_secret().as_str()),
            ("redirect_uri", self.options.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging {} authorization code for tokens", self.name);

        let response = self
            .http_client
            .post(&self.provider.endpoints().token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to exchange {} authorization code: {:?}", self.name, e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::Authorization(
                        AuthorizationErrorKind::TokenExchangeFailed,
                    ),
                }
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("{} token endpoint returned {}: {}", self.name, status, body);
            let message = if body.is_empty() {
                format!("Token exchange failed with status {status}")
            } else {
                body
            };
            return Err(authorization_error(
                AuthorizationErrorKind::TokenExchangeFailed,
                &message,
            ));
        }

        self.provider.parse_token_response(&body)
    }

    async fn callback(
        &self,
        request: &AuthRequest,
        session: &mut Session,
        options: &StrategyOptions,
    ) -> Result<User, Error> {
        let state = request.query_param("state").ok_or_else(|| {
            authorization_error(AuthorizationErrorKind::MissingState, "Missing state on URL.")
        })?;

        let stored_state = match session.get(SESSION_STATE_KEY) {
            Some(Value::String(stored)) => stored,
            _ => {
                return Err(authorization_error(
                    AuthorizationErrorKind::MissingState,
                    "Missing state on session.",
                ))
            }
        };
        if stored_state != state {
            return Err(authorization_error(
                AuthorizationErrorKind::InvalidState,
                "State doesn't match.",
            ));
        }

        let code = request.query_param("code").ok_or_else(|| {
            authorization_error(AuthorizationErrorKind::MissingCode, "Missing code.")
        })?;

        let tokens = self.exchange_code(&code).await?;
        let profile = self
            .provider
            .user_profile(&self.http_client, &tokens.access_token)
            .await?;
        debug!("Fetched {} profile for id {}", self.name, profile.id);

        let params = VerifyParams {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            extra_params: tokens.extra_params,
            profile,
            context: options.context.clone(),
        };

        self.verify.verify(params).await.map_err(|e| match e.error_kind {
            ErrorKind::Authorization(_) => e,
            _ => Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Authorization(AuthorizationErrorKind::VerifyFailed),
            },
        })
    }
}

#[async_trait]
impl<P, User> Strategy<User> for OAuth2Strategy<P, User>
where
    P: Provider,
    User: Serialize + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn authenticate(
        &self,
        request: AuthRequest,
        storage: &dyn SessionStorage,
        options: &StrategyOptions,
    ) -> Result<Outcome<User>, Error> {
        let mut session = storage.get_session(request.cookie()).await?;

        if let Some(error) = request.query_param("error") {
            let description = request.query_param("error_description").unwrap_or(error);
            let err = authorization_error(AuthorizationErrorKind::ProviderDenied, &description);
            return failure(err, session, storage, options).await;
        }

        if request.query_param("code").is_none() && request.query_param("state").is_none() {
            let state = generate_state();
            let url = self.authorization_url(&state)?;
            session.flash(SESSION_STATE_KEY, json!(state));
            let set_cookie = storage.commit_session(&session).await?;

            debug!("Redirecting to {} authorization endpoint", self.name);
            return Ok(Outcome::Redirect(
                Redirect::to(url.as_str()).with_cookie(set_cookie),
            ));
        }

        match self.callback(&request, &mut session, options).await {
            Ok(user) => success(user, session, storage, options).await,
            Err(e) => failure(e, session, storage, options).await,
        }
    }
}
