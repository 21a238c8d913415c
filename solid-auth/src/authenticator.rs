//! Registry of strategies and the session-facing login/logout surface.

use std::collections::HashMap;
use std::sync::Arc;

use log::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{config_error, ConfigErrorKind, Error};
use crate::request::AuthRequest;
use crate::session::{Session, SessionStorage};
use crate::strategy::{AuthenticateOptions, Outcome, Redirect, Strategy, StrategyOptions};

/// Session keys and error handling shared by every strategy an [`Authenticator`]
/// dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthenticatorOptions {
    /// Key the authenticated user is stored under.
    pub session_key: String,
    /// Key a suppressed failure's `{ message }` is flashed under.
    pub session_error_key: String,
    /// Key the name of the strategy that authenticated the user is stored under.
    pub session_strategy_key: String,
    pub throw_on_error: bool,
}

impl Default for AuthenticatorOptions {
    fn default() -> Self {
        Self {
            session_key: "user".to_string(),
            session_error_key: "auth:error".to_string(),
            session_strategy_key: "strategy".to_string(),
            throw_on_error: false,
        }
    }
}

/// Where to send the client depending on whether the session is authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRedirects {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_redirect: Option<String>,
}

impl AuthRedirects {
    pub fn on_success(mut self, to: impl Into<String>) -> Self {
        self.success_redirect = Some(to.into());
        self
    }

    pub fn on_failure(mut self, to: impl Into<String>) -> Self {
        self.failure_redirect = Some(to.into());
        self
    }
}

/// Options for [`Authenticator::logout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutOptions {
    pub redirect_to: String,
}

impl LogoutOptions {
    pub fn new(redirect_to: impl Into<String>) -> Self {
        Self {
            redirect_to: redirect_to.into(),
        }
    }
}

/// Result of asking whether a session is authenticated.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState<User> {
    Authenticated(User),
    Anonymous,
    Redirect(Redirect),
}

impl<User> AuthState<User> {
    pub fn user(self) -> Option<User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Dispatches authentication requests to named strategies.
///
/// Strategies are registered once at startup; the authenticator is then shared
/// (typically behind an `Arc`) by every request handler.
pub struct Authenticator<User> {
    strategies: HashMap<String, Arc<dyn Strategy<User>>>,
    session_storage: Arc<dyn SessionStorage>,
    options: AuthenticatorOptions,
}

impl<User> Authenticator<User>
where
    User: DeserializeOwned + Send + 'static,
{
    pub fn new(session_storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_options(session_storage, AuthenticatorOptions::default())
    }

    pub fn with_options(
        session_storage: Arc<dyn SessionStorage>,
        options: AuthenticatorOptions,
    ) -> Self {
        Self {
            strategies: HashMap::new(),
            session_storage,
            options,
        }
    }

    pub fn options(&self) -> &AuthenticatorOptions {
        &self.options
    }

    pub fn session_storage(&self) -> &Arc<dyn SessionStorage> {
        &self.session_storage
    }

    /// Register a strategy under `name`, or under its own name when `None`.
    ///
    /// An existing registration under the same name is replaced.
    pub fn use_strategy(
        &mut self,
        strategy: impl Strategy<User> + 'static,
        name: Option<&str>,
    ) -> &mut Self {
        let name = name.unwrap_or_else(|| strategy.name()).to_string();
        if self.strategies.contains_key(&name) {
            debug!("Replacing strategy registered as {name}");
        }
        self.strategies.insert(name, Arc::new(strategy));
        self
    }

    pub fn unuse(&mut self, name: &str) -> &mut Self {
        self.strategies.remove(name);
        self
    }

    pub fn has_strategy(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Names of the registered strategies, sorted.
    pub fn strategy_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the strategy registered under `name` against `request`.
    ///
    /// Call-site options take precedence over the authenticator's defaults.
    pub async fn authenticate(
        &self,
        name: &str,
        request: &AuthRequest,
        options: AuthenticateOptions,
    ) -> Result<Outcome<User>, Error> {
        let Some(strategy) = self.strategies.get(name) else {
            warn!("Authentication requested for unknown strategy {name}");
            return Err(config_error(
                ConfigErrorKind::StrategyNotFound,
                &format!("Strategy {name} not found."),
            ));
        };

        let options = StrategyOptions {
            name: name.to_string(),
            session_key: self.options.session_key.clone(),
            session_error_key: self.options.session_error_key.clone(),
            session_strategy_key: self.options.session_strategy_key.clone(),
            throw_on_error: options.throw_on_error.unwrap_or(self.options.throw_on_error),
            success_redirect: options.success_redirect,
            failure_redirect: options.failure_redirect,
            context: options.context,
        };

        strategy
            .authenticate(request.clone(), self.session_storage.as_ref(), &options)
            .await
    }

    /// Look up the user in the session addressed by the request's cookie.
    pub async fn is_authenticated(
        &self,
        request: &AuthRequest,
        redirects: &AuthRedirects,
    ) -> Result<AuthState<User>, Error> {
        let mut session = self.session_storage.get_session(request.cookie()).await?;
        self.is_session_authenticated(&mut session, redirects)
    }

    /// Look up the user in an already loaded session.
    ///
    /// An authenticated session answers with a redirect to `success_redirect` when
    /// one is given, an anonymous one with a redirect to `failure_redirect`. A stored
    /// value that no longer decodes as `User` counts as anonymous.
    pub fn is_session_authenticated(
        &self,
        session: &mut Session,
        redirects: &AuthRedirects,
    ) -> Result<AuthState<User>, Error> {
        let user: Option<User> = match session.get_as(&self.options.session_key) {
            Ok(user) => user,
            Err(e) => {
                warn!(
                    "Ignoring session value under {} that is not a valid user: {e}",
                    self.options.session_key
                );
                None
            }
        };

        match (user, redirects) {
            (
                Some(_),
                AuthRedirects {
                    success_redirect: Some(to),
                    ..
                },
            ) => Ok(AuthState::Redirect(Redirect::to(to.as_str()))),
            (Some(user), _) => Ok(AuthState::Authenticated(user)),
            (
                None,
                AuthRedirects {
                    failure_redirect: Some(to),
                    ..
                },
            ) => Ok(AuthState::Redirect(Redirect::to(to.as_str()))),
            (None, _) => Ok(AuthState::Anonymous),
        }
    }

    /// Destroy the request's session and redirect to `redirect_to`.
    pub async fn logout(
        &self,
        request: &AuthRequest,
        options: &LogoutOptions,
    ) -> Result<Redirect, Error> {
        let session = self.session_storage.get_session(request.cookie()).await?;
        let set_cookie = self.session_storage.destroy_session(&session).await?;

        info!("Logged out session");
        Ok(Redirect::to(options.redirect_to.as_str()).with_cookie(set_cookie))
    }
}
