//! Strategy capability, authentication options and outcomes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Error;
use crate::request::AuthRequest;
use crate::session::{Session, SessionStorage};

/// Options a caller may pass to a single `authenticate` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throw_on_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl AuthenticateOptions {
    pub fn success_redirect(mut self, to: impl Into<String>) -> Self {
        self.success_redirect = Some(to.into());
        self
    }

    pub fn failure_redirect(mut self, to: impl Into<String>) -> Self {
        self.failure_redirect = Some(to.into());
        self
    }

    pub fn throw_on_error(mut self, throw_on_error: bool) -> Self {
        self.throw_on_error = Some(throw_on_error);
        self
    }

    pub fn context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// Options handed to a strategy, after merging authenticator defaults with the
/// call-site [`AuthenticateOptions`].
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOptions {
    pub name: String,
    pub session_key: String,
    pub session_error_key: String,
    pub session_strategy_key: String,
    pub throw_on_error: bool,
    pub success_redirect: Option<String>,
    pub failure_redirect: Option<String>,
    pub context: Option<Value>,
}

/// A redirect to send back to the client, with the session cookie to set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub set_cookie: Option<String>,
}

impl Redirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            set_cookie: None,
        }
    }

    pub fn with_cookie(mut self, set_cookie: String) -> Self {
        self.set_cookie = Some(set_cookie);
        self
    }
}

/// Result of an authentication step that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<User> {
    Authenticated(User),
    Redirect(Redirect),
}

impl<User> Outcome<User> {
    pub fn user(self) -> Option<User> {
        match self {
            Outcome::Authenticated(user) => Some(user),
            Outcome::Redirect(_) => None,
        }
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            Outcome::Authenticated(_) => None,
            Outcome::Redirect(redirect) => Some(redirect),
        }
    }
}

/// A pluggable authentication method.
#[async_trait]
pub trait Strategy<User>: Send + Sync {
    /// Name the strategy registers under when none is given.
    fn name(&self) -> &str;

    /// Run one leg of the strategy against an inbound request.
    ///
    /// Returns a redirect when the flow must continue elsewhere (including a
    /// `success_redirect` or a suppressed failure), the verified user otherwise.
    async fn authenticate(
        &self,
        request: AuthRequest,
        storage: &dyn SessionStorage,
        options: &StrategyOptions,
    ) -> Result<Outcome<User>, Error>;
}

/// Completes a strategy with a verified user.
///
/// With a `success_redirect` the user and strategy name are written to the session,
/// which is committed, and a redirect is returned. Without one a store-backed session
/// is still committed and the user is returned.
pub async fn success<User: Serialize>(
    user: User,
    mut session: Session,
    storage: &dyn SessionStorage,
    options: &StrategyOptions,
) -> Result<Outcome<User>, Error> {
    let Some(location) = &options.success_redirect else {
        if !session.id().is_empty() {
            storage.commit_session(&session).await?;
        }
        return Ok(Outcome::Authenticated(user));
    };

    session.set(&options.session_key, serde_json::to_value(&user)?);
    session.set(&options.session_strategy_key, json!(options.name));
    let set_cookie = storage.commit_session(&session).await?;

    log::info!("Authenticated with strategy {}", options.name);
    Ok(Outcome::Redirect(
        Redirect::to(location.as_str()).with_cookie(set_cookie),
    ))
}

/// Completes a strategy with a failure.
///
/// Suppressible errors become a flashed `{ message }` under `session_error_key`
/// plus a redirect to `failure_redirect`, unless `throw_on_error` is set or no
/// `failure_redirect` was given; in that case, and for all other errors, the
/// error propagates after the store-backed session is committed.
pub async fn failure<User>(
    error: Error,
    mut session: Session,
    storage: &dyn SessionStorage,
    options: &StrategyOptions,
) -> Result<Outcome<User>, Error> {
    log::warn!("Strategy {} failed: {}", options.name, error);

    let location = match &options.failure_redirect {
        Some(location) if !options.throw_on_error && error.is_suppressible() => location,
        _ => {
            // Flash values read during the failed attempt stay consumed
            if !session.id().is_empty() {
                if let Err(e) = storage.commit_session(&session).await {
                    log::warn!("Failed to commit session after failure: {e}");
                }
            }
            return Err(error);
        }
    };

    session.flash(
        &options.session_error_key,
        json!({ "message": error.message() }),
    );
    let set_cookie = storage.commit_session(&session).await?;

    Ok(Outcome::Redirect(
        Redirect::to(location.as_str()).with_cookie(set_cookie),
    ))
}
