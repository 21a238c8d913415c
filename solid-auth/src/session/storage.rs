//! Session storage trait for loading and persisting sessions.

use async_trait::async_trait;

use super::Session;
use crate::error::Error;

/// Trait for the external session store.
///
/// Strategies and the authenticator only read and mutate sessions; creating and
/// destroying the backing record is the store's responsibility.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load the session addressed by a `Cookie` header.
    ///
    /// A missing or unknown cookie yields a fresh, empty session.
    async fn get_session(&self, cookie_header: Option<&str>) -> Result<Session, Error>;

    /// Persist the session and return the `Set-Cookie` header value for it.
    async fn commit_session(&self, session: &Session) -> Result<String, Error>;

    /// Remove the session and return a `Set-Cookie` header value that expires it.
    async fn destroy_session(&self, session: &Session) -> Result<String, Error>;
}
