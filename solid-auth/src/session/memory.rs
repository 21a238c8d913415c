//! Server-side session store kept in process memory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tokio::sync::RwLock;

use super::{Session, SessionData, SessionStorage};
use crate::error::Error;

/// Cookie name used when none is configured.
pub const DEFAULT_COOKIE_NAME: &str = "__session";

const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

struct StoredSession {
    data: SessionData,
    expires_at: DateTime<Utc>,
}

/// Session store holding session data in memory, keyed by a random id that the
/// client carries in a cookie.
///
/// Records expire `ttl` after their last commit (one day by default). Expired
/// records are never loaded and are swept whenever a new session is committed.
/// Cloning shares the underlying map.
#[derive(Clone)]
pub struct MemorySessionStorage {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
    cookie_name: String,
    ttl: Duration,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::with_cookie_name(DEFAULT_COOKIE_NAME)
    }

    pub fn with_cookie_name(cookie_name: impl Into<String>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            cookie_name: cookie_name.into(),
            ttl: Duration::days(1),
        }
    }

    /// Set how long a committed session stays valid.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Number of sessions currently held, expired ones included until swept.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop every expired session, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, stored| stored.expires_at > now);
        before - sessions.len()
    }

    fn session_id_from_cookie<'a>(&self, cookie_header: &'a str) -> Option<&'a str> {
        cookie_header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == self.cookie_name && !value.is_empty()).then_some(value)
        })
    }

    fn generate_id() -> String {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        hex::encode(random_bytes)
    }
}

impl Default for MemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn get_session(&self, cookie_header: Option<&str>) -> Result<Session, Error> {
        let Some(id) = cookie_header.and_then(|header| self.session_id_from_cookie(header)) else {
            return Ok(Session::default());
        };

        let sessions = self.sessions.read().await;
        match sessions.get(id) {
            Some(stored) if Utc::now() < stored.expires_at => {
                Ok(Session::new(id, stored.data.clone()))
            }
            Some(_) => {
                log::trace!("Stored session expired, starting a new one");
                Ok(Session::default())
            }
            None => {
                log::trace!("No stored session for cookie, starting a new one");
                Ok(Session::default())
            }
        }
    }

    async fn commit_session(&self, session: &Session) -> Result<String, Error> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let id = if session.id().is_empty() {
            let before = sessions.len();
            sessions.retain(|_, stored| stored.expires_at > now);
            if sessions.len() < before {
                log::trace!("Swept {} expired sessions", before - sessions.len());
            }
            Self::generate_id()
        } else {
            session.id().to_string()
        };

        sessions.insert(
            id.clone(),
            StoredSession {
                data: session.data().clone(),
                expires_at: now + self.ttl,
            },
        );

        Ok(format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            self.cookie_name, id
        ))
    }

    async fn destroy_session(&self, session: &Session) -> Result<String, Error> {
        if !session.id().is_empty() {
            self.sessions.write().await.remove(session.id());
        }

        Ok(format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Expires={}",
            self.cookie_name, EXPIRED
        ))
    }
}
