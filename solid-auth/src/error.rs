//! Error types for the `solid-auth` crate.
//!
//! Follows a root Error struct holding a tree of error kind enums, with the
//! original failure kept as `source` for chaining.

use std::error::Error as StdError;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Top-level error type for the solid-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in solid-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    Authorization(AuthorizationErrorKind),
    Session(SessionErrorKind),
    Http(HttpErrorKind),
}

/// Misconfiguration of the authenticator or a strategy. Never redirect-suppressed.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    StrategyNotFound,
    MissingOption,
    InvalidOption,
}

/// Failures of one authentication attempt.
#[derive(Debug, PartialEq)]
pub enum AuthorizationErrorKind {
    ProviderDenied,
    MissingState,
    InvalidState,
    MissingCode,
    TokenExchangeFailed,
    MissingAccessToken,
    MissingTokenType,
    ProfileFetchFailed,
    InvalidResponse,
    VerifyFailed,
}

/// Errors from the session store.
#[derive(Debug, PartialEq)]
pub enum SessionErrorKind {
    Serialization,
    Storage,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl Error {
    /// Authorization errors may be turned into a flash + redirect by a strategy;
    /// everything else always propagates.
    pub fn is_suppressible(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::Authorization(_) | ErrorKind::Http(_)
        )
    }

    /// Stable snake_case identifier of the error kind.
    pub fn code(&self) -> &'static str {
        match &self.error_kind {
            ErrorKind::Config(kind) => match kind {
                ConfigErrorKind::StrategyNotFound => "strategy_not_found",
                ConfigErrorKind::MissingOption => "missing_option",
                ConfigErrorKind::InvalidOption => "invalid_option",
            },
            ErrorKind::Authorization(kind) => match kind {
                AuthorizationErrorKind::ProviderDenied => "provider_denied",
                AuthorizationErrorKind::MissingState => "missing_state",
                AuthorizationErrorKind::InvalidState => "invalid_state",
                AuthorizationErrorKind::MissingCode => "missing_code",
                AuthorizationErrorKind::TokenExchangeFailed => "token_exchange_failed",
                AuthorizationErrorKind::MissingAccessToken => "missing_access_token",
                AuthorizationErrorKind::MissingTokenType => "missing_token_type",
                AuthorizationErrorKind::ProfileFetchFailed => "profile_fetch_failed",
                AuthorizationErrorKind::InvalidResponse => "invalid_response",
                AuthorizationErrorKind::VerifyFailed => "verify_failed",
            },
            ErrorKind::Session(kind) => match kind {
                SessionErrorKind::Serialization => "session_serialization",
                SessionErrorKind::Storage => "session_storage",
            },
            ErrorKind::Http(kind) => match kind {
                HttpErrorKind::BuilderFailed => "http_builder_failed",
                HttpErrorKind::RequestFailed => "http_request_failed",
                HttpErrorKind::Network => "http_network",
            },
        }
    }

    /// Human readable message, taken from the source when one is present.
    pub fn message(&self) -> String {
        match &self.source {
            Some(source) => source.to_string(),
            None => format!("{:?}", self.error_kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config(_) => write!(f, "Configuration error: {}", self.message()),
            ErrorKind::Authorization(_) => write!(f, "Authorization error: {}", self.message()),
            ErrorKind::Session(_) => write!(f, "Session error: {}", self.message()),
            ErrorKind::Http(_) => write!(f, "HTTP error: {}", self.message()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Error", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Session(SessionErrorKind::Serialization),
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}

/// Helper function to create authorization errors.
pub fn authorization_error(kind: AuthorizationErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Authorization(kind),
    }
}

/// Helper function to create session storage errors.
pub fn session_error(kind: SessionErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Session(kind),
    }
}
