use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::utils::e_to_string;

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Auth(solid_auth::Error),
    Web(WebErrorKind),
}

/// Failures raised by the HTTP layer itself, before or after the authenticator runs.
#[derive(Debug, PartialEq, Eq)]
pub enum WebErrorKind {
    /// A required query parameter or option is missing or malformed.
    Input(String),
    /// The `type` query parameter names no known action.
    UnsupportedAction(String),
    /// The remote auth handler answered with an `{ error }` or `{ message }` body.
    Remote(String),
}

impl Error {
    /// The message sent to clients as `{ "error": message }`.
    pub fn message(&self) -> String {
        match self {
            Error::Auth(err) => e_to_string(&serde_json::to_value(err).unwrap_or_default()),
            Error::Web(WebErrorKind::Input(message)) | Error::Web(WebErrorKind::Remote(message)) => {
                message.clone()
            }
            Error::Web(WebErrorKind::UnsupportedAction(action)) => {
                format!("Unsupported action: {action}")
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Web(WebErrorKind::Input(_)) | Error::Web(WebErrorKind::UnsupportedAction(_)) => {
                StatusCode::BAD_REQUEST
            }
            Error::Web(WebErrorKind::Remote(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Auth(err) => Some(err),
            Error::Web(_) => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.message())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Error::Auth(err) => warn!("Authentication request failed: {err}"),
            Error::Web(kind) => debug!("Rejected authentication request: {kind:?}"),
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<solid_auth::Error> for Error {
    fn from(err: solid_auth::Error) -> Self {
        Error::Auth(err)
    }
}
