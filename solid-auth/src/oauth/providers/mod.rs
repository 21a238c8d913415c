//! Provider implementations.
//!
//! Each provider supplies its endpoints, scope vocabulary, token response parsing
//! and profile normalization to the generic [`OAuth2Strategy`](super::OAuth2Strategy).

pub mod discord;
pub mod facebook;
pub mod github;
pub mod google;
pub mod microsoft;

use log::*;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{authorization_error, AuthorizationErrorKind, Error, ErrorKind};

/// Join scopes with the provider's separator into a `scope` parameter.
pub(crate) fn scope_param(scopes: &[String], separator: &str) -> (String, String) {
    ("scope".to_string(), scopes.join(separator))
}

/// Send a profile request and read its JSON body.
///
/// Transport failures, non-success statuses and undecodable bodies are all
/// reported as profile fetch failures.
pub(crate) async fn fetch_json(
    request: reqwest::RequestBuilder,
    provider: &str,
) -> Result<Value, Error> {
    let profile_error = |e: reqwest::Error| {
        warn!("Failed to fetch {} profile: {:?}", provider, e);
        Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Authorization(AuthorizationErrorKind::ProfileFetchFailed),
        }
    };

    let response = request.send().await.map_err(profile_error)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("{} profile endpoint returned {}: {}", provider, status, body);
        return Err(authorization_error(
            AuthorizationErrorKind::ProfileFetchFailed,
            &format!("Failed to fetch {provider} profile ({status})"),
        ));
    }

    response.json::<Value>().await.map_err(profile_error)
}

/// Decode the provider's raw profile payload.
pub(crate) fn parse_profile<T: DeserializeOwned>(raw: &Value, provider: &str) -> Result<T, Error> {
    T::deserialize(raw).map_err(|e| {
        warn!("Unexpected {} profile shape: {:?}", provider, e);
        Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Authorization(AuthorizationErrorKind::InvalidResponse),
        }
    })
}
