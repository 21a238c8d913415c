//! Token endpoint response parsing.

use serde_json::{Map, Value};

use crate::error::{authorization_error, AuthorizationErrorKind, Error};

/// Tokens obtained from the token endpoint, plus whatever else the provider
/// returned alongside them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub extra_params: Map<String, Value>,
}

impl TokenSet {
    /// Parse a JSON token response.
    pub fn from_json(body: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(body).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::ErrorKind::Authorization(AuthorizationErrorKind::InvalidResponse),
        })?;
        let Value::Object(mut fields) = value else {
            return Err(authorization_error(
                AuthorizationErrorKind::InvalidResponse,
                "Token response is not a JSON object.",
            ));
        };

        let access_token = match fields.remove("access_token") {
            Some(Value::String(token)) if !token.is_empty() => token,
            _ => {
                return Err(authorization_error(
                    AuthorizationErrorKind::MissingAccessToken,
                    "Missing access token.",
                ))
            }
        };
        let refresh_token = match fields.remove("refresh_token") {
            Some(Value::String(token)) if !token.is_empty() => Some(token),
            _ => None,
        };

        Ok(Self {
            access_token,
            refresh_token,
            extra_params: fields,
        })
    }

    /// Parse an `application/x-www-form-urlencoded` token response.
    ///
    /// Every field except the tokens lands in `extra_params` as a string.
    pub fn from_form(body: &str) -> Result<Self, Error> {
        let mut access_token = None;
        let mut refresh_token = None;
        let mut extra_params = Map::new();

        for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
            match key.as_ref() {
                "access_token" => access_token = Some(value.into_owned()),
                "refresh_token" => refresh_token = Some(value.into_owned()),
                _ => {
                    extra_params.insert(key.into_owned(), Value::String(value.into_owned()));
                }
            }
        }

        let access_token = access_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            authorization_error(AuthorizationErrorKind::MissingAccessToken, "Missing access token.")
        })?;

        Ok(Self {
            access_token,
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            extra_params,
        })
    }
}
