//! Translation of authenticator outcomes into HTTP responses.

use axum::http::header::{HeaderName, LOCATION, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use solid_auth::{Outcome, Redirect};
use url::Url;

type Headers = AppendHeaders<Vec<(HeaderName, String)>>;

/// Resolve a redirect target against the site origin, so clients always receive an
/// absolute URL.
pub fn absolute_location(site_url: &Url, location: &str) -> String {
    site_url
        .join(location)
        .map(String::from)
        .unwrap_or_else(|_| location.to_string())
}

fn redirect_headers(location: String, redirect: Redirect) -> Headers {
    let mut headers = vec![(LOCATION, location)];
    if let Some(set_cookie) = redirect.set_cookie {
        headers.push((SET_COOKIE, set_cookie));
    }
    AppendHeaders(headers)
}

/// A redirect for a script caller: `{ "redirect": url }` with `Location` and
/// `Set-Cookie` headers, answered with 200 so `fetch` does not follow it.
pub fn redirect_json(site_url: &Url, redirect: Redirect) -> Response {
    let location = absolute_location(site_url, &redirect.location);
    let body = Json(json!({ "redirect": location }));
    (StatusCode::OK, redirect_headers(location, redirect), body).into_response()
}

/// A redirect for a browser navigation: `303 See Other`.
pub fn see_other(redirect: Redirect) -> Response {
    let location = redirect.location.clone();
    (StatusCode::SEE_OTHER, redirect_headers(location, redirect)).into_response()
}

/// Render an outcome for a script caller; an authenticated user is sent as JSON.
pub fn outcome_json<User: Serialize>(site_url: &Url, outcome: Outcome<User>) -> Response {
    match outcome {
        Outcome::Redirect(redirect) => redirect_json(site_url, redirect),
        Outcome::Authenticated(user) => Json(user).into_response(),
    }
}

/// Render an outcome for a browser navigation.
pub fn outcome_navigation<User: Serialize>(outcome: Outcome<User>) -> Response {
    match outcome {
        Outcome::Redirect(redirect) => see_other(redirect),
        Outcome::Authenticated(user) => Json(user).into_response(),
    }
}
