//! Controller for the authentication entry point.
//!
//! `POST ?type=login|logout&opts=<json>[&provider=<name>]` is called by scripts and
//! answers redirects as JSON. `GET /{provider}/callback` is the provider's redirect
//! back to the site and answers with a real redirect.

use crate::error::{Error, WebErrorKind};
use crate::response::{outcome_json, outcome_navigation, redirect_json};
use crate::AppState;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use log::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solid_auth::{AuthRequest, AuthenticateOptions, LogoutOptions};
use url::Url;

/// Query parameters of the POST entry point.
#[derive(Debug, Default, Deserialize)]
pub struct AuthParams {
    #[serde(rename = "type")]
    pub action: Option<String>,
    pub opts: Option<String>,
    pub provider: Option<String>,
}

fn input_error(message: impl Into<String>) -> Error {
    Error::Web(WebErrorKind::Input(message.into()))
}

/// Rebuild the absolute request URL the strategies see from the site origin and the
/// path the client requested, before any router nesting stripped it.
fn auth_request(
    site_url: &Url,
    method: Method,
    uri: &Uri,
    headers: HeaderMap,
) -> Result<AuthRequest, Error> {
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let url = site_url
        .join(path)
        .map_err(|e| input_error(format!("Invalid request URL: {e}")))?;

    let mut request = AuthRequest::new(method, url);
    request.headers = headers;
    Ok(request)
}

fn parse_opts(opts: Option<&str>) -> Result<Value, Error> {
    match opts {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(raw).map_err(|e| input_error(format!("Invalid opts: {e}")))
        }
        _ => Ok(Value::Object(Default::default())),
    }
}

/// POST login or logout.
pub async fn handle<User>(
    State(app_state): State<AppState<User>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<AuthParams>,
) -> Result<Response, Error>
where
    User: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let opts = parse_opts(params.opts.as_deref())?;
    let request = auth_request(&app_state.site_url, Method::POST, &uri, headers)?;

    match params.action.as_deref() {
        Some("login") => {
            let provider = params
                .provider
                .filter(|provider| !provider.is_empty())
                .ok_or_else(|| input_error("No provider specified"))?;
            let options: AuthenticateOptions = serde_json::from_value(opts)
                .map_err(|e| input_error(format!("Invalid opts: {e}")))?;

            debug!("Login requested with provider {provider}");
            let outcome = app_state
                .authenticator
                .authenticate(&provider, &request, options)
                .await?;
            Ok(outcome_json(&app_state.site_url, outcome))
        }
        Some("logout") => {
            let options: LogoutOptions =
                serde_json::from_value(opts).map_err(|_| input_error("redirectTo is required"))?;

            let redirect = app_state.authenticator.logout(&request, &options).await?;
            Ok(redirect_json(&app_state.site_url, redirect))
        }
        Some(action) => Err(Error::Web(WebErrorKind::UnsupportedAction(
            action.to_string(),
        ))),
        None => Err(input_error("No action specified")),
    }
}

/// GET provider callback.
pub async fn callback<User>(
    State(app_state): State<AppState<User>>,
    Path(provider): Path<String>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Response, Error>
where
    User: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let request = auth_request(&app_state.site_url, Method::GET, &uri, headers)?;

    debug!("Callback received for provider {provider}");
    let outcome = app_state
        .authenticator
        .authenticate(&provider, &request, app_state.callback_options.clone())
        .await?;
    Ok(outcome_navigation(outcome))
}
