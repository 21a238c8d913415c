use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use mockito::{Matcher, Server, ServerGuard};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use solid_auth::oauth::providers::discord;
use solid_auth::oauth::{Endpoints, OAuth2Options, OAuth2Strategy, VerifyParams};
use solid_auth::{AuthRedirects, AuthRequest, AuthState, Authenticator, MemorySessionStorage};
use tower::ServiceExt;
use url::Url;
use web::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: String,
    username: String,
    email: Option<String>,
}

fn authenticator(server: &ServerGuard) -> Arc<Authenticator<User>> {
    let provider = discord::Provider::new().with_endpoints(Endpoints {
        authorization_url: "https://discord.com/api/oauth2/authorize".to_string(),
        token_url: format!("{}/api/oauth2/token", server.url()),
        user_info_url: format!("{}/api/users/@me", server.url()),
    });
    let strategy = OAuth2Strategy::new(
        OAuth2Options::new(
            "discord-client",
            "discord-secret",
            "https://app.test/api/auth/discord/callback",
        ),
        provider,
        |params: VerifyParams| async move {
            Ok::<_, solid_auth::Error>(User {
                id: params.profile.id.clone(),
                username: params.profile.display_name.clone(),
                email: params.profile.email().map(str::to_string),
            })
        },
    )
    .unwrap();

    let mut authenticator = Authenticator::new(Arc::new(MemorySessionStorage::new()));
    authenticator.use_strategy(strategy, None);
    Arc::new(authenticator)
}

fn router(authenticator: Arc<Authenticator<User>>) -> Router {
    let app_state = AppState::new(authenticator, Url::parse("https://app.test").unwrap());
    web::router::define_routes(app_state, "/api/auth")
}

fn cookie_pair(response: &Response) -> String {
    let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn start_login(app: Router) -> (Url, String) {
    let mut uri = Url::parse("https://app.test/api/auth").unwrap();
    uri.query_pairs_mut()
        .append_pair("type", "login")
        .append_pair("provider", "discord")
        .append_pair("opts", r#"{"successRedirect":"/","failureRedirect":"/"}"#);
    let request = Request::builder()
        .method("POST")
        .uri(&uri[url::Position::BeforePath..])
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = cookie_pair(&response);
    let body = body_json(response).await;
    let redirect = Url::parse(body["redirect"].as_str().unwrap()).unwrap();
    (redirect, cookie)
}

fn state_of(url: &Url) -> String {
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .unwrap()
}

#[tokio::test]
async fn test_login_starts_at_discord_authorization_url() {
    let server = Server::new_async().await;
    let app = router(authenticator(&server));

    let (redirect, _cookie) = start_login(app).await;

    assert_eq!(redirect.host_str(), Some("discord.com"));
    assert_eq!(redirect.path(), "/api/oauth2/authorize");
    let query: std::collections::HashMap<_, _> = redirect.query_pairs().into_owned().collect();
    assert_eq!(query["client_id"], "discord-client");
    assert_eq!(
        query["redirect_uri"],
        "https://app.test/api/auth/discord/callback"
    );
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["scope"], "identify email");
    assert!(!query["state"].is_empty());
}

#[tokio::test]
async fn test_callback_stores_user_and_redirects_home() {
    let mut server = Server::new_async().await;
    let token_mock = server
        .mock("POST", "/api/oauth2/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("code".into(), "abc".into()),
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "discord-access",
                "token_type": "Bearer",
                "expires_in": 604800,
                "refresh_token": "discord-refresh",
                "scope": "identify email"
            })
            .to_string(),
        )
        .create_async()
        .await;
    let profile_mock = server
        .mock("GET", "/api/users/@me")
        .match_header("authorization", "Bearer discord-access")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "80351110224678912",
                "username": "nelly",
                "discriminator": "1337",
                "avatar": "8342729096ea3675442027381ff50dfe",
                "email": "nelly@discord.com"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let authenticator = authenticator(&server);
    let (redirect, cookie) = start_login(router(authenticator.clone())).await;
    let state = state_of(&redirect);

    let request = Request::builder()
        .uri(format!(
            "/api/auth/discord/callback?code=abc&state={state}"
        ))
        .header(COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = router(authenticator.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/");
    token_mock.assert_async().await;
    profile_mock.assert_async().await;

    let request = AuthRequest::get(Url::parse("https://app.test/").unwrap())
        .with_cookie(&cookie_pair(&response));
    let auth_state = authenticator
        .is_authenticated(&request, &AuthRedirects::default())
        .await
        .unwrap();
    assert_eq!(
        auth_state,
        AuthState::Authenticated(User {
            id: "80351110224678912".to_string(),
            username: "nelly".to_string(),
            email: Some("nelly@discord.com".to_string()),
        })
    );
}

#[tokio::test]
async fn test_replayed_callback_with_forged_state_fails() {
    let mut server = Server::new_async().await;
    let token_mock = server
        .mock("POST", "/api/oauth2/token")
        .expect(0)
        .create_async()
        .await;

    let authenticator = authenticator(&server);
    let (_redirect, cookie) = start_login(router(authenticator.clone())).await;

    let request = Request::builder()
        .uri("/api/auth/discord/callback?code=abc&state=forged")
        .header(COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = router(authenticator).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "invalid_state: State doesn't match." })
    );
    token_mock.assert_async().await;
}
