use crate::controller::{auth_controller, health_check_controller};
use crate::AppState;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Routes of the authentication entry point, relative to its mount path.
pub fn create_auth_handler<User>(app_state: AppState<User>) -> Router
where
    User: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(auth_controller::handle::<User>))
        .route(
            "/{provider}/callback",
            get(auth_controller::callback::<User>),
        )
        .with_state(app_state)
}

pub fn define_routes<User>(app_state: AppState<User>, auth_path: &str) -> Router
where
    User: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    Router::new()
        .nest(auth_path, create_auth_handler(app_state))
        .merge(health_routes())
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

/// Allow credentialed requests from the configured origins only.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{LOCATION, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use solid_auth::error::{authorization_error, AuthorizationErrorKind};
    use solid_auth::strategy::{failure, success};
    use solid_auth::{
        AuthRequest, Authenticator, Error, MemorySessionStorage, Outcome, Redirect,
        SessionStorage, Strategy, StrategyOptions,
    };
    use std::sync::Arc;
    use tower::ServiceExt;
    use url::Url;

    /// Redirects logins to a fake provider and accepts callbacks with `code=good`.
    struct FakeProvider;

    #[async_trait]
    impl Strategy<Value> for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn authenticate(
            &self,
            request: AuthRequest,
            storage: &dyn SessionStorage,
            options: &StrategyOptions,
        ) -> Result<Outcome<Value>, Error> {
            let session = storage.get_session(request.cookie()).await?;
            match request.query_param("code").as_deref() {
                None => Ok(Outcome::Redirect(Redirect::to(
                    "https://provider.test/authorize?state=s",
                ))),
                Some("good") => success(json!({ "id": "u-1" }), session, storage, options).await,
                Some(_) => {
                    let err = authorization_error(
                        AuthorizationErrorKind::InvalidState,
                        "State doesn't match.",
                    );
                    failure(err, session, storage, options).await
                }
            }
        }
    }

    fn app() -> (Router, Arc<Authenticator<Value>>) {
        let mut authenticator = Authenticator::new(Arc::new(MemorySessionStorage::new()));
        authenticator.use_strategy(FakeProvider, None);
        let authenticator = Arc::new(authenticator);

        let app_state = AppState::new(authenticator.clone(), Url::parse("https://app.test").unwrap());
        (define_routes(app_state, "/api/auth"), authenticator)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = app();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_answers_redirect_as_json() {
        let (app, _) = app();
        let response = app
            .oneshot(post("/api/auth?type=login&provider=fake&opts=%7B%7D"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[LOCATION],
            "https://provider.test/authorize?state=s"
        );
        assert_eq!(
            body_json(response).await,
            json!({ "redirect": "https://provider.test/authorize?state=s" })
        );
    }

    #[tokio::test]
    async fn test_login_without_provider_is_rejected() {
        let (app, _) = app();
        let response = app.oneshot(post("/api/auth?type=login")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "No provider specified" })
        );
    }

    #[tokio::test]
    async fn test_login_with_unknown_provider_is_500() {
        let (app, _) = app();
        let response = app
            .oneshot(post("/api/auth?type=login&provider=github"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "strategy_not_found: Strategy github not found." })
        );
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() {
        let (app, _) = app();
        let response = app.oneshot(post("/api/auth?type=refresh")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_requires_redirect_to() {
        let (app, _) = app();
        let response = app
            .oneshot(post("/api/auth?type=logout&opts=%7B%7D"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "redirectTo is required" })
        );
    }

    #[tokio::test]
    async fn test_logout_clears_cookie_and_redirects() {
        let (app, _) = app();
        let response = app
            .oneshot(post(
                "/api/auth?type=logout&opts=%7B%22redirectTo%22%3A%22%2Flogin%22%7D",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[LOCATION], "https://app.test/login");
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));
        assert_eq!(
            body_json(response).await,
            json!({ "redirect": "https://app.test/login" })
        );
    }

    #[tokio::test]
    async fn test_callback_redirects_with_session_cookie() {
        let (app, authenticator) = app();
        let request = Request::builder()
            .uri("/api/auth/fake/callback?code=good&state=s")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/");

        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        let cookie = set_cookie.split(';').next().unwrap();
        let mut session = authenticator
            .session_storage()
            .get_session(Some(cookie))
            .await
            .unwrap();
        assert_eq!(session.get("user"), Some(json!({ "id": "u-1" })));
    }

    #[tokio::test]
    async fn test_callback_failure_without_failure_redirect_is_500() {
        let (app, _) = app();
        let request = Request::builder()
            .uri("/api/auth/fake/callback?code=bad&state=s")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "invalid_state: State doesn't match." })
        );
    }
}
