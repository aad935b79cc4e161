//! Authentication middleware behavior: protected routes reject before any
//! query executes, so these run against a pool that never connects.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::{auth_header, test_app};

async fn error_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/workouts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = error_body(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn garbage_bearer_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/progress/summary")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_wrong_secret_is_unauthorized() {
    let mut other = common::test_config();
    other.jwt_secret = "some-other-secret".to_string();
    let (token, _) =
        fittrack_backend::utils::generate_token(uuid::Uuid::new_v4(), "x@y.test", &other).unwrap();

    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/goals")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_cookie_is_accepted_as_credential() {
    // A valid cookie must get past the auth middleware; the handler then
    // fails on the unreachable database, proving the credential was accepted.
    let (auth, _) = auth_header();
    let token = auth.strip_prefix("Bearer ").unwrap();

    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/goals")
                .header(header::COOKIE, format!("session_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn public_routes_do_not_require_a_token() {
    // Missing state parameter -> 400 from the callback handler itself, not a
    // 401 from the middleware.
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/spotify/callback?code=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
