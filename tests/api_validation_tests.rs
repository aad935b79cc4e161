//! Request validation at the handler boundary. Every case here must be
//! rejected before the handler touches the database, so the suite runs
//! against a pool that never connects.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::{auth_header, test_app, test_app_with_config, test_config};

async fn send_json(
    app: axum::Router,
    method: &str,
    uri: &str,
    auth: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn error_message(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    value["error"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn workout_with_too_few_exercises_is_rejected() {
    let (auth, _) = auth_header();

    let body = json!({
        "name": "Push day",
        "exercises": [
            { "exercise_id": Uuid::new_v4(), "sets": 3, "reps": 10 },
            { "exercise_id": Uuid::new_v4(), "sets": 3, "reps": 10 }
        ]
    });

    let response = send_json(test_app(), "POST", "/api/workouts", &auth, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.contains("at least 3"));
}

#[tokio::test]
async fn workout_with_blank_name_is_rejected() {
    let (auth, _) = auth_header();

    let exercises: Vec<_> = (0..3)
        .map(|_| json!({ "exercise_id": Uuid::new_v4(), "sets": 3, "reps": 10 }))
        .collect();
    let body = json!({ "name": "   ", "exercises": exercises });

    let response = send_json(test_app(), "POST", "/api/workouts", &auth, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn workout_with_nonpositive_reps_is_rejected() {
    let (auth, _) = auth_header();

    let exercises: Vec<_> = (0..3)
        .map(|_| json!({ "exercise_id": Uuid::new_v4(), "sets": 3, "reps": 0 }))
        .collect();
    let body = json!({ "name": "Leg day", "exercises": exercises });

    let response = send_json(test_app(), "POST", "/api/workouts", &auth, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_save_missing_workout_id_is_a_400_not_a_422() {
    let (auth, _) = auth_header();

    let body = json!({
        "started_at": "2026-08-01T10:00:00Z",
        "ended_at": "2026-08-01T10:45:00Z",
        "duration_secs": 2700,
        "exercises": []
    });

    let response = send_json(test_app(), "POST", "/api/workout-sessions", &auth, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.contains("workout_id"));
}

#[tokio::test]
async fn session_save_with_negative_duration_is_rejected() {
    let (auth, _) = auth_header();

    let body = json!({
        "workout_id": Uuid::new_v4(),
        "started_at": "2026-08-01T10:00:00Z",
        "ended_at": "2026-08-01T10:45:00Z",
        "duration_secs": -5
    });

    let response = send_json(test_app(), "POST", "/api/workout-sessions", &auth, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_save_with_inverted_time_range_is_rejected() {
    let (auth, _) = auth_header();

    let body = json!({
        "workout_id": Uuid::new_v4(),
        "started_at": "2026-08-01T11:00:00Z",
        "ended_at": "2026-08-01T10:00:00Z",
        "duration_secs": 3600
    });

    let response = send_json(test_app(), "POST", "/api/workout-sessions", &auth, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn progress_entry_without_metrics_is_rejected() {
    let (auth, _) = auth_header();

    let response = send_json(test_app(), "POST", "/api/progress", &auth, json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn progress_entry_with_nonpositive_metric_is_rejected() {
    let (auth, _) = auth_header();

    let body = json!({ "weight_kg": -80.0 });
    let response = send_json(test_app(), "POST", "/api/progress", &auth, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_goal_slug_is_rejected() {
    let (auth, _) = auth_header();

    let body = json!({ "goals": ["become_taller"] });
    let response = send_json(test_app(), "PUT", "/api/goals", &auth, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_playlist_name_is_rejected() {
    let (auth, _) = auth_header();

    let body = json!({ "name": "" });
    let response = send_json(test_app(), "POST", "/api/spotify/playlists", &auth, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_player_action_is_rejected() {
    let (auth, _) = auth_header();

    let response = test_app()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/spotify/player/rewind")
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_setup_is_hidden_when_no_secret_is_configured() {
    let (auth, _) = auth_header();

    let body = json!({ "secret": "whatever" });
    let response = send_json(test_app(), "POST", "/api/admin/setup", &auth, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_setup_rejects_a_wrong_secret() {
    let mut config = test_config();
    config.admin_setup_secret = Some("real-secret".to_string());
    let (auth, _) = auth_header();

    let body = json!({ "secret": "guessed-secret" });
    let response = send_json(
        test_app_with_config(config),
        "POST",
        "/api/admin/setup",
        &auth,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
