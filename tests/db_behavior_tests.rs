//! Persistence behavior against a real database: what a request actually
//! leaves behind in the tables. Each test is a no-op unless
//! `TEST_DATABASE_URL` points at a disposable Postgres instance.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use common::{app_with_pool, bearer_for};

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");

    sqlx::migrate!().run(&pool).await.expect("apply migrations");

    Some(pool)
}

async fn seed_user(pool: &PgPool, role: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, name, role)
         VALUES ($1, 'Tester', $2)
         RETURNING id",
    )
    .bind(format!("{}@example.test", Uuid::new_v4()))
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_exercise(pool: &PgPool) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO exercises (name, muscle_group, difficulty)
         VALUES ($1, 'chest', 'beginner')
         RETURNING id",
    )
    .bind(format!("Bench press {}", Uuid::new_v4()))
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_workout(pool: &PgPool, user_id: Uuid) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO workouts (user_id, name)
         VALUES ($1, 'Push day')
         RETURNING id",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

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

#[tokio::test]
async fn session_save_persists_the_valid_subset_of_exercises() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let user_id = seed_user(&pool, "user").await;
    let exercise_id = seed_exercise(&pool).await;
    let workout_id = seed_workout(&pool, user_id).await;

    let body = json!({
        "workout_id": workout_id,
        "started_at": "2026-08-01T10:00:00Z",
        "ended_at": "2026-08-01T10:45:00Z",
        "duration_secs": 2700,
        "exercises": [
            {
                "exercise_id": exercise_id,
                "sets": [{ "target_reps": 10, "target_weight": 60.0, "completed": true }]
            },
            {
                "exercise_id": Uuid::new_v4(),
                "sets": [{ "target_reps": 8 }]
            }
        ]
    });

    let response = send_json(
        app_with_pool(pool.clone()),
        "POST",
        "/api/workout-sessions",
        &bearer_for(user_id),
        body,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let created: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let session_id: Uuid = created["id"].as_str().unwrap().parse().unwrap();

    // The unresolvable reference was dropped, the real one was saved.
    let exercise_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM session_exercises WHERE session_id = $1",
    )
    .bind(session_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(exercise_count, 1);

    // Actuals default to the targets when the client omits them.
    let (actual_reps, actual_weight) = sqlx::query_as::<_, (Option<i32>, Option<f64>)>(
        "SELECT ss.actual_reps, ss.actual_weight
         FROM session_sets ss
         JOIN session_exercises se ON se.id = ss.session_exercise_id
         WHERE se.session_id = $1",
    )
    .bind(session_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(actual_reps, Some(10));
    assert_eq!(actual_weight, Some(60.0));
}

#[tokio::test]
async fn deleting_a_non_owned_workout_is_forbidden_and_leaves_it_intact() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner_id = seed_user(&pool, "user").await;
    let intruder_id = seed_user(&pool, "user").await;
    let workout_id = seed_workout(&pool, owner_id).await;

    let response = app_with_pool(pool.clone())
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/workouts/{workout_id}"))
                .header(header::AUTHORIZATION, bearer_for(intruder_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workouts WHERE id = $1")
        .bind(workout_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn admin_cannot_delete_their_own_account() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let admin_id = seed_user(&pool, "admin").await;

    let response = app_with_pool(pool.clone())
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/users/{admin_id}"))
                .header(header::AUTHORIZATION, bearer_for(admin_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(admin_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}
