use axum::{
    Router,
    routing::{delete, get, post, put},
};
use config::Config;
use services::spotify::SpotifyClient;
use sqlx::PgPool;

pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub spotify: SpotifyClient,
}

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        // Identified by the signed OAuth state, not a session cookie.
        .route("/spotify/callback", get(routes::spotify::oauth_callback));

    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/users/profile", put(routes::users::update_profile))
        .route("/users/onboarding", post(routes::users::complete_onboarding))
        // Exercise catalog
        .route("/exercises", get(routes::exercises::list_exercises))
        .route("/exercises", post(routes::exercises::create_exercise))
        .route("/exercises/{id}", get(routes::exercises::get_exercise))
        // Workouts
        .route("/workouts", get(routes::workouts::list_workouts))
        .route("/workouts", post(routes::workouts::create_workout))
        .route("/workouts/{id}", get(routes::workouts::get_workout))
        .route("/workouts/{id}", put(routes::workouts::update_workout))
        .route("/workouts/{id}", delete(routes::workouts::delete_workout))
        // Workout sessions
        .route("/workout-sessions", post(routes::sessions::save_session))
        .route("/workout-sessions", get(routes::sessions::list_sessions))
        .route("/workout-sessions/{id}", get(routes::sessions::get_session))
        // Body progress
        .route("/progress", get(routes::progress::list_entries))
        .route("/progress", post(routes::progress::create_entry))
        .route("/progress/summary", get(routes::progress::get_summary))
        .route("/progress/{id}", delete(routes::progress::delete_entry))
        // Fitness goals
        .route("/goals", get(routes::goals::get_goals))
        .route("/goals", put(routes::goals::update_goals))
        // Spotify panel
        .route("/spotify/auth", get(routes::spotify::connect))
        .route("/spotify/status", get(routes::spotify::status))
        .route("/spotify/disconnect", delete(routes::spotify::disconnect))
        .route("/spotify/profile", get(routes::spotify::get_profile))
        .route("/spotify/playlists", get(routes::spotify::get_playlists))
        .route("/spotify/playlists", post(routes::spotify::create_playlist))
        .route(
            "/spotify/playlists/{id}/tracks",
            post(routes::spotify::add_tracks),
        )
        .route("/spotify/playback", get(routes::spotify::get_playback))
        .route(
            "/spotify/player/{action}",
            put(routes::spotify::transport_control),
        )
        // Admin console (role checked per request inside the handlers)
        .route("/admin/users", get(routes::admin::list_users))
        .route("/admin/users/{id}", get(routes::admin::get_user_detail))
        .route("/admin/users/{id}", put(routes::admin::update_user))
        .route("/admin/users/{id}", delete(routes::admin::delete_user))
        .route("/admin/setup", post(routes::admin::admin_setup))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let router = Router::new().nest(
        &state.config.api_base_uri,
        Router::new().merge(public_routes).merge(protected_routes),
    );

    let router = router.layer(axum::middleware::from_fn(middleware::log_errors));

    router.with_state(state)
}
