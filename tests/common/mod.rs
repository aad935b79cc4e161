// Each test binary compiles its own copy; not every helper is used by all.
#![allow(dead_code)]

use axum::Router;
use fittrack_backend::{
    AppState, build_router, config::Config, services::spotify::SpotifyClient,
    utils::generate_token,
};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://postgres@localhost:1/unreachable".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiration_secs: 3600,
        oauth_state_expiration_secs: 600,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        api_base_uri: "/api".to_string(),
        spotify_client_id: "test-client".to_string(),
        spotify_client_secret: "test-secret".to_string(),
        spotify_redirect_uri: "http://localhost:3000/api/spotify/callback".to_string(),
        admin_setup_secret: None,
    }
}

/// App wired against a lazy pool that never connects. Good for exercising
/// every path that must reject before the first query runs.
pub fn test_app() -> Router {
    test_app_with_config(test_config())
}

pub fn test_app_with_config(config: Config) -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");

    app_over_pool(pool, config)
}

/// App wired against a live pool, for suites that verify persistence.
pub fn app_with_pool(pool: sqlx::PgPool) -> Router {
    app_over_pool(pool, test_config())
}

fn app_over_pool(pool: sqlx::PgPool, config: Config) -> Router {
    let spotify = SpotifyClient::new(
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
        config.spotify_redirect_uri.clone(),
    );

    build_router(AppState {
        pool,
        config,
        spotify,
    })
}

pub fn auth_header() -> (String, Uuid) {
    let user_id = Uuid::new_v4();
    (bearer_for(user_id), user_id)
}

pub fn bearer_for(user_id: Uuid) -> String {
    let (token, _) = generate_token(user_id, "tester@example.com", &test_config()).unwrap();
    format!("Bearer {token}")
}
