use std::net::{IpAddr, SocketAddr};

use fittrack_backend::{AppState, build_router, config::Config, services::spotify::SpotifyClient};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'fittrack_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let spotify = SpotifyClient::new(
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
        config.spotify_redirect_uri.clone(),
    );

    let state = AppState {
        pool,
        config: config.clone(),
        spotify,
    };

    let app = build_router(state.clone());

    // CORS is wide open in development builds only.
    #[cfg(debug_assertions)]
    let app = {
        tracing::info!("Running in debug mode with CORS enabled");
        app.layer(tower_http::cors::CorsLayer::permissive())
    };

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
