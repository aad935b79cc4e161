use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub oauth_state_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub admin_setup_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = env::var("JWT_EXPIRATION")?
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            // OAuth state tokens only need to survive the redirect round-trip
            oauth_state_expiration_secs: env::var("OAUTH_STATE_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".to_string()),
            spotify_client_id: env::var("SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: env::var("SPOTIFY_CLIENT_SECRET")?,
            spotify_redirect_uri: env::var("SPOTIFY_REDIRECT_URI")?,
            admin_setup_secret: env::var("ADMIN_SETUP_SECRET").ok(),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn oauth_state_expiration(&self) -> Duration {
        Duration::from_secs(self.oauth_state_expiration_secs)
    }
}
