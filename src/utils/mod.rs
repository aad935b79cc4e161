use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

pub fn generate_token(
    user_id: Uuid,
    email: &str,
    config: &Config,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(config.jwt_expiration().as_secs() as i64))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: expiration,
        iat: Utc::now().timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok((token, expiration))
}

pub fn verify_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Claims carried by the Spotify OAuth `state` parameter. The `purpose` field
/// keeps a session token from being replayed as a state token.
#[derive(Debug, Serialize, Deserialize)]
pub struct OAuthStateClaims {
    pub sub: Uuid,
    pub purpose: String,
    pub exp: i64,
    pub iat: i64,
}

const OAUTH_STATE_PURPOSE: &str = "spotify_oauth";

pub fn generate_oauth_state(
    user_id: Uuid,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(
            config.oauth_state_expiration().as_secs() as i64,
        ))
        .expect("valid timestamp")
        .timestamp();

    let claims = OAuthStateClaims {
        sub: user_id,
        purpose: OAUTH_STATE_PURPOSE.to_string(),
        exp: expiration,
        iat: Utc::now().timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

pub fn verify_oauth_state(
    state: &str,
    config: &Config,
) -> Result<Uuid, jsonwebtoken::errors::Error> {
    let token_data = decode::<OAuthStateClaims>(
        state,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    if token_data.claims.purpose != OAUTH_STATE_PURPOSE {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
    }

    Ok(token_data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_secs: 3600,
            oauth_state_expiration_secs: 600,
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            api_base_uri: "/api".to_string(),
            spotify_client_id: "client".to_string(),
            spotify_client_secret: "secret".to_string(),
            spotify_redirect_uri: "http://localhost/api/spotify/callback".to_string(),
            admin_setup_secret: None,
        }
    }

    #[test]
    fn token_round_trip() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let (token, exp) = generate_token(user_id, "a@b.test", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@b.test");
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn tampered_token_rejected() {
        let config = test_config();
        let (token, _) = generate_token(Uuid::new_v4(), "a@b.test", &config).unwrap();
        let mut other = test_config();
        other.jwt_secret = "different-secret".to_string();
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn oauth_state_round_trip() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let state = generate_oauth_state(user_id, &config).unwrap();
        assert_eq!(verify_oauth_state(&state, &config).unwrap(), user_id);
    }

    #[test]
    fn session_token_is_not_a_valid_state() {
        let config = test_config();
        let (token, _) = generate_token(Uuid::new_v4(), "a@b.test", &config).unwrap();
        assert!(verify_oauth_state(&token, &config).is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hashed = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hashed).unwrap());
        assert!(!verify_password("hunter23", &hashed).unwrap());
    }
}
