use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

/// Claims carried by the bearer token the login service issues.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Opaque user id.
    pub sub: String,
    /// Expiry as a unix timestamp.
    pub exp: usize,
}

/// The caller's identity as injected by the auth gate.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Verifies the bearer token and extracts the caller's identity. Auth-gated
/// routes call this before touching any store; everything past this point
/// trusts `user_id` over anything the request body claims.
pub fn authenticate(headers: &HeaderMap, config: &Config) -> Result<AuthenticatedUser, AppError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

    let key = DecodingKey::from_secret(config.auth_token_secret.expose_secret().as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default())
        .map_err(|_| AppError::Unauthorized)?;

    Ok(AuthenticatedUser {
        user_id: token_data.claims.sub,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use secrecy::Secret;

    fn test_config() -> Config {
        Config {
            database_url: "mongodb://127.0.0.1:27017".to_string(),
            database_name: "storefront_test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            auth_token_secret: Secret::new("test-secret".to_string()),
        }
    }

    fn token_for(user_id: &str, secret: &str) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_resolves_identity() {
        let config = test_config();
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token_for("u1", "test-secret"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        let caller = authenticate(&headers, &config).unwrap();
        assert_eq!(caller.user_id, "u1");
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let config = test_config();
        let headers = HeaderMap::new();
        assert!(matches!(
            authenticate(&headers, &config),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let config = test_config();
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token_for("u1", "other-secret"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        assert!(matches!(
            authenticate(&headers, &config),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn non_bearer_scheme_is_unauthorized() {
        let config = test_config();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        assert!(matches!(
            authenticate(&headers, &config),
            Err(AppError::Unauthorized)
        ));
    }
}
