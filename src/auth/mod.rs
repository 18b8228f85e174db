use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::config_loader;
use crate::domain::value_objects::enums::account_roles::AccountRole;
use crate::domain::value_objects::iam::Requester;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub email: Option<String>,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthAccount {
    pub account_id: Uuid,
    pub email: Option<String>,
    pub role: AccountRole,
}

impl AuthAccount {
    pub fn requester(&self) -> Requester {
        Requester {
            account_id: self.account_id,
            role: self.role,
        }
    }
}

pub fn validate_jwt(token: &str) -> Result<Claims, anyhow::Error> {
    let secret = config_loader::get_auth_secret()?.jwt_secret;

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthAccount
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let auth_str = auth_header.to_str().map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            )
        })?;

        if !auth_str.starts_with("Bearer ") {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format".to_string(),
            ));
        }

        let token = &auth_str[7..];

        let claims = validate_jwt(token)
            .map_err(|e| (StatusCode::UNAUTHORIZED, format!("Unauthorized: {}", e)))?;

        let account_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid account ID in token".to_string(),
            )
        })?;

        Ok(AuthAccount {
            account_id,
            email: claims.email,
            role: AccountRole::from_str(&claims.role).unwrap_or(AccountRole::User),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::env;

    fn set_env_vars() {
        unsafe {
            env::set_var("JWT_SECRET", "supersecretjwtsecretforunittesting123");
        }
    }

    fn token_for(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn validates_well_formed_token() {
        set_env_vars();
        let claims = Claims {
            sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            role: "admin".to_string(),
            email: Some("admin@example.com".to_string()),
            exp: 9999999999,
        };

        let token = token_for(&claims, "supersecretjwtsecretforunittesting123");
        let decoded = validate_jwt(&token).expect("valid token should pass");
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, "admin");
    }

    #[test]
    fn rejects_expired_token() {
        set_env_vars();
        let claims = Claims {
            sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            role: "user".to_string(),
            email: None,
            exp: 1,
        };

        let token = token_for(&claims, "supersecretjwtsecretforunittesting123");
        assert!(validate_jwt(&token).is_err());
    }

    #[test]
    fn rejects_wrong_signature() {
        set_env_vars();
        let claims = Claims {
            sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            role: "user".to_string(),
            email: None,
            exp: 9999999999,
        };

        let token = token_for(&claims, "wrongsecret");
        assert!(validate_jwt(&token).is_err());
    }
}
