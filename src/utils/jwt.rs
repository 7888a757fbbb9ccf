use actix_web::HttpRequest;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Admin id
    pub exp: usize,  // Expiration timestamp
}

/// HS256 signing material, built once from configuration.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::days(ttl_days),
        }
    }

    pub fn generate_token(&self, admin_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let expiration = (chrono::Utc::now() + self.ttl).timestamp().max(0) as usize;

        let claims = Claims {
            sub: admin_id.to_string(),
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &self.decoding,
            &Validation::new(jsonwebtoken::Algorithm::HS256),
        )
        .map(|data| data.claims)
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|auth| auth.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Claims of the admin making `req`, or `Unauthorized`.
pub fn authorize(req: &HttpRequest, keys: &JwtKeys) -> Result<Claims, AppError> {
    let token = bearer_token(req).ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;
    keys.validate_token(token)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}
