//! Bearer token minting and verification for API auth.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
}

/// Claims carried by a signed-in profile's bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Profile id.
    pub sub: Uuid,
    /// Role name, lowercase (`super_admin`, `admin`, `therapist`, `parent`).
    pub role: String,
    /// Home center of the profile, absent for super admins.
    pub center_id: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

pub fn mint(
    secret: &str,
    profile_id: Uuid,
    role: &str,
    center_id: Option<Uuid>,
    ttl_hours: i64,
) -> Result<String, JwtError> {
    let now = Utc::now();
    let claims = Claims {
        sub: profile_id,
        role: role.to_string(),
        center_id,
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn verify(secret: &str, token: &str) -> Result<Claims, JwtError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Token(e),
    })?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_then_verify_round_trips_claims() {
        let id = Uuid::new_v4();
        let center = Uuid::new_v4();
        let token = mint("test-secret", id, "admin", Some(center), 24).unwrap();
        let claims = verify("test-secret", &token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.center_id, Some(center));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = mint("secret-a", Uuid::new_v4(), "parent", None, 24).unwrap();
        assert!(verify("secret-b", &token).is_err());
    }
}
