//! Password auth and bearer-token issuance.

use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString, rand_core::OsRng},
};
use db::{
    DBService,
    models::profile::{CreateProfile, Profile, ProfileRole},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utils::jwt;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account is disabled")]
    Inactive,
    #[error("email already registered")]
    EmailTaken,
    #[error("password must be at least 8 characters")]
    WeakPassword,
    #[error("password hash error: {0}")]
    Hash(String),
    #[error("token error: {0}")]
    Jwt(#[from] jwt::JwtError),
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct AuthSession {
    pub token: String,
    pub profile: Profile,
}

#[derive(Clone)]
pub struct AuthService {
    db: DBService,
    jwt_secret: String,
    jwt_ttl_hours: i64,
}

impl AuthService {
    pub fn new(db: DBService, jwt_secret: String, jwt_ttl_hours: i64) -> Self {
        Self {
            db,
            jwt_secret,
            jwt_ttl_hours,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    fn verify_password(&self, hash: &str, password: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn issue_token(&self, profile: &Profile) -> Result<String, AuthError> {
        Ok(jwt::mint(
            &self.jwt_secret,
            profile.id,
            &profile.role.to_string(),
            profile.center_id,
            self.jwt_ttl_hours,
        )?)
    }

    pub fn verify_token(&self, token: &str) -> Result<jwt::Claims, AuthError> {
        Ok(jwt::verify(&self.jwt_secret, token)?)
    }

    /// Parent self-signup into a resolved center.
    pub async fn register_parent(
        &self,
        center_id: Uuid,
        req: &RegisterRequest,
    ) -> Result<AuthSession, AuthError> {
        if req.password.len() < 8 {
            return Err(AuthError::WeakPassword);
        }
        if Profile::find_by_email(&self.db.pool, &req.email)
            .await?
            .is_some()
        {
            return Err(AuthError::EmailTaken);
        }
        let hash = self.hash_password(&req.password)?;
        let profile = Profile::create(
            &self.db.pool,
            &CreateProfile {
                center_id: Some(center_id),
                email: req.email.clone(),
                full_name: req.full_name.clone(),
                phone: req.phone.clone(),
                role: ProfileRole::Parent,
            },
            Some(hash),
        )
        .await?;
        let token = self.issue_token(&profile)?;
        Ok(AuthSession { token, profile })
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthSession, AuthError> {
        let profile = Profile::find_by_email(&self.db.pool, &req.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let hash = profile
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.verify_password(hash, &req.password)? {
            return Err(AuthError::InvalidCredentials);
        }
        if !profile.active {
            return Err(AuthError::Inactive);
        }
        let token = self.issue_token(&profile)?;
        Ok(AuthSession { token, profile })
    }
}

#[cfg(test)]
mod tests {
    use db::models::center::{Center, CreateCenter};

    use super::*;

    async fn service() -> (AuthService, DBService) {
        let db = DBService::new_in_memory().await.unwrap();
        let auth = AuthService::new(db.clone(), "test-secret".to_string(), 24);
        (auth, db)
    }

    async fn seed_center(db: &DBService) -> Center {
        let data = CreateCenter {
            name: "Acme Child Center".to_string(),
            slug: None,
            custom_domain: None,
            description: None,
            phone: None,
            email: None,
            address: None,
            city: None,
        };
        Center::create(&db.pool, &data, "acme").await.unwrap()
    }

    #[tokio::test]
    async fn register_then_login() {
        let (auth, db) = service().await;
        let center = seed_center(&db).await;
        let req = RegisterRequest {
            email: "Parent@Example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            full_name: "A Parent".to_string(),
            phone: None,
        };
        let session = auth.register_parent(center.id, &req).await.unwrap();
        assert_eq!(session.profile.role, ProfileRole::Parent);
        assert_eq!(session.profile.center_id, Some(center.id));

        // Email comparison is case-insensitive.
        let login = auth
            .login(&LoginRequest {
                email: "parent@example.com".to_string(),
                password: "hunter2hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.profile.id, session.profile.id);

        let claims = auth.verify_token(&login.token).unwrap();
        assert_eq!(claims.sub, session.profile.id);
        assert_eq!(claims.center_id, Some(center.id));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (auth, db) = service().await;
        let center = seed_center(&db).await;
        let req = RegisterRequest {
            email: "p@example.com".to_string(),
            password: "correct-password".to_string(),
            full_name: "P".to_string(),
            phone: None,
        };
        auth.register_parent(center.id, &req).await.unwrap();
        let err = auth
            .login(&LoginRequest {
                email: "p@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (auth, db) = service().await;
        let center = seed_center(&db).await;
        let req = RegisterRequest {
            email: "dup@example.com".to_string(),
            password: "password-one".to_string(),
            full_name: "Dup".to_string(),
            phone: None,
        };
        auth.register_parent(center.id, &req).await.unwrap();
        let err = auth.register_parent(center.id, &req).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }
}
