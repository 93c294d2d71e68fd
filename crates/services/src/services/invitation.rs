//! Staff invitation flow: an admin invites an email into their center, the
//! invitee redeems the token to set a password and activate the account.

use chrono::{Duration, Utc};
use db::{
    DBService,
    models::{
        invitation::{Invitation, InvitationStatus},
        profile::{Profile, ProfileRole},
    },
};
use rand::{Rng, distributions::Alphanumeric};
use serde::Deserialize;
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

const TOKEN_LEN: usize = 40;
const EXPIRY_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("only center admins can invite users")]
    Forbidden,
    #[error("cannot invite a super admin")]
    RoleNotInvitable,
    #[error("invitation not found")]
    NotFound,
    #[error("invitation expired")]
    Expired,
    #[error("invitation already accepted")]
    AlreadyAccepted,
    #[error("profile for invitation is missing")]
    ProfileMissing,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct InviteRequest {
    pub email: String,
    pub full_name: String,
    pub role: ProfileRole,
}

#[derive(Clone)]
pub struct InvitationService {
    db: DBService,
}

impl InvitationService {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    fn generate_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect()
    }

    /// Create (or refresh) an invitation into `center_id`. The caller must be
    /// an admin of that center, or a super admin.
    pub async fn invite(
        &self,
        center_id: Uuid,
        inviter: &Profile,
        req: &InviteRequest,
    ) -> Result<Invitation, InvitationError> {
        let allowed = inviter.role.is_super_admin()
            || (inviter.role == ProfileRole::Admin && inviter.center_id == Some(center_id));
        if !allowed {
            return Err(InvitationError::Forbidden);
        }
        if req.role == ProfileRole::SuperAdmin {
            return Err(InvitationError::RoleNotInvitable);
        }

        let token = Self::generate_token();
        let expires_at = Utc::now() + Duration::days(EXPIRY_DAYS);

        Profile::upsert_invited(&self.db.pool, center_id, &req.email, &req.full_name, &req.role)
            .await?;

        let invitation =
            match Invitation::find_pending(&self.db.pool, center_id, &req.email).await? {
                Some(existing) => {
                    Invitation::refresh(&self.db.pool, existing.id, &token, expires_at).await?
                }
                None => {
                    Invitation::create(
                        &self.db.pool,
                        center_id,
                        &req.email,
                        &req.role,
                        &token,
                        inviter.id,
                        expires_at,
                    )
                    .await?
                }
            };

        tracing::info!(
            center_id = %center_id,
            email = %invitation.email,
            role = %invitation.role,
            "invitation issued"
        );
        Ok(invitation)
    }

    /// Redeem a token: set the invitee's password hash and activate the
    /// profile.
    pub async fn accept(
        &self,
        token: &str,
        password_hash: &str,
    ) -> Result<Profile, InvitationError> {
        let invitation = Invitation::find_by_token(&self.db.pool, token)
            .await?
            .ok_or(InvitationError::NotFound)?;

        match invitation.status {
            InvitationStatus::Accepted => return Err(InvitationError::AlreadyAccepted),
            InvitationStatus::Expired => return Err(InvitationError::Expired),
            InvitationStatus::Pending => {}
        }
        if invitation.expires_at < Utc::now() {
            Invitation::set_status(&self.db.pool, invitation.id, InvitationStatus::Expired)
                .await?;
            return Err(InvitationError::Expired);
        }

        let profile = Profile::find_by_email(&self.db.pool, &invitation.email)
            .await?
            .ok_or(InvitationError::ProfileMissing)?;
        Profile::set_password_and_activate(&self.db.pool, profile.id, password_hash).await?;
        Invitation::set_status(&self.db.pool, invitation.id, InvitationStatus::Accepted).await?;

        Profile::find_by_id(&self.db.pool, profile.id)
            .await?
            .ok_or(InvitationError::ProfileMissing)
    }

    pub async fn list(&self, center_id: Uuid) -> Result<Vec<Invitation>, InvitationError> {
        Ok(Invitation::list_by_center(&self.db.pool, center_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use db::models::center::{Center, CreateCenter};

    use super::*;

    async fn setup() -> (InvitationService, DBService, Center, Profile) {
        let db = DBService::new_in_memory().await.unwrap();
        let center = Center::create(
            &db.pool,
            &CreateCenter {
                name: "Acme".to_string(),
                slug: None,
                custom_domain: None,
                description: None,
                phone: None,
                email: None,
                address: None,
                city: None,
            },
            "acme",
        )
        .await
        .unwrap();
        let admin = Profile::create(
            &db.pool,
            &db::models::profile::CreateProfile {
                center_id: Some(center.id),
                email: "admin@acme.test".to_string(),
                full_name: "Admin".to_string(),
                phone: None,
                role: ProfileRole::Admin,
            },
            Some("unused".to_string()),
        )
        .await
        .unwrap();
        (InvitationService::new(db.clone()), db, center, admin)
    }

    #[tokio::test]
    async fn invite_creates_placeholder_profile_and_token() {
        let (svc, db, center, admin) = setup().await;
        let invitation = svc
            .invite(
                center.id,
                &admin,
                &InviteRequest {
                    email: "therapist@acme.test".to_string(),
                    full_name: "New Therapist".to_string(),
                    role: ProfileRole::Therapist,
                },
            )
            .await
            .unwrap();
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(invitation.token.len(), TOKEN_LEN);

        let placeholder = Profile::find_by_email(&db.pool, "therapist@acme.test")
            .await
            .unwrap()
            .unwrap();
        assert!(placeholder.password_hash.is_none());
        assert_eq!(placeholder.role, ProfileRole::Therapist);
    }

    #[tokio::test]
    async fn reinvite_refreshes_the_pending_token() {
        let (svc, _db, center, admin) = setup().await;
        let req = InviteRequest {
            email: "t@acme.test".to_string(),
            full_name: "T".to_string(),
            role: ProfileRole::Therapist,
        };
        let first = svc.invite(center.id, &admin, &req).await.unwrap();
        let second = svc.invite(center.id, &admin, &req).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_ne!(first.token, second.token);
    }

    #[tokio::test]
    async fn accept_activates_profile_and_consumes_token() {
        let (svc, db, center, admin) = setup().await;
        let invitation = svc
            .invite(
                center.id,
                &admin,
                &InviteRequest {
                    email: "t@acme.test".to_string(),
                    full_name: "T".to_string(),
                    role: ProfileRole::Therapist,
                },
            )
            .await
            .unwrap();

        let profile = svc.accept(&invitation.token, "$argon2id$fake").await.unwrap();
        assert!(profile.active);
        assert!(profile.password_hash.is_some());

        let err = svc.accept(&invitation.token, "$argon2id$fake").await.unwrap_err();
        assert!(matches!(err, InvitationError::AlreadyAccepted));

        let _ = db;
    }

    #[tokio::test]
    async fn parents_cannot_invite() {
        let (svc, db, center, _admin) = setup().await;
        let parent = Profile::create(
            &db.pool,
            &db::models::profile::CreateProfile {
                center_id: Some(center.id),
                email: "parent@acme.test".to_string(),
                full_name: "Parent".to_string(),
                phone: None,
                role: ProfileRole::Parent,
            },
            None,
        )
        .await
        .unwrap();
        let err = svc
            .invite(
                center.id,
                &parent,
                &InviteRequest {
                    email: "x@acme.test".to_string(),
                    full_name: "X".to_string(),
                    role: ProfileRole::Therapist,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, InvitationError::Forbidden));
    }
}
