use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::profile::ProfileRole;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Expired,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Invitation {
    pub id: Uuid,
    pub center_id: Uuid,
    pub email: String,
    pub role: ProfileRole,
    pub token: String,
    pub status: InvitationStatus,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COLUMNS: &str =
    "id, center_id, email, role, token, status, invited_by, expires_at, created_at, updated_at";

impl Invitation {
    pub async fn create(
        pool: &SqlitePool,
        center_id: Uuid,
        email: &str,
        role: &ProfileRole,
        token: &str,
        invited_by: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO invitations (id, center_id, email, role, token, invited_by, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(email.to_ascii_lowercase())
        .bind(role)
        .bind(token)
        .bind(invited_by)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM invitations WHERE token = $1"))
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_pending(
        pool: &SqlitePool,
        center_id: Uuid,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM invitations
             WHERE center_id = $1 AND email = $2 AND status = 'pending'"
        ))
        .bind(center_id)
        .bind(email.to_ascii_lowercase())
        .fetch_optional(pool)
        .await
    }

    /// Refresh the token and expiry of a pending invitation (re-invite).
    pub async fn refresh(
        pool: &SqlitePool,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE invitations
             SET token = $2, expires_at = $3, status = 'pending', updated_at = CURRENT_TIMESTAMP
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    pub async fn set_status(
        pool: &SqlitePool,
        id: Uuid,
        status: InvitationStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE invitations SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn list_by_center(
        pool: &SqlitePool,
        center_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM invitations WHERE center_id = $1 ORDER BY created_at DESC"
        ))
        .bind(center_id)
        .fetch_all(pool)
        .await
    }
}
