use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "profile_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProfileRole {
    SuperAdmin,
    Admin,
    Therapist,
    #[default]
    Parent,
}

impl ProfileRole {
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Admin of some center or global admin.
    pub fn can_manage_center(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

/// A user account. `password_hash` is empty until an invitation is accepted
/// or the profile self-registers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Profile {
    pub id: Uuid,
    pub center_id: Option<Uuid>,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: Option<String>,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: ProfileRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProfile {
    pub center_id: Option<Uuid>,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: ProfileRole,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

const COLUMNS: &str =
    "id, center_id, email, password_hash, full_name, phone, role, active, created_at, updated_at";

impl Profile {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM profiles WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM profiles WHERE email = $1"))
            .bind(email.to_ascii_lowercase())
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_center(
        pool: &SqlitePool,
        center_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM profiles WHERE center_id = $1 ORDER BY full_name ASC"
        ))
        .bind(center_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProfile,
        password_hash: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO profiles (id, center_id, email, password_hash, full_name, phone, role)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.center_id)
        .bind(data.email.to_ascii_lowercase())
        .bind(password_hash)
        .bind(&data.full_name)
        .bind(&data.phone)
        .bind(&data.role)
        .fetch_one(pool)
        .await
    }

    /// Insert a placeholder row for an invited email, or return the existing
    /// profile unchanged.
    pub async fn upsert_invited(
        pool: &SqlitePool,
        center_id: Uuid,
        email: &str,
        full_name: &str,
        role: &ProfileRole,
    ) -> Result<Self, sqlx::Error> {
        if let Some(existing) = Self::find_by_email(pool, email).await? {
            return Ok(existing);
        }
        let data = CreateProfile {
            center_id: Some(center_id),
            email: email.to_string(),
            full_name: full_name.to_string(),
            phone: None,
            role: role.clone(),
        };
        Self::create(pool, &data, None).await
    }

    pub async fn set_password_and_activate(
        pool: &SqlitePool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE profiles SET password_hash = $2, active = 1, updated_at = CURRENT_TIMESTAMP
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE profiles SET
                full_name  = COALESCE($2, full_name),
                phone      = COALESCE($3, phone),
                updated_at = CURRENT_TIMESTAMP
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.full_name)
        .bind(&data.phone)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_active(pool: &SqlitePool, id: Uuid, active: bool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE profiles SET active = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(pool)
            .await?;
        Ok(())
    }
}
