use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Therapist {
    pub id: Uuid,
    pub center_id: Uuid,
    /// Login account, when the therapist has one.
    pub profile_id: Option<Uuid>,
    pub full_name: String,
    pub specialty: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTherapist {
    pub profile_id: Option<Uuid>,
    pub full_name: String,
    pub specialty: String,
    pub title: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateTherapist {
    pub full_name: Option<String>,
    pub specialty: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub active: Option<bool>,
}

const COLUMNS: &str =
    "id, center_id, profile_id, full_name, specialty, title, bio, active, created_at, updated_at";

impl Therapist {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM therapists WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_center(
        pool: &SqlitePool,
        center_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM therapists WHERE center_id = $1 ORDER BY full_name ASC"
        ))
        .bind(center_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        center_id: Uuid,
        data: &CreateTherapist,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO therapists (id, center_id, profile_id, full_name, specialty, title, bio)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(data.profile_id)
        .bind(&data.full_name)
        .bind(&data.specialty)
        .bind(&data.title)
        .bind(&data.bio)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        center_id: Uuid,
        data: &UpdateTherapist,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE therapists SET
                full_name  = COALESCE($3, full_name),
                specialty  = COALESCE($4, specialty),
                title      = COALESCE($5, title),
                bio        = COALESCE($6, bio),
                active     = COALESCE($7, active),
                updated_at = CURRENT_TIMESTAMP
             WHERE id = $1 AND center_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(&data.full_name)
        .bind(&data.specialty)
        .bind(&data.title)
        .bind(&data.bio)
        .bind(data.active)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid, center_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM therapists WHERE id = $1 AND center_id = $2")
            .bind(id)
            .bind(center_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
