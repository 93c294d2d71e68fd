use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Child {
    pub id: Uuid,
    pub center_id: Uuid,
    pub parent_profile_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateChild {
    pub parent_profile_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateChild {
    pub parent_profile_id: Option<Uuid>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

const COLUMNS: &str = "id, center_id, parent_profile_id, first_name, last_name, birth_date, diagnosis, notes, active, created_at, updated_at";

impl Child {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM children WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_center(
        pool: &SqlitePool,
        center_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM children
             WHERE center_id = $1
             ORDER BY last_name ASC, first_name ASC"
        ))
        .bind(center_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_parent(
        pool: &SqlitePool,
        parent_profile_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM children
             WHERE parent_profile_id = $1
             ORDER BY last_name ASC, first_name ASC"
        ))
        .bind(parent_profile_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        center_id: Uuid,
        data: &CreateChild,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO children (id, center_id, parent_profile_id, first_name, last_name, birth_date, diagnosis, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(data.parent_profile_id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.birth_date)
        .bind(&data.diagnosis)
        .bind(&data.notes)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        center_id: Uuid,
        data: &UpdateChild,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE children SET
                parent_profile_id = COALESCE($3, parent_profile_id),
                first_name        = COALESCE($4, first_name),
                last_name         = COALESCE($5, last_name),
                birth_date        = COALESCE($6, birth_date),
                diagnosis         = COALESCE($7, diagnosis),
                notes             = COALESCE($8, notes),
                active            = COALESCE($9, active),
                updated_at        = CURRENT_TIMESTAMP
             WHERE id = $1 AND center_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(data.parent_profile_id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.birth_date)
        .bind(&data.diagnosis)
        .bind(&data.notes)
        .bind(data.active)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid, center_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM children WHERE id = $1 AND center_id = $2")
            .bind(id)
            .bind(center_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
