use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// An in-app notification for one profile.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Notification {
    pub id: Uuid,
    pub center_id: Option<Uuid>,
    pub profile_id: Uuid,
    pub title: String,
    pub body: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, center_id, profile_id, title, body, read_at, created_at";

impl Notification {
    pub async fn create(
        pool: &SqlitePool,
        center_id: Option<Uuid>,
        profile_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO notifications (id, center_id, profile_id, title, body)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(profile_id)
        .bind(title)
        .bind(body)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_profile(
        pool: &SqlitePool,
        profile_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE profile_id = $1 AND ($2 = 0 OR read_at IS NULL)
             ORDER BY created_at DESC
             LIMIT $3"
        ))
        .bind(profile_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn mark_read(
        pool: &SqlitePool,
        id: Uuid,
        profile_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = $3 WHERE id = $1 AND profile_id = $2 AND read_at IS NULL",
        )
        .bind(id)
        .bind(profile_id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn mark_all_read(
        pool: &SqlitePool,
        profile_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET read_at = $2 WHERE profile_id = $1 AND read_at IS NULL")
                .bind(profile_id)
                .bind(at)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
