use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A browser push subscription registered by the SPA's service worker.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PushSubscription {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RegisterPushSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

const COLUMNS: &str = "id, profile_id, endpoint, p256dh, auth, created_at";

impl PushSubscription {
    /// Register or replace a subscription for an endpoint.
    pub async fn upsert(
        pool: &SqlitePool,
        profile_id: Uuid,
        data: &RegisterPushSubscription,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO push_subscriptions (id, profile_id, endpoint, p256dh, auth)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT(endpoint) DO UPDATE SET
                profile_id = excluded.profile_id,
                p256dh     = excluded.p256dh,
                auth       = excluded.auth
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(profile_id)
        .bind(&data.endpoint)
        .bind(&data.p256dh)
        .bind(&data.auth)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_profile(
        pool: &SqlitePool,
        profile_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM push_subscriptions WHERE profile_id = $1"
        ))
        .bind(profile_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete_by_endpoint(
        pool: &SqlitePool,
        profile_id: Uuid,
        endpoint: &str,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM push_subscriptions WHERE profile_id = $1 AND endpoint = $2")
                .bind(profile_id)
                .bind(endpoint)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
