use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Payment {
    pub id: Uuid,
    pub center_id: Uuid,
    pub child_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    /// Billing period, `YYYY-MM`.
    pub period: String,
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreatePayment {
    pub child_id: Uuid,
    pub amount_cents: i64,
    pub currency: Option<String>,
    pub period: String,
    pub note: Option<String>,
}

/// One row of the per-center monthly summary.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PaymentSummaryRow {
    pub status: PaymentStatus,
    pub count: i64,
    pub total_cents: i64,
}

const COLUMNS: &str = "id, center_id, child_id, amount_cents, currency, period, status, method, paid_at, note, created_at, updated_at";

impl Payment {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM payments WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_center_period(
        pool: &SqlitePool,
        center_id: Uuid,
        period: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM payments
             WHERE center_id = $1 AND period = $2
             ORDER BY created_at DESC"
        ))
        .bind(center_id)
        .bind(period)
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_child(pool: &SqlitePool, child_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM payments WHERE child_id = $1 ORDER BY period DESC"
        ))
        .bind(child_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        center_id: Uuid,
        data: &CreatePayment,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let currency = data.currency.clone().unwrap_or_else(|| "USD".to_string());
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO payments (id, center_id, child_id, amount_cents, currency, period, note)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(data.child_id)
        .bind(data.amount_cents)
        .bind(currency)
        .bind(&data.period)
        .bind(&data.note)
        .fetch_one(pool)
        .await
    }

    pub async fn mark_paid(
        pool: &SqlitePool,
        id: Uuid,
        center_id: Uuid,
        method: Option<String>,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE payments SET
                status     = 'paid',
                method     = COALESCE($3, method),
                paid_at    = $4,
                updated_at = CURRENT_TIMESTAMP
             WHERE id = $1 AND center_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(method)
        .bind(paid_at)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_status(
        pool: &SqlitePool,
        id: Uuid,
        center_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE payments SET status = $3, updated_at = CURRENT_TIMESTAMP
             WHERE id = $1 AND center_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    pub async fn summarize_period(
        pool: &SqlitePool,
        center_id: Uuid,
        period: &str,
    ) -> Result<Vec<PaymentSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, PaymentSummaryRow>(
            "SELECT status, COUNT(*) AS count, SUM(amount_cents) AS total_cents
             FROM payments
             WHERE center_id = $1 AND period = $2
             GROUP BY status
             ORDER BY status",
        )
        .bind(center_id)
        .bind(period)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid, center_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1 AND center_id = $2")
            .bind(id)
            .bind(center_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
