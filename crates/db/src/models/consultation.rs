use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "consultation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConsultationStatus {
    #[default]
    Requested,
    Scheduled,
    Completed,
    Cancelled,
}

/// An intake consultation, usually converted from a lead.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Consultation {
    pub id: Uuid,
    pub center_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub child_name: String,
    pub parent_name: String,
    pub phone: Option<String>,
    pub status: ConsultationStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub outcome: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateConsultation {
    pub lead_id: Option<Uuid>,
    pub child_name: String,
    pub parent_name: String,
    pub phone: Option<String>,
}

const COLUMNS: &str = "id, center_id, lead_id, child_name, parent_name, phone, status, scheduled_at, outcome, created_at, updated_at";

impl Consultation {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM consultations WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_center(
        pool: &SqlitePool,
        center_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM consultations WHERE center_id = $1 ORDER BY created_at DESC"
        ))
        .bind(center_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        center_id: Uuid,
        data: &CreateConsultation,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO consultations (id, center_id, lead_id, child_name, parent_name, phone)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(data.lead_id)
        .bind(&data.child_name)
        .bind(&data.parent_name)
        .bind(&data.phone)
        .fetch_one(pool)
        .await
    }

    pub async fn schedule(
        pool: &SqlitePool,
        id: Uuid,
        center_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE consultations SET
                status       = 'scheduled',
                scheduled_at = $3,
                updated_at   = CURRENT_TIMESTAMP
             WHERE id = $1 AND center_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(scheduled_at)
        .fetch_optional(pool)
        .await
    }

    pub async fn close(
        pool: &SqlitePool,
        id: Uuid,
        center_id: Uuid,
        status: ConsultationStatus,
        outcome: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE consultations SET
                status     = $3,
                outcome    = COALESCE($4, outcome),
                updated_at = CURRENT_TIMESTAMP
             WHERE id = $1 AND center_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(status)
        .bind(outcome)
        .fetch_optional(pool)
        .await
    }
}
