use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Appointment {
    pub id: Uuid,
    pub center_id: Uuid,
    pub child_id: Uuid,
    pub therapist_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub note: Option<String>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateAppointment {
    pub child_id: Uuid,
    pub therapist_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateAppointment {
    pub therapist_id: Option<Uuid>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub note: Option<String>,
}

const COLUMNS: &str = "id, center_id, child_id, therapist_id, start_at, end_at, status, note, reminder_sent_at, created_at, updated_at";

impl Appointment {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM appointments WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Appointments for a therapist that overlap `[start_at, end_at)`,
    /// ignoring cancelled ones and optionally one appointment (the one being
    /// moved).
    pub async fn find_overlapping(
        pool: &SqlitePool,
        therapist_id: Uuid,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE therapist_id = $1
               AND status != 'cancelled'
               AND start_at < $3
               AND end_at > $2
               AND ($4 IS NULL OR id != $4)
             ORDER BY start_at ASC"
        ))
        .bind(therapist_id)
        .bind(start_at)
        .bind(end_at)
        .bind(exclude_id)
        .fetch_all(pool)
        .await
    }

    /// Calendar listing, optionally narrowed to one therapist.
    pub async fn list_by_center_range(
        pool: &SqlitePool,
        center_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        therapist_id: Option<Uuid>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE center_id = $1 AND start_at >= $2 AND start_at < $3
               AND ($4 IS NULL OR therapist_id = $4)
             ORDER BY start_at ASC"
        ))
        .bind(center_id)
        .bind(from)
        .bind(to)
        .bind(therapist_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_child(pool: &SqlitePool, child_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM appointments WHERE child_id = $1 ORDER BY start_at DESC"
        ))
        .bind(child_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        center_id: Uuid,
        data: &CreateAppointment,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO appointments (id, center_id, child_id, therapist_id, start_at, end_at, note)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(data.child_id)
        .bind(data.therapist_id)
        .bind(data.start_at)
        .bind(data.end_at)
        .bind(&data.note)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        center_id: Uuid,
        data: &UpdateAppointment,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE appointments SET
                therapist_id = COALESCE($3, therapist_id),
                start_at     = COALESCE($4, start_at),
                end_at       = COALESCE($5, end_at),
                status       = COALESCE($6, status),
                note         = COALESCE($7, note),
                updated_at   = CURRENT_TIMESTAMP
             WHERE id = $1 AND center_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(data.therapist_id)
        .bind(data.start_at)
        .bind(data.end_at)
        .bind(&data.status)
        .bind(&data.note)
        .fetch_optional(pool)
        .await
    }

    /// Scheduled appointments starting inside `[now, horizon)` whose reminder
    /// has not been sent yet.
    pub async fn list_needing_reminder(
        pool: &SqlitePool,
        now: DateTime<Utc>,
        horizon: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE status = 'scheduled'
               AND reminder_sent_at IS NULL
               AND start_at >= $1 AND start_at < $2
             ORDER BY start_at ASC"
        ))
        .bind(now)
        .bind(horizon)
        .fetch_all(pool)
        .await
    }

    pub async fn mark_reminded(
        pool: &SqlitePool,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE appointments SET reminder_sent_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid, center_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1 AND center_id = $2")
            .bind(id)
            .bind(center_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
