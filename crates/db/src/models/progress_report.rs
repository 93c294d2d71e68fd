use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A periodic development report for a child, optionally shared with the
/// parent portal.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ProgressReport {
    pub id: Uuid,
    pub center_id: Uuid,
    pub child_id: Uuid,
    pub therapist_id: Option<Uuid>,
    /// Reporting period, `YYYY-MM`.
    pub period: String,
    pub summary: String,
    pub goals: Option<String>,
    pub shared_with_parent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProgressReport {
    pub child_id: Uuid,
    pub therapist_id: Option<Uuid>,
    pub period: String,
    pub summary: String,
    pub goals: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateProgressReport {
    pub summary: Option<String>,
    pub goals: Option<String>,
    pub shared_with_parent: Option<bool>,
}

/// Flattened row for CSV export.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressReportExportRow {
    pub child_first_name: String,
    pub child_last_name: String,
    pub therapist_name: Option<String>,
    pub period: String,
    pub summary: String,
    pub goals: Option<String>,
    pub shared_with_parent: bool,
}

const COLUMNS: &str = "id, center_id, child_id, therapist_id, period, summary, goals, shared_with_parent, created_at, updated_at";

impl ProgressReport {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM progress_reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_center(
        pool: &SqlitePool,
        center_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM progress_reports
             WHERE center_id = $1
             ORDER BY period DESC, created_at DESC"
        ))
        .bind(center_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_child(
        pool: &SqlitePool,
        child_id: Uuid,
        shared_only: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM progress_reports
             WHERE child_id = $1 AND ($2 = 0 OR shared_with_parent = 1)
             ORDER BY period DESC"
        ))
        .bind(child_id)
        .bind(shared_only)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        center_id: Uuid,
        data: &CreateProgressReport,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO progress_reports (id, center_id, child_id, therapist_id, period, summary, goals)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(data.child_id)
        .bind(data.therapist_id)
        .bind(&data.period)
        .bind(&data.summary)
        .bind(&data.goals)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        center_id: Uuid,
        data: &UpdateProgressReport,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE progress_reports SET
                summary            = COALESCE($3, summary),
                goals              = COALESCE($4, goals),
                shared_with_parent = COALESCE($5, shared_with_parent),
                updated_at         = CURRENT_TIMESTAMP
             WHERE id = $1 AND center_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(&data.summary)
        .bind(&data.goals)
        .bind(data.shared_with_parent)
        .fetch_optional(pool)
        .await
    }

    /// Joined rows for a center's spreadsheet export.
    pub async fn list_for_export(
        pool: &SqlitePool,
        center_id: Uuid,
    ) -> Result<Vec<ProgressReportExportRow>, sqlx::Error> {
        sqlx::query_as::<_, ProgressReportExportRow>(
            "SELECT
                ch.first_name AS child_first_name,
                ch.last_name  AS child_last_name,
                t.full_name   AS therapist_name,
                r.period      AS period,
                r.summary     AS summary,
                r.goals       AS goals,
                r.shared_with_parent AS shared_with_parent
             FROM progress_reports r
             JOIN children ch ON ch.id = r.child_id
             LEFT JOIN therapists t ON t.id = r.therapist_id
             WHERE r.center_id = $1
             ORDER BY r.period DESC, ch.last_name ASC",
        )
        .bind(center_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid, center_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM progress_reports WHERE id = $1 AND center_id = $2")
            .bind(id)
            .bind(center_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
