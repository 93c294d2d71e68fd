//! Progress-report export for spreadsheet use.

use db::{DBService, models::progress_report::ProgressReport};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ReportExportError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Clone)]
pub struct ReportExportService {
    db: DBService,
}

impl ReportExportService {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    /// All of a center's progress reports as CSV, one row per report, joined
    /// with child and therapist names.
    pub async fn export_csv(&self, center_id: Uuid) -> Result<String, ReportExportError> {
        let rows = ProgressReport::list_for_export(&self.db.pool, center_id).await?;
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &rows {
            writer.serialize(row)?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        tracing::debug!(center_id = %center_id, rows = rows.len(), "progress reports exported");
        Ok(String::from_utf8(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use db::models::{
        center::{Center, CreateCenter},
        child::{Child, CreateChild},
        progress_report::CreateProgressReport,
    };

    use super::*;

    #[tokio::test]
    async fn export_contains_header_and_one_row_per_report() {
        let db = DBService::new_in_memory().await.unwrap();
        let center = Center::create(
            &db.pool,
            &CreateCenter {
                name: "Acme".to_string(),
                slug: None,
                custom_domain: None,
                description: None,
                phone: None,
                email: None,
                address: None,
                city: None,
            },
            "acme",
        )
        .await
        .unwrap();
        let child = Child::create(
            &db.pool,
            center.id,
            &CreateChild {
                parent_profile_id: None,
                first_name: "Mia".to_string(),
                last_name: "Onat".to_string(),
                birth_date: chrono::NaiveDate::from_ymd_opt(2019, 4, 2).unwrap(),
                diagnosis: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        ProgressReport::create(
            &db.pool,
            center.id,
            &CreateProgressReport {
                child_id: child.id,
                therapist_id: None,
                period: "2026-07".to_string(),
                summary: "Improved articulation, \"s\" sounds clearer".to_string(),
                goals: Some("two-word requests".to_string()),
            },
        )
        .await
        .unwrap();

        let svc = ReportExportService::new(db);
        let csv = svc.export_csv(center.id).await.unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "child_first_name,child_last_name,therapist_name,period,summary,goals,shared_with_parent"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("Mia,Onat,"));
        assert!(row.contains("2026-07"));
        assert!(lines.next().is_none());
    }
}
