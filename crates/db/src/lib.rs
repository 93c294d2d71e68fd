pub mod models;

use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use thiserror::Error;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Shared handle to the SQLite pool. Cheap to clone.
#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    /// Open (creating if missing) the database at `database_url` and run
    /// pending migrations.
    pub async fn new(database_url: &str) -> Result<Self, DbInitError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        MIGRATOR.run(&pool).await?;
        tracing::info!(database_url, "database ready");
        Ok(Self { pool })
    }

    /// In-memory database for tests.
    pub async fn new_in_memory() -> Result<Self, DbInitError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }
}

#[cfg(test)]
mod tests {
    use crate::models::center::{Center, CreateCenter};

    use super::*;

    #[tokio::test]
    async fn migrations_apply_cleanly() {
        let db = DBService::new_in_memory().await.unwrap();
        let applied: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert!(applied >= 5);
    }

    #[tokio::test]
    async fn center_round_trips_through_sqlite() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = Center::create(
            &db.pool,
            &CreateCenter {
                name: "Acme Child Center".to_string(),
                slug: None,
                custom_domain: Some("ACME-Therapy.COM".to_string()),
                description: Some("Speech & occupational therapy".to_string()),
                phone: None,
                email: None,
                address: None,
                city: Some("Springfield".to_string()),
            },
            "acme",
        )
        .await
        .unwrap();

        let by_slug = Center::find_by_slug(&db.pool, "acme").await.unwrap().unwrap();
        assert_eq!(by_slug.id, created.id);
        assert!(by_slug.active);

        // Domains are normalized to lowercase on write and on lookup.
        let by_domain = Center::find_by_custom_domain(&db.pool, "Acme-Therapy.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_domain.id, created.id);

        let dup = Center::create(
            &db.pool,
            &CreateCenter {
                name: "Other".to_string(),
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
        .await;
        assert!(dup.is_err(), "duplicate slug must violate the unique index");
    }
}
