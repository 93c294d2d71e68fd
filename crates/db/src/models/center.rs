use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// One tenant: a child-development therapy center.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Center {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub custom_domain: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCenter {
    pub name: String,
    pub slug: Option<String>,
    pub custom_domain: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateCenter {
    pub name: Option<String>,
    pub custom_domain: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub active: Option<bool>,
}

const COLUMNS: &str = "id, name, slug, custom_domain, description, phone, email, address, city, active, created_at, updated_at";

impl Center {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM centers WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM centers WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Lookup by custom domain. Domains are stored lowercase.
    pub async fn find_by_custom_domain(
        pool: &SqlitePool,
        domain: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM centers WHERE custom_domain = $1"
        ))
        .bind(domain.to_ascii_lowercase())
        .fetch_optional(pool)
        .await
    }

    pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM centers WHERE active = 1 ORDER BY name ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM centers ORDER BY name ASC"))
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateCenter,
        slug: &str,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let custom_domain = data.custom_domain.as_deref().map(str::to_ascii_lowercase);
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO centers (id, name, slug, custom_domain, description, phone, email, address, city)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.name)
        .bind(slug)
        .bind(custom_domain)
        .bind(&data.description)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.address)
        .bind(&data.city)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCenter,
    ) -> Result<Option<Self>, sqlx::Error> {
        let custom_domain = data.custom_domain.as_deref().map(str::to_ascii_lowercase);
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE centers SET
                name          = COALESCE($2, name),
                custom_domain = COALESCE($3, custom_domain),
                description   = COALESCE($4, description),
                phone         = COALESCE($5, phone),
                email         = COALESCE($6, email),
                address       = COALESCE($7, address),
                city          = COALESCE($8, city),
                active        = COALESCE($9, active),
                updated_at    = CURRENT_TIMESTAMP
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.name)
        .bind(custom_domain)
        .bind(&data.description)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.address)
        .bind(&data.city)
        .bind(data.active)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM centers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
