use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct BlogPost {
    pub id: Uuid,
    pub center_id: Uuid,
    pub title: String,
    /// Unique per center.
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateBlogPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateBlogPost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
}

/// Published post reference with its center slug, for the sitemap.
#[derive(Debug, Clone, FromRow)]
pub struct PublishedPostRef {
    pub slug: String,
    pub center_slug: String,
    pub updated_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, center_id, title, slug, content, excerpt, published, published_at, created_at, updated_at";

impl BlogPost {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM blog_posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(
        pool: &SqlitePool,
        center_id: Uuid,
        slug: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM blog_posts WHERE center_id = $1 AND slug = $2"
        ))
        .bind(center_id)
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_published(
        pool: &SqlitePool,
        center_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM blog_posts
             WHERE center_id = $1 AND published = 1
             ORDER BY published_at DESC"
        ))
        .bind(center_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_center(
        pool: &SqlitePool,
        center_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM blog_posts WHERE center_id = $1 ORDER BY created_at DESC"
        ))
        .bind(center_id)
        .fetch_all(pool)
        .await
    }

    /// All published posts across active centers, for sitemap generation.
    pub async fn list_published_refs(pool: &SqlitePool) -> Result<Vec<PublishedPostRef>, sqlx::Error> {
        sqlx::query_as::<_, PublishedPostRef>(
            "SELECT p.slug AS slug, c.slug AS center_slug, p.updated_at AS updated_at
             FROM blog_posts p
             JOIN centers c ON c.id = p.center_id
             WHERE p.published = 1 AND c.active = 1
             ORDER BY c.slug ASC, p.published_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        center_id: Uuid,
        data: &CreateBlogPost,
        slug: &str,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO blog_posts (id, center_id, title, slug, content, excerpt)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(&data.title)
        .bind(slug)
        .bind(&data.content)
        .bind(&data.excerpt)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        center_id: Uuid,
        data: &UpdateBlogPost,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE blog_posts SET
                title      = COALESCE($3, title),
                content    = COALESCE($4, content),
                excerpt    = COALESCE($5, excerpt),
                updated_at = CURRENT_TIMESTAMP
             WHERE id = $1 AND center_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(&data.excerpt)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_published(
        pool: &SqlitePool,
        id: Uuid,
        center_id: Uuid,
        published: bool,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE blog_posts SET
                published    = $3,
                published_at = $4,
                updated_at   = CURRENT_TIMESTAMP
             WHERE id = $1 AND center_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(center_id)
        .bind(published)
        .bind(published_at)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid, center_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1 AND center_id = $2")
            .bind(id)
            .bind(center_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
