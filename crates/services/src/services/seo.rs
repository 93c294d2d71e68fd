//! Sitemap and robots.txt generation, served live from the current center
//! and blog-post tables.

use db::{
    DBService,
    models::{blog_post::BlogPost, center::Center},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Static marketing routes always present in the sitemap.
const STATIC_ROUTES: &[&str] = &["/", "/centers", "/login", "/register"];

#[derive(Clone)]
pub struct SeoService {
    db: DBService,
    base_url: String,
}

impl SeoService {
    pub fn new(db: DBService, base_url: String) -> Self {
        Self { db, base_url }
    }

    pub async fn sitemap_xml(&self) -> Result<String, SeoError> {
        let centers = Center::list_active(&self.db.pool).await?;
        let posts = BlogPost::list_published_refs(&self.db.pool).await?;

        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for route in STATIC_ROUTES {
            push_url(&mut xml, &format!("{}{}", self.base_url, route), None);
        }
        for center in &centers {
            push_url(
                &mut xml,
                &format!("{}/centers/{}", self.base_url, center.slug),
                Some(center.updated_at.format("%Y-%m-%d").to_string()),
            );
        }
        for post in &posts {
            push_url(
                &mut xml,
                &format!("{}/centers/{}/blog/{}", self.base_url, post.center_slug, post.slug),
                Some(post.updated_at.format("%Y-%m-%d").to_string()),
            );
        }
        xml.push_str("</urlset>\n");
        Ok(xml)
    }

    pub fn robots_txt(&self) -> String {
        format!(
            "User-agent: *\n\
             Allow: /\n\
             Disallow: /master\n\
             Disallow: /api\n\
             \n\
             Sitemap: {}/sitemap.xml\n",
            self.base_url
        )
    }
}

fn push_url(xml: &mut String, loc: &str, lastmod: Option<String>) {
    xml.push_str("  <url><loc>");
    xml.push_str(&xml_escape(loc));
    xml.push_str("</loc>");
    if let Some(date) = lastmod {
        xml.push_str("<lastmod>");
        xml.push_str(&date);
        xml.push_str("</lastmod>");
    }
    xml.push_str("</url>\n");
}

fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use db::models::{
        blog_post::CreateBlogPost,
        center::{CreateCenter, UpdateCenter},
    };

    use super::*;

    async fn seed() -> DBService {
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
        let post = BlogPost::create(
            &db.pool,
            center.id,
            &CreateBlogPost {
                title: "Early signs".to_string(),
                content: "...".to_string(),
                excerpt: None,
            },
            "early-signs",
        )
        .await
        .unwrap();
        BlogPost::set_published(
            &db.pool,
            post.id,
            center.id,
            true,
            Some(chrono::Utc::now()),
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn sitemap_lists_static_center_and_post_urls() {
        let db = seed().await;
        let svc = SeoService::new(db, "https://example.com".to_string());
        let xml = svc.sitemap_xml().await.unwrap();
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/centers/acme</loc>"));
        assert!(xml.contains("<loc>https://example.com/centers/acme/blog/early-signs</loc>"));
        assert!(xml.contains("<lastmod>"));
    }

    #[tokio::test]
    async fn unpublished_posts_and_inactive_centers_are_excluded() {
        let db = seed().await;
        let center = Center::find_by_slug(&db.pool, "acme").await.unwrap().unwrap();
        Center::update(
            &db.pool,
            center.id,
            &UpdateCenter {
                name: None,
                custom_domain: None,
                description: None,
                phone: None,
                email: None,
                address: None,
                city: None,
                active: Some(false),
            },
        )
        .await
        .unwrap();

        let svc = SeoService::new(db, "https://example.com".to_string());
        let xml = svc.sitemap_xml().await.unwrap();
        assert!(!xml.contains("/centers/acme</loc>"));
        assert!(!xml.contains("/blog/early-signs"));
    }

    #[test]
    fn escapes_xml_metacharacters() {
        assert_eq!(xml_escape("a&b<c>"), "a&amp;b&lt;c&gt;");
    }

    #[tokio::test]
    async fn robots_points_at_the_sitemap() {
        let db = DBService::new_in_memory().await.unwrap();
        let svc = SeoService::new(db, "https://example.com".to_string());
        let robots = svc.robots_txt();
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
        assert!(robots.contains("Disallow: /master"));
    }
}
