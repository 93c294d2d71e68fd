//! Center resolution: decides, per request, which tenant's data a page may
//! read.
//!
//! The active center is picked from an ordered list of fallbacks: custom
//! domain, explicit `/centers/:slug` path, the slug the SPA cached from a
//! prior visit, and finally the signed-in profile's home center. Global
//! routes resolve no tenant and tell the client to drop its cached slug.

use async_trait::async_trait;
use db::models::{center::Center, profile::Profile};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use strum_macros::Display;
use ts_rs::TS;
use uuid::Uuid;

/// Header the SPA uses to forward its cached center slug.
pub const CACHED_SLUG_HEADER: &str = "x-cached-center";
/// Header a super admin uses to act inside a center.
pub const IMPERSONATE_HEADER: &str = "x-impersonate-center";

pub const CENTER_NOT_FOUND: &str = "center not found";

/// Which fallback produced the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionSource {
    CustomDomain,
    PathSlug,
    CachedSlug,
    Profile,
    None,
}

/// Outcome of resolving one request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TenantResolution {
    pub center: Option<Center>,
    pub source: ResolutionSource,
    /// The client should drop its cached slug (global route, or the cached
    /// slug no longer matches a center).
    pub clear_cached_slug: bool,
    pub error: Option<String>,
}

impl TenantResolution {
    fn resolved(center: Center, source: ResolutionSource) -> Self {
        Self {
            center: Some(center),
            source,
            clear_cached_slug: false,
            error: None,
        }
    }

    fn none(clear_cached_slug: bool) -> Self {
        Self {
            center: None,
            source: ResolutionSource::None,
            clear_cached_slug,
            error: None,
        }
    }

    fn miss(clear_cached_slug: bool) -> Self {
        Self {
            center: None,
            source: ResolutionSource::None,
            clear_cached_slug,
            error: Some(CENTER_NOT_FOUND.to_string()),
        }
    }
}

/// The pieces of a request that tenant resolution looks at.
#[derive(Debug, Clone, Default)]
pub struct ResolutionRequest<'a> {
    /// `Host` header, may still carry a port.
    pub host: Option<&'a str>,
    /// URL path, e.g. `/centers/acme/schedule`.
    pub path: &'a str,
    /// Slug forwarded from the SPA's cache.
    pub cached_slug: Option<&'a str>,
    /// Super-admin impersonation slug.
    pub impersonate_slug: Option<&'a str>,
    pub profile: Option<&'a Profile>,
}

/// Center lookups needed by the resolver. Split out so the fallback order is
/// testable without a database.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn center_by_domain(&self, domain: &str) -> Result<Option<Center>, sqlx::Error>;
    async fn center_by_slug(&self, slug: &str) -> Result<Option<Center>, sqlx::Error>;
    async fn center_by_id(&self, id: Uuid) -> Result<Option<Center>, sqlx::Error>;
}

pub struct DbTenantDirectory {
    pool: SqlitePool,
}

impl DbTenantDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantDirectory for DbTenantDirectory {
    async fn center_by_domain(&self, domain: &str) -> Result<Option<Center>, sqlx::Error> {
        Center::find_by_custom_domain(&self.pool, domain).await
    }

    async fn center_by_slug(&self, slug: &str) -> Result<Option<Center>, sqlx::Error> {
        Center::find_by_slug(&self.pool, slug).await
    }

    async fn center_by_id(&self, id: Uuid) -> Result<Option<Center>, sqlx::Error> {
        Center::find_by_id(&self.pool, id).await
    }
}

/// Extract the slug from a `/centers/:slug/...` path.
pub fn path_slug(path: &str) -> Option<&str> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match segments.next() {
        Some("centers") => segments.next(),
        _ => None,
    }
}

/// Routes that belong to no tenant: the landing page, auth pages, the center
/// directory, the super-admin area and the parent portal entry.
pub fn is_global_route(path: &str) -> bool {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match segments.next() {
        None => true,
        Some("login" | "register" | "master" | "portal") => true,
        Some("centers") => segments.next().is_none(),
        _ => false,
    }
}

fn is_admin_route(path: &str) -> bool {
    matches!(
        path.split('/').filter(|s| !s.is_empty()).next(),
        Some("master")
    )
}

fn normalize_host(host: &str) -> String {
    let host = host.rsplit_once(':').map_or(host, |(h, port)| {
        if port.chars().all(|c| c.is_ascii_digit()) {
            h
        } else {
            host
        }
    });
    host.to_ascii_lowercase()
}

/// Resolve the active center for one request. Lookup misses are reported in
/// the result, not as errors; only database failures propagate.
pub async fn resolve(
    dir: &dyn TenantDirectory,
    req: &ResolutionRequest<'_>,
) -> Result<TenantResolution, sqlx::Error> {
    let is_super_admin = req
        .profile
        .is_some_and(|p| p.role.is_super_admin());

    // An explicit slug: from the path, or (super admins only) the
    // impersonation header.
    let explicit_slug = path_slug(req.path).or(if is_super_admin {
        req.impersonate_slug
    } else {
        None
    });

    // 1. Custom domain, unless this is an admin route or an explicit slug
    //    names a different center.
    if !is_admin_route(req.path)
        && let Some(host) = req.host
    {
        let domain = normalize_host(host);
        if let Some(center) = dir.center_by_domain(&domain).await? {
            match explicit_slug {
                Some(slug) if slug != center.slug => {} // fall through to 2
                _ => return Ok(TenantResolution::resolved(center, ResolutionSource::CustomDomain)),
            }
        }
    }

    // 2. Explicit slug overrides everything below, including the cache.
    if let Some(slug) = explicit_slug {
        return Ok(match dir.center_by_slug(slug).await? {
            Some(center) => TenantResolution::resolved(center, ResolutionSource::PathSlug),
            None => TenantResolution::miss(req.cached_slug.is_some()),
        });
    }

    // 3. Global routes resolve no tenant and invalidate the cache.
    if is_global_route(req.path) {
        return Ok(TenantResolution::none(req.cached_slug.is_some()));
    }

    if let Some(slug) = req.cached_slug {
        return Ok(match dir.center_by_slug(slug).await? {
            Some(center) => TenantResolution::resolved(center, ResolutionSource::CachedSlug),
            None => TenantResolution::miss(true),
        });
    }

    // 4. The signed-in profile's home center. Super admins skip this; they
    //    operate globally unless they impersonated explicitly.
    if let Some(profile) = req.profile
        && !profile.role.is_super_admin()
        && let Some(center_id) = profile.center_id
    {
        return Ok(match dir.center_by_id(center_id).await? {
            Some(center) => TenantResolution::resolved(center, ResolutionSource::Profile),
            None => TenantResolution::miss(false),
        });
    }

    // 5. No tenant context.
    Ok(TenantResolution::none(false))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use db::models::profile::ProfileRole;

    use super::*;

    struct MapDirectory {
        by_domain: HashMap<String, Center>,
        by_slug: HashMap<String, Center>,
        by_id: HashMap<Uuid, Center>,
    }

    impl MapDirectory {
        fn new(centers: Vec<Center>) -> Self {
            let mut by_domain = HashMap::new();
            let mut by_slug = HashMap::new();
            let mut by_id = HashMap::new();
            for c in centers {
                if let Some(d) = &c.custom_domain {
                    by_domain.insert(d.clone(), c.clone());
                }
                by_slug.insert(c.slug.clone(), c.clone());
                by_id.insert(c.id, c);
            }
            Self {
                by_domain,
                by_slug,
                by_id,
            }
        }
    }

    #[async_trait]
    impl TenantDirectory for MapDirectory {
        async fn center_by_domain(&self, domain: &str) -> Result<Option<Center>, sqlx::Error> {
            Ok(self.by_domain.get(domain).cloned())
        }

        async fn center_by_slug(&self, slug: &str) -> Result<Option<Center>, sqlx::Error> {
            Ok(self.by_slug.get(slug).cloned())
        }

        async fn center_by_id(&self, id: Uuid) -> Result<Option<Center>, sqlx::Error> {
            Ok(self.by_id.get(&id).cloned())
        }
    }

    fn center(slug: &str, domain: Option<&str>) -> Center {
        Center {
            id: Uuid::new_v4(),
            name: slug.to_string(),
            slug: slug.to_string(),
            custom_domain: domain.map(str::to_string),
            description: None,
            phone: None,
            email: None,
            address: None,
            city: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn profile(role: ProfileRole, center_id: Option<Uuid>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            center_id,
            email: "user@example.com".to_string(),
            password_hash: None,
            full_name: "User".to_string(),
            phone: None,
            role,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn dir_with_acme_and_bloom() -> (MapDirectory, Center, Center) {
        let acme = center("acme", Some("acme-therapy.com"));
        let bloom = center("bloom", None);
        let dir = MapDirectory::new(vec![acme.clone(), bloom.clone()]);
        (dir, acme, bloom)
    }

    #[tokio::test]
    async fn custom_domain_resolves_the_mapped_center() {
        let (dir, acme, _) = dir_with_acme_and_bloom();
        let req = ResolutionRequest {
            host: Some("acme-therapy.com:443"),
            path: "/schedule",
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert_eq!(res.center.unwrap().id, acme.id);
        assert_eq!(res.source, ResolutionSource::CustomDomain);
    }

    #[tokio::test]
    async fn admin_routes_never_resolve_by_domain() {
        let (dir, _, _) = dir_with_acme_and_bloom();
        let req = ResolutionRequest {
            host: Some("acme-therapy.com"),
            path: "/master/centers",
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert!(res.center.is_none());
    }

    #[tokio::test]
    async fn differing_path_slug_beats_custom_domain() {
        let (dir, _, bloom) = dir_with_acme_and_bloom();
        let req = ResolutionRequest {
            host: Some("acme-therapy.com"),
            path: "/centers/bloom/blog",
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert_eq!(res.center.unwrap().id, bloom.id);
        assert_eq!(res.source, ResolutionSource::PathSlug);
    }

    #[tokio::test]
    async fn matching_path_slug_keeps_domain_resolution() {
        let (dir, acme, _) = dir_with_acme_and_bloom();
        let req = ResolutionRequest {
            host: Some("acme-therapy.com"),
            path: "/centers/acme",
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert_eq!(res.center.unwrap().id, acme.id);
        assert_eq!(res.source, ResolutionSource::CustomDomain);
    }

    #[tokio::test]
    async fn path_slug_overrides_cached_slug() {
        let (dir, acme, _) = dir_with_acme_and_bloom();
        let req = ResolutionRequest {
            host: Some("app.example.com"),
            path: "/centers/acme/schedule",
            cached_slug: Some("bloom"),
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert_eq!(res.center.unwrap().id, acme.id);
        assert_eq!(res.source, ResolutionSource::PathSlug);
    }

    #[tokio::test]
    async fn global_route_resolves_nothing_and_clears_cache() {
        let (dir, _, _) = dir_with_acme_and_bloom();
        for path in ["/", "/login", "/centers", "/master/overview"] {
            let req = ResolutionRequest {
                host: Some("app.example.com"),
                path,
                cached_slug: Some("acme"),
                ..Default::default()
            };
            let res = resolve(&dir, &req).await.unwrap();
            assert!(res.center.is_none(), "path {path} resolved a center");
            assert!(res.clear_cached_slug, "path {path} kept the cache");
            assert!(res.error.is_none());
        }
    }

    #[tokio::test]
    async fn cached_slug_is_reused_on_tenant_routes() {
        let (dir, acme, _) = dir_with_acme_and_bloom();
        let req = ResolutionRequest {
            host: Some("app.example.com"),
            path: "/schedule",
            cached_slug: Some("acme"),
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert_eq!(res.center.unwrap().id, acme.id);
        assert_eq!(res.source, ResolutionSource::CachedSlug);
    }

    #[tokio::test]
    async fn profile_center_is_the_last_fallback() {
        let (dir, _, bloom) = dir_with_acme_and_bloom();
        let p = profile(ProfileRole::Parent, Some(bloom.id));
        let req = ResolutionRequest {
            host: Some("app.example.com"),
            path: "/schedule",
            profile: Some(&p),
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert_eq!(res.center.unwrap().id, bloom.id);
        assert_eq!(res.source, ResolutionSource::Profile);
    }

    #[tokio::test]
    async fn super_admin_profile_center_is_ignored() {
        let (dir, acme, _) = dir_with_acme_and_bloom();
        let p = profile(ProfileRole::SuperAdmin, Some(acme.id));
        let req = ResolutionRequest {
            host: Some("app.example.com"),
            path: "/schedule",
            profile: Some(&p),
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert!(res.center.is_none());
        assert_eq!(res.source, ResolutionSource::None);
    }

    #[tokio::test]
    async fn super_admin_impersonates_with_header() {
        let (dir, acme, _) = dir_with_acme_and_bloom();
        let p = profile(ProfileRole::SuperAdmin, None);
        let req = ResolutionRequest {
            host: Some("app.example.com"),
            path: "/schedule",
            impersonate_slug: Some("acme"),
            profile: Some(&p),
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert_eq!(res.center.unwrap().id, acme.id);
    }

    #[tokio::test]
    async fn impersonation_header_is_ignored_for_non_super_admins() {
        let (dir, _, bloom) = dir_with_acme_and_bloom();
        let p = profile(ProfileRole::Parent, Some(bloom.id));
        let req = ResolutionRequest {
            host: Some("app.example.com"),
            path: "/schedule",
            impersonate_slug: Some("acme"),
            profile: Some(&p),
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert_eq!(res.center.unwrap().id, bloom.id);
    }

    #[tokio::test]
    async fn unknown_slug_sets_error_and_no_center() {
        let (dir, _, _) = dir_with_acme_and_bloom();
        let req = ResolutionRequest {
            host: Some("app.example.com"),
            path: "/centers/ghost",
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert!(res.center.is_none());
        assert_eq!(res.error.as_deref(), Some(CENTER_NOT_FOUND));
    }

    #[tokio::test]
    async fn unknown_cached_slug_sets_error_and_clears_cache() {
        let (dir, _, _) = dir_with_acme_and_bloom();
        let req = ResolutionRequest {
            host: Some("app.example.com"),
            path: "/schedule",
            cached_slug: Some("ghost"),
            ..Default::default()
        };
        let res = resolve(&dir, &req).await.unwrap();
        assert!(res.center.is_none());
        assert!(res.clear_cached_slug);
        assert_eq!(res.error.as_deref(), Some(CENTER_NOT_FOUND));
    }
}
