//! Request plumbing: bearer-token auth and per-request center resolution.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use db::models::{
    center::Center,
    profile::{Profile, ProfileRole},
};
use services::services::tenant::{
    self, CACHED_SLUG_HEADER, CENTER_NOT_FOUND, DbTenantDirectory, IMPERSONATE_HEADER,
    ResolutionRequest, TenantResolution,
};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok().filter(|v| !v.is_empty())
}

async fn load_profile(state: &AppState, token: &str) -> Result<Profile, ApiError> {
    let claims = state
        .auth
        .verify_token(token)
        .map_err(|_| ApiError::Unauthorized("invalid or expired token".to_string()))?;
    let profile = Profile::find_by_id(&state.db.pool, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("unknown profile".to_string()))?;
    if !profile.active {
        return Err(ApiError::Forbidden("account is disabled".to_string()));
    }
    Ok(profile)
}

/// Minimal percent-decoding for the `path` query parameter.
fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes.get(i + 1..i + 3);
                match hex.and_then(|h| u8::from_str_radix(std::str::from_utf8(h).ok()?, 16).ok()) {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// The SPA route the resolution should consider. API calls carry it
/// implicitly in their (nest-stripped) path; the `/context` probe passes the
/// SPA's current location explicitly.
fn logical_path(req: &Request) -> String {
    let path = req.uri().path();
    if path == "/context" {
        let from_query = req.uri().query().and_then(|q| {
            q.split('&')
                .find_map(|pair| pair.strip_prefix("path="))
                .map(percent_decode)
        });
        return from_query.unwrap_or_else(|| "/".to_string());
    }
    path.to_string()
}

/// Resolve the active center for every API request and stash the outcome in
/// request extensions. Auth failures here do not abort the request; routes
/// that require auth enforce it through [`AuthUser`].
pub async fn resolve_center(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let profile = match bearer_token(req.headers()) {
        Some(token) => load_profile(&state, token).await.ok(),
        None => None,
    };

    let path = logical_path(&req);
    let headers = req.headers();
    let resolution = {
        let request = ResolutionRequest {
            host: header_str(headers, "host"),
            path: &path,
            cached_slug: header_str(headers, CACHED_SLUG_HEADER),
            impersonate_slug: header_str(headers, IMPERSONATE_HEADER),
            profile: profile.as_ref(),
        };
        let dir = DbTenantDirectory::new(state.db.pool.clone());
        tenant::resolve(&dir, &request).await?
    };

    req.extensions_mut().insert(resolution);
    if let Some(profile) = profile {
        req.extensions_mut().insert(profile);
    }
    Ok(next.run(req).await)
}

/// The authenticated profile. Rejects with 401 when the token is missing or
/// bad.
pub struct AuthUser(pub Profile);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(profile) = parts.extensions.get::<Profile>() {
            return Ok(Self(profile.clone()));
        }
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
        load_profile(state, token).await.map(Self)
    }
}

/// Like [`AuthUser`] but anonymous requests pass through.
pub struct MaybeAuthUser(pub Option<Profile>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(profile) = parts.extensions.get::<Profile>() {
            return Ok(Self(Some(profile.clone())));
        }
        match bearer_token(&parts.headers) {
            Some(token) => Ok(Self(load_profile(state, token).await.ok())),
            None => Ok(Self(None)),
        }
    }
}

/// The resolved center. Rejects with the resolver's error when no center is
/// in scope.
pub struct CenterContext(pub Center);

impl FromRequestParts<AppState> for CenterContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let resolution = parts
            .extensions
            .get::<TenantResolution>()
            .cloned()
            .ok_or_else(|| ApiError::NotFound(CENTER_NOT_FOUND.to_string()))?;
        match resolution.center {
            Some(center) => Ok(Self(center)),
            None => Err(ApiError::NotFound(
                resolution.error.unwrap_or_else(|| CENTER_NOT_FOUND.to_string()),
            )),
        }
    }
}

/// Admin or therapist of this center, or a super admin.
pub fn require_staff(profile: &Profile, center_id: Uuid) -> Result<(), ApiError> {
    let ok = profile.role.is_super_admin()
        || (matches!(profile.role, ProfileRole::Admin | ProfileRole::Therapist)
            && profile.center_id == Some(center_id));
    if ok {
        Ok(())
    } else {
        Err(ApiError::Forbidden("staff access required".to_string()))
    }
}

/// Admin of this center, or a super admin.
pub fn require_admin(profile: &Profile, center_id: Uuid) -> Result<(), ApiError> {
    let ok = profile.role.is_super_admin()
        || (profile.role == ProfileRole::Admin && profile.center_id == Some(center_id));
    if ok {
        Ok(())
    } else {
        Err(ApiError::Forbidden("admin access required".to_string()))
    }
}

pub fn require_super_admin(profile: &Profile) -> Result<(), ApiError> {
    if profile.role.is_super_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("super admin access required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_decode_handles_encoded_paths() {
        assert_eq!(percent_decode("%2Fcenters%2Facme"), "/centers/acme");
        assert_eq!(percent_decode("/plain"), "/plain");
        assert_eq!(percent_decode("bad%2"), "bad%2");
    }
}
