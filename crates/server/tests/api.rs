//! End-to-end tests against the assembled router with an in-memory database.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use db::{
    DBService,
    models::{
        center::{Center, CreateCenter},
        profile::{CreateProfile, Profile, ProfileRole},
    },
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{AppState, app};
use services::services::config::Config;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
}

async fn test_app() -> TestApp {
    let db = DBService::new_in_memory().await.unwrap();
    let config = Config {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        jwt_ttl_hours: 24,
        public_base_url: "https://app.example.com".to_string(),
        reminder_poll_secs: 300,
        reminder_horizon_hours: 24,
        analytics_enabled: false,
    };
    let state = AppState::new(db, config);
    TestApp {
        router: app(state.clone()),
        state,
    }
}

async fn seed_center(state: &AppState, name: &str, slug: &str, domain: Option<&str>) -> Center {
    Center::create(
        &state.db.pool,
        &CreateCenter {
            name: name.to_string(),
            slug: None,
            custom_domain: domain.map(str::to_string),
            description: None,
            phone: None,
            email: None,
            address: None,
            city: None,
        },
        slug,
    )
    .await
    .unwrap()
}

/// Create a profile with a working password and return (profile, bearer token).
async fn seed_user(
    state: &AppState,
    center_id: Option<uuid::Uuid>,
    email: &str,
    role: ProfileRole,
) -> (Profile, String) {
    let hash = state.auth.hash_password("correct-horse-battery").unwrap();
    let profile = Profile::create(
        &state.db.pool,
        &CreateProfile {
            center_id,
            email: email.to_string(),
            full_name: "Test User".to_string(),
            phone: None,
            role,
        },
        Some(hash),
    )
    .await
    .unwrap();
    let token = state.auth.issue_token(&profile).unwrap();
    (profile, token)
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let t = test_app().await;
    let (status, _) = send(&t.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_center_slug_is_a_404() {
    let t = test_app().await;
    let (status, body) = send(&t.router, get("/api/centers/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("center not found"));
}

#[tokio::test]
async fn context_resolves_path_slug_over_cached_slug() {
    let t = test_app().await;
    seed_center(&t.state, "Acme", "acme", None).await;
    seed_center(&t.state, "Bloom", "bloom", None).await;

    let req = Request::builder()
        .uri("/api/context?path=%2Fcenters%2Facme%2Fschedule")
        .header("x-cached-center", "bloom")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["center"]["slug"], json!("acme"));
    assert_eq!(body["data"]["source"], json!("path_slug"));
    assert_eq!(body["data"]["clear_cached_slug"], json!(false));
}

#[tokio::test]
async fn context_on_global_route_clears_cached_slug() {
    let t = test_app().await;
    seed_center(&t.state, "Acme", "acme", None).await;

    let req = Request::builder()
        .uri("/api/context?path=%2Flogin")
        .header("x-cached-center", "acme")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["center"], Value::Null);
    assert_eq!(body["data"]["clear_cached_slug"], json!(true));
}

#[tokio::test]
async fn context_resolves_custom_domain() {
    let t = test_app().await;
    seed_center(&t.state, "Acme", "acme", Some("acme-therapy.com")).await;

    let req = Request::builder()
        .uri("/api/context?path=%2F")
        .header("host", "acme-therapy.com")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["center"]["slug"], json!("acme"));
    assert_eq!(body["data"]["source"], json!("custom_domain"));
}

#[tokio::test]
async fn register_login_and_me_flow() {
    let t = test_app().await;
    seed_center(&t.state, "Acme", "acme", None).await;

    let mut req = post_json(
        "/api/auth/register",
        json!({
            "email": "parent@example.com",
            "password": "hunter2hunter2",
            "full_name": "A Parent",
            "phone": null
        }),
    );
    req.headers_mut()
        .insert("x-cached-center", "acme".parse().unwrap());
    let (status, body) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &t.router,
        post_json(
            "/api/auth/login",
            json!({"email": "parent@example.com", "password": "hunter2hunter2"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    let req = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!("parent@example.com"));
    assert_eq!(body["data"]["role"], json!("parent"));
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn super_admin_creates_centers_parents_cannot() {
    let t = test_app().await;
    let center = seed_center(&t.state, "Acme", "acme", None).await;
    let (_, admin_token) = seed_user(&t.state, None, "root@example.com", ProfileRole::SuperAdmin).await;
    let (_, parent_token) =
        seed_user(&t.state, Some(center.id), "p@example.com", ProfileRole::Parent).await;

    let mut req = post_json("/api/centers", json!({"name": "Bloom Therapy", "slug": null}));
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {admin_token}").parse().unwrap(),
    );
    let (status, body) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::OK, "create center failed: {body}");
    assert_eq!(body["data"]["slug"], json!("bloom-therapy"));

    let mut req = post_json("/api/centers", json!({"name": "Evil", "slug": null}));
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {parent_token}").parse().unwrap(),
    );
    let (status, _) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn public_lead_submission_and_admin_listing() {
    let t = test_app().await;
    let center = seed_center(&t.state, "Acme", "acme", None).await;
    let (_, admin_token) =
        seed_user(&t.state, Some(center.id), "admin@acme.test", ProfileRole::Admin).await;

    let mut req = post_json(
        "/api/leads",
        json!({"name": "Curious Parent", "phone": "555-0100", "email": null, "message": "hi", "source": "instagram"}),
    );
    req.headers_mut()
        .insert("x-cached-center", "acme".parse().unwrap());
    let (status, body) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::OK, "lead failed: {body}");

    // Anonymous listing is rejected.
    let mut req = get("/api/leads");
    req.headers_mut()
        .insert("x-cached-center", "acme".parse().unwrap());
    let (status, _) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The center admin sees the lead.
    let mut req = get("/api/leads");
    req.headers_mut()
        .insert("x-cached-center", "acme".parse().unwrap());
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {admin_token}").parse().unwrap(),
    );
    let (status, body) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["status"], json!("new"));
}

#[tokio::test]
async fn admins_of_another_center_are_locked_out() {
    let t = test_app().await;
    seed_center(&t.state, "Acme", "acme", None).await;
    let bloom = seed_center(&t.state, "Bloom", "bloom", None).await;
    let (_, bloom_admin_token) =
        seed_user(&t.state, Some(bloom.id), "admin@bloom.test", ProfileRole::Admin).await;

    // Bloom's admin asking for Acme's leads is forbidden, not shown another
    // tenant's rows.
    let mut req = get("/api/leads");
    req.headers_mut()
        .insert("x-cached-center", "acme".parse().unwrap());
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {bloom_admin_token}").parse().unwrap(),
    );
    let (status, _) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn sitemap_lists_seeded_center() {
    let t = test_app().await;
    seed_center(&t.state, "Acme", "acme", None).await;
    let response = t.router.clone().oneshot(get("/sitemap.xml")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let xml = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(xml.contains("https://app.example.com/centers/acme"));
}

#[tokio::test]
async fn invitation_flow_end_to_end() {
    let t = test_app().await;
    let center = seed_center(&t.state, "Acme", "acme", None).await;
    let (_, admin_token) =
        seed_user(&t.state, Some(center.id), "admin@acme.test", ProfileRole::Admin).await;

    let mut req = post_json(
        "/api/invitations",
        json!({"email": "new-therapist@acme.test", "full_name": "New Therapist", "role": "therapist"}),
    );
    req.headers_mut()
        .insert("x-cached-center", "acme".parse().unwrap());
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {admin_token}").parse().unwrap(),
    );
    let (status, body) = send(&t.router, req).await;
    assert_eq!(status, StatusCode::OK, "invite failed: {body}");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &t.router,
        post_json(
            "/api/invitations/accept",
            json!({"token": token, "password": "a-long-password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "accept failed: {body}");

    let (status, body) = send(
        &t.router,
        post_json(
            "/api/auth/login",
            json!({"email": "new-therapist@acme.test", "password": "a-long-password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "post-accept login failed: {body}");
    assert_eq!(body["data"]["profile"]["role"], json!("therapist"));
}
