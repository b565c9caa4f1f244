//! End-to-end tests over the HTTP surface.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt; // for `oneshot`
use ulid::Ulid;

use venued::api::{AppState, create_router};
use venued::auth::{AuthGate, hash_password};
use venued::engine::Engine;
use venued::model::{Role, User, now_ms};

/// Build a test app over a throwaway journal. The engine handle is
/// returned so tests can seed accounts the API refuses to create
/// (admins).
fn create_test_app() -> (Router, Arc<Engine>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(Engine::new(dir.path().join("test.journal")).unwrap());
    let state = AppState {
        engine: engine.clone(),
        auth: AuthGate::new("test-secret"),
    };
    (create_router(state), engine, dir)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register_and_login(app: &Router, email: &str, role: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "firstName": "Test",
            "lastName": "User",
            "phone": "555-0100",
            "email": email,
            "password": "hunter2",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Admins cannot self-register; seed one through the engine.
async fn seed_admin(app: &Router, engine: &Engine) -> String {
    engine
        .register_user(User {
            id: Ulid::new(),
            first_name: "Admin".into(),
            last_name: String::new(),
            phone: String::new(),
            email: "admin@example.com".into(),
            password_hash: hash_password("rootpw").unwrap(),
            role: Role::Admin,
            created_at: now_ms(),
        })
        .await
        .unwrap();

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "admin@example.com", "password": "rootpw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_venue(app: &Router, owner_token: &str, price_per_hour: f64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/venues",
        Some(owner_token),
        Some(json!({
            "name": "Main Hall",
            "location": "Pune",
            "capacity": 120,
            "amenities": ["wifi", "parking"],
            "pricePerHour": price_per_hour,
            "pricePerDay": 500.0,
            "description": "Conference hall",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "venue create failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check() {
    let (app, _engine, _dir) = create_test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "venued");
}

#[tokio::test]
async fn register_then_login() {
    let (app, _engine, _dir) = create_test_app();
    let token = register_and_login(&app, "asha@example.com", "user").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn login_wrong_password_rejected() {
    let (app, _engine, _dir) = create_test_app();
    register_and_login(&app, "asha@example.com", "user").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "asha@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn duplicate_registration_rejected() {
    let (app, _engine, _dir) = create_test_app();
    register_and_login(&app, "asha@example.com", "user").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "firstName": "Again",
            "lastName": "User",
            "phone": "555-0101",
            "email": "asha@example.com",
            "password": "other",
            "role": "user",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn admin_self_registration_forbidden() {
    let (app, _engine, _dir) = create_test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "firstName": "Eve",
            "lastName": "Admin",
            "phone": "555-0102",
            "email": "eve@example.com",
            "password": "pw",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn venue_create_requires_owner_role() {
    let (app, _engine, _dir) = create_test_app();
    let token = register_and_login(&app, "guest@example.com", "user").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/venues",
        Some(&token),
        Some(json!({
            "name": "Hall",
            "location": "Pune",
            "capacity": 10,
            "pricePerHour": 100.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Only venue owners can add venues");
}

#[tokio::test]
async fn venue_crud_flow() {
    let (app, _engine, _dir) = create_test_app();
    let owner = register_and_login(&app, "owner@example.com", "venue_owner").await;
    let venue_id = create_venue(&app, &owner, 200.0).await;

    // Public list and get
    let (status, body) = send(&app, "GET", "/api/venues", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", &format!("/api/venues/{venue_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Main Hall");
    assert_eq!(body["verified"], false);

    // Owner patch
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/venues/{venue_id}"),
        Some(&owner),
        Some(json!({ "name": "Annex", "pricePerHour": 250.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Annex");
    assert_eq!(body["pricePerHour"], json!(250.0));
    assert_eq!(body["location"], "Pune");

    // Owner's listing
    let (status, body) = send(&app, "GET", "/api/venues/my", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn venue_get_missing_404() {
    let (app, _engine, _dir) = create_test_app();
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/venues/{}", Ulid::new()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Venue not found");
}

#[tokio::test]
async fn booking_conflict_is_audited() {
    let (app, engine, _dir) = create_test_app();
    let owner = register_and_login(&app, "owner@example.com", "venue_owner").await;
    let first_guest = register_and_login(&app, "one@example.com", "user").await;
    let second_guest = register_and_login(&app, "two@example.com", "user").await;
    let admin = seed_admin(&app, &engine).await;
    let venue_id = create_venue(&app, &owner, 200.0).await;

    // 10:00–12:00 at rate 200 → total 400
    let (status, body) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&first_guest),
        Some(json!({
            "venueId": venue_id,
            "bookingType": "hour",
            "date": "2024-06-01",
            "startTime": "10:00",
            "endTime": "12:00",
            "hours": 2,
            "total": 400.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["conflict"], false);
    assert_eq!(body["total"], json!(400.0));
    assert_eq!(body["startTime"], "10:00");

    // 11:00–13:00 overlaps — rejected but recorded
    let (status, body) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&second_guest),
        Some(json!({
            "venueId": venue_id,
            "bookingType": "hour",
            "date": "2024-06-01",
            "startTime": "11:00",
            "endTime": "13:00",
            "hours": 2,
            "total": 400.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Booking conflict: overlapping time.");

    // Admin sees both rows, one flagged
    let (status, body) = send(&app, "GET", "/api/admin/bookings", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows.iter().filter(|r| r["conflict"] == true).count(),
        1
    );

    // The rejected requester sees their flagged attempt, venue joined
    let (status, body) = send(&app, "GET", "/api/bookings/my", Some(&second_guest), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["conflict"], true);
    assert_eq!(rows[0]["venue"]["name"], "Main Hall");
}

#[tokio::test]
async fn daily_booking_conflict_message() {
    let (app, _engine, _dir) = create_test_app();
    let owner = register_and_login(&app, "owner@example.com", "venue_owner").await;
    let guest = register_and_login(&app, "guest@example.com", "user").await;
    let venue_id = create_venue(&app, &owner, 200.0).await;

    let book = |start: &str, end: &str| {
        json!({
            "venueId": venue_id,
            "bookingType": "day",
            "date": start,
            "endDate": end,
            "days": 3,
            "total": 1500.0,
        })
    };

    let (status, _) = send(&app, "POST", "/api/bookings", Some(&guest), Some(book("2024-01-01", "2024-01-03"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/bookings", Some(&guest), Some(book("2024-01-03", "2024-01-05"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Booking conflict: overlapping dates.");
}

#[tokio::test]
async fn booking_missing_venue_404() {
    let (app, _engine, _dir) = create_test_app();
    let guest = register_and_login(&app, "guest@example.com", "user").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&guest),
        Some(json!({
            "venueId": Ulid::new().to_string(),
            "bookingType": "hour",
            "date": "2024-06-01",
            "startTime": "10:00",
            "endTime": "12:00",
            "hours": 2,
            "total": 400.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Venue not found");
}

#[tokio::test]
async fn booking_missing_kind_fields_rejected() {
    let (app, engine, _dir) = create_test_app();
    let owner = register_and_login(&app, "owner@example.com", "venue_owner").await;
    let guest = register_and_login(&app, "guest@example.com", "user").await;
    let venue_id = create_venue(&app, &owner, 200.0).await;

    // Hourly submission without times
    let (status, _) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&guest),
        Some(json!({
            "venueId": venue_id,
            "bookingType": "hour",
            "date": "2024-06-01",
            "hours": 2,
            "total": 400.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    // Nothing lands on the ledger for malformed submissions
    assert!(engine.all_bookings().await.is_empty());
}

#[tokio::test]
async fn booking_requires_token() {
    let (app, _engine, _dir) = create_test_app();

    let (status, body) = send(&app, "GET", "/api/bookings/my", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No token provided");

    let (status, body) = send(&app, "GET", "/api/bookings/my", Some("bogus.jwt.token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn quote_matches_pricing_rules() {
    let (app, _engine, _dir) = create_test_app();
    let owner = register_and_login(&app, "owner@example.com", "venue_owner").await;
    let venue_id = create_venue(&app, &owner, 100.0).await;

    // 09:00–11:30 at rate 100 → 3 billable hours, total 300
    let (status, body) = send(
        &app,
        "POST",
        "/api/bookings/quote",
        None,
        Some(json!({
            "venueId": venue_id,
            "bookingType": "hour",
            "startTime": "09:00",
            "endTime": "11:30",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hours"], 3);
    assert_eq!(body["total"], json!(300.0));

    // Three inclusive days at rate 500 → 1500
    let (status, body) = send(
        &app,
        "POST",
        "/api/bookings/quote",
        None,
        Some(json!({
            "venueId": venue_id,
            "bookingType": "day",
            "date": "2024-01-01",
            "endDate": "2024-01-03",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days"], 3);
    assert_eq!(body["total"], json!(1500.0));
}

#[tokio::test]
async fn quote_without_day_rate_rejected() {
    let (app, _engine, _dir) = create_test_app();
    let owner = register_and_login(&app, "owner@example.com", "venue_owner").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/venues",
        Some(&owner),
        Some(json!({
            "name": "Hourly Only",
            "location": "Pune",
            "capacity": 20,
            "pricePerHour": 100.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let venue_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/bookings/quote",
        None,
        Some(json!({
            "venueId": venue_id,
            "bookingType": "day",
            "date": "2024-01-01",
            "endDate": "2024-01-02",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Venue has no daily rate");
}

#[tokio::test]
async fn admin_surface_is_role_guarded() {
    let (app, engine, _dir) = create_test_app();
    let guest = register_and_login(&app, "guest@example.com", "user").await;
    let admin = seed_admin(&app, &engine).await;

    let (status, body) = send(&app, "GET", "/api/admin/users", Some(&guest), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admins only");

    let (status, body) = send(&app, "GET", "/api/admin/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    // guest + admin, password hashes never serialized
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));

    let (status, body) = send(&app, "GET", "/api/admin/analytics", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userCount"], 2);
    assert_eq!(body["venueCount"], 0);
}

#[tokio::test]
async fn admin_venue_deletion_keeps_ledger_rows() {
    let (app, engine, _dir) = create_test_app();
    let owner = register_and_login(&app, "owner@example.com", "venue_owner").await;
    let guest = register_and_login(&app, "guest@example.com", "user").await;
    let admin = seed_admin(&app, &engine).await;
    let venue_id = create_venue(&app, &owner, 200.0).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&guest),
        Some(json!({
            "venueId": venue_id,
            "bookingType": "hour",
            "date": "2024-06-01",
            "startTime": "10:00",
            "endTime": "12:00",
            "hours": 2,
            "total": 400.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/admin/venues/{venue_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Venue deleted");

    let (status, _) = send(&app, "GET", &format!("/api/venues/{venue_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bookings are never deleted; the join just comes back empty
    let (status, body) = send(&app, "GET", "/api/admin/bookings", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0]["venue"].is_null());
}

#[tokio::test]
async fn owner_cannot_delete_anothers_venue() {
    let (app, _engine, _dir) = create_test_app();
    let owner = register_and_login(&app, "owner@example.com", "venue_owner").await;
    let rival = register_and_login(&app, "rival@example.com", "venue_owner").await;
    let venue_id = create_venue(&app, &owner, 200.0).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/venues/{venue_id}"),
        Some(&rival),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/venues/{venue_id}"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}
