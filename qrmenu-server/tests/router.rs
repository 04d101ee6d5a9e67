//! Router-level tests: auth, role gates and request validation that are
//! decided before any database query runs.

mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{MemoryMailer, SECRET, app, call, offline_state};
use http::StatusCode;
use jsonwebtoken::{EncodingKey, Header, encode};
use qrmenu_server::auth::JwtService;
use qrmenu_server::auth::jwt::Claims;
use serde_json::json;
use shared::models::Role;
use uuid::Uuid;

fn jwt() -> JwtService {
    JwtService::new(SECRET, 24)
}

fn staff(role: Role) -> String {
    jwt()
        .issue_staff(Uuid::new_v4(), Some(Uuid::new_v4()), role)
        .unwrap()
}

fn operator() -> String {
    jwt()
        .issue_staff(Uuid::new_v4(), None, Role::SuperAdmin)
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = app(offline_state(Arc::default()));
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "qrmenu-server");
    assert!(body["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let app = app(offline_state(Arc::default()));

    let (status, body) = call(&app, "GET", "/api/v1/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, body) = call(&app, "GET", "/api/v1/orders", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1004);

    let forged = JwtService::new("some-other-secret-some-other-secret", 24)
        .issue_staff(Uuid::new_v4(), Some(Uuid::new_v4()), Role::Admin)
        .unwrap();
    let (status, _) = call(&app, "GET", "/api/v1/tables", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_has_its_own_code() {
    let app = app(offline_state(Arc::default()));
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        restaurant_id: Some(Uuid::new_v4()),
        role: Role::Admin,
        table_number: None,
        exp: now - 60,
        iat: now - 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) = call(&app, "GET", "/api/v1/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1003);
}

#[tokio::test]
async fn role_gates() {
    let app = app(offline_state(Arc::default()));
    let order = format!("/api/v1/orders/{}", Uuid::new_v4());

    // customers may order but not read the kitchen list
    let customer = jwt().issue_customer(Uuid::new_v4(), 3).unwrap();
    let (status, body) = call(&app, "GET", "/api/v1/orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2001);

    // kitchen cannot delete orders or read reports
    let kitchen = staff(Role::Kitchen);
    let (status, _) = call(&app, "DELETE", &order, Some(&kitchen), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, "GET", "/api/v1/orders/report", Some(&kitchen), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // waiters cannot manage tables or the menu
    let waiter = staff(Role::Waiter);
    let (status, _) = call(
        &app,
        "POST",
        "/api/v1/tables",
        Some(&waiter),
        Some(json!({"tableNumber": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, "GET", "/api/v1/menu/products", Some(&waiter), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // kitchen staff cannot create orders
    let (status, _) = call(
        &app,
        "POST",
        "/api/v1/orders",
        Some(&kitchen),
        Some(json!({"tableNumber": 1, "items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // tenant admins stay out of the CRM and the mailer
    let admin = staff(Role::Admin);
    for uri in ["/api/v1/crm/stats", "/api/v1/crm/restaurants", "/api/v1/email/template"] {
        let (status, _) = call(&app, "GET", uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn me_returns_the_token_identity() {
    let app = app(offline_state(Arc::default()));
    let restaurant = Uuid::new_v4();
    let token = jwt().issue_customer(restaurant, 3).unwrap();

    let (status, body) = call(&app, "GET", "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "customer");
    assert_eq!(body["tableNumber"], 3);
    assert_eq!(body["restaurantId"], restaurant.to_string());
    assert_eq!(body["subject"], format!("customer:{restaurant}:3"));
}

#[tokio::test]
async fn unknown_status_is_a_typed_validation_error() {
    let app = app(offline_state(Arc::default()));
    let uri = format!("/api/v1/orders/{}/status", Uuid::new_v4());

    let (status, body) = call(
        &app,
        "PATCH",
        &uri,
        Some(&staff(Role::Kitchen)),
        Some(json!({"status": "Yolda"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4004);
}

#[tokio::test]
async fn order_table_and_source_must_agree() {
    let app = app(offline_state(Arc::default()));
    let waiter = staff(Role::Waiter);
    let items = json!([{"productId": 1, "name": "Ayran", "price": 25.0, "quantity": 1}]);

    for body in [
        json!({"items": items}),
        json!({"tableNumber": 0, "source": "restaurant", "items": items}),
        json!({"tableNumber": 3, "source": "getir", "items": items}),
    ] {
        let (status, resp) =
            call(&app, "POST", "/api/v1/orders", Some(&waiter), Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(resp["code"], 4008);
    }
}

#[tokio::test]
async fn operator_needs_a_restaurant_for_tenant_routes() {
    let app = app(offline_state(Arc::default()));
    let (status, body) = call(&app, "GET", "/api/v1/tables", Some(&operator()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 3001);
}

#[tokio::test]
async fn report_query_is_validated() {
    let app = app(offline_state(Arc::default()));
    let admin = staff(Role::Admin);

    let (status, body) = call(
        &app,
        "GET",
        "/api/v1/orders/report?period=yearly",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);

    let (status, body) = call(
        &app,
        "GET",
        "/api/v1/orders/report?startDate=2025-03-10&endDate=2025-03-01",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);

    let (status, body) = call(
        &app,
        "GET",
        "/api/v1/orders/report?startDate=2025-03-10",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7);
}

#[tokio::test]
async fn login_rate_limit_kicks_in_after_five_attempts() {
    let app = app(offline_state(Arc::default()));

    // an empty email is rejected before any lookup
    for _ in 0..5 {
        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], 9);
}

#[tokio::test]
async fn customer_login_rejects_table_zero() {
    let app = app(offline_state(Arc::default()));
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/auth/customer-login",
        None,
        Some(json!({"restaurantSlug": "kofteci-ramiz", "tableNumber": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7003);
}

#[tokio::test]
async fn bulk_email_reports_each_recipient() {
    let mailer = Arc::new(MemoryMailer::default());
    let app = app(offline_state(mailer.clone()));
    let token = operator();

    let (status, body) = call(&app, "GET", "/api/v1/email/template", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["html"].as_str().unwrap().contains("<html"));

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/email/send",
        Some(&token),
        Some(json!({
            "recipients": ["owner@kofteci.test", "gone@bounce.test", "no-at-sign"],
            "subject": "QR Menü"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], 1);
    assert_eq!(body["failed"], 2);
    assert_eq!(body["results"][1]["success"], false);
    assert_eq!(*mailer.sent.lock().unwrap(), vec!["owner@kofteci.test".to_string()]);

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/email/send",
        Some(&token),
        Some(json!({"recipients": [], "subject": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7);
}

#[tokio::test]
async fn cors_allows_configured_origin_only() {
    let app = app(offline_state(Arc::default()));
    let request = http::Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/orders")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "GET")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );

    let request = http::Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/orders")
        .header("origin", "https://evil.example")
        .header("access-control-request-method", "GET")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
