use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use folio::config::Config;
use folio::entities::accounts::Role;
use http_body_util::BodyExt;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "correct-horse-battery";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.token_secret = "integration-test-secret".to_string();
    config.server.secure_cookies = false;

    let state = folio::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");

    state
        .store()
        .create_account(
            ADMIN_EMAIL,
            "Admin",
            ADMIN_PASSWORD,
            Role::Admin,
            &state.config.security,
        )
        .await
        .expect("Failed to seed admin account");

    folio::api::router(state)
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login_admin(app: &Router) -> (String, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("Content-Type", "application/json")
        .body(Body::from(
            serde_json::json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set the auth cookie")
        .to_str()
        .unwrap()
        .to_string();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let token = json["data"]["token"].as_str().unwrap().to_string();

    (token, cookie)
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = spawn_app().await;

    // Wrong password and unknown account must be indistinguishable.
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": ADMIN_EMAIL, "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let wrong_password_error = body["error"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": "ghost@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"].as_str().unwrap(), wrong_password_error);
}

#[tokio::test]
async fn test_login_requires_email_and_password() {
    let app = spawn_app().await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": "", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": ADMIN_EMAIL, "password": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_sets_hardened_cookie_and_me_works() {
    let app = spawn_app().await;
    let (token, cookie) = login_admin(&app).await;

    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.starts_with("token="));

    // Bearer flow
    let (status, me) = send_json(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["email"], ADMIN_EMAIL);
    assert_eq!(me["data"]["role"], "admin");

    // The identity payload never carries any password material.
    let raw = me.to_string();
    assert!(!raw.contains("password"));
    assert!(!raw.contains("hash"));

    // Cookie flow: send the cookie back, no bearer header.
    let cookie_pair = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header(header::COOKIE, cookie_pair)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let app = spawn_app().await;

    let (status, _) = send_json(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(&app, "GET", "/api/auth/me", Some("garbage.token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = spawn_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_admin_routes_refuse_anonymous_callers_without_side_effects() {
    let app = spawn_app().await;
    let (token, _) = login_admin(&app).await;

    let (status, created) = send_json(
        &app,
        "POST",
        "/api/admin/project",
        Some(&token),
        Some(serde_json::json!({"title": "Keep", "description": "d"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_i64().unwrap();

    // No token: gate fires before the handler, so nothing is deleted.
    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/admin/project/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, listed) = send_json(&app, "GET", "/api/projects", None, None).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_registration_creates_user_role_and_rejects_duplicates() {
    let app = spawn_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "name": "Visitor",
            "email": "Visitor@Example.com",
            "password": "longenough"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["email"], "visitor@example.com");

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "name": "Visitor",
            "email": "visitor@example.com",
            "password": "longenough"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "name": "Visitor",
            "email": "short@example.com",
            "password": "short"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_role_is_forbidden_on_admin_routes() {
    let app = spawn_app().await;

    send_json(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "name": "Visitor",
            "email": "visitor@example.com",
            "password": "longenough"
        })),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": "visitor@example.com", "password": "longenough"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user_token = body["data"]["token"].as_str().unwrap().to_string();

    // Authenticated but not authorized: 403, not 401.
    let (status, _) = send_json(
        &app,
        "GET",
        "/api/admin/messages",
        Some(&user_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The identity itself is still readable.
    let (status, me) = send_json(&app, "GET", "/api/auth/me", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["role"], "user");
}

#[tokio::test]
async fn test_tampered_token_is_unauthorized() {
    let app = spawn_app().await;
    let (token, _) = login_admin(&app).await;

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let (status, _) = send_json(&app, "GET", "/api/auth/me", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_endpoints_carry_the_stricter_throttle() {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.token_secret = "integration-test-secret".to_string();
    config.server.secure_cookies = false;
    config.security.auth_max_requests = 2;

    let state = folio::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");
    let app = folio::api::router(state);

    let attempt = serde_json::json!({"email": "ghost@example.com", "password": "wrong"});

    let (status, _) = send_json(&app, "POST", "/api/auth/login", None, Some(attempt.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send_json(&app, "POST", "/api/auth/login", None, Some(attempt.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Third credential attempt inside the window trips the auth limiter.
    let (status, _) = send_json(&app, "POST", "/api/auth/login", None, Some(attempt)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // The general API limiter is a separate budget: public reads still work.
    let (status, _) = send_json(&app, "GET", "/api/projects", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Upload gating
// ============================================================================

fn multipart_request(uri: &str, token: Option<&str>, boundary: &str, body: String) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        header::CONTENT_TYPE,
        format!("{}; boundary={boundary}", mime::MULTIPART_FORM_DATA),
    );

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_upload_requires_auth_and_admin() {
    let app = spawn_app().await;

    let boundary = "X-FOLIO-TEST-BOUNDARY";
    let empty = format!("--{boundary}--\r\n");

    let response = app
        .clone()
        .oneshot(multipart_request("/api/upload", None, boundary, empty))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_without_file_part_is_bad_request() {
    let app = spawn_app().await;
    let (token, _) = login_admin(&app).await;

    let boundary = "X-FOLIO-TEST-BOUNDARY";

    // A form with no parts at all.
    let empty = format!("--{boundary}--\r\n");
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/api/upload",
            Some(&token),
            boundary,
            empty,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["success"], false);
    assert!(json.get("url").is_none());
    assert!(json["data"].is_null());

    // A text-only part is not a file either.
    let text_only = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{boundary}--\r\n"
    );
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/api/upload",
            Some(&token),
            boundary,
            text_only,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_content() {
    let app = spawn_app().await;
    let (token, _) = login_admin(&app).await;

    let boundary = "X-FOLIO-TEST-BOUNDARY";
    let script = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"evil.sh\"\r\nContent-Type: application/octet-stream\r\n\r\n#!/bin/sh\r\n--{boundary}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(multipart_request(
            "/api/upload",
            Some(&token),
            boundary,
            script,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_unknown_intent() {
    let app = spawn_app().await;
    let (token, _) = login_admin(&app).await;

    let boundary = "X-FOLIO-TEST-BOUNDARY";
    let pdf = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.pdf\"\r\nContent-Type: application/pdf\r\n\r\n%PDF-1.7 body\r\n--{boundary}--\r\n"
    );

    // Intent outside the allow-list fails before any forwarding happens.
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/api/upload?intent=backdoor",
            Some(&token),
            boundary,
            pdf,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
