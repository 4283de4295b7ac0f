mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use artenact_api::config::ApiConfig;
use common::{TestApp, ASHA_TOKEN, EXPIRED_TOKEN, RAVI_TOKEN};

#[tokio::test]
async fn post_then_get_round_trips_with_email_and_no_internal_id() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/profile", Some(ASHA_TOKEN), json!({ "name": "A" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Profile synced successfully");
    assert_eq!(body["user_data"]["name"], "A");

    let (status, body) = app.get("/api/profile", Some(ASHA_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "user": {
                "firebase_uid": "uid-asha",
                "email": "asha@example.com",
                "name": "A"
            }
        })
    );
    let user = body["user"].as_object().unwrap();
    assert!(!user.contains_key("_id"));
    assert!(!user.contains_key("id"));
}

#[tokio::test]
async fn get_without_profile_is_404() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/profile", Some(ASHA_TOKEN)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Profile not found." }));
}

#[tokio::test]
async fn omitted_fields_keep_previous_values() {
    let app = TestApp::new();

    app.post(
        "/api/profile",
        Some(ASHA_TOKEN),
        json!({ "name": "Asha", "craft_type": "pottery", "bio": "first" }),
    )
    .await;
    let (status, body) = app
        .post("/api/profile", Some(ASHA_TOKEN), json!({ "bio": "second" }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_data"]["name"], "Asha");
    assert_eq!(body["user_data"]["craft_type"], "pottery");
    assert_eq!(body["user_data"]["bio"], "second");
}

#[tokio::test]
async fn repeated_bio_update_is_idempotent() {
    let app = TestApp::new();
    app.post("/api/profile", Some(ASHA_TOKEN), json!({ "name": "Asha" })).await;

    let (_, once) = app.post("/api/profile", Some(ASHA_TOKEN), json!({ "bio": "x" })).await;
    let (_, twice) = app.post("/api/profile", Some(ASHA_TOKEN), json!({ "bio": "x" })).await;

    assert_eq!(once["user_data"], twice["user_data"]);
}

#[tokio::test]
async fn email_and_uid_in_body_are_ignored() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/profile",
            Some(ASHA_TOKEN),
            json!({ "name": "Asha", "email": "attacker@example.com", "firebase_uid": "uid-ravi" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_data"]["email"], "asha@example.com");
    assert_eq!(body["user_data"]["firebase_uid"], "uid-asha");
    assert!(matches!(
        app.get("/api/profile", Some(RAVI_TOKEN)).await.0,
        StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn null_clears_field_and_omitted_fields_are_kept() {
    let app = TestApp::new();
    app.post(
        "/api/profile",
        Some(ASHA_TOKEN),
        json!({ "name": "Asha", "craft_type": "pottery" }),
    )
    .await;

    let (status, body) = app
        .post("/api/profile", Some(ASHA_TOKEN), json!({ "name": null }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["user_data"],
        json!({ "firebase_uid": "uid-asha", "email": "asha@example.com", "craft_type": "pottery" })
    );

    let (_, profile) = app.get("/api/profile", Some(ASHA_TOKEN)).await;
    assert!(profile["user"].get("name").is_none());
}

#[tokio::test]
async fn identity_without_email_stores_no_email() {
    let app = TestApp::new();

    let (_, body) = app.post("/api/profile", Some(RAVI_TOKEN), json!({ "name": "Ravi" })).await;

    assert_eq!(
        body["user_data"],
        json!({ "firebase_uid": "uid-ravi", "name": "Ravi" })
    );
}

#[tokio::test]
async fn profiles_are_isolated_per_identity() {
    let app = TestApp::new();

    app.post("/api/profile", Some(ASHA_TOKEN), json!({ "name": "Asha" })).await;
    app.post("/api/profile", Some(RAVI_TOKEN), json!({ "name": "Ravi" })).await;

    assert_eq!(app.get("/api/profile", Some(ASHA_TOKEN)).await.1["user"]["name"], "Asha");
    assert_eq!(app.get("/api/profile", Some(RAVI_TOKEN)).await.1["user"]["name"], "Ravi");
}

#[tokio::test]
async fn missing_credential_is_401_and_nothing_is_written() {
    let app = TestApp::new();

    let (status, body) = app.post("/api/profile", None, json!({ "name": "A" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "Bearer token not provided" }));

    let (status, _) = app.get("/api/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(app.profiles.is_empty().await);
}

#[tokio::test]
async fn invalid_credential_is_403_with_cause() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/profile", Some(EXPIRED_TOKEN), json!({ "name": "A" }))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Invalid authentication credentials: Token expired");
    assert!(app.profiles.is_empty().await);
}

#[tokio::test]
async fn non_bearer_scheme_is_403() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/profile")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrongly_typed_field_is_422() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/profile", Some(ASHA_TOKEN), json!({ "name": 42 }))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
    assert!(app.profiles.is_empty().await);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/profile")
        .header(header::AUTHORIZATION, format!("Bearer {}", ASHA_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn missing_content_type_is_415() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/profile")
        .header(header::AUTHORIZATION, format!("Bearer {}", ASHA_TOKEN))
        .body(Body::from("{\"name\": \"A\"}"))
        .unwrap();
    let (status, _) = app.send(request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn oversized_body_is_413() {
    let app = TestApp::with_api_config(ApiConfig {
        enable_request_logging: false,
        max_request_size_bytes: 64,
    });

    let (status, _) = app
        .post("/api/profile", Some(ASHA_TOKEN), json!({ "bio": "x".repeat(500) }))
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.profiles.is_empty().await);
}
