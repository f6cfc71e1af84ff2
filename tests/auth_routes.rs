use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::json;
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

use chess_server::{
    auth::{
        AccessPayload, Claims,
        jwt::{JwtKeys, encode_token, make_access_claims, now_unix},
    },
    db::entities::{refresh_token, user},
    routes::API_PREFIX,
    test_helpers::{TEST_JWT_SECRET, test_router, test_router_with_db},
};

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

fn user_model(id: Uuid) -> user::Model {
    let now = Utc::now().fixed_offset();
    user::Model {
        id,
        created_at: now,
        updated_at: now,
        email: "alice@example.com".to_string(),
        username: "alice".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
        is_email_verified: false,
    }
}

fn token_model(token: &str, user_id: Uuid) -> refresh_token::Model {
    let now = Utc::now().fixed_offset();
    refresh_token::Model {
        id: Uuid::new_v4(),
        user_id,
        token: token.to_string(),
        expires_at: now + Duration::days(7),
        created_at: now,
    }
}

fn bearer(user_id: Uuid) -> String {
    let claims = make_access_claims(
        &AccessPayload {
            user_id,
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
        },
        600,
    );
    let token = encode_token(&JwtKeys::from_secret(TEST_JWT_SECRET.as_bytes()), &claims)
        .expect("encode token");
    format!("Bearer {token}")
}

fn post_json(path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(api_path(path))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

async fn json_response(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request should succeed");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("body should be json");
    (status, json)
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, json) = json_response(
        test_router(),
        Request::builder()
            .uri(api_path("/health"))
            .body(Body::empty())
            .expect("request should build"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["healthy"], true);
}

#[tokio::test]
async fn register_with_mismatched_confirmation_is_a_validation_error() {
    let (status, json) = json_response(
        test_router(),
        post_json(
            "/auth/register",
            json!({
                "email": "alice@example.com",
                "username": "alice",
                "password": "Str0ng!pass",
                "confirm_password": "different"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Validation failed");
    let errors = json["data"]["errors"].as_array().expect("errors array");
    assert!(errors.iter().any(|e| e["field"] == "confirm_password"));
}

#[tokio::test]
async fn register_with_weak_password_lists_failed_rules() {
    let (status, json) = json_response(
        test_router(),
        post_json(
            "/auth/register",
            json!({
                "email": "alice@example.com",
                "username": "alice",
                "password": "password",
                "confirm_password": "password"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = json["data"]["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|e| e["field"] == "password"));
}

#[tokio::test]
async fn register_with_missing_field_is_a_bad_request() {
    let (status, json) = json_response(
        test_router(),
        post_json("/auth/register", json!({ "email": "alice@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn register_returns_user_without_hash_and_token_pair() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .append_query_results([Vec::<user::Model>::new()])
        .append_query_results([[user_model(user_id)]])
        .append_query_results([[token_model("refresh-abc", user_id)]])
        .into_connection();

    let (status, json) = json_response(
        test_router_with_db(db),
        post_json(
            "/auth/register",
            json!({
                "email": "Alice@Example.com",
                "username": "alice",
                "password": "Str0ng!pass",
                "confirm_password": "Str0ng!pass"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["user"]["id"], user_id.to_string());
    assert!(json["data"]["user"].get("password_hash").is_none());
    assert_eq!(json["data"]["tokens"]["token_type"], "Bearer");
    assert_eq!(json["data"]["tokens"]["refresh_token"], "refresh-abc");
    let expires_in = json["data"]["tokens"]["expires_in"]
        .as_u64()
        .expect("expires_in");
    assert!((1795..=1800).contains(&expires_in));
}

#[tokio::test]
async fn login_with_unknown_email_uses_generic_message() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let (status, json) = json_response(
        test_router_with_db(db),
        post_json(
            "/auth/login",
            json!({ "email": "ghost@example.com", "password": "Str0ng!pass" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid email or password");
}

#[tokio::test]
async fn refresh_with_unknown_token_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<refresh_token::Model>::new()])
        .into_connection();

    let (status, json) = json_response(
        test_router_with_db(db),
        post_json("/auth/refresh", json!({ "refresh_token": "nope" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn logout_with_unknown_token_still_succeeds() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let (status, json) = json_response(
        test_router_with_db(db),
        post_json("/auth/logout", json!({ "refresh_token": "unknown" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["revoked"], false);
}

#[tokio::test]
async fn logout_all_requires_access_token() {
    let (status, json) = json_response(
        test_router(),
        Request::builder()
            .method("POST")
            .uri(api_path("/auth/logout-all"))
            .body(Body::empty())
            .expect("request should build"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Missing or invalid Authorization header");
}

#[tokio::test]
async fn logout_all_revokes_callers_tokens() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 3,
        }])
        .into_connection();

    let (status, json) = json_response(
        test_router_with_db(db),
        Request::builder()
            .method("POST")
            .uri(api_path("/auth/logout-all"))
            .header("authorization", bearer(user_id))
            .body(Body::empty())
            .expect("request should build"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["revoked"], true);
    assert_eq!(json["data"]["count"], 3);
}

#[tokio::test]
async fn profile_rejects_forged_token() {
    let claims = make_access_claims(
        &AccessPayload {
            user_id: Uuid::new_v4(),
            email: "mallory@example.com".to_string(),
            username: "mallory".to_string(),
        },
        600,
    );
    let forged = encode_token(&JwtKeys::from_secret(b"some-other-secret"), &claims)
        .expect("encode token");

    let (status, json) = json_response(
        test_router(),
        Request::builder()
            .uri(api_path("/auth/profile"))
            .header("authorization", format!("Bearer {forged}"))
            .body(Body::empty())
            .expect("request should build"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid or expired token");
}

#[tokio::test]
async fn profile_rejects_expired_token() {
    let now = now_unix();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        email: "alice@example.com".to_string(),
        username: "alice".to_string(),
        iat: now - 3600,
        exp: now - 1,
    };
    let expired = encode_token(&JwtKeys::from_secret(TEST_JWT_SECRET.as_bytes()), &claims)
        .expect("encode token");

    let (status, _) = json_response(
        test_router(),
        Request::builder()
            .uri(api_path("/auth/profile"))
            .header("authorization", format!("Bearer {expired}"))
            .body(Body::empty())
            .expect("request should build"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_returns_current_user() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(user_id)]])
        .into_connection();

    let (status, json) = json_response(
        test_router_with_db(db),
        Request::builder()
            .uri(api_path("/auth/profile"))
            .header("authorization", bearer(user_id))
            .body(Body::empty())
            .expect("request should build"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["username"], "alice");
    assert!(json["data"].get("password_hash").is_none());
}
