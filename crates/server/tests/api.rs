use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{AuthConfig, AuthKeys, ServerState, router};

const PASSWORD: &str = "Sup3r-secret!";

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .bcrypt_cost(4)
        .build()
        .await
        .unwrap();
    let keys = AuthKeys::new(&AuthConfig {
        jwt_key: "0123456789abcdef0123456789abcdef".to_string(),
        token_ttl_minutes: 60,
        secure_cookie: false,
    })
    .unwrap();
    router(ServerState::new(engine, keys))
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
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "username": username,
            "password": PASSWORD,
            "firstName": "Test",
            "lastName": "User",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": username, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/actuator/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/api/account/active", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_sets_cookie_and_cookie_authenticates() {
    let app = app().await;
    register_and_login(&app, "alice").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": "alice", "password": PASSWORD }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    let pair = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/me")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let me: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(me["username"], "alice");
    assert_eq!(me["activeStatus"], true);
}

#[tokio::test]
async fn wrong_password_is_401() {
    let app = app().await;
    register_and_login(&app, "alice").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "alice", "password": "Wrong-pass1!" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn weak_registration_is_400_and_duplicate_is_409() {
    let app = app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "username": "carol",
            "password": "password",
            "firstName": "Carol",
            "lastName": "User",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    register_and_login(&app, "carol").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "username": "carol",
            "password": PASSWORD,
            "firstName": "Carol",
            "lastName": "User",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, _) = send(&app, "GET", "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/api/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logging out without a session still succeeds.
    let (status, _) = send(&app, "POST", "/api/logout", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn empty_lists_differ_between_route_styles() {
    let app = app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/api/account/active", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send(
        &app,
        "GET",
        "/api/account/select/active",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/payment/select", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, "GET", "/api/payment/active", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn account_and_transaction_flow() {
    let app = app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, account) = send(
        &app,
        "POST",
        "/api/account",
        Some(&token),
        Some(json!({ "accountNameOwner": "chase_alice", "accountType": "credit" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account["accountNameOwner"], "chase_alice");

    let (status, _) = send(
        &app,
        "POST",
        "/api/account/insert",
        Some(&token),
        Some(json!({ "accountNameOwner": "chase_alice", "accountType": "credit" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, transaction) = send(
        &app,
        "POST",
        "/api/transaction",
        Some(&token),
        Some(json!({
            "accountType": "credit",
            "transactionType": "expense",
            "accountNameOwner": "chase_alice",
            "transactionDate": "2024-01-15",
            "description": "Grocery Store",
            "category": "groceries",
            "amount": "12.34",
            "transactionState": "outstanding",
            "reoccurringType": "onetime",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(transaction["amount"], "12.34");
    let guid = transaction["guid"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/transaction/state/update/{guid}/cleared"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["transactionState"], "cleared");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/transaction/state/update/{guid}/sideways"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, totals) = send(
        &app,
        "GET",
        "/api/transaction/account/totals/chase_alice",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(totals["totalsCleared"], "12.34");

    // Another user cannot see alice's data.
    let bob = register_and_login(&app, "bobby").await;
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/transaction/{guid}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, deleted) = send(
        &app,
        "DELETE",
        &format!("/api/transaction/delete/{guid}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["guid"], guid.as_str());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = app().await;
    let token = register_and_login(&app, "alice").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/account")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn family_members_are_private() {
    let app = app().await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bobby").await;

    let (status, member) = send(
        &app,
        "POST",
        "/api/family-members",
        Some(&alice),
        Some(json!({ "memberName": "Jane", "relationship": "spouse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["owner"], "alice");

    let (status, members) = send(
        &app,
        "GET",
        "/api/family-members/owner/alice/relationship/spouse",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "GET",
        "/api/family-members/owner/alice",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, counts) = send(
        &app,
        "GET",
        "/api/medical-expenses/claim-status-counts",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counts.as_array().unwrap().len(), 6);
}

async fn send_with_headers(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(header::HeaderName, String)],
) -> StatusCode {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    let request = builder.body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn non_bearer_authorization_falls_back_to_cookie() {
    let app = app().await;
    let token = register_and_login(&app, "alice").await;
    let basic = (header::AUTHORIZATION, "Basic dXNlcjpwYXNz".to_string());
    let cookie = (header::COOKIE, format!("token={token}"));

    let status = send_with_headers(&app, "GET", "/api/me", &[basic.clone(), cookie.clone()]).await;
    assert_eq!(status, StatusCode::OK);

    let status = send_with_headers(&app, "GET", "/api/me", &[basic.clone()]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let status = send_with_headers(&app, "POST", "/api/logout", &[basic.clone()]).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Logout with a Basic header still revokes the session cookie.
    let status = send_with_headers(&app, "POST", "/api/logout", &[basic, cookie.clone()]).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let status = send_with_headers(&app, "GET", "/api/me", &[cookie]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pending_and_parameter_routes() {
    let app = app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, pending) = send(
        &app,
        "POST",
        "/api/pending/transaction",
        Some(&token),
        Some(json!({
            "accountNameOwner": "chase_alice",
            "transactionDate": "2024-03-10",
            "description": "Coffee Shop",
            "amount": "4.50",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pending["reviewStatus"], "pending");

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/pending/transaction/delete/all",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, "GET", "/api/pending/transaction/all", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let parameter = json!({ "parameterName": "payment_account", "parameterValue": "checking_alice" });
    let (status, _) = send(&app, "POST", "/api/parameter", Some(&token), Some(parameter.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", "/api/parameter", Some(&token), Some(parameter)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn validation_amount_rejects_future_state() {
    let app = app().await;
    let token = register_and_login(&app, "alice").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/account",
        Some(&token),
        Some(json!({ "accountNameOwner": "chase_alice", "accountType": "credit" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let validation = |state: &str| {
        json!({
            "validationDate": "2024-02-01T12:00:00Z",
            "transactionState": state,
            "amount": "100.00",
        })
    };
    let (status, _) = send(
        &app,
        "POST",
        "/api/validation/amount/insert/chase_alice",
        Some(&token),
        Some(validation("future")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = send(
        &app,
        "POST",
        "/api/validation/amount/insert/chase_alice",
        Some(&token),
        Some(validation("cleared")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["transactionState"], "cleared");
}

#[tokio::test]
async fn receipt_must_be_jpeg_or_png() {
    let app = app().await;
    let token = register_and_login(&app, "alice").await;
    let (status, transaction) = send(
        &app,
        "POST",
        "/api/transaction",
        Some(&token),
        Some(json!({
            "accountType": "credit",
            "transactionType": "expense",
            "accountNameOwner": "chase_alice",
            "transactionDate": "2024-01-15",
            "description": "Grocery Store",
            "category": "groceries",
            "amount": "12.34",
            "transactionState": "outstanding",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let transaction_id = transaction["transactionId"].as_i64().unwrap();

    // "hello" in base64
    let (status, _) = send(
        &app,
        "POST",
        "/api/receipt/image",
        Some(&token),
        Some(json!({ "transactionId": transaction_id, "image": "aGVsbG8=" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, fetched) = send(
        &app,
        "GET",
        &format!("/api/transaction/{}", transaction["guid"].as_str().unwrap()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["receiptImageId"], Value::Null);
}
