//! Registration, login and identity reservation.
//!
//! Requires a `PostgreSQL` database in `DATABASE_URL`.

use reqwest::StatusCode;
use serde_json::json;

use store_ratings_integration_tests::{TEST_PASSWORD, TestContext, json_id, unique_email};

fn registration(email: &str) -> serde_json::Value {
    json!({
        "name": "Registration Test",
        "email": email,
        "password": TEST_PASSWORD,
        "address": "5 Elm Street",
    })
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_distinct_registrations_get_unique_ids_and_lowercase_email() {
    let ctx = TestContext::new().await;

    let first = unique_email("Mixed.Case");
    let second = unique_email("Other");

    let a = ctx.post("/auth/register", None, &registration(&first)).await;
    let b = ctx.post("/auth/register", None, &registration(&second)).await;

    assert_eq!(a.status, StatusCode::CREATED);
    assert_eq!(b.status, StatusCode::CREATED);
    assert_ne!(json_id(&a.body["id"]), json_id(&b.body["id"]));
    assert_eq!(a.body["email"], first.to_lowercase());
    assert_eq!(a.body["role"], "User");
    assert!(a.body.get("password").is_none());
    assert!(a.body.get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_concurrent_registrations_reserve_distinct_ids() {
    let ctx = TestContext::new().await;

    let emails: Vec<String> = (0..8).map(|_| unique_email("burst")).collect();

    let mut tasks = Vec::new();
    for email in &emails {
        let ctx = ctx.clone();
        let body = registration(email);
        tasks.push(tokio::spawn(async move {
            ctx.post("/auth/register", None, &body).await
        }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        let response = task.await.expect("Registration task panicked");
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        ids.push(json_id(&response.body["id"]));
    }

    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), emails.len());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_email_differing_only_in_case_is_duplicate() {
    let ctx = TestContext::new().await;
    let email = unique_email("dup");

    let first = ctx.post("/auth/register", None, &registration(&email)).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = ctx
        .post("/auth/register", None, &registration(&email.to_uppercase()))
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.body["message"], "Email already exists");
    assert_eq!(ctx.users_with_email(&email).await, 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_public_registration_cannot_choose_admin() {
    let ctx = TestContext::new().await;
    let email = unique_email("climber");

    let mut body = registration(&email);
    body["role"] = json!("Admin");
    let response = ctx.post("/auth/register", None, &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "role");
    assert_eq!(ctx.users_with_email(&email).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_invalid_registration_stores_nothing() {
    let ctx = TestContext::new().await;
    let email = unique_email("short");

    let mut body = registration(&email);
    body["password"] = json!("12345");
    let response = ctx.post("/auth/register", None, &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.users_with_email(&email).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_email_that_grows_when_lowercased_stays_readable() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let email = unique_email(&"\u{130}".repeat(100));

    let created = ctx.post("/auth/register", None, &registration(&email)).await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    let id = json_id(&created.body["id"]);

    let fetched = ctx.get(&format!("/users/{id}"), Some(&admin.token)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["email"], created.body["email"]);

    let listed = ctx.get("/users", Some(&admin.token)).await;
    assert_eq!(listed.status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_email_too_long_once_lowercased_is_rejected() {
    let ctx = TestContext::new().await;
    let email = unique_email(&"\u{130}".repeat(110));

    let response = ctx.post("/auth/register", None, &registration(&email)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "email");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_login_returns_token_and_user() {
    let ctx = TestContext::new().await;
    let owner = ctx.register("Owner").await;

    let response = ctx.login(&owner.email.to_uppercase(), TEST_PASSWORD).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(json_id(&response.body["user"]["id"]), owner.id);
    assert_eq!(response.body["user"]["role"], "Owner");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_login_failures_are_bad_requests() {
    let ctx = TestContext::new().await;
    let user = ctx.register("User").await;

    let unknown = ctx.login(&unique_email("ghost"), TEST_PASSWORD).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.body["message"], "User not found");

    let wrong = ctx.login(&user.email, "not-the-password").await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.body["message"], "Invalid credentials");
}
