//! Admin-only operations: stores, users and statistics.
//!
//! Requires a `PostgreSQL` database in `DATABASE_URL`.

use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use store_ratings_integration_tests::{TEST_PASSWORD, TestContext, json_id, unique_email};

async fn stores_named(ctx: &TestContext, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stores WHERE name = $1")
        .bind(name)
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count stores")
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_non_admin_cannot_create_store() {
    let ctx = TestContext::new().await;
    let owner = ctx.register("Owner").await;
    let user = ctx.register("User").await;
    let name = format!("Forbidden {}", Uuid::new_v4().simple());
    let body = json!({"name": name, "address": "2 Side Street", "owner_id": owner.id});

    for caller in [&user, &owner] {
        let response = ctx.post("/stores", Some(&caller.token), &body).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }
    let anonymous = ctx.post("/stores", None, &body).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    assert_eq!(stores_named(&ctx, &name).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_admin_creates_store() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let owner = ctx.register("Owner").await;
    let tag = Uuid::new_v4().simple().to_string();
    let name = format!("Bakery {tag}");

    let response = ctx
        .post(
            "/stores",
            Some(&admin.token),
            &json!({
                "name": name,
                "email": "Hello@Bakery.example",
                "address": "8 Baker Street",
                "ownerId": owner.id,
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["name"], name);
    assert_eq!(response.body["email"], "hello@bakery.example");
    assert_eq!(json_id(&response.body["owner_id"]), owner.id);

    let search = ctx.get(&format!("/stores?q={tag}"), None).await;
    let found = search.body.as_array().expect("Store list is an array");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], name);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_store_owner_must_exist_and_be_owner() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let user = ctx.register("User").await;

    let missing = ctx
        .post(
            "/stores",
            Some(&admin.token),
            &json!({"name": "Nobody's Shop", "address": "0 Void", "owner_id": i32::MAX}),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], "Owner not found");

    let not_owner = ctx
        .post(
            "/stores",
            Some(&admin.token),
            &json!({"name": "Wrong Role Shop", "address": "1 Void", "owner_id": user.id}),
        )
        .await;
    assert_eq!(not_owner.status, StatusCode::BAD_REQUEST);
    assert_eq!(not_owner.body["errors"][0]["field"], "owner_id");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_admin_creates_user_of_any_role() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let email = unique_email("made-admin");

    let response = ctx
        .post(
            "/users",
            Some(&admin.token),
            &json!({
                "name": "Second Admin",
                "email": email,
                "password": TEST_PASSWORD,
                "address": "2 Admin Plaza",
                "role": "Admin",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["role"], "Admin");

    let login = ctx.login(&email, TEST_PASSWORD).await;
    assert_eq!(login.status, StatusCode::OK);

    let user = ctx.register("User").await;
    let refused = ctx
        .post(
            "/users",
            Some(&user.token),
            &json!({
                "name": "Sneaky",
                "email": unique_email("sneaky"),
                "password": TEST_PASSWORD,
                "address": "3 Side Street",
            }),
        )
        .await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_user_list_filters_by_role_and_search() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let owner = ctx.register("Owner").await;
    let user = ctx.register("User").await;

    let by_email = ctx
        .get(&format!("/users?q={}", owner.email), Some(&admin.token))
        .await;
    assert_eq!(by_email.status, StatusCode::OK);
    let found = by_email.body.as_array().expect("User list is an array");
    assert_eq!(found.len(), 1);
    assert_eq!(json_id(&found[0]["id"]), owner.id);
    assert!(found[0].get("password_hash").is_none());

    let owners = ctx
        .get(&format!("/users?role=owner&q={}", user.email), Some(&admin.token))
        .await;
    assert_eq!(owners.body, json!([]));

    let bad_role = ctx.get("/users?role=superuser", Some(&admin.token)).await;
    assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_user_detail_includes_owner_average() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let owner = ctx.register("Owner").await;
    let store_id = ctx.create_store(&admin, owner.id).await;
    let rater = ctx.register("User").await;
    ctx.rate(&rater, store_id, 4).await;

    let detail = ctx
        .get(&format!("/users/{}", owner.id), Some(&admin.token))
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["role"], "Owner");
    assert_eq!(detail.body["average_rating"], 4.0);

    let plain = ctx
        .get(&format!("/users/{}", rater.id), Some(&admin.token))
        .await;
    assert_eq!(plain.status, StatusCode::OK);
    assert!(plain.body.get("average_rating").is_none_or(serde_json::Value::is_null));

    let missing = ctx
        .get(&format!("/users/{}", i32::MAX), Some(&admin.token))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_stats_reports_totals_to_admin_only() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let owner = ctx.register("Owner").await;
    let store_id = ctx.create_store(&admin, owner.id).await;
    ctx.rate(&owner, store_id, 5).await;

    let stats = ctx.get("/stats", Some(&admin.token)).await;
    assert_eq!(stats.status, StatusCode::OK);
    for key in ["total_users", "total_stores", "total_ratings"] {
        assert!(stats.body[key].as_i64().is_some_and(|n| n >= 1), "{key}");
    }
    assert!(stats.body["total_users"].as_i64() >= Some(2));

    let refused = ctx.get("/stats", Some(&owner.token)).await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
}
