//! Integration tests for the engine's JSON trigger API.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (cargo run -p sellerglass-cli -- migrate)
//! - The engine running (cargo run -p sellerglass-engine)
//!
//! Run with: cargo test -p sellerglass-integration-tests -- --ignored
//!
//! Credentials in the payloads are deliberately unverifiable; connecting
//! still succeeds (the account stays `pending`) because verification failure
//! is reported, not raised.

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the engine API (configurable via environment).
fn engine_base_url() -> String {
    std::env::var("ENGINE_BASE_URL").unwrap_or_else(|_| "http://localhost:3002".to_string())
}

fn connect_payload(owner_id: Uuid) -> Value {
    json!({
        "owner_id": owner_id,
        "name": "Integration test account",
        "region": "na",
        "marketplace_id": "ATVPDKIKX0DER",
        "seller_id": "A3EXAMPLE",
        "refresh_token": "Atzr|integration-test",
        "lwa_client_id": "amzn1.application-oa2-client.integration",
        "lwa_client_secret": "not-a-real-secret",
        "aws_access_key_id": "AKIAINTEGRATION",
        "aws_secret_access_key": "not-a-real-key",
        "aws_role_arn": "arn:aws:iam::123456789012:role/spapi"
    })
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running engine"]
async fn test_health() {
    let resp = Client::new()
        .get(format!("{}/health", engine_base_url()))
        .send()
        .await
        .expect("Failed to reach engine");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
#[ignore = "Requires a running engine"]
async fn test_readiness_checks_the_database() {
    let resp = Client::new()
        .get(format!("{}/health/ready", engine_base_url()))
        .send()
        .await
        .expect("Failed to reach engine");

    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Account Lifecycle Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running engine"]
async fn test_account_lifecycle() {
    let client = Client::new();
    let base_url = engine_base_url();
    let owner_id = Uuid::new_v4();

    // Connect: stored despite failing verification
    let resp = client
        .post(format!("{base_url}/accounts"))
        .json(&connect_payload(owner_id))
        .send()
        .await
        .expect("Failed to connect account");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("connect response");
    assert_eq!(body["verified"], json!(false));
    assert_eq!(body["account"]["status"], json!("pending"));
    assert!(body["error"].is_string());

    let account_id = body["account"]["id"].as_str().expect("account id").to_owned();

    // The stored account is visible, without its credentials
    let resp = client
        .get(format!("{base_url}/accounts/{account_id}"))
        .send()
        .await
        .expect("Failed to get account");
    assert_eq!(resp.status(), StatusCode::OK);

    let summary: Value = resp.json().await.expect("account summary");
    assert_eq!(summary["name"], json!("Integration test account"));
    assert!(summary.get("refresh_token").is_none());
    assert!(summary.get("lwa_client_secret").is_none());

    // And listed under its owner
    let resp = client
        .get(format!("{base_url}/accounts?owner_id={owner_id}"))
        .send()
        .await
        .expect("Failed to list accounts");
    assert_eq!(resp.status(), StatusCode::OK);

    let listed: Value = resp.json().await.expect("account list");
    let ids: Vec<&str> = listed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|account| account["id"].as_str())
        .collect();
    assert!(ids.contains(&account_id.as_str()));

    // Delete, then the account is gone
    let resp = client
        .delete(format!("{base_url}/accounts/{account_id}"))
        .send()
        .await
        .expect("Failed to delete account");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{base_url}/accounts/{account_id}"))
        .send()
        .await
        .expect("Failed to get account");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires a running engine"]
async fn test_listing_accounts_requires_an_owner_filter() {
    let resp = Client::new()
        .get(format!("{}/accounts", engine_base_url()))
        .send()
        .await
        .expect("Failed to reach engine");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Sync Trigger Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running engine"]
async fn test_sync_trigger_for_unknown_account_is_not_found() {
    let resp = Client::new()
        .post(format!(
            "{}/accounts/{}/sync/all",
            engine_base_url(),
            Uuid::new_v4()
        ))
        .send()
        .await
        .expect("Failed to reach engine");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Product & Cost Ledger Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running engine"]
async fn test_product_cost_flow() {
    let client = Client::new();
    let base_url = engine_base_url();
    let sku = format!("IT-{}", Uuid::new_v4());

    // Create a product
    let resp = client
        .post(format!("{base_url}/products"))
        .json(&json!({
            "owner_id": Uuid::new_v4(),
            "sku": sku,
            "name": "Integration test product"
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let product: Value = resp.json().await.expect("product");
    let product_id = product["id"].as_str().expect("product id").to_owned();

    // First cost version opens the ledger
    let resp = client
        .post(format!("{base_url}/products/{product_id}/costs"))
        .json(&json!({
            "base_cost": "10.00",
            "shipping_cost": "1.50",
            "effective_from": "2026-08-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to create cost version");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let v1: Value = resp.json().await.expect("cost version");
    assert_eq!(v1["version"], json!(1));
    assert_eq!(v1["total_cost"], json!("11.50"));
    assert!(v1["effective_to"].is_null());

    // Second version closes the first
    let resp = client
        .post(format!("{base_url}/products/{product_id}/costs"))
        .json(&json!({
            "base_cost": "12.00",
            "shipping_cost": "1.50",
            "effective_from": "2026-08-10T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to create cost version");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Historical margin resolution uses the version in effect at as_of
    let resp = client
        .get(format!(
            "{base_url}/products/{product_id}/costs/current?as_of=2026-08-05T00:00:00Z"
        ))
        .send()
        .await
        .expect("Failed to resolve cost");
    assert_eq!(resp.status(), StatusCode::OK);

    let current: Value = resp.json().await.expect("current cost");
    assert_eq!(current["version"], json!(1));
    assert_eq!(current["base_cost"], json!("10.00"));

    // Full history, newest first
    let resp = client
        .get(format!("{base_url}/products/{product_id}/costs"))
        .send()
        .await
        .expect("Failed to list cost versions");
    assert_eq!(resp.status(), StatusCode::OK);

    let history: Value = resp.json().await.expect("history");
    let history = history.as_array().expect("array");
    assert_eq!(history.len(), 2);
    let newest = history.first().expect("newest version");
    assert_eq!(newest["version"], json!(2));

    // Starting before the open version would rewrite history
    let resp = client
        .post(format!("{base_url}/products/{product_id}/costs"))
        .json(&json!({
            "base_cost": "9.00",
            "effective_from": "2026-08-02T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to reach engine");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires a running engine"]
async fn test_blank_sku_is_rejected() {
    let resp = Client::new()
        .post(format!("{}/products", engine_base_url()))
        .json(&json!({
            "owner_id": Uuid::new_v4(),
            "sku": "   ",
            "name": "No SKU"
        }))
        .send()
        .await
        .expect("Failed to reach engine");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
