// Integration tests for the offer negotiation endpoints. Each test spawns
// the real router on an ephemeral port with a private data dir and drives
// it over HTTP.

use std::sync::{Arc, Mutex};

use serde_json::json;
use uuid::Uuid;

use estatebook_marketplace::{api_router, AppState, Config, SharedState};

async fn spawn_app() -> String {
    let config = Config {
        port: 0,
        data_dir: std::env::temp_dir().join(format!("estatebook_it_{}", Uuid::new_v4().simple())),
        seed_demo_data: false,
    };
    let state: SharedState = Arc::new(Mutex::new(AppState::new(&config)));
    let app = api_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn create_listing(
    client: &reqwest::Client,
    base_url: &str,
    seller_id: &str,
    asking_price: i64,
) -> String {
    let response = client
        .post(format!("{}/listings", base_url))
        .json(&json!({
            "title": "3BR villa, sea view",
            "description": "Renovated in 2024",
            "seller_id": seller_id,
            "asking_price": asking_price
        }))
        .send()
        .await
        .expect("Failed to create listing");

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse listing");
    body["listing"]["id"].as_str().unwrap().to_string()
}

async fn place_offer(
    client: &reqwest::Client,
    base_url: &str,
    property_id: &str,
    buyer_id: &str,
    amount: i64,
) -> serde_json::Value {
    let response = client
        .post(format!("{}/offers", base_url))
        .json(&json!({
            "property_id": property_id,
            "buyer_id": buyer_id,
            "amount": amount,
            "message": "willing to close this month"
        }))
        .send()
        .await
        .expect("Failed to place offer");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse offer")
}

#[tokio::test]
async fn test_full_negotiation_flow() {
    let client = reqwest::Client::new();
    let base_url = spawn_app().await;

    let listing_id = create_listing(&client, &base_url, "seller_1", 60_000_000).await;

    // buyer opens at 500000
    let body = place_offer(&client, &base_url, &listing_id, "buyer_1", 500_000).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["offer"]["status"], "pending");
    let offer_id = body["offer"]["id"].as_str().unwrap().to_string();

    // seller counters at 550000
    let response = client
        .post(format!("{}/offers/{}/counter", base_url, offer_id))
        .json(&json!({
            "acting_party_id": "seller_1",
            "counter_amount": 550_000,
            "counter_message": "final price"
        }))
        .send()
        .await
        .expect("Failed to counter");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["offer"]["status"], "countered");
    assert_eq!(body["offer"]["counter_amount"], 550_000);
    assert_eq!(body["offer"]["amount"], 500_000);

    // buyer accepts the counter
    let response = client
        .post(format!("{}/offers/{}/accept", base_url, offer_id))
        .json(&json!({ "acting_party_id": "buyer_1" }))
        .send()
        .await
        .expect("Failed to accept");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["offer"]["status"], "accepted");

    // a late reject must fail and change nothing
    let response = client
        .post(format!("{}/offers/{}/reject", base_url, offer_id))
        .json(&json!({ "acting_party_id": "seller_1" }))
        .send()
        .await
        .expect("Failed to send reject");
    assert_eq!(response.status(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "invalid_state_transition");

    let response = client
        .get(format!("{}/offers/{}", base_url, offer_id))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["offer"]["status"], "accepted");

    // the accepted sale flags the listing
    let response = client
        .get(format!("{}/listings/{}", base_url, listing_id))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["listing"]["status"], "under_offer");

    // seller was notified at placement and at acceptance
    let response = client
        .get(format!("{}/notifications/seller_1", base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    let kinds: Vec<&str> = body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"offer_received"));
    assert!(kinds.contains(&"offer_accepted"));
}

#[tokio::test]
async fn test_offer_validation_errors() {
    let client = reqwest::Client::new();
    let base_url = spawn_app().await;
    let listing_id = create_listing(&client, &base_url, "seller_1", 60_000_000).await;

    // non-positive amount
    let response = client
        .post(format!("{}/offers", base_url))
        .json(&json!({
            "property_id": listing_id,
            "buyer_id": "buyer_1",
            "amount": 0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "invalid_amount");

    // unknown listing
    let response = client
        .post(format!("{}/offers", base_url))
        .json(&json!({
            "property_id": "lst_missing",
            "buyer_id": "buyer_1",
            "amount": 100
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // seller cannot bid on their own listing
    let response = client
        .post(format!("{}/offers", base_url))
        .json(&json!({
            "property_id": listing_id,
            "buyer_id": "seller_1",
            "amount": 100
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // one active negotiation per (listing, buyer)
    place_offer(&client, &base_url, &listing_id, "buyer_1", 500_000).await;
    let response = client
        .post(format!("{}/offers", base_url))
        .json(&json!({
            "property_id": listing_id,
            "buyer_id": "buyer_1",
            "amount": 510_000
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "active_offer_exists");
}

#[tokio::test]
async fn test_role_enforcement() {
    let client = reqwest::Client::new();
    let base_url = spawn_app().await;
    let listing_id = create_listing(&client, &base_url, "seller_1", 60_000_000).await;

    let body = place_offer(&client, &base_url, &listing_id, "buyer_1", 500_000).await;
    let offer_id = body["offer"]["id"].as_str().unwrap().to_string();

    // buyer cannot resolve their own pending offer
    let response = client
        .post(format!("{}/offers/{}/accept", base_url, offer_id))
        .json(&json!({ "acting_party_id": "buyer_1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // a stranger cannot act at all
    let response = client
        .post(format!("{}/offers/{}/reject", base_url, offer_id))
        .json(&json!({ "acting_party_id": "stranger" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // buyer cannot counter
    let response = client
        .post(format!("{}/offers/{}/counter", base_url, offer_id))
        .json(&json!({ "acting_party_id": "buyer_1", "counter_amount": 550_000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // invalid counter amount from the right party
    let response = client
        .post(format!("{}/offers/{}/counter", base_url, offer_id))
        .json(&json!({ "acting_party_id": "seller_1", "counter_amount": -5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // offer is still pending after all of the above
    let response = client
        .get(format!("{}/offers/{}", base_url, offer_id))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["offer"]["status"], "pending");
}

#[tokio::test]
async fn test_offer_listing_and_status_filter() {
    let client = reqwest::Client::new();
    let base_url = spawn_app().await;

    let first = create_listing(&client, &base_url, "seller_1", 10_000_000).await;
    let second = create_listing(&client, &base_url, "seller_1", 20_000_000).await;

    let body = place_offer(&client, &base_url, &first, "buyer_1", 9_000_000).await;
    let first_offer = body["offer"]["id"].as_str().unwrap().to_string();
    place_offer(&client, &base_url, &second, "buyer_1", 18_000_000).await;

    client
        .post(format!("{}/offers/{}/accept", base_url, first_offer))
        .json(&json!({ "acting_party_id": "seller_1" }))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/offers/buyer/buyer_1", base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);

    let response = client
        .get(format!("{}/offers/buyer/buyer_1?status=pending", base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["offers"][0]["property_id"], second.as_str());

    let response = client
        .get(format!("{}/offers/seller/seller_1?status=accepted", base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["offers"][0]["id"], first_offer.as_str());
}

#[tokio::test]
async fn test_offers_blocked_once_listing_under_offer() {
    let client = reqwest::Client::new();
    let base_url = spawn_app().await;
    let listing_id = create_listing(&client, &base_url, "seller_1", 60_000_000).await;

    let body = place_offer(&client, &base_url, &listing_id, "buyer_1", 500_000).await;
    let offer_id = body["offer"]["id"].as_str().unwrap().to_string();

    client
        .post(format!("{}/offers/{}/accept", base_url, offer_id))
        .json(&json!({ "acting_party_id": "seller_1" }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/offers", base_url))
        .json(&json!({
            "property_id": listing_id,
            "buyer_id": "buyer_2",
            "amount": 700_000
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "listing_unavailable");
}
