use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use keydate_api::{app, AppState};
use keydate_catalog::{Categorizer, InventorySource, MarketIndex, PricingConfig, PricingEngine, RuleSet};
use keydate_shared::Listing;
use keydate_store::{JsonInventory, MarketIndexRepository};
use serde_json::{json, Value};
use tower::ServiceExt;

const RULES: &str = r#"[
    {"name": "Elvis Birthday", "keywords": ["elvis", "presley"], "tier": "MAJOR", "increase_percent": 25, "start_date": "01-06", "end_date": "01-10"},
    {"name": "Record Store Week", "keywords": ["record"], "tier": "MEDIUM", "increase_percent": 15, "start_date": "01-01", "end_date": "01-31"},
    {"name": "New Year", "keywords": ["champagne"], "tier": "PEAK", "increase_percent": 35, "start_date": "12-28", "end_date": "01-03"},
    {"name": "Broken", "keywords": ["elvis"], "tier": "ULTRA", "increase_percent": 90, "start_date": "01-06", "end_date": "01-10"}
]"#;

fn listings() -> Vec<Listing> {
    vec![
        Listing::new("100", "Elvis Presley Record", 20000),
        Listing::new("200", "KAWS Companion Grey", 15000),
        Listing::new("300", "Sticker pack", 500),
    ]
}

fn market_index() -> MarketIndex {
    MarketIndex::from_json(
        r#"{"generated": "2026-01-01", "total_items": 30,
            "categories": {"KAWS - Companion": {"count": 30, "sold_count": 12, "sold_avg": 290.0, "sold_median": 280.0}}}"#,
    )
    .unwrap()
}

struct TestApp {
    router: Router,
    inventory: Arc<JsonInventory>,
}

fn test_app(market: MarketIndexRepository) -> TestApp {
    let report = RuleSet::from_json(RULES).unwrap();
    assert_eq!(report.rejected.len(), 1);

    let inventory = Arc::new(JsonInventory::in_memory(listings()));
    let state = AppState {
        engine: Arc::new(PricingEngine::new(report.rules, PricingConfig::default())),
        inventory: inventory.clone(),
        price_sink: inventory.clone(),
        market: Arc::new(market),
        categorizer: Arc::new(Categorizer::default()),
    };

    TestApp { router: app(state), inventory }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let app = test_app(MarketIndexRepository::empty());
    let (status, body) = get(&app.router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_boost_uses_single_highest_event() {
    let app = test_app(MarketIndexRepository::empty());
    let (status, body) = post(
        &app.router,
        "/api/price/boost",
        json!({"base_price_cents": 20000, "text": "Elvis Presley Record", "date": "2026-01-08"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["boosted_price_cents"], 25000);
    assert_eq!(body["winning_event"], "Elvis Birthday");
    assert_eq!(body["matching_events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_boost_without_match_returns_base() {
    let app = test_app(MarketIndexRepository::empty());
    let (status, body) = post(
        &app.router,
        "/api/price/boost",
        json!({"base_price_cents": 8000, "text": "Banksy print", "date": "2026-01-08"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["boosted_price_cents"], 8000);
    assert!(body["winning_event"].is_null());
}

#[tokio::test]
async fn test_boost_rejects_invalid_input() {
    let app = test_app(MarketIndexRepository::empty());

    let (status, body) = post(
        &app.router,
        "/api/price/boost",
        json!({"base_price_cents": 0, "text": "Elvis", "date": "2026-01-08"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("positive"));

    let (status, _) = post(
        &app.router,
        "/api/price/boost",
        json!({"base_price_cents": 1000, "text": "Elvis", "date": ""}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listings_carry_suggestions_and_market_data() {
    let app = test_app(MarketIndexRepository::fixed(market_index()));
    let (status, body) = get(&app.router, "/api/listings?date=2026-01-08").await;

    assert_eq!(status, StatusCode::OK);
    let listings = body.as_array().unwrap();
    assert_eq!(listings.len(), 3);

    assert_eq!(listings[0]["id"], "100");
    assert_eq!(listings[0]["suggested_price_cents"], 25000);
    assert!(listings[0].get("market_data").is_none());

    assert_eq!(listings[1]["suggested_price_cents"], 15000);
    assert_eq!(listings[1]["market_data"]["category"], "KAWS - Companion");
    assert_eq!(listings[1]["price_assessment"]["status"], "underpriced");
}

#[tokio::test]
async fn test_listings_search_filter() {
    let app = test_app(MarketIndexRepository::empty());
    let (_, body) = get(&app.router, "/api/listings?search=KAWS&date=2026-01-08").await;

    let listings = body.as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["id"], "200");
}

#[tokio::test]
async fn test_stats_and_underpriced() {
    let app = test_app(MarketIndexRepository::empty());

    let (status, stats) = get(&app.router, "/api/stats?date=2026-01-08").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_listings"], 3);
    assert_eq!(stats["total_value_cents"], 35500);
    assert_eq!(stats["active_events"], 2);
    assert_eq!(stats["underpriced"], 1);

    let (_, underpriced) = get(&app.router, "/api/underpriced?date=2026-01-08").await;
    let items = underpriced.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "100");
    assert_eq!(items[0]["boost_percent"], 25.0);
}

#[tokio::test]
async fn test_alerts() {
    let app = test_app(MarketIndexRepository::empty());
    let (_, body) = get(&app.router, "/api/alerts").await;

    let alerts = body.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["kind"], "low_price");
    assert_eq!(alerts[0]["listing"]["id"], "300");
}

#[tokio::test]
async fn test_update_price_flows_to_sink() {
    let app = test_app(MarketIndexRepository::empty());

    let (status, body) = post(&app.router, "/api/update-price", json!({"item_id": "100", "price_cents": 25000})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["event"]["previous_price_cents"], 20000);
    assert_eq!(app.inventory.get_listing("100").await.unwrap().price_cents, 25000);

    let (status, _) = post(&app.router, "/api/update-price", json!({"item_id": "100"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app.router, "/api/update-price", json!({"item_id": "999", "price_cents": 100})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_calendar_month_spans() {
    let app = test_app(MarketIndexRepository::empty());
    let (status, body) = get(&app.router, "/api/calendar?month=1&year=2026").await;

    assert_eq!(status, StatusCode::OK);
    let spans: Vec<(String, String, String)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| {
            (
                s["event"].as_str().unwrap().to_string(),
                s["start_date"].as_str().unwrap().to_string(),
                s["end_date"].as_str().unwrap().to_string(),
            )
        })
        .collect();

    assert_eq!(
        spans,
        vec![
            ("New Year".to_string(), "2026-01-01".to_string(), "2026-01-03".to_string()),
            ("Record Store Week".to_string(), "2026-01-01".to_string(), "2026-01-31".to_string()),
            ("Elvis Birthday".to_string(), "2026-01-06".to_string(), "2026-01-10".to_string()),
        ]
    );

    let (status, _) = get(&app.router, "/api/calendar?month=13&year=2026").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calendar_projection() {
    let app = test_app(MarketIndexRepository::empty());
    let (status, body) = get(&app.router, "/api/calendar/projection?start=2026-01-01&end=2026-01-31").await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    let dates: Vec<&str> = entries.iter().map(|e| e["date"].as_str().unwrap()).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);

    let elvis: Vec<&str> = entries
        .iter()
        .filter(|e| e["event"] == "Elvis Birthday")
        .map(|e| e["date"].as_str().unwrap())
        .collect();
    assert_eq!(elvis, vec!["2026-01-06", "2026-01-07", "2026-01-08", "2026-01-09", "2026-01-10"]);

    let (status, _) = get(&app.router, "/api/calendar/projection?start=2026-02-01&end=2026-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upcoming_dates() {
    let app = test_app(MarketIndexRepository::empty());
    let (status, body) = get(&app.router, "/api/upcoming-dates?date=2026-01-08").await;

    assert_eq!(status, StatusCode::OK);
    let events: Vec<&str> = body.as_array().unwrap().iter().map(|e| e["event"].as_str().unwrap()).collect();
    assert_eq!(events, vec!["Record Store Week", "Elvis Birthday", "New Year"]);
    assert_eq!(body[0]["month"], "JAN");
    assert_eq!(body[0]["day"], 1);
    assert_eq!(body[2]["start_date"], "2026-12-28");
}

#[tokio::test]
async fn test_market_lookup() {
    let app = test_app(MarketIndexRepository::fixed(market_index()));

    let (status, body) = get(&app.router, "/api/market-lookup?q=kaws%20companion").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], true);
    assert_eq!(body["sold_median_cents"], 28000);

    let (_, body) = get(&app.router, "/api/market-lookup?q=elvis").await;
    assert_eq!(body["found"], false);

    let (status, _) = get(&app.router, "/api/market-lookup").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_market_categories_requires_index() {
    let app = test_app(MarketIndexRepository::empty());
    let (status, _) = get(&app.router, "/api/market-categories").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let app = test_app(MarketIndexRepository::fixed(market_index()));
    let (status, body) = get(&app.router, "/api/market-categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 30);
    assert_eq!(body["categories"][0]["category"], "KAWS - Companion");
}

#[tokio::test]
async fn test_price_check() {
    let app = test_app(MarketIndexRepository::fixed(market_index()));

    let (status, body) = post(&app.router, "/api/price-check", json!({"title": "KAWS Companion", "price_cents": 50000})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "overpriced");
    assert_eq!(body["your_price_cents"], 50000);

    let (_, body) = post(&app.router, "/api/price-check", json!({"title": "Elvis LP", "price_cents": 5000})).await;
    assert_eq!(body["status"], "unknown");

    let (status, _) = post(&app.router, "/api/price-check", json!({"title": "KAWS"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
