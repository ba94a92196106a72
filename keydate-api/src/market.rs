use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use keydate_catalog::{
    market::{assess_price, market_price, CategorySummary},
    MarketQuote, PriceAssessment,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MarketLookupQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarketLookupResponse {
    pub query: String,
    pub found: bool,
    #[serde(flatten)]
    pub quote: Option<MarketQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarketCategoriesResponse {
    pub generated: Option<String>,
    pub total_items: u64,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Deserialize)]
pub struct PriceCheckRequest {
    pub title: Option<String>,
    pub price_cents: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PriceCheckResponse {
    pub title: String,
    pub your_price_cents: i64,
    #[serde(flatten)]
    pub assessment: Option<PriceAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/market-lookup", get(market_lookup))
        .route("/api/market-categories", get(market_categories))
        .route("/api/price-check", post(price_check))
}

/// GET /api/market-lookup
pub async fn market_lookup(
    State(state): State<AppState>,
    Query(query): Query<MarketLookupQuery>,
) -> Result<Json<MarketLookupResponse>, AppError> {
    let Some(q) = query.q.filter(|q| !q.trim().is_empty()) else {
        return Err(AppError::ValidationError("Missing query parameter".to_string()));
    };

    let index = state.market.current().await?;
    let quote = index
        .as_deref()
        .and_then(|index| market_price(index, &state.categorizer, &q));

    let message = match quote {
        Some(_) => None,
        None => Some("No market data found for this item type".to_string()),
    };

    Ok(Json(MarketLookupResponse {
        query: q,
        found: quote.is_some(),
        quote,
        message,
    }))
}

/// GET /api/market-categories
pub async fn market_categories(
    State(state): State<AppState>,
) -> Result<Json<MarketCategoriesResponse>, AppError> {
    let index = state
        .market
        .current()
        .await?
        .ok_or_else(|| AppError::InternalServerError("Market index not loaded".to_string()))?;

    Ok(Json(MarketCategoriesResponse {
        generated: index.generated.clone(),
        total_items: index.total_items,
        categories: index.category_summaries(),
    }))
}

/// POST /api/price-check
/// Compare a price with the market median for the title's category
pub async fn price_check(
    State(state): State<AppState>,
    Json(req): Json<PriceCheckRequest>,
) -> Result<Json<PriceCheckResponse>, AppError> {
    let (Some(title), Some(price_cents)) = (
        req.title.filter(|t| !t.trim().is_empty()),
        req.price_cents.filter(|p| *p > 0),
    ) else {
        return Err(AppError::ValidationError("Missing title or price".to_string()));
    };

    let index = state.market.current().await?;
    let assessment = index
        .as_deref()
        .and_then(|index| market_price(index, &state.categorizer, &title))
        .and_then(|quote| assess_price(&quote, price_cents));

    let (status, message) = match assessment {
        Some(_) => (None, None),
        None => (
            Some("unknown".to_string()),
            Some("No market data available for this item type".to_string()),
        ),
    };

    Ok(Json(PriceCheckResponse {
        title,
        your_price_cents: price_cents,
        assessment,
        status,
        message,
    }))
}
