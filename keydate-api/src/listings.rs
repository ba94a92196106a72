use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use keydate_catalog::{
    market::{assess_price, market_price},
    Alert, EventRule, InventoryStats, MarketQuote, PriceAssessment,
};
use keydate_shared::{Listing, PriceAppliedEvent};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::resolve_date;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListingsQuery {
    pub search: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    /// Absent for listings without a positive price
    pub suggested_price_cents: Option<i64>,
    pub matching_events: Vec<EventRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_data: Option<MarketQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_assessment: Option<PriceAssessment>,
}

#[derive(Debug, Serialize)]
pub struct UnderpricedView {
    #[serde(flatten)]
    pub listing: Listing,
    pub suggested_price_cents: i64,
    pub boost_percent: f64,
    pub winning_event: Option<String>,
    pub matching_events: Vec<EventRule>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePriceRequest {
    pub item_id: Option<String>,
    pub price_cents: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UpdatePriceResponse {
    pub success: bool,
    pub event: PriceAppliedEvent,
}

#[derive(Debug, Deserialize)]
pub struct BoostRequest {
    pub base_price_cents: i64,
    pub text: String,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BoostResponse {
    pub base_price_cents: i64,
    pub boosted_price_cents: i64,
    pub boost_percent: f64,
    pub winning_event: Option<String>,
    pub matching_events: Vec<EventRule>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/listings", get(list_listings))
        .route("/api/stats", get(get_stats))
        .route("/api/underpriced", get(get_underpriced))
        .route("/api/alerts", get(get_alerts))
        .route("/api/update-price", post(update_price))
        .route("/api/price/boost", post(boost_price))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/listings
/// Listings with suggested prices, matching events and market data
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingsQuery>,
) -> Result<Json<Vec<ListingView>>, AppError> {
    let date = resolve_date(query.date.as_deref())?;
    let mut listings = state.inventory.list_listings().await.map_err(AppError::from_inventory)?;

    if let Some(search) = query.search.as_deref().map(str::to_lowercase).filter(|s| !s.is_empty()) {
        listings.retain(|l| l.title.to_lowercase().contains(&search));
    }

    let index = state.market.current().await?;

    let views = listings
        .into_iter()
        .map(|listing| {
            let (suggested_price_cents, matching_events) = match state.engine.suggest_price(&listing, date) {
                Ok(s) => (Some(s.suggested_cents), s.matched_events),
                Err(e) => {
                    tracing::warn!(listing_id = %listing.id, error = %e, "Skipping price suggestion");
                    (None, Vec::new())
                }
            };

            let market_data = index
                .as_deref()
                .and_then(|index| market_price(index, &state.categorizer, &listing.title));
            let price_assessment = market_data
                .as_ref()
                .and_then(|quote| assess_price(quote, listing.price_cents));

            ListingView {
                listing,
                suggested_price_cents,
                matching_events,
                market_data,
                price_assessment,
            }
        })
        .collect();

    Ok(Json(views))
}

/// GET /api/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<InventoryStats>, AppError> {
    let date = resolve_date(query.date.as_deref())?;
    let listings = state.inventory.list_listings().await.map_err(AppError::from_inventory)?;

    Ok(Json(state.engine.inventory_stats(&listings, date)))
}

/// GET /api/underpriced
/// Listings whose event-boosted price is above the current price
pub async fn get_underpriced(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<UnderpricedView>>, AppError> {
    let date = resolve_date(query.date.as_deref())?;
    let listings = state.inventory.list_listings().await.map_err(AppError::from_inventory)?;

    let underpriced = listings
        .into_iter()
        .filter_map(|listing| {
            let suggestion = state.engine.suggest_price(&listing, date).ok()?;
            if !state.engine.is_underpriced(&suggestion) {
                return None;
            }
            Some(UnderpricedView {
                listing,
                suggested_price_cents: suggestion.suggested_cents,
                boost_percent: suggestion.boost_percent,
                winning_event: suggestion.winning_event,
                matching_events: suggestion.matched_events,
            })
        })
        .collect();

    Ok(Json(underpriced))
}

/// GET /api/alerts
pub async fn get_alerts(State(state): State<AppState>) -> Result<Json<Vec<Alert>>, AppError> {
    let listings = state.inventory.list_listings().await.map_err(AppError::from_inventory)?;
    Ok(Json(state.engine.alerts(&listings)))
}

/// POST /api/update-price
/// Hand a new price to the price sink
pub async fn update_price(
    State(state): State<AppState>,
    Json(req): Json<UpdatePriceRequest>,
) -> Result<Json<UpdatePriceResponse>, AppError> {
    let (Some(item_id), Some(price_cents)) = (req.item_id.filter(|id| !id.is_empty()), req.price_cents) else {
        return Err(AppError::ValidationError("Missing parameters".to_string()));
    };

    let event = state
        .price_sink
        .apply_price(&item_id, price_cents)
        .await
        .map_err(AppError::from_inventory)?;

    Ok(Json(UpdatePriceResponse { success: true, event }))
}

/// POST /api/price/boost
/// Price arbitrary item text against the rule set
pub async fn boost_price(
    State(state): State<AppState>,
    Json(req): Json<BoostRequest>,
) -> Result<Json<BoostResponse>, AppError> {
    let date = resolve_date(req.date.as_deref())?;

    let active = state.engine.match_active_events(&req.text, date);
    let boosted_price_cents = state
        .engine
        .calculate_boosted_price(req.base_price_cents, &active)
        .map_err(AppError::from_pricing)?;
    let winner = keydate_catalog::select_boost(&active);

    Ok(Json(BoostResponse {
        base_price_cents: req.base_price_cents,
        boosted_price_cents,
        boost_percent: winner.map(|r| r.increase_percent).unwrap_or(0.0),
        winning_event: winner.map(|r| r.name.clone()),
        matching_events: active.into_iter().cloned().collect(),
    }))
}
