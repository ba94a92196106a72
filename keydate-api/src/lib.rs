use axum::{
    routing::get,
    Router,
    http::Method,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod state;
pub mod error;
pub mod listings;
pub mod calendar;
pub mod market;

pub use state::AppState;
use error::AppError;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .route("/health", get(health))
        .merge(listings::routes())
        .merge(calendar::routes())
        .merge(market::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "app": "keydate-api" }))
}

/// The requested `YYYY-MM-DD` date, or today when absent.
pub(crate) fn resolve_date(param: Option<&str>) -> Result<NaiveDate, AppError> {
    match param {
        Some(raw) => keydate_catalog::parse_date(raw).map_err(AppError::from_pricing),
        None => Ok(chrono::Local::now().date_naive()),
    }
}
