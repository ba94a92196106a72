use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Months, NaiveDate};
use keydate_catalog::Tier;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::resolve_date;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectionQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub date: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CalendarSpanView {
    pub event: String,
    pub tier: Tier,
    pub increase_percent: f64,
    /// First three keywords, comma separated
    pub item: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ProjectionEntryView {
    pub date: NaiveDate,
    pub event: String,
    pub tier: Tier,
    pub increase_percent: f64,
}

#[derive(Debug, Serialize)]
pub struct UpcomingView {
    pub month: String,
    pub day: u32,
    pub event: String,
    pub tier: Tier,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active_now: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/calendar", get(get_calendar))
        .route("/api/calendar/projection", get(get_projection))
        .route("/api/upcoming-dates", get(get_upcoming_dates))
}

fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid month {}-{}", year, month)))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::ValidationError(format!("Invalid month {}-{}", year, month)))?;
    Ok((first, last))
}

fn calendar_range(query: &CalendarQuery) -> Result<(NaiveDate, NaiveDate), AppError> {
    match (query.month, query.year, query.start.as_deref(), query.end.as_deref()) {
        (Some(month), Some(year), _, _) => month_bounds(year, month),
        (_, _, Some(start), Some(end)) => Ok((resolve_date(Some(start))?, resolve_date(Some(end))?)),
        (None, None, None, None) => {
            let today = resolve_date(None)?;
            month_bounds(today.year(), today.month())
        }
        _ => Err(AppError::ValidationError(
            "Provide month and year, or start and end".to_string(),
        )),
    }
}

/// GET /api/calendar
/// Event spans for a month (or an explicit range), for calendar rendering
pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarSpanView>>, AppError> {
    let (start, end) = calendar_range(&query)?;
    let spans = state.engine.active_spans(start, end).map_err(AppError::from_pricing)?;

    let views = spans
        .into_iter()
        .map(|span| CalendarSpanView {
            event: span.rule.name.clone(),
            tier: span.rule.tier,
            increase_percent: span.rule.increase_percent,
            item: span.rule.keywords.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
            start_date: span.start,
            end_date: span.end,
        })
        .collect();

    Ok(Json(views))
}

/// GET /api/calendar/projection
/// Every (date, event) pair in the range
pub async fn get_projection(
    State(state): State<AppState>,
    Query(query): Query<ProjectionQuery>,
) -> Result<Json<Vec<ProjectionEntryView>>, AppError> {
    let start = resolve_date(Some(&query.start))?;
    let end = resolve_date(Some(&query.end))?;

    let entries = state
        .engine
        .project_calendar(start, end)
        .map_err(AppError::from_pricing)?
        .into_iter()
        .map(|entry| ProjectionEntryView {
            date: entry.date,
            event: entry.rule.name.clone(),
            tier: entry.rule.tier,
            increase_percent: entry.rule.increase_percent,
        })
        .collect();

    Ok(Json(entries))
}

/// GET /api/upcoming-dates
/// Nearest event windows, running or next
pub async fn get_upcoming_dates(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Vec<UpcomingView>>, AppError> {
    let today = resolve_date(query.date.as_deref())?;
    let limit = query.limit.unwrap_or(state.engine.config().upcoming_limit);

    let views = state
        .engine
        .upcoming_events(today, limit)
        .into_iter()
        .map(|u| UpcomingView {
            month: u.start.format("%b").to_string().to_uppercase(),
            day: u.start.day(),
            event: u.rule.name.clone(),
            tier: u.rule.tier,
            start_date: u.start,
            end_date: u.end,
            active_now: u.active_now,
        })
        .collect();

    Ok(Json(views))
}
