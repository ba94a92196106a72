use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use keydate_shared::Listing;

use crate::rules::{EventRule, RuleSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingConfig {
    /// A suggestion counts as underpriced when it exceeds the base price by more than this percent
    #[serde(default = "default_underpriced_threshold")]
    pub underpriced_threshold_percent: f64,

    /// Longest calendar projection accepted, in days
    #[serde(default = "default_max_projection_days")]
    pub max_projection_days: i64,

    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,

    /// Listings below this price raise a low-price alert (cents)
    #[serde(default = "default_low_price_cents")]
    pub low_price_cents: i64,

    /// Listings above this price raise a high-value alert (cents)
    #[serde(default = "default_high_value_cents")]
    pub high_value_cents: i64,
}

fn default_underpriced_threshold() -> f64 { 1.0 }
fn default_max_projection_days() -> i64 { 731 }
fn default_upcoming_limit() -> usize { 10 }
fn default_low_price_cents() -> i64 { 1_000 }
fn default_high_value_cents() -> i64 { 100_000 }

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            underpriced_threshold_percent: default_underpriced_threshold(),
            max_projection_days: default_max_projection_days(),
            upcoming_limit: default_upcoming_limit(),
            low_price_cents: default_low_price_cents(),
            high_value_cents: default_high_value_cents(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("Base price must be positive, got {0} cents")]
    InvalidBasePrice(i64),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Date range end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Date range of {days} days exceeds the limit of {max}")]
    RangeTooLarge { days: i64, max: i64 },

    #[error("Boosted price overflows")]
    PriceOverflow,
}

/// Parse a `YYYY-MM-DD` date supplied by a caller.
pub fn parse_date(input: &str) -> Result<NaiveDate, PricingError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PricingError::InvalidDate("date is empty".to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|e| PricingError::InvalidDate(format!("'{}': {}", trimmed, e)))
}

/// Pick the rule whose boost applies: largest percent, then higher tier, then name.
pub fn select_boost<'a>(active: &[&'a EventRule]) -> Option<&'a EventRule> {
    active.iter().copied().max_by(|a, b| {
        a.increase_percent
            .total_cmp(&b.increase_percent)
            .then(a.tier.cmp(&b.tier))
            .then_with(|| b.name.cmp(&a.name))
    })
}

/// Key-date pricing engine over an immutable rule set.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    rules: RuleSet,
    config: PricingConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceSuggestion {
    pub listing_id: String,
    pub base_cents: i64,
    pub suggested_cents: i64,
    pub boost_percent: f64,
    pub winning_event: Option<String>,
    pub matched_events: Vec<EventRule>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InventoryStats {
    pub total_listings: usize,
    pub total_value_cents: i64,
    pub active_events: usize,
    pub underpriced: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowPrice,
    HighValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub listing: Listing,
}

impl PricingEngine {
    pub fn new(rules: RuleSet, config: PricingConfig) -> Self {
        Self { rules, config }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Rules whose keywords appear in `item_text` and whose window contains `date`.
    pub fn match_active_events(&self, item_text: &str, date: NaiveDate) -> Vec<&EventRule> {
        let text = item_text.to_lowercase();
        let matched: Vec<&EventRule> = self
            .rules
            .iter()
            .filter(|rule| rule.is_active_on(date) && rule.matches_lowercase(&text))
            .collect();

        if !matched.is_empty() {
            tracing::debug!(%date, matches = matched.len(), "Matched active events");
        }
        matched
    }

    /// Rules active on `date`, regardless of item keywords.
    pub fn active_rules(&self, date: NaiveDate) -> Vec<&EventRule> {
        self.rules.iter().filter(|rule| rule.is_active_on(date)).collect()
    }

    /// Apply the single largest boost among `active`; boosts never add up.
    pub fn calculate_boosted_price(&self, base_cents: i64, active: &[&EventRule]) -> Result<i64, PricingError> {
        if base_cents <= 0 {
            return Err(PricingError::InvalidBasePrice(base_cents));
        }

        let Some(winner) = select_boost(active) else {
            return Ok(base_cents);
        };

        let boosted = (base_cents as f64 * (100.0 + winner.increase_percent) / 100.0).round();
        if !boosted.is_finite() || boosted >= i64::MAX as f64 {
            return Err(PricingError::PriceOverflow);
        }

        Ok(boosted as i64)
    }

    pub fn suggest_price(&self, listing: &Listing, date: NaiveDate) -> Result<PriceSuggestion, PricingError> {
        let matched = self.match_active_events(&listing.descriptor(), date);
        let suggested_cents = self.calculate_boosted_price(listing.price_cents, &matched)?;
        let winner = select_boost(&matched);

        Ok(PriceSuggestion {
            listing_id: listing.id.clone(),
            base_cents: listing.price_cents,
            suggested_cents,
            boost_percent: winner.map(|r| r.increase_percent).unwrap_or(0.0),
            winning_event: winner.map(|r| r.name.clone()),
            matched_events: matched.into_iter().cloned().collect(),
        })
    }

    pub fn is_underpriced(&self, suggestion: &PriceSuggestion) -> bool {
        let threshold = 1.0 + self.config.underpriced_threshold_percent / 100.0;
        suggestion.suggested_cents as f64 > suggestion.base_cents as f64 * threshold
    }

    /// Listings with a non-positive price are counted but never suggested.
    pub fn inventory_stats(&self, listings: &[Listing], date: NaiveDate) -> InventoryStats {
        let underpriced = listings
            .iter()
            .filter_map(|l| self.suggest_price(l, date).ok())
            .filter(|s| self.is_underpriced(s))
            .count();

        InventoryStats {
            total_listings: listings.len(),
            total_value_cents: listings.iter().map(|l| l.price_cents).sum(),
            active_events: self.active_rules(date).len(),
            underpriced,
        }
    }

    pub fn alerts(&self, listings: &[Listing]) -> Vec<Alert> {
        let low = listings
            .iter()
            .filter(|l| l.price_cents < self.config.low_price_cents)
            .map(|l| Alert {
                kind: AlertKind::LowPrice,
                message: format!("Low price: {}...", truncate_title(&l.title)),
                listing: l.clone(),
            });

        let high = listings
            .iter()
            .filter(|l| l.price_cents > self.config.high_value_cents)
            .map(|l| Alert {
                kind: AlertKind::HighValue,
                message: format!("High value item: {}...", truncate_title(&l.title)),
                listing: l.clone(),
            });

        low.chain(high).collect()
    }
}

fn truncate_title(title: &str) -> String {
    title.chars().take(40).collect()
}
