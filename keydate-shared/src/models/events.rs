use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Emitted by a price sink once a new price has been applied to a listing.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct PriceAppliedEvent {
    pub event_id: Uuid,
    pub listing_id: String,
    pub previous_price_cents: i64,
    pub new_price_cents: i64,
    pub applied_at: DateTime<Utc>,
}

impl PriceAppliedEvent {
    pub fn new(listing_id: impl Into<String>, previous_price_cents: i64, new_price_cents: i64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            listing_id: listing_id.into(),
            previous_price_cents,
            new_price_cents,
            applied_at: Utc::now(),
        }
    }
}
