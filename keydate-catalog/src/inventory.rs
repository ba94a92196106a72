use std::collections::HashMap;

use async_trait::async_trait;
use keydate_shared::{Listing, PriceAppliedEvent};

/// Supplies listings to price. The engine never fetches inventory itself.
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn list_listings(&self) -> Result<Vec<Listing>, InventoryError>;

    async fn get_listing(&self, listing_id: &str) -> Result<Listing, InventoryError>;
}

/// Persists or publishes a new price for a listing.
#[async_trait]
pub trait PriceSink: Send + Sync {
    async fn apply_price(&self, listing_id: &str, new_price_cents: i64) -> Result<PriceAppliedEvent, InventoryError>;
}

/// Listings held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct InventoryManager {
    order: Vec<String>,
    listings: HashMap<String, Listing>,
}

impl InventoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut manager = Self::new();
        for listing in listings {
            manager.upsert(listing);
        }
        manager
    }

    /// Insert or replace a listing, keeping its original position on replace
    pub fn upsert(&mut self, listing: Listing) {
        if !self.listings.contains_key(&listing.id) {
            self.order.push(listing.id.clone());
        }
        self.listings.insert(listing.id.clone(), listing);
    }

    pub fn get(&self, listing_id: &str) -> Option<&Listing> {
        self.listings.get(listing_id)
    }

    pub fn list(&self) -> Vec<Listing> {
        self.order
            .iter()
            .filter_map(|id| self.listings.get(id))
            .cloned()
            .collect()
    }

    pub fn apply_price(&mut self, listing_id: &str, new_price_cents: i64) -> Result<PriceAppliedEvent, InventoryError> {
        if new_price_cents <= 0 {
            return Err(InventoryError::InvalidPrice(new_price_cents));
        }

        let listing = self
            .listings
            .get_mut(listing_id)
            .ok_or_else(|| InventoryError::NotFound(listing_id.to_string()))?;

        let event = PriceAppliedEvent::new(listing_id, listing.price_cents, new_price_cents);
        listing.price_cents = new_price_cents;

        Ok(event)
    }

    /// The listings as they would read after `apply_price`, leaving `self` untouched.
    /// Fails the same way `apply_price` does.
    pub fn list_with_price(&self, listing_id: &str, new_price_cents: i64) -> Result<Vec<Listing>, InventoryError> {
        if new_price_cents <= 0 {
            return Err(InventoryError::InvalidPrice(new_price_cents));
        }
        if !self.listings.contains_key(listing_id) {
            return Err(InventoryError::NotFound(listing_id.to_string()));
        }

        Ok(self
            .list()
            .into_iter()
            .map(|mut listing| {
                if listing.id == listing_id {
                    listing.price_cents = new_price_cents;
                }
                listing
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Listing not found: {0}")]
    NotFound(String),

    #[error("Invalid price: {0} cents")]
    InvalidPrice(i64),

    #[error("Inventory backend failed: {0}")]
    Backend(String),
}
