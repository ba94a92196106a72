use std::path::PathBuf;

use async_trait::async_trait;
use keydate_catalog::{InventoryError, InventoryManager, InventorySource, PriceSink};
use keydate_shared::{Listing, PriceAppliedEvent};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Listings loaded from a JSON file and served from memory. With write-through
/// enabled every applied price rewrites the file.
pub struct JsonInventory {
    path: Option<PathBuf>,
    write_through: bool,
    inner: RwLock<InventoryManager>,
}

impl JsonInventory {
    pub async fn load(path: impl Into<PathBuf>, write_through: bool) -> Result<Self, StoreError> {
        let path = path.into();
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        let listings: Vec<Listing> = serde_json::from_str(&source).map_err(|source| StoreError::Inventory {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), listings = listings.len(), "Loaded inventory");

        Ok(Self {
            path: Some(path),
            write_through,
            inner: RwLock::new(InventoryManager::from_listings(listings)),
        })
    }

    pub fn in_memory(listings: Vec<Listing>) -> Self {
        Self {
            path: None,
            write_through: false,
            inner: RwLock::new(InventoryManager::from_listings(listings)),
        }
    }

    async fn persist(&self, listings: &[Listing]) -> Result<(), InventoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let body = serde_json::to_vec_pretty(listings).map_err(|e| InventoryError::Backend(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| InventoryError::Backend(format!("{}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| InventoryError::Backend(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }
}

#[async_trait]
impl InventorySource for JsonInventory {
    async fn list_listings(&self) -> Result<Vec<Listing>, InventoryError> {
        Ok(self.inner.read().await.list())
    }

    async fn get_listing(&self, listing_id: &str) -> Result<Listing, InventoryError> {
        self.inner
            .read()
            .await
            .get(listing_id)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound(listing_id.to_string()))
    }
}

#[async_trait]
impl PriceSink for JsonInventory {
    async fn apply_price(&self, listing_id: &str, new_price_cents: i64) -> Result<PriceAppliedEvent, InventoryError> {
        let mut inner = self.inner.write().await;

        // The file is written first so a failed write leaves memory untouched.
        if self.write_through {
            let staged = inner.list_with_price(listing_id, new_price_cents)?;
            self.persist(&staged).await?;
        }
        let event = inner.apply_price(listing_id, new_price_cents)?;

        tracing::info!(
            listing_id,
            previous = event.previous_price_cents,
            new = event.new_price_cents,
            "Applied listing price"
        );
        Ok(event)
    }
}
