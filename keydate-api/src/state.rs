use std::sync::Arc;

use keydate_catalog::{Categorizer, InventorySource, PriceSink, PricingEngine};
use keydate_store::MarketIndexRepository;

#[derive(Clone)]
pub struct AppState {
    /// Built once at startup and never mutated
    pub engine: Arc<PricingEngine>,
    pub inventory: Arc<dyn InventorySource>,
    pub price_sink: Arc<dyn PriceSink>,
    pub market: Arc<MarketIndexRepository>,
    pub categorizer: Arc<Categorizer>,
}
