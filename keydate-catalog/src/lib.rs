pub mod window;
pub mod rules;
pub mod pricing;
pub mod calendar;
pub mod inventory;
pub mod market;

pub use window::{MonthDay, RecurringWindow, WindowError};
pub use rules::{EventRule, LoadReport, RuleError, RuleLoadError, RuleRejection, RuleSet, Tier};
pub use pricing::{parse_date, select_boost, Alert, AlertKind, InventoryStats, PriceSuggestion, PricingConfig, PricingEngine, PricingError};
pub use calendar::{CalendarEntry, EventSpan, UpcomingEvent};
pub use inventory::{InventoryError, InventoryManager, InventorySource, PriceSink};
pub use market::{Categorizer, MarketIndex, MarketQuote, MarketStatus, PriceAssessment};
