pub mod models;

pub use models::events::PriceAppliedEvent;
pub use models::listing::Listing;
