pub mod events;
pub mod listing;
