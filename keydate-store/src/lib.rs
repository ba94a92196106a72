pub mod app_config;
pub mod error;
pub mod rule_repo;
pub mod inventory_repo;
pub mod market_repo;

pub use error::StoreError;
pub use rule_repo::RuleRepository;
pub use inventory_repo::JsonInventory;
pub use market_repo::MarketIndexRepository;
