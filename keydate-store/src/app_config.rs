use serde::Deserialize;
use std::env;

use keydate_catalog::PricingConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub rules: RulesConfig,
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RulesConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    pub path: String,
    /// Persist applied prices back to the inventory file
    #[serde(default)]
    pub write_through: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MarketConfig {
    pub index_path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `KEYDATE__SERVER__PORT=8080` sets `server.port`
            .add_source(config::Environment::with_prefix("KEYDATE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Deserialize from an in-memory TOML document (no files, no environment).
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_defaults_apply() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 5050

            [rules]
            path = "config/pricing_rules.json"

            [inventory]
            path = "data/inventory.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 5050);
        assert!(!config.inventory.write_through);
        assert!(config.market.index_path.is_none());
        assert_eq!(config.pricing, PricingConfig::default());
    }

    #[test]
    fn test_pricing_overrides() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [rules]
            path = "rules.json"

            [inventory]
            path = "inventory.json"
            write_through = true

            [market]
            index_path = "market.json"

            [pricing]
            underpriced_threshold_percent = 5.0
            upcoming_limit = 3
            "#,
        )
        .unwrap();

        assert!(config.inventory.write_through);
        assert_eq!(config.market.index_path.as_deref(), Some("market.json"));
        assert_eq!(config.pricing.underpriced_threshold_percent, 5.0);
        assert_eq!(config.pricing.upcoming_limit, 3);
        assert_eq!(config.pricing.max_projection_days, 731);
    }
}
