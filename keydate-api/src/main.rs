use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use keydate_api::{app, AppState};
use keydate_catalog::{Categorizer, PricingEngine};
use keydate_store::{app_config::Config, JsonInventory, MarketIndexRepository, RuleRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keydate_api=debug,keydate_store=info,keydate_catalog=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting keydate API on port {}", config.server.port);

    // Rules load once; bad records are logged and skipped
    let report = RuleRepository::new(&config.rules.path)
        .load()
        .await
        .context("Failed to load pricing rules")?;
    let engine = PricingEngine::new(report.rules, config.pricing.clone());

    let inventory = Arc::new(
        JsonInventory::load(&config.inventory.path, config.inventory.write_through)
            .await
            .context("Failed to load inventory")?,
    );

    let market = match &config.market.index_path {
        Some(path) => MarketIndexRepository::new(path),
        None => MarketIndexRepository::empty(),
    };

    let app_state = AppState {
        engine: Arc::new(engine),
        inventory: inventory.clone(),
        price_sink: inventory,
        market: Arc::new(market),
        categorizer: Arc::new(Categorizer::default()),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
