use anyhow::{Context, Result};
use copilot_core::MarketDataAggregator;
use dotenv::dotenv;
use market_data_rust::{create_app, AppState, ServiceConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting market data service...");

    let config = ServiceConfig::from_env()?;
    let aggregator = MarketDataAggregator::new(config.aggregator.clone())?;

    // Background loops run for the life of the process
    let _tasks = aggregator.start();

    let app = create_app(AppState::new(aggregator));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    info!("Market data service listening on {}", bind_addr);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
