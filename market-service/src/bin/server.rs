//! Market service server binary

use market_service::{Config, MarketService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting ticket market service");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(operator = %config.operator_account, rate_bps = config.commission_rate_bps, "configuration loaded");

    // Build engine and spawn the actor
    let service = MarketService::new(config)?;
    tracing::info!("Market engine ready");

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down market service");
    service.shutdown().await?;
    Ok(())
}
