// demos/order_store.rs
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use order_store::{
    prelude::*,
    telemetry::init_tracing,
    StoreConfig,
};
use rust_decimal::Decimal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let config = StoreConfig::load(&config_dir).context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    info!("Starting order store demo at {}", config.location);
    let store = OrderStore::from_config(&config)
        .await
        .context("Failed to open order store")?;

    let now = Utc::now();
    let mut orders = vec![
        OrderBuilder::new()
            .exchange_id(1)
            .symbol("BTCUSDT")
            .buy()
            .limit(Decimal::new(30_000, 0))
            .quantity(Decimal::new(5, 2))
            .created_at(now - Duration::minutes(1))
            .build()?,
        OrderBuilder::new()
            .exchange_id(2)
            .symbol("ETHUSDT")
            .sell()
            .market()
            .quantity(Decimal::new(15, 1))
            .status(OrderStatus::Filled)
            .build()?,
    ];

    for order in &mut orders {
        store.create_order(order).await?;
        info!("Created {}", order);
    }

    info!("--- Querying ---");
    for order in store.orders(&[]).await? {
        info!("{}", order);
    }

    let filled = store.orders(&[with_status(OrderStatus::Filled)]).await?;
    info!("Filled orders: {}", filled.len());

    let mut first = orders[0].clone();
    first.status = OrderStatus::Canceled;
    first.updated_at = Utc::now();
    store.update_order(&first).await?;

    let canceled = store
        .orders(&[with_pair("BTCUSDT"), with_status(OrderStatus::Canceled)])
        .await?;
    info!("Canceled BTCUSDT orders: {}", canceled.len());

    let stats = store.stats();
    info!(
        "Backend stats: {} writes, {} scans, {} bytes written",
        stats.writes, stats.scans, stats.bytes_written
    );

    store.close().await?;
    Ok(())
}
