// src/bin/rebuild_history.rs
// Run with: cargo run --bin rebuild_history

use anyhow::Context;
use dotenv::dotenv;
use froth_dashboard::services::{history, http};
use froth_dashboard::Config;
use log::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().context("loading configuration")?;
    let client = http::build_client(&config)?;

    info!("Forcing history reload into {}", config.history_cache_path.display());
    let rows = history::refresh_history(&client, &config).await?;

    if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
        println!("History rebuilt: {} months, {} .. {}", rows.len(), first.date, last.date);
        println!(
            "Latest: CAPE {} | Tobin's Q {:?} | household equity {:?}",
            last.cape, last.tobinq, last.household_equity_share
        );
    }
    Ok(())
}
