// src/bin/test_sources.rs
// Run with: cargo run --bin test_sources
// Hits every live source once and reports what it found. Writes nothing.

use anyhow::Context;
use dotenv::dotenv;
use froth_dashboard::services::{fed, http, insider, multpl, trends};
use froth_dashboard::Config;
use log::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().context("loading configuration")?;
    let client = http::build_client(&config)?;
    let mut failures = 0;

    for slug in [multpl::CAPE_SLUG, multpl::PE_SLUG, multpl::PS_SLUG] {
        info!("-----------------------------------------------------");
        match multpl::fetch_latest_ratio(&client, &config.sources.multpl_base, slug).await {
            Ok(value) => info!("SUCCESS: {} = {}", slug, value),
            Err(e) => {
                error!("ERROR: {} failed: {}", slug, e);
                failures += 1;
            }
        }
    }

    info!("-----------------------------------------------------");
    match fed::fetch_tobin_q(&client, &config.sources.fed_tobin_q).await {
        Ok(series) => info!("SUCCESS: Tobin's Q latest {:?}", series.last()),
        Err(e) => {
            error!("ERROR: Tobin's Q failed: {}", e);
            failures += 1;
        }
    }

    info!("-----------------------------------------------------");
    match fed::fetch_household_equity(&client, &config.sources.fed_household_csv).await {
        Ok(series) => info!("SUCCESS: household equity latest {:?}", series.last()),
        Err(e) => {
            error!("ERROR: household equity failed: {}", e);
            failures += 1;
        }
    }

    info!("-----------------------------------------------------");
    match trends::fetch_search_interest(
        &client,
        &config.sources.trends_base,
        &config.trends.keywords,
        &config.trends.timeframe,
    )
    .await
    {
        Ok(value) => info!("SUCCESS: search interest {:.2}", value),
        Err(e) => {
            error!("ERROR: Trends failed: {}", e);
            failures += 1;
        }
    }

    info!("-----------------------------------------------------");
    match insider::fetch_insider_selling(&client, &config.insider).await {
        Ok(value) => info!("SUCCESS: insider selling {:.1}M", value),
        Err(e) => error!(
            "ERROR: insider screener failed ({}); a run would use {}M",
            e, config.insider.fallback_millions
        ),
    }

    println!("{} fatal source(s) failing", failures);
    Ok(())
}
