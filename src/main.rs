use anyhow::Context;
use dotenv::dotenv;
use froth_dashboard::{pipeline, Config};
use log::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the froth collector...");

    let config = Config::from_env().context("loading configuration")?;
    let observation = pipeline::run_once(&config).await?;

    info!("done {} z={}", observation.date, observation.composite_z_score);
    Ok(())
}
