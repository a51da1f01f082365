//! Railink game simulator.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod runner;

use config::SimConfig;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimConfig::from_env()?;
    info!(
        seed = config.seed,
        turns = config.turns,
        strategy = ?config.strategy,
        "Starting Railink simulation..."
    );

    let report = runner::run_game(&config)?;
    info!(score = %report.score, "Game finished");

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
