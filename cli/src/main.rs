//! Hue Replay Binary
//!
//! Entry point for the Hue query log replay tool.

#![deny(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use hue_replay::Args;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let json = args.json;
    let summary = hue_replay::run(args).await?;

    if json {
        println!("{}", serde_json::to_string(&summary)?);
    }

    Ok(())
}
