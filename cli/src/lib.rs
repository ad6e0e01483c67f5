//! Hue Replay CLI
//!
//! Re-runs the database statements recorded in a Hue server log.
//!
//! # Usage
//!
//! ```bash
//! export HUE_CONF_DIR=/etc/hue/conf
//! hue-replay --read-log-file /var/log/hue/runcpserver.log \
//!     --start-time "01/Jan/2018 00:00:00" --end-time "01/Jan/2018 00:05:00"
//! hue-replay --dry-run --json
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod db;

pub use config::Config;
pub use db::DatabaseConfig;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use shared::models::{parse_log_timestamp, TimeBound, TimeWindow};
use shared::replay::{LogQueryReplayer, ReplaySummary, DEFAULT_LOG_FILE};
use shared::storage::RecordingCursor;
use std::path::PathBuf;

/// Hue Replay - re-run database queries recorded in a Hue log
#[derive(Debug, Parser)]
#[command(name = "hue-replay")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log file to scan for queries written with database logging enabled
    #[arg(long, env = "HUE_REPLAY_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub read_log_file: PathBuf,

    /// Start of the replay window, format: DD/Mon/YYYY HH:MM:SS (default: two minutes ago)
    #[arg(long, value_parser = parse_log_timestamp)]
    pub start_time: Option<NaiveDateTime>,

    /// End of the replay window, format: DD/Mon/YYYY HH:MM:SS (default: now)
    #[arg(long, value_parser = parse_log_timestamp)]
    pub end_time: Option<NaiveDateTime>,

    /// Rebuild and log the statements without connecting to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Print the replay summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Runs a replay with configuration taken from the environment.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, or if the
/// replay itself fails.
pub async fn run(args: Args) -> Result<ReplaySummary> {
    let config = Config::from_env()?;
    run_with_config(args, config).await
}

/// Runs a replay with the provided configuration.
///
/// Must be called from a multi-threaded tokio runtime.
///
/// # Errors
///
/// Returns an error if the log file cannot be read, a QUERY line is
/// malformed, the database cannot be reached or a statement fails.
pub async fn run_with_config(args: Args, config: Config) -> Result<ReplaySummary> {
    tracing::warn!(hue_conf_dir = %config.hue_conf_dir.display(), "HUE_CONF_DIR");
    config.database.log_settings();

    let window = TimeWindow::from_bounds(
        args.start_time.map(TimeBound::from),
        args.end_time.map(TimeBound::from),
        Local::now().naive_local(),
    )?;

    tracing::warn!(
        log_file = %args.read_log_file.display(),
        %window,
        dry_run = args.dry_run,
        "Running database queries in file"
    );

    let replayer = LogQueryReplayer::new(
        args.read_log_file,
        window,
        config.database.engine.clone(),
    );

    if args.dry_run {
        let mut cursor = RecordingCursor::new();
        let summary = replayer.replay(&mut cursor)?;
        for sql in cursor.statements() {
            tracing::info!(query = %sql, "Dry run");
        }
        return Ok(summary);
    }

    let mut cursor = config.database.connect().await?;
    let summary = replayer.replay(&mut cursor)?;
    cursor
        .close()
        .await
        .context("Failed to close database connection")?;

    Ok(summary)
}
