//! Data models for the replay pipeline.
//!
//! This module contains the types describing one physical log line and the
//! time window used to select lines for replay.

pub mod log_line;
pub mod window;

pub use log_line::LogLine;
pub use window::{
    parse_log_timestamp, TimeBound, TimeWindow, TimestampError, DEFAULT_LOOKBACK_MINUTES,
    LOG_TIMESTAMP_FORMAT,
};
