//! Query log replay.
//!
//! The pipeline is strictly linear and single-threaded:
//! read -> filter by time -> parse -> substitute -> execute -> log.

mod replayer;

pub use replayer::{
    FetchStatus, LogQueryReplayer, ReplayError, ReplayResult, ReplaySummary, SkipReason,
    DEFAULT_LOG_FILE,
};
