//! Hue Replay Shared Library
//!
//! This crate re-runs the database statements that Hue records in its
//! server log when database logging is enabled.
//!
//! # Modules
//!
//! - [`models`] - Log line and time window models
//! - [`query`] - Log line grammar and parameter substitution
//! - [`storage`] - Cursor trait and database backends
//! - [`replay`] - The log query replayer
//! - [`config`] - Database engine identification
//!
//! # Example
//!
//! ```
//! use shared::config::DatabaseEngine;
//! use shared::models::TimeWindow;
//! use shared::replay::LogQueryReplayer;
//! use shared::storage::RecordingCursor;
//!
//! let replayer = LogQueryReplayer::new(
//!     "/var/log/hue/runcpserver.log",
//!     TimeWindow::recent(),
//!     DatabaseEngine::new("mysql"),
//! );
//! let mut cursor = RecordingCursor::new();
//! let summary = replayer.replay_reader("no queries here\n".as_bytes(), &mut cursor).unwrap();
//! assert_eq!(summary.executed, 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod models;
pub mod query;
pub mod replay;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
