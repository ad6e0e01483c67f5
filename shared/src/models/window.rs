//! Replay time window.
//!
//! Hue writes its server log with local, zone-less timestamps in the
//! `DD/Mon/YYYY HH:MM:SS` form (for example `01/Jan/2018 00:00:00`), so the
//! window is expressed in naive local time as well.

use chrono::{Duration, Local, NaiveDateTime};
use thiserror::Error;

/// The timestamp format used by Hue log lines and by the CLI bounds.
pub const LOG_TIMESTAMP_FORMAT: &str = "%d/%b/%Y %H:%M:%S";

/// How far back the default window reaches from "now".
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 2;

/// Errors that can occur while reading a timestamp.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    /// The text does not match `DD/Mon/YYYY HH:MM:SS`.
    #[error("Invalid timestamp '{input}': expected format DD/Mon/YYYY HH:MM:SS")]
    InvalidFormat {
        /// The rejected text.
        input: String,
    },
}

/// Parses a timestamp written in the Hue log format.
///
/// # Errors
///
/// Returns `TimestampError::InvalidFormat` if the text is not a valid
/// `DD/Mon/YYYY HH:MM:SS` timestamp.
///
/// # Example
///
/// ```
/// use shared::models::parse_log_timestamp;
///
/// let ts = parse_log_timestamp("01/Jan/2018 00:00:00").unwrap();
/// assert_eq!(ts.to_string(), "2018-01-01 00:00:00");
/// ```
pub fn parse_log_timestamp(input: &str) -> Result<NaiveDateTime, TimestampError> {
    NaiveDateTime::parse_from_str(input.trim(), LOG_TIMESTAMP_FORMAT).map_err(|_| {
        TimestampError::InvalidFormat {
            input: input.to_string(),
        }
    })
}

/// One end of a window, either already parsed or still in log format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeBound {
    /// A ready timestamp.
    At(NaiveDateTime),
    /// Text in `DD/Mon/YYYY HH:MM:SS` form.
    Text(String),
}

impl TimeBound {
    /// Resolves the bound to a timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if a textual bound cannot be parsed.
    pub fn resolve(&self) -> Result<NaiveDateTime, TimestampError> {
        match self {
            Self::At(ts) => Ok(*ts),
            Self::Text(text) => parse_log_timestamp(text),
        }
    }
}

impl From<NaiveDateTime> for TimeBound {
    fn from(ts: NaiveDateTime) -> Self {
        Self::At(ts)
    }
}

impl From<&str> for TimeBound {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TimeBound {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Inclusive time window used to select log lines for replay.
///
/// `start <= end` is not enforced. An inverted window is valid but
/// contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// First instant included in the window.
    pub start: NaiveDateTime,
    /// Last instant included in the window.
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Creates a window from two timestamps.
    #[must_use]
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Creates a window from optional bounds.
    ///
    /// A missing start defaults to `now` minus two minutes and a missing end
    /// defaults to `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if either textual bound cannot be parsed.
    ///
    /// # Example
    ///
    /// ```
    /// use shared::models::{parse_log_timestamp, TimeWindow};
    ///
    /// let now = parse_log_timestamp("01/Jan/2018 00:10:00").unwrap();
    /// let end = Some("01/Jan/2018 00:09:00".into());
    /// let window = TimeWindow::from_bounds(None, end, now).unwrap();
    /// assert_eq!(window.start.to_string(), "2018-01-01 00:08:00");
    /// assert_eq!(window.end.to_string(), "2018-01-01 00:09:00");
    /// ```
    pub fn from_bounds(
        start: Option<TimeBound>,
        end: Option<TimeBound>,
        now: NaiveDateTime,
    ) -> Result<Self, TimestampError> {
        let start = match start {
            Some(bound) => bound.resolve()?,
            None => now - Duration::minutes(DEFAULT_LOOKBACK_MINUTES),
        };
        let end = match end {
            Some(bound) => bound.resolve()?,
            None => now,
        };
        Ok(Self { start, end })
    }

    /// The default window: the last two minutes of local time.
    #[must_use]
    pub fn recent() -> Self {
        let now = Local::now().naive_local();
        Self::new(now - Duration::minutes(DEFAULT_LOOKBACK_MINUTES), now)
    }

    /// Returns true if the timestamp falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Returns true if the start lies after the end.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format(LOG_TIMESTAMP_FORMAT),
            self.end.format(LOG_TIMESTAMP_FORMAT)
        )
    }
}
