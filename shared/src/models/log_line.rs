//! Log line model.
//!
//! Only lines carrying the `QUERY` marker are looked at closely. For those
//! the timestamp is extracted eagerly, because a QUERY line without a
//! readable timestamp is treated as a malformed log and stops the replay.

use crate::query::{extract_timestamp, ParseError, QUERY_TEXT_MARKER};
use chrono::NaiveDateTime;

/// Substring identifying a line that records a database statement.
pub const QUERY_LINE_MARKER: &str = "QUERY";

/// One physical line of a Hue server log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine<'a> {
    /// 1-based line number within the file.
    pub number: usize,

    /// The line text without its terminator.
    pub raw: &'a str,

    /// Timestamp of a QUERY line.
    pub timestamp: Option<NaiveDateTime>,

    /// The part of the line starting at the `QUERY = u'` marker, if present.
    pub query: Option<&'a str>,
}

impl<'a> LogLine<'a> {
    /// Classifies a raw line.
    ///
    /// Lines without the `QUERY` marker come back with neither timestamp nor
    /// query fragment.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the line is a QUERY line whose bracketed
    /// timestamp is missing or unreadable.
    ///
    /// # Example
    ///
    /// ```
    /// use shared::models::LogLine;
    ///
    /// let raw = "[01/Jan/2018 00:00:00 -0800] base DEBUG QUERY = u'SELECT 1' - PARAMS = ();";
    /// let line = LogLine::scan(1, raw).unwrap();
    /// assert!(line.is_query());
    /// assert_eq!(line.query, Some("QUERY = u'SELECT 1' - PARAMS = ();"));
    /// ```
    pub fn scan(number: usize, raw: &'a str) -> Result<Self, ParseError> {
        if !raw.contains(QUERY_LINE_MARKER) {
            return Ok(Self {
                number,
                raw,
                timestamp: None,
                query: None,
            });
        }

        let timestamp = extract_timestamp(raw)?;
        let query = raw.find(QUERY_TEXT_MARKER).map(|start| &raw[start..]);

        Ok(Self {
            number,
            raw,
            timestamp: Some(timestamp),
            query,
        })
    }

    /// Returns true if the line records a database statement.
    #[must_use]
    pub fn is_query(&self) -> bool {
        self.timestamp.is_some()
    }
}
