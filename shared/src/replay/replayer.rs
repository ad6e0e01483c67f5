//! Log query replayer.
//!
//! Scans a Hue server log, picks the QUERY lines inside a time window,
//! rebuilds their SQL and runs it through a [`Cursor`].

use crate::config::DatabaseEngine;
use crate::models::{LogLine, TimeWindow};
use crate::query::{
    normalize_oracle_datetime, parse_query_line, render_query, ParseError, QUERY_TEXT_MARKER,
};
use crate::storage::{Cursor, CursorError, FetchedRow};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Log file Hue writes by default.
pub const DEFAULT_LOG_FILE: &str = "/var/log/hue/runcpserver.log";

/// Errors that abort a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The log file could not be opened or read.
    #[error("Failed to read log file {path}: {source}")]
    Io {
        /// The log file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A QUERY line did not match the expected layout.
    #[error("Malformed QUERY line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        #[source]
        source: ParseError,
    },

    /// The database rejected a replayed statement.
    #[error("Statement from line {line} failed: {source}")]
    Execute {
        /// 1-based line number.
        line: usize,
        /// The cursor error.
        #[source]
        source: CursorError,
    },
}

/// Why a line was not replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The line does not record a statement.
    NotAQuery,
    /// The statement was logged outside the window.
    OutsideWindow,
}

/// What happened to the single-row fetch after a statement ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// A row came back.
    Row(FetchedRow),
    /// The result set was empty.
    NoRows,
    /// The fetch failed; the replay carried on.
    Failed(String),
}

/// Outcome of replaying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayResult {
    /// The line was left alone.
    Skipped(SkipReason),
    /// The statement was executed.
    Executed {
        /// The SQL that was run.
        sql: String,
        /// Result of the follow-up fetch.
        fetch: FetchStatus,
    },
}

/// Totals for one replay run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaySummary {
    /// Number of statements executed.
    pub executed: usize,
    /// Number of lines skipped for any reason.
    pub skipped: usize,
    /// Number of executed statements whose fetch failed.
    pub fetch_failures: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl ReplaySummary {
    /// Elapsed time in seconds.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Replays the statements of a Hue log file against a cursor.
///
/// # Example
///
/// ```
/// use shared::config::DatabaseEngine;
/// use shared::models::{parse_log_timestamp, TimeWindow};
/// use shared::replay::LogQueryReplayer;
/// use shared::storage::RecordingCursor;
///
/// let log = "[01/Jan/2018 00:00:30 -0800] util DEBUG \
///            QUERY = u'SELECT * FROM t WHERE a = :arg0 AND b = :arg1' - PARAMS = (5, True);\n";
/// let window = TimeWindow::new(
///     parse_log_timestamp("01/Jan/2018 00:00:00").unwrap(),
///     parse_log_timestamp("01/Jan/2018 00:01:00").unwrap(),
/// );
/// let replayer = LogQueryReplayer::new("unused.log", window, DatabaseEngine::new("oracle"));
/// let mut cursor = RecordingCursor::new();
///
/// let summary = replayer.replay_reader(log.as_bytes(), &mut cursor).unwrap();
/// assert_eq!(summary.executed, 1);
/// assert_eq!(cursor.statements(), ["SELECT * FROM t WHERE a = 5 AND b = 1"]);
/// ```
#[derive(Debug, Clone)]
pub struct LogQueryReplayer {
    log_file: PathBuf,
    window: TimeWindow,
    engine: DatabaseEngine,
    clock: fn() -> NaiveDateTime,
}

impl LogQueryReplayer {
    /// Creates a replayer for a log file, window and engine.
    #[must_use]
    pub fn new(log_file: impl Into<PathBuf>, window: TimeWindow, engine: DatabaseEngine) -> Self {
        Self {
            log_file: log_file.into(),
            window,
            engine,
            clock: local_now,
        }
    }

    /// Replaces the clock used for datetime placeholders.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Replays the configured log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read, if a QUERY
    /// line inside the window is malformed, or if a statement fails to run.
    pub fn replay(&self, cursor: &mut dyn Cursor) -> Result<ReplaySummary, ReplayError> {
        let file = File::open(&self.log_file).map_err(|source| self.io_error(source))?;
        self.replay_reader(BufReader::new(file), cursor)
    }

    /// Replays log text from any buffered reader.
    ///
    /// Lines are decoded lossily so stray non-UTF-8 bytes in unrelated log
    /// lines do not stop the run.
    ///
    /// # Errors
    ///
    /// Same as [`replay`](Self::replay).
    pub fn replay_reader<R: BufRead>(
        &self,
        mut reader: R,
        cursor: &mut dyn Cursor,
    ) -> Result<ReplaySummary, ReplayError> {
        let started = Instant::now();
        if self.window.is_inverted() {
            tracing::warn!(
                window = %self.window,
                "Start time is after end time, no query will be selected"
            );
        }

        let mut summary = ReplaySummary::default();
        let mut buf = Vec::new();
        let mut number = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| self.io_error(source))?;
            if read == 0 {
                break;
            }
            number += 1;

            let text = String::from_utf8_lossy(&buf);
            let line = text.trim_end_matches(['\n', '\r']);

            match self.replay_line(number, line, cursor)? {
                ReplayResult::Skipped(_) => summary.skipped += 1,
                ReplayResult::Executed { fetch, .. } => {
                    summary.executed += 1;
                    if matches!(fetch, FetchStatus::Failed(_)) {
                        summary.fetch_failures += 1;
                    }
                }
            }
        }

        summary.elapsed = started.elapsed();
        tracing::info!(
            total_queries = summary.executed,
            fetch_failures = summary.fetch_failures,
            elapsed_secs = %format!("{:.2}", summary.elapsed_secs()),
            "Replay finished"
        );

        Ok(summary)
    }

    /// Replays a single line.
    ///
    /// # Errors
    ///
    /// Returns `ReplayError::Parse` for a malformed QUERY line and
    /// `ReplayError::Execute` if the statement cannot be run. A failed fetch
    /// is reported as `FetchStatus::Failed`, not as an error.
    pub fn replay_line(
        &self,
        number: usize,
        raw: &str,
        cursor: &mut dyn Cursor,
    ) -> Result<ReplayResult, ReplayError> {
        let parse_error = |source| ReplayError::Parse {
            line: number,
            source,
        };

        let line = LogLine::scan(number, raw).map_err(parse_error)?;
        let Some(timestamp) = line.timestamp else {
            return Ok(ReplayResult::Skipped(SkipReason::NotAQuery));
        };
        if !self.window.contains(timestamp) {
            tracing::trace!(line = number, %timestamp, "Query outside window");
            return Ok(ReplayResult::Skipped(SkipReason::OutsideWindow));
        }

        let started = Instant::now();
        let fragment = line
            .query
            .ok_or(ParseError::MissingMarker {
                marker: QUERY_TEXT_MARKER,
            })
            .map_err(parse_error)?;
        let parsed = parse_query_line(&normalize_oracle_datetime(fragment)).map_err(parse_error)?;
        let sql = render_query(&parsed, &self.engine, (self.clock)());

        cursor.execute(&sql).map_err(|source| ReplayError::Execute {
            line: number,
            source,
        })?;

        let fetch = match cursor.fetch_one() {
            Ok(Some(row)) => FetchStatus::Row(row),
            Ok(None) => FetchStatus::NoRows,
            Err(e) => {
                tracing::warn!(
                    line = number,
                    error = %e,
                    query = %sql,
                    "fetchone failed for query"
                );
                FetchStatus::Failed(e.to_string())
            }
        };

        tracing::debug!(
            line = number,
            elapsed_secs = started.elapsed().as_secs_f64(),
            query = %sql,
            "Query replayed"
        );

        Ok(ReplayResult::Executed { sql, fetch })
    }

    fn io_error(&self, source: std::io::Error) -> ReplayError {
        ReplayError::Io {
            path: self.log_file.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_log_timestamp;
    use crate::storage::RecordingCursor;
    use chrono::NaiveDate;
    use std::io::Write;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::new(
            parse_log_timestamp(start).unwrap(),
            parse_log_timestamp(end).unwrap(),
        )
    }

    fn replayer(engine: &str) -> LogQueryReplayer {
        LogQueryReplayer::new(
            "runcpserver.log",
            window("01/Jan/2018 00:00:00", "01/Jan/2018 01:00:00"),
            DatabaseEngine::new(engine),
        )
        .with_clock(fixed_now)
    }

    fn query_line(time: &str, template: &str, params: &str) -> String {
        format!(
            "[{time} -0800] util DEBUG (0.001) QUERY = u'{template}' - PARAMS = ({params}); \
             args=({params})"
        )
    }

    #[test]
    fn test_non_query_line_skipped() {
        let mut cursor = RecordingCursor::new();
        let result = replayer("sqlite3")
            .replay_line(1, "[01/Jan/2018 00:10:00 -0800] access INFO GET /", &mut cursor)
            .unwrap();
        assert_eq!(result, ReplayResult::Skipped(SkipReason::NotAQuery));
        assert!(cursor.statements().is_empty());
    }

    #[test]
    fn test_line_outside_window_skipped() {
        let mut cursor = RecordingCursor::new();
        let line = query_line("01/Jan/2018 02:00:00", "SELECT :arg0", "1,");
        let result = replayer("sqlite3").replay_line(1, &line, &mut cursor).unwrap();
        assert_eq!(result, ReplayResult::Skipped(SkipReason::OutsideWindow));
        assert!(cursor.statements().is_empty());
    }

    #[test]
    fn test_window_bounds_included() {
        let mut cursor = RecordingCursor::new();
        let r = replayer("sqlite3");
        let first = query_line("01/Jan/2018 00:00:00", "SELECT :arg0", "1,");
        let last = query_line("01/Jan/2018 01:00:00", "SELECT :arg0", "2,");
        assert!(matches!(
            r.replay_line(1, &first, &mut cursor).unwrap(),
            ReplayResult::Executed { .. }
        ));
        assert!(matches!(
            r.replay_line(2, &last, &mut cursor).unwrap(),
            ReplayResult::Executed { .. }
        ));
        assert_eq!(cursor.statements(), ["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_worked_example_on_oracle() {
        let mut cursor = RecordingCursor::new();
        let line = query_line(
            "01/Jan/2018 00:30:00",
            "SELECT * FROM t WHERE a = :arg0 AND b = :arg1",
            "5, True",
        );
        let result = replayer("oracle").replay_line(7, &line, &mut cursor).unwrap();
        assert_eq!(
            result,
            ReplayResult::Executed {
                sql: "SELECT * FROM t WHERE a = 5 AND b = 1".to_string(),
                fetch: FetchStatus::NoRows,
            }
        );
    }

    #[test]
    fn test_oracle_datetime_replaced_with_now() {
        let mut cursor = RecordingCursor::new();
        let line = query_line(
            "01/Jan/2018 00:30:00",
            "UPDATE desktop_document2 SET last_modified = :arg0 WHERE id = :arg1",
            "Oracle_datetime(2017, 12, 31, 23, 59, 59, 999), 42",
        );
        replayer("oracle").replay_line(1, &line, &mut cursor).unwrap();
        assert_eq!(
            cursor.statements(),
            ["UPDATE desktop_document2 SET last_modified = '2018-06-01 12:00:00.000000' \
              WHERE id = 42"]
        );
    }

    #[test]
    fn test_fetch_failure_is_not_fatal() {
        let mut cursor = RecordingCursor::new().strict_fetch();
        let line = query_line(
            "01/Jan/2018 00:30:00",
            "INSERT INTO t (a) VALUES (:arg0)",
            "1,",
        );
        let result = replayer("sqlite3").replay_line(1, &line, &mut cursor).unwrap();
        assert!(matches!(
            result,
            ReplayResult::Executed {
                fetch: FetchStatus::Failed(_),
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_query_line_is_fatal() {
        let mut cursor = RecordingCursor::new();
        let line = "[01/Jan/2018 00:30:00 -0800] util DEBUG QUERY = u'SELECT 1'";
        let result = replayer("sqlite3").replay_line(4, line, &mut cursor);
        assert!(matches!(
            result,
            Err(ReplayError::Parse {
                line: 4,
                source: ParseError::MissingMarker { .. }
            })
        ));
    }

    #[test]
    fn test_query_marker_without_statement_text_is_fatal() {
        let mut cursor = RecordingCursor::new();
        let line = "[01/Jan/2018 00:30:00 -0800] util DEBUG QUERY took 3 ms";
        let result = replayer("sqlite3").replay_line(5, line, &mut cursor);
        assert!(matches!(
            result,
            Err(ReplayError::Parse {
                line: 5,
                source: ParseError::MissingMarker {
                    marker: QUERY_TEXT_MARKER
                }
            })
        ));
        assert!(cursor.statements().is_empty());
    }

    #[test]
    fn test_text_before_statement_is_ignored() {
        let mut cursor = RecordingCursor::new();
        let line = "[01/Jan/2018 00:30:00 -0800] Oracle_datetime(1) ' - PARAMS = (9); \
                    QUERY = u'SELECT :arg0' - PARAMS = (4,);";
        replayer("sqlite3").replay_line(1, line, &mut cursor).unwrap();
        assert_eq!(cursor.statements(), ["SELECT 4"]);
    }

    #[test]
    fn test_query_line_without_timestamp_is_fatal() {
        let mut cursor = RecordingCursor::new();
        let result =
            replayer("sqlite3").replay_line(2, "QUERY = u'SELECT 1' - PARAMS = ();", &mut cursor);
        assert!(matches!(
            result,
            Err(ReplayError::Parse {
                line: 2,
                source: ParseError::MissingTimestamp
            })
        ));
    }

    #[test]
    fn test_malformed_line_outside_window_not_parsed() {
        let mut cursor = RecordingCursor::new();
        let line = "[01/Jan/2018 05:00:00 -0800] util DEBUG QUERY = u'SELECT 1'";
        let result = replayer("sqlite3").replay_line(1, line, &mut cursor).unwrap();
        assert_eq!(result, ReplayResult::Skipped(SkipReason::OutsideWindow));
    }

    #[test]
    fn test_execute_failure_is_fatal() {
        let mut cursor = RecordingCursor::new().fail_execute_on("DROP");
        let line = query_line("01/Jan/2018 00:30:00", "DROP TABLE t", "");
        let result = replayer("sqlite3").replay_line(3, &line, &mut cursor);
        assert!(matches!(result, Err(ReplayError::Execute { line: 3, .. })));
    }

    #[test]
    fn test_replay_reader_counts() {
        let log = [
            "[01/Jan/2018 00:00:01 -0800] access INFO GET /hue/editor".to_string(),
            query_line("01/Jan/2018 00:05:00", "SELECT * FROM auth_user WHERE id = :arg0", "1,"),
            query_line("01/Jan/2018 03:00:00", "SELECT * FROM auth_user WHERE id = :arg0", "2,"),
            query_line(
                "01/Jan/2018 00:06:00",
                "INSERT INTO t (a, b) VALUES (:arg0, :arg1)",
                "3, 4",
            ),
            query_line("01/Jan/2018 00:07:00", "DELETE FROM t WHERE a = :arg0", "3,"),
        ]
        .join("\n");

        let mut cursor = RecordingCursor::new().strict_fetch();
        let summary = replayer("mysql")
            .replay_reader(log.as_bytes(), &mut cursor)
            .unwrap();

        assert_eq!(summary.executed, 3);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.fetch_failures, 2);
        assert_eq!(
            cursor.statements(),
            [
                "SELECT * FROM auth_user WHERE id = 1",
                "INSERT INTO t (a, b) VALUES (3, 4)",
                "DELETE FROM t WHERE a = 3",
            ]
        );
    }

    #[test]
    fn test_replay_reader_stops_at_malformed_line() {
        let log = [
            query_line("01/Jan/2018 00:05:00", "SELECT :arg0", "1,"),
            "[01/Jan/2018 00:06:00 -0800] util DEBUG QUERY = broken".to_string(),
            query_line("01/Jan/2018 00:07:00", "SELECT :arg0", "2,"),
        ]
        .join("\n");

        let mut cursor = RecordingCursor::new();
        let result = replayer("sqlite3").replay_reader(log.as_bytes(), &mut cursor);

        assert!(matches!(result, Err(ReplayError::Parse { line: 2, .. })));
        assert_eq!(cursor.statements(), ["SELECT 1"]);
    }

    #[test]
    fn test_replay_reader_handles_crlf_and_invalid_utf8() {
        let mut log = Vec::new();
        log.extend_from_slice(b"[01/Jan/2018 00:01:00 -0800] access INFO caf\xe9\r\n");
        log.extend_from_slice(query_line("01/Jan/2018 00:05:00", "SELECT :arg0", "1,").as_bytes());
        log.extend_from_slice(b"\r\n");

        let mut cursor = RecordingCursor::new();
        let summary = replayer("sqlite3")
            .replay_reader(log.as_slice(), &mut cursor)
            .unwrap();

        assert_eq!(summary.executed, 1);
        assert_eq!(cursor.statements(), ["SELECT 1"]);
    }

    #[test]
    fn test_inverted_window_selects_nothing() {
        let r = LogQueryReplayer::new(
            "runcpserver.log",
            window("01/Jan/2018 01:00:00", "01/Jan/2018 00:00:00"),
            DatabaseEngine::default(),
        );
        let log = query_line("01/Jan/2018 00:30:00", "SELECT :arg0", "1,");
        let mut cursor = RecordingCursor::new();
        let summary = r.replay_reader(log.as_bytes(), &mut cursor).unwrap();
        assert_eq!(summary.executed, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_replay_missing_file() {
        let r = LogQueryReplayer::new(
            "/nonexistent/hue/runcpserver.log",
            window("01/Jan/2018 00:00:00", "01/Jan/2018 01:00:00"),
            DatabaseEngine::default(),
        );
        let mut cursor = RecordingCursor::new();
        let result = r.replay(&mut cursor);
        assert!(matches!(result, Err(ReplayError::Io { .. })));
    }

    #[test]
    fn test_replay_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "{}",
            query_line("01/Jan/2018 00:15:00", "SELECT * FROM t WHERE b = :arg0", "False,")
        )
        .unwrap();

        let r = LogQueryReplayer::new(
            file.path(),
            window("01/Jan/2018 00:00:00", "01/Jan/2018 01:00:00"),
            DatabaseEngine::new("oracle"),
        );
        let mut cursor = RecordingCursor::new();
        let summary = r.replay(&mut cursor).unwrap();

        assert_eq!(summary.executed, 1);
        assert_eq!(cursor.statements(), ["SELECT * FROM t WHERE b = 0"]);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = ReplaySummary {
            executed: 2,
            skipped: 5,
            fetch_failures: 1,
            elapsed: Duration::from_millis(1500),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["executed"], 2);
        assert_eq!(json["skipped"], 5);
        assert_eq!(json["fetch_failures"], 1);
    }
}
