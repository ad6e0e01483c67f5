//! In-memory cursor.
//!
//! Records statements instead of running them. Used for dry runs and in
//! tests.

use super::cursor::{Cursor, CursorError, FetchedRow};

/// Cursor that records every statement it is given.
///
/// By default every fetch returns `Ok(None)`. With [`strict_fetch`]
/// enabled, fetching after anything but a `SELECT` fails with
/// `CursorError::NoResultSet`, like most DB-API drivers do.
///
/// [`strict_fetch`]: RecordingCursor::strict_fetch
///
/// # Example
///
/// ```
/// use shared::storage::{Cursor, RecordingCursor};
///
/// let mut cursor = RecordingCursor::new();
/// cursor.execute("SELECT 1").unwrap();
/// assert_eq!(cursor.statements(), ["SELECT 1"]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingCursor {
    statements: Vec<String>,
    strict_fetch: bool,
    fail_execute_on: Option<String>,
    pending: bool,
}

impl RecordingCursor {
    /// Creates an empty recording cursor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes fetches fail after statements that are not `SELECT`s.
    #[must_use]
    pub fn strict_fetch(mut self) -> Self {
        self.strict_fetch = true;
        self
    }

    /// Makes `execute` fail for statements containing `needle`.
    #[must_use]
    pub fn fail_execute_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_execute_on = Some(needle.into());
        self
    }

    /// Statements executed so far, oldest first.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }
}

impl Cursor for RecordingCursor {
    fn execute(&mut self, sql: &str) -> Result<(), CursorError> {
        if let Some(needle) = &self.fail_execute_on {
            if sql.contains(needle.as_str()) {
                return Err(CursorError::Execute(format!("rejected statement: {sql}")));
            }
        }
        self.statements.push(sql.to_string());
        self.pending = true;
        Ok(())
    }

    fn fetch_one(&mut self) -> Result<Option<FetchedRow>, CursorError> {
        if !std::mem::take(&mut self.pending) {
            return Err(CursorError::NoResultSet);
        }
        let returns_rows = self
            .statements
            .last()
            .is_some_and(|sql| sql.trim_start().to_ascii_uppercase().starts_with("SELECT"));
        if self.strict_fetch && !returns_rows {
            return Err(CursorError::NoResultSet);
        }
        Ok(None)
    }
}
