//! Cursor trait.
//!
//! A cursor is the only view the replayer has of the database: it runs a
//! statement and then tries to fetch one row from it, the way a DB-API
//! cursor is used.

use thiserror::Error;

/// Errors that can occur during cursor operations.
#[derive(Debug, Error)]
pub enum CursorError {
    /// The database could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The statement was rejected or failed while running.
    #[error("Execute failed: {0}")]
    Execute(String),

    /// The last statement produced no result set.
    #[error("No results to fetch")]
    NoResultSet,

    /// Fetching failed for another reason.
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// Summary of a fetched row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchedRow {
    /// Number of columns in the row.
    pub columns: usize,
}

/// Sequential statement runner.
///
/// A cursor is used by one caller at a time and reused across statements.
pub trait Cursor {
    /// Runs a statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement cannot be run.
    fn execute(&mut self, sql: &str) -> Result<(), CursorError>;

    /// Fetches one row of the last statement's result.
    ///
    /// Returns `Ok(None)` when the result set is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the last statement has no result set or the
    /// fetch itself fails.
    fn fetch_one(&mut self) -> Result<Option<FetchedRow>, CursorError>;
}
