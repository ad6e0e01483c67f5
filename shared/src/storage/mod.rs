//! Statement execution backends.
//!
//! The [`Cursor`] trait is the seam between the replayer and a database.
//! [`SqlCursor`] talks to a real database through sqlx and
//! [`RecordingCursor`] only records what it was asked to run.

pub mod cursor;
pub mod recording;
pub mod sql_cursor;

pub use cursor::{Cursor, CursorError, FetchedRow};
pub use recording::RecordingCursor;
pub use sql_cursor::SqlCursor;
