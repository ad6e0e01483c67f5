//! Grammar and substitution for logged statements.
//!
//! Hue's database logging writes each ORM statement as a template with
//! `:argN` placeholders followed by the Python repr of its parameter tuple.
//! This module parses that text and rebuilds executable SQL from it.
//!
//! # Example
//!
//! ```
//! use shared::config::DatabaseEngine;
//! use shared::query::{normalize_oracle_datetime, parse_query_line, render_query};
//!
//! let line = "[01/Jan/2018 00:00:00 -0800] util DEBUG \
//!             QUERY = u'SELECT * FROM t WHERE a = :arg0' - PARAMS = (5,);";
//! let parsed = parse_query_line(&normalize_oracle_datetime(line)).unwrap();
//! let now = chrono::Local::now().naive_local();
//! let sql = render_query(&parsed, &DatabaseEngine::new("mysql"), now);
//! assert_eq!(sql, "SELECT * FROM t WHERE a = 5");
//! ```

mod ast;
mod parser;
mod substitute;

pub use ast::*;
pub use parser::{
    extract_timestamp, normalize_oracle_datetime, parse_query_line, split_params, ParseError,
    PARAMS_END_MARKER, PARAMS_MARKER, QUERY_TEXT_MARKER,
};
pub use substitute::{datetime_literal, numeric_booleans, render_query, DATETIME_LITERAL_FORMAT};
