//! Grammar for Hue database-logging lines, built with nom.
//!
//! A QUERY line looks like:
//!
//! ```text
//! [01/Jan/2018 00:00:00 -0800] util DEBUG QUERY = u'<sql>' - PARAMS = (<params>); args=(...)
//! ```
//!
//! The grammar is deliberately loose: anything before the bracketed
//! timestamp and before the `QUERY = u'` marker is ignored, as is
//! everything after the closing `);` of the parameter tuple.

use super::ast::{ParsedQuery, PLACEHOLDER_PREFIX};
use crate::models::{parse_log_timestamp, TimestampError};
use chrono::NaiveDateTime;
use nom::{
    bytes::complete::{tag, take_till1, take_until},
    character::complete::char,
    combinator::recognize,
    sequence::{preceded, separated_pair, terminated},
    IResult, Parser,
};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use thiserror::Error;

/// Marker opening the logged statement text.
pub const QUERY_TEXT_MARKER: &str = "QUERY = u'";

/// Marker separating the statement text from the parameter tuple.
pub const PARAMS_MARKER: &str = "' - PARAMS = (";

/// Marker closing the parameter tuple.
pub const PARAMS_END_MARKER: &str = ");";

static ORACLE_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Oracle_datetime\([0-9, ]*\)").expect("Oracle datetime pattern is valid")
});

static PLACEHOLDER_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{PLACEHOLDER_PREFIX}([0-9]+)")).expect("placeholder pattern is valid")
});

/// Errors that can occur while parsing a log line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// No `[DD/Mon/YYYY HH:MM:SS` prefix could be found.
    #[error("Missing bracketed timestamp")]
    MissingTimestamp,

    /// The bracketed timestamp is not a valid date.
    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),

    /// A required structural marker is absent.
    #[error("Missing marker \"{marker}\"")]
    MissingMarker {
        /// The marker that was looked for.
        marker: &'static str,
    },

    /// The template references a placeholder with no matching parameter.
    #[error("Placeholder :arg{index} has no parameter ({available} available)")]
    MissingParameter {
        /// The placeholder index found in the template.
        index: usize,
        /// Number of parameters in the logged tuple.
        available: usize,
    },
}

/// Extracts and parses the bracketed timestamp of a log line.
///
/// The timestamp is the first two space-separated words after the first
/// `[` of the line.
///
/// # Errors
///
/// Returns `ParseError::MissingTimestamp` when there is no bracket followed
/// by two words, and `ParseError::InvalidTimestamp` when the words are not a
/// `DD/Mon/YYYY HH:MM:SS` timestamp.
///
/// # Example
///
/// ```
/// use shared::query::extract_timestamp;
///
/// let ts = extract_timestamp("[05/Jun/2018 08:30:00 +0200] access INFO QUERY").unwrap();
/// assert_eq!(ts.to_string(), "2018-06-05 08:30:00");
/// ```
pub fn extract_timestamp(line: &str) -> Result<NaiveDateTime, ParseError> {
    let (_, text) = bracketed_timestamp(line).map_err(|_| ParseError::MissingTimestamp)?;
    Ok(parse_log_timestamp(text)?)
}

/// Replaces every `Oracle_datetime(...)` wrapper with `PLACEHOLDER`.
///
/// The wrapped date is not kept; the substitution step later swaps the
/// placeholder for the current time.
#[must_use]
pub fn normalize_oracle_datetime(line: &str) -> Cow<'_, str> {
    ORACLE_DATETIME.replace_all(line, super::ast::DATETIME_PLACEHOLDER)
}

/// Parses the statement template and parameter tuple out of a QUERY line.
///
/// The line is expected to have been passed through
/// [`normalize_oracle_datetime`] already.
///
/// # Errors
///
/// Returns `ParseError::MissingMarker` if any of the `QUERY = u'`,
/// `' - PARAMS = (` or `);` markers is missing, and
/// `ParseError::MissingParameter` if the template refers to a placeholder
/// index beyond the parameter tuple.
///
/// # Example
///
/// ```
/// use shared::query::parse_query_line;
///
/// let parsed = parse_query_line(
///     "QUERY = u'SELECT * FROM t WHERE a = :arg0 AND b = :arg1' - PARAMS = (5, True);",
/// )
/// .unwrap();
/// assert_eq!(parsed.template, "SELECT * FROM t WHERE a = :arg0 AND b = :arg1");
/// assert_eq!(parsed.params, vec!["5", "True"]);
/// ```
pub fn parse_query_line(line: &str) -> Result<ParsedQuery, ParseError> {
    let (rest, _) = up_to(QUERY_TEXT_MARKER)
        .parse(line)
        .map_err(|_| missing(QUERY_TEXT_MARKER))?;
    let (rest, template) = up_to(PARAMS_MARKER)
        .parse(rest)
        .map_err(|_| missing(PARAMS_MARKER))?;
    let (_, params) = up_to(PARAMS_END_MARKER)
        .parse(rest)
        .map_err(|_| missing(PARAMS_END_MARKER))?;

    let parsed = ParsedQuery::new(template, split_params(params));
    check_placeholders(&parsed)?;
    Ok(parsed)
}

/// Splits the text of a logged parameter tuple into raw tokens.
///
/// A trailing comma (one-element tuple) is dropped and `", "` separators are
/// normalized before splitting. An empty tuple yields a single empty token.
#[must_use]
pub fn split_params(text: &str) -> Vec<String> {
    let text = text.strip_suffix(',').unwrap_or(text);
    text.replace(", ", ",")
        .split(',')
        .map(str::to_string)
        .collect()
}

fn check_placeholders(query: &ParsedQuery) -> Result<(), ParseError> {
    let highest = PLACEHOLDER_REF
        .captures_iter(&query.template)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .max();

    match highest {
        Some(index) if index >= query.params.len() => Err(ParseError::MissingParameter {
            index,
            available: query.params.len(),
        }),
        _ => Ok(()),
    }
}

fn missing(marker: &'static str) -> ParseError {
    ParseError::MissingMarker { marker }
}

// ============================================================================
// nom parsers
// ============================================================================

/// Consumes input up to and including `marker`, yielding the text before it.
fn up_to<'a>(
    marker: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(take_until(marker), tag(marker))
}

fn bracketed_timestamp(input: &str) -> IResult<&str, &str> {
    preceded(
        (take_until("["), char('[')),
        recognize(separated_pair(word, char(' '), word)),
    )
    .parse(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c == ' ' || c == ']').parse(input)
}
