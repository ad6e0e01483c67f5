//! Placeholder substitution.
//!
//! Turns a [`ParsedQuery`] back into executable SQL by splicing the raw
//! parameter tokens into the template.

use super::ast::{placeholder_name, ParsedQuery, DATETIME_PLACEHOLDER};
use crate::config::DatabaseEngine;
use chrono::NaiveDateTime;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Format of the literal that replaces a datetime placeholder.
pub const DATETIME_LITERAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

static TRUE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)true").expect("true pattern is valid"));

static FALSE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)false").expect("false pattern is valid"));

/// Builds executable SQL from a parsed query.
///
/// Parameters are applied from the highest index down, so `:arg1` never
/// clobbers the prefix of `:arg10`. A `PLACEHOLDER` parameter becomes a
/// quoted `now` literal. On Oracle-family engines every `True`/`False`
/// inside a token becomes `1`/`0`, even as part of a longer word.
///
/// # Example
///
/// ```
/// use shared::config::DatabaseEngine;
/// use shared::query::{render_query, ParsedQuery};
///
/// let query = ParsedQuery::new(
///     "SELECT * FROM t WHERE a = :arg0 AND b = :arg1",
///     vec!["5".to_string(), "True".to_string()],
/// );
/// let now = chrono::Local::now().naive_local();
/// let sql = render_query(&query, &DatabaseEngine::new("oracle"), now);
/// assert_eq!(sql, "SELECT * FROM t WHERE a = 5 AND b = 1");
/// ```
#[must_use]
pub fn render_query(query: &ParsedQuery, engine: &DatabaseEngine, now: NaiveDateTime) -> String {
    let oracle = engine.is_oracle_family();
    let mut sql = query.template.clone();

    for (index, token) in query.params.iter().enumerate().rev() {
        let value = if token == DATETIME_PLACEHOLDER {
            Cow::Owned(datetime_literal(now))
        } else if oracle {
            numeric_booleans(token)
        } else {
            Cow::Borrowed(token.as_str())
        };
        sql = sql.replace(&placeholder_name(index), &value);
    }

    sql
}

/// Quoted timestamp literal accepted by every supported engine.
#[must_use]
pub fn datetime_literal(ts: NaiveDateTime) -> String {
    format!("'{}'", ts.format(DATETIME_LITERAL_FORMAT))
}

/// Rewrites every `true`/`false` (any case) in a token to `1`/`0`.
#[must_use]
pub fn numeric_booleans(token: &str) -> Cow<'_, str> {
    match TRUE_TOKEN.replace_all(token, "1") {
        Cow::Borrowed(_) => FALSE_TOKEN.replace_all(token, "0"),
        Cow::Owned(replaced) => Cow::Owned(FALSE_TOKEN.replace_all(&replaced, "0").into_owned()),
    }
}
