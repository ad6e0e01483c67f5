//! Parsed form of a logged statement.

/// Prefix of a positional placeholder in a logged template.
pub const PLACEHOLDER_PREFIX: &str = ":arg";

/// Token standing in for an `Oracle_datetime(...)` parameter value.
pub const DATETIME_PLACEHOLDER: &str = "PLACEHOLDER";

/// Returns the placeholder name for a parameter index, e.g. `:arg3`.
#[must_use]
pub fn placeholder_name(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{index}")
}

/// A statement template together with its raw parameter tokens.
///
/// Parameters are kept exactly as they appeared in the logged tuple
/// (`5`, `u'admin'`, `True`, ...). They are spliced into the template as
/// literal SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Statement text containing `:argN` placeholders.
    pub template: String,

    /// Raw parameter tokens, in placeholder order.
    pub params: Vec<String>,
}

impl ParsedQuery {
    /// Creates a parsed query.
    #[must_use]
    pub fn new(template: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            template: template.into(),
            params,
        }
    }
}
