use thiserror::Error;

/// Number of characters of unconsumed input shown in a parse diagnostic.
pub const REMAINDER_PREVIEW: usize = 30;

/// A parsing error with source location.
///
/// `line` and `col` are 1-based positions coming from the lexer spans.
/// `remainder` is a bounded preview of the input that could not be consumed,
/// starting at the offending position.
#[derive(Debug, Error)]
#[error("{line}:{col}: {message} near {remainder:?}")]
pub struct ParserError {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub remainder: String,
}

impl ParserError {
    /// Builds an error whose preview starts at byte `offset` of `source`.
    pub fn at(source: &str, offset: usize, line: usize, col: usize, message: &str) -> Self {
        let rest = source.get(offset..).unwrap_or("");
        ParserError {
            message: message.to_string(),
            line,
            col,
            remainder: preview(rest),
        }
    }
}

/// Truncates `rest` to the first [`REMAINDER_PREVIEW`] characters.
fn preview(rest: &str) -> String {
    let mut chars = rest.chars();
    let head: String = chars.by_ref().take(REMAINDER_PREVIEW).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
