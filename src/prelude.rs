//! Embedded prelude.
//!
//! The prelude is written in Tack itself and compiled into the binary, so
//! `tack` needs no files besides the user's own.

use crate::lang::Expr;
use crate::parser::parse_source;
use crate::parser_error::ParserError;

/// Source text of the default prelude.
pub const SOURCE: &str = include_str!("../stdlib/prelude.tk");

/// Words the default prelude defines, in definition order.
pub const WORDS: [&str; 20] = [
    "swap", "over", "rot", "-rot", "nip", "dup2", "drop2", "if", "when", "unless", "keep", "bi",
    "times", "!=", "neg", "fold", "length", "reverse", "map", "filter",
];

/// Parses the default prelude.
pub fn parse() -> Result<Vec<Expr>, ParserError> {
    parse_source(SOURCE)
}
