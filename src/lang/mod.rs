//! # Tack expression model
//!
//! This module defines the values a Tack program is made of. The parser
//! produces them, the reduction machine consumes and produces them, and the
//! same type serves as code, data and environment.
//!
//! ## Documentation conventions
//!
//! - Stack effects are written as `( before -- after )`, top of stack last.
//! - `[ ... ]` denotes a quotation, `( a b )` a pair.
//! - Sequences are always stored in text order: the top of a stack is the
//!   last element.

pub mod expr;
pub mod image;
pub mod stack;

pub use expr::Expr;
pub use stack::Stack;
