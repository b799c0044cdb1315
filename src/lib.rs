//! Tack: a small concatenative language evaluated by stack reduction.
//!
//! Source text is lexed and parsed into [`lang::Expr`] nodes, assembled with
//! the primitive library and the prelude by [`program`], and reduced by the
//! [`vm::Machine`] into a final [`lang::Stack`].

pub mod lang;
pub mod lexer;
pub mod parser;
pub mod parser_error;
pub mod prelude;
pub mod program;
pub mod runtime;
pub mod token;
pub mod vm;
