#![forbid(unsafe_code)]
//! Strata: a streaming, grammar-driven parser
//!
//! Source text flows through three pull-based layers: the lexer cuts it into tokens, the phrase parser groups
//! tokens into statements and blocks, and the term parser interprets a compiled grammar over the phrases to emit
//! a flat stream of structure events. This crate provides the command-line tool on top of those layers.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Syntax errors are data**: malformed input never fails a parse. Errors ride on the tokens that expose them
//!   and the CLI renders them with miette.

pub mod cli;

pub use strata_core::lang;
pub use strata_core::{ErrorInfo, SourceLocation, TextPos};
pub use strata_syntax::grammar;
pub use strata_syntax::pipeline;
pub use strata_syntax::{ParserConfig, PhraseToken, SyntaxDiagnostic, TermToken, Token};
