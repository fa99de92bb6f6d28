//! Streaming syntax pipeline for Strata: lexer, phrase parser and grammar-driven term parser.
//!
//! Each layer is a pull-based state machine with the same contract: `parse(input)` reports a [`ParserState`],
//! `read()` takes the produced token. Layers hand tokens to each other through single-slot [`Cell`]s, and every
//! piece of state lives in the layer structs, so parsing can stop at any point and resume when more text arrives.
//!
//! ## Notes
//! - Syntax errors never abort a parse. They travel as `strata_core::ErrorInfo` chains on the tokens that expose
//!   them; only caller mistakes are returned as [`ContractError`].
//! - Vocabulary (token, phrase and term kinds, error codes) comes from `strata_core::lang` registries.
//!
//! ## Examples
//! ```rust
//! use strata_core::lang::terms::TermKind;
//! use strata_syntax::{ParserConfig, pipeline};
//!
//! let terms = pipeline::terms("doc", "a { b }", &ParserConfig::default()).unwrap();
//! assert_eq!(terms.last().map(|t| t.kind), Some(TermKind::Eof));
//! ```

#![forbid(unsafe_code)]

pub mod cell;
pub mod config;
pub mod diagnostics;
pub mod grammar;
pub mod lexer;
pub mod marked_queue;
pub mod phrase;
pub mod pipeline;
pub mod state;
pub mod term;

pub use cell::Cell;
pub use config::ParserConfig;
pub use diagnostics::{ContractError, Layer, SyntaxDiagnostic};
pub use grammar::{CompiledGrammar, GrammarBuilder, GrammarError};
pub use lexer::{Lexer, Token, TokenKey};
pub use marked_queue::MarkedQueue;
pub use phrase::{PhraseParser, PhraseToken};
pub use pipeline::{Pipeline, PipelineError};
pub use state::ParserState;
pub use term::{TermParser, TermToken};
