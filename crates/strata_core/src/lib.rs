//! Shared vocabulary for the Strata parser framework.
//!
//! This crate is intentionally small and dependency-free. It holds the pieces that every layer of the
//! pipeline (lexer, phrase parser, term parser) and every consumer of their output agree on:
//! - source positions ([`TextPos`], [`SourceLocation`]),
//! - immutable error chains ([`ErrorInfo`]),
//! - kind registries for tokens, phrase tokens, term tokens and error codes ([`lang`]).
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global state, no parser state machines.
//! - Kind identity comes from the `lang` registries; callers match on ids, never on spellings.

pub mod errors;
pub mod lang;
pub mod text;

pub use errors::{ErrorCode, ErrorInfo};
pub use text::{SourceLocation, TextPos};
