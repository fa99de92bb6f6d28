//! Strata kind vocabularies.
//!
//! This module is the “front door” for the kinds every pipeline layer agrees on: lexical token kinds, phrase
//! kinds, term kinds, syntax roles and built-in error codes.
//!
//! Callers work with **stable IDs** (e.g. `TokenKind`, `ErrorCodeId`) and look up spellings/metadata via
//! registry tables, so renderers, tests and diagnostics never compare strings.
//!
//! ## Notes
//! - Registries are **pure**: no parser state, no IO, no side effects.
//!
//! ## Examples
//! ```rust
//! use strata_core::lang::tokens::{self, TokenKind};
//!
//! assert_eq!(tokens::from_str("IDENTIFIER"), Some(TokenKind::Identifier));
//! assert_eq!(tokens::as_str(TokenKind::Identifier), "IDENTIFIER");
//! ```

pub mod errors;
pub mod phrases;
pub mod registry;
pub mod terms;
pub mod tokens;
