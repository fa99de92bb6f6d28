//! Phrase tokens.

use strata_core::lang::phrases::PhraseKind;
use strata_core::{ErrorInfo, TextPos};

use crate::lexer::Token;

/// A lexical token classified by its role in the statement/block structure, or a synthetic boundary.
///
/// ## Notes
/// - Synthetic boundaries (a closing `STATEMENT_END`, a block closed at end of input) carry no token and are
///   zero-width at `pos`.
/// - `error` holds phrase-level errors only; lexical errors stay on the wrapped token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseToken {
    pub kind: PhraseKind,
    pub token: Option<Token>,
    pub pos: TextPos,
    pub error: Option<ErrorInfo>,
}

impl PhraseToken {
    /// Wrap a lexical token.
    pub fn new(kind: PhraseKind, token: Token) -> Self {
        Self {
            kind,
            pos: token.start,
            token: Some(token),
            error: None,
        }
    }

    /// A zero-width boundary at `pos`.
    pub fn synthetic(kind: PhraseKind, pos: TextPos) -> Self {
        Self {
            kind,
            token: None,
            pos,
            error: None,
        }
    }

    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    pub fn start(&self) -> TextPos {
        self.pos
    }

    pub fn end(&self) -> TextPos {
        self.token.as_ref().map_or(self.pos, |t| t.end)
    }

    pub fn text(&self) -> &str {
        self.token.as_ref().map_or("", |t| t.text())
    }

    pub fn is_synthetic(&self) -> bool {
        self.token.is_none()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Display for PhraseToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.token {
            Some(token) => write!(f, "{} {:?} @{}", self.kind, token.text(), self.pos),
            None => write!(f, "{} @{}", self.kind, self.pos),
        }
    }
}
