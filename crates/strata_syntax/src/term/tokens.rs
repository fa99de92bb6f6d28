//! Term tokens: the output of the term parser.

use std::fmt;
use std::sync::Arc;

use strata_core::lang::phrases::PhraseKind;
use strata_core::lang::terms::{SyntaxRole, TermKind};
use strata_core::lang::tokens::TokenKind;
use strata_core::{ErrorInfo, TextPos};

use crate::grammar::StructuralName;
use crate::phrase::PhraseToken;

/// One event of the term stream.
///
/// ## Notes
/// - Terms that wrap a phrase token span it; structure events (`*_START`, `*_END`, errors) are zero-width.
/// - `error` holds term-level errors. Phrase and lexical errors stay on the wrapped tokens; [`TermToken::errors`]
///   walks all three.
/// - `grammar_source` names the grammar that produced the term; doctype terms precede any grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermToken {
    pub kind: TermKind,
    pub role: SyntaxRole,
    pub structural: Option<StructuralName>,
    pub phrase: Option<PhraseToken>,
    pub start: TextPos,
    pub end: TextPos,
    pub grammar_source: Option<Arc<str>>,
    pub error: Option<ErrorInfo>,
}

impl TermToken {
    /// A zero-width event at `pos`.
    pub fn at(kind: TermKind, role: SyntaxRole, pos: TextPos) -> Self {
        Self {
            kind,
            role,
            structural: None,
            phrase: None,
            start: pos,
            end: pos,
            grammar_source: None,
            error: None,
        }
    }

    /// A term spanning `phrase`.
    pub fn wrap(kind: TermKind, role: SyntaxRole, phrase: PhraseToken) -> Self {
        Self {
            kind,
            role,
            structural: None,
            start: phrase.start(),
            end: phrase.end(),
            phrase: Some(phrase),
            grammar_source: None,
            error: None,
        }
    }

    /// An `IGNORABLE` term for trivia, with the role its token implies.
    pub fn ignorable(phrase: PhraseToken) -> Self {
        let role = match phrase.token.as_ref().map(|t| t.kind) {
            Some(TokenKind::DocComment) => SyntaxRole::Documentation,
            _ => SyntaxRole::Ignorable,
        };
        Self::wrap(TermKind::Ignorable, role, phrase)
    }

    pub fn with_structural(mut self, structural: Option<StructuralName>) -> Self {
        self.structural = structural;
        self
    }

    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    /// Source text of the wrapped token, or `""` for events.
    pub fn text(&self) -> &str {
        self.phrase.as_ref().map_or("", |p| p.text())
    }

    pub fn phrase_kind(&self) -> Option<PhraseKind> {
        self.phrase.as_ref().map(|p| p.kind)
    }

    /// Every error attached to this term: term level first, then phrase level, then lexical.
    pub fn errors(&self) -> impl Iterator<Item = &ErrorInfo> {
        let phrase = self.phrase.as_ref();
        self.error
            .iter()
            .chain(phrase.and_then(|p| p.error.as_ref()))
            .chain(phrase.and_then(|p| p.token.as_ref()).and_then(|t| t.error.as_ref()))
            .flat_map(|e| e.iter())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

impl fmt::Display for TermToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(structural) = &self.structural {
            write!(f, "({structural})")?;
        }
        if self.phrase.as_ref().is_some_and(|p| p.has_token()) {
            write!(f, " {:?}", self.text())?;
        }
        if self.role != SyntaxRole::Unknown {
            write!(f, " [{}]", self.role)?;
        }
        write!(f, " @{}", self.start)
    }
}
