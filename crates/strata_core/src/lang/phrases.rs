//! Phrase token kinds.
//!
//! The phrase layer wraps each lexical token (or a synthetic boundary) in one of these kinds, turning a flat token
//! stream into statements and `{ }` blocks.
//!
//! ## Notes
//! - Statement starts are not a phrase kind: the term layer stamps them once a statement's first significant
//!   token is known.
//!
//! ## Examples
//! ```rust
//! use strata_core::lang::phrases::{self, PhraseKind};
//!
//! assert_eq!(phrases::from_str("SOFT_STATEMENT_END"), Some(PhraseKind::SoftStatementEnd));
//! assert!(PhraseKind::EndBlock.closes_statement());
//! ```

use super::registry::{LangItemInfo, item, lookup};

/// Stable identifier for phrase token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhraseKind {
    Ignorable,
    Control,
    Significant,
    SoftStatementEnd,
    StatementEnd,
    StartBlock,
    EndBlock,
    Eof,
}

impl PhraseKind {
    /// Kinds that terminate the statement in front of them without being part of it.
    pub fn closes_statement(self) -> bool {
        matches!(self, PhraseKind::EndBlock | PhraseKind::Eof)
    }
}

impl std::fmt::Display for PhraseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(as_str(*self))
    }
}

/// Metadata for a phrase kind.
pub type PhraseKindInfo = LangItemInfo<PhraseKind>;

/// Registry of all phrase kinds, ordered by [`PhraseKind`] discriminant.
pub const PHRASE_KINDS: &[PhraseKindInfo] = &[
    item(
        PhraseKind::Ignorable,
        "IGNORABLE",
        &[],
        "Whitespace, newlines and comments that carry no statement structure.",
    ),
    item(
        PhraseKind::Control,
        "CONTROL",
        &[],
        "A token outside any statement, such as a stray `;` or an unmatched `}`.",
    ),
    item(
        PhraseKind::Significant,
        "SIGNIFICANT",
        &[],
        "A token that belongs to the current statement.",
    ),
    item(
        PhraseKind::SoftStatementEnd,
        "SOFT_STATEMENT_END",
        &["SOFT_END"],
        "A newline inside a statement; the grammar decides whether it ends the statement.",
    ),
    item(
        PhraseKind::StatementEnd,
        "STATEMENT_END",
        &[],
        "An explicit `;` or a synthetic zero-width boundary before `}` or end of input.",
    ),
    item(PhraseKind::StartBlock, "START_BLOCK", &[], "An opening `{`."),
    item(
        PhraseKind::EndBlock,
        "END_BLOCK",
        &[],
        "A matching `}` or a synthetic block closure at end of input.",
    ),
    item(PhraseKind::Eof, "EOF", &[], "End of input."),
];

/// Return the canonical spelling for a phrase kind.
pub fn as_str(id: PhraseKind) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for a phrase kind.
pub fn info_for(id: PhraseKind) -> &'static PhraseKindInfo {
    &PHRASE_KINDS[id as usize]
}

/// Resolve a phrase kind spelling (or alias) to its identifier.
pub fn from_str(s: &str) -> Option<PhraseKind> {
    lookup(PHRASE_KINDS, s)
}
