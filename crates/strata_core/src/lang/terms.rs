//! Term token kinds and syntax roles.
//!
//! Term tokens are the output of the grammar-driven layer: a flat, well-nested event stream of starts, ends and
//! single tokens. Each term carries a [`SyntaxRole`] that tooling (highlighting, formatting) uses without knowing
//! the grammar.
//!
//! ## Examples
//! ```rust
//! use strata_core::lang::terms::{self, SyntaxRole, TermKind, TermShape};
//!
//! assert_eq!(terms::from_str("GRAMMAR_IS_LOADED"), Some(TermKind::GrammarIsLoaded));
//! assert_eq!(TermKind::ObjectStart.shape(), TermShape::Start);
//! assert_eq!(TermKind::ObjectStart.matching_end(), Some(TermKind::ObjectEnd));
//! assert_eq!(terms::role_from_str("skipped"), Some(SyntaxRole::Skipped));
//! ```

use super::registry::{LangItemInfo, item, lookup};

/// Whether a term opens a nested range, closes one, or stands alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermShape {
    Start,
    End,
    Single,
}

/// Stable identifier for term kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermKind {
    StatementStart,
    StatementEnd,
    BlockStart,
    BlockEnd,
    ObjectStart,
    ObjectEnd,
    AttributesStart,
    AttributesEnd,
    DocCommentStart,
    DocCommentEnd,
    PropertyStart,
    PropertyEnd,
    ListPropertyStart,
    ListPropertyEnd,
    ExpressionStart,
    ExpressionEnd,
    Value,
    Structural,
    Control,
    Ignorable,
    SyntaxError,
    GrammarIsLoaded,
    Eof,
}

impl TermKind {
    pub fn shape(self) -> TermShape {
        info_for(self).shape
    }

    pub fn is_start(self) -> bool {
        self.shape() == TermShape::Start
    }

    pub fn is_end(self) -> bool {
        self.shape() == TermShape::End
    }

    /// The end kind that closes a start kind.
    pub fn matching_end(self) -> Option<TermKind> {
        info_for(self).pair.filter(|_| self.is_start())
    }

    /// The start kind that an end kind closes.
    pub fn matching_start(self) -> Option<TermKind> {
        info_for(self).pair.filter(|_| self.is_end())
    }
}

impl std::fmt::Display for TermKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(as_str(*self))
    }
}

/// Metadata for a term kind.
#[derive(Debug, Clone, Copy)]
pub struct TermKindInfo {
    pub item: LangItemInfo<TermKind>,
    pub shape: TermShape,
    /// The other half of a start/end pair.
    pub pair: Option<TermKind>,
}

/// Registry of all term kinds, ordered by [`TermKind`] discriminant.
pub const TERM_KINDS: &[TermKindInfo] = &[
    start(TermKind::StatementStart, "STATEMENT_START", TermKind::StatementEnd, "Start of a statement."),
    end(TermKind::StatementEnd, "STATEMENT_END", TermKind::StatementStart, "End of a statement."),
    start(TermKind::BlockStart, "BLOCK_START", TermKind::BlockEnd, "An opening `{` of a block."),
    end(TermKind::BlockEnd, "BLOCK_END", TermKind::BlockStart, "The closing `}` of a block."),
    start(TermKind::ObjectStart, "OBJECT_START", TermKind::ObjectEnd, "Start of a named object."),
    end(TermKind::ObjectEnd, "OBJECT_END", TermKind::ObjectStart, "End of a named object."),
    start(
        TermKind::AttributesStart,
        "ATTRIBUTES_START",
        TermKind::AttributesEnd,
        "Start of an attribute group.",
    ),
    end(
        TermKind::AttributesEnd,
        "ATTRIBUTES_END",
        TermKind::AttributesStart,
        "End of an attribute group.",
    ),
    start(
        TermKind::DocCommentStart,
        "DOC_COMMENT_START",
        TermKind::DocCommentEnd,
        "Start of a run of documentation comments.",
    ),
    end(
        TermKind::DocCommentEnd,
        "DOC_COMMENT_END",
        TermKind::DocCommentStart,
        "End of a run of documentation comments.",
    ),
    start(TermKind::PropertyStart, "PROPERTY_START", TermKind::PropertyEnd, "Start of a named property."),
    end(TermKind::PropertyEnd, "PROPERTY_END", TermKind::PropertyStart, "End of a named property."),
    start(
        TermKind::ListPropertyStart,
        "LIST_PROPERTY_START",
        TermKind::ListPropertyEnd,
        "Start of a property holding a list of values.",
    ),
    end(
        TermKind::ListPropertyEnd,
        "LIST_PROPERTY_END",
        TermKind::ListPropertyStart,
        "End of a list property.",
    ),
    start(
        TermKind::ExpressionStart,
        "EXPRESSION_START",
        TermKind::ExpressionEnd,
        "Start of an operator expression.",
    ),
    end(
        TermKind::ExpressionEnd,
        "EXPRESSION_END",
        TermKind::ExpressionStart,
        "End of an operator expression.",
    ),
    single(TermKind::Value, "VALUE", "A literal or identifier carrying a value."),
    single(
        TermKind::Structural,
        "STRUCTURAL",
        "A keyword or punctuation token that carries structure but no value.",
    ),
    single(TermKind::Control, "CONTROL", "A control token outside any statement."),
    single(TermKind::Ignorable, "IGNORABLE", "Trivia, or a token skipped during recovery."),
    single(TermKind::SyntaxError, "SYNTAX_ERROR", "A zero-width syntax error report."),
    single(
        TermKind::GrammarIsLoaded,
        "GRAMMAR_IS_LOADED",
        "The grammar for the rest of the source has been loaded.",
    ),
    single(TermKind::Eof, "EOF", "End of input."),
];

/// Return the canonical spelling for a term kind.
pub fn as_str(id: TermKind) -> &'static str {
    info_for(id).item.canonical
}

/// Return the full metadata entry for a term kind.
pub fn info_for(id: TermKind) -> &'static TermKindInfo {
    &TERM_KINDS[id as usize]
}

/// Resolve a term kind spelling to its identifier.
pub fn from_str(s: &str) -> Option<TermKind> {
    TERM_KINDS.iter().find(|t| t.item.canonical == s).map(|t| t.item.id)
}

const fn start(id: TermKind, canonical: &'static str, end: TermKind, description: &'static str) -> TermKindInfo {
    TermKindInfo {
        item: item(id, canonical, &[], description),
        shape: TermShape::Start,
        pair: Some(end),
    }
}

const fn end(id: TermKind, canonical: &'static str, start: TermKind, description: &'static str) -> TermKindInfo {
    TermKindInfo {
        item: item(id, canonical, &[], description),
        shape: TermShape::End,
        pair: Some(start),
    }
}

const fn single(id: TermKind, canonical: &'static str, description: &'static str) -> TermKindInfo {
    TermKindInfo {
        item: item(id, canonical, &[], description),
        shape: TermShape::Single,
        pair: None,
    }
}

// ============================================================================
// SYNTAX ROLES
// ============================================================================

/// The role a term plays in the source, independent of the grammar that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxRole {
    Primary,
    Secondary,
    Keyword,
    Operator,
    Separator,
    Modifier,
    Documentation,
    Control,
    Ignorable,
    Skipped,
    Unknown,
}

impl std::fmt::Display for SyntaxRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(role_as_str(*self))
    }
}

/// Metadata for a syntax role.
pub type SyntaxRoleInfo = LangItemInfo<SyntaxRole>;

/// Registry of all syntax roles, ordered by [`SyntaxRole`] discriminant.
pub const SYNTAX_ROLES: &[SyntaxRoleInfo] = &[
    item(SyntaxRole::Primary, "primary", &[], "The main value of a construct, such as a name."),
    item(SyntaxRole::Secondary, "secondary", &[], "A subordinate value, such as an argument."),
    item(SyntaxRole::Keyword, "keyword", &[], "A reserved word of the grammar."),
    item(SyntaxRole::Operator, "operator", &["op"], "An operator symbol."),
    item(SyntaxRole::Separator, "separator", &["sep"], "Punctuation separating or grouping items."),
    item(SyntaxRole::Modifier, "modifier", &[], "A word or symbol modifying the construct that follows."),
    item(SyntaxRole::Documentation, "documentation", &["doc"], "Documentation comments."),
    item(SyntaxRole::Control, "control", &[], "Control tokens outside any statement."),
    item(SyntaxRole::Ignorable, "ignorable", &[], "Whitespace, newlines and plain comments."),
    item(SyntaxRole::Skipped, "skipped", &[], "A token skipped during error recovery."),
    item(SyntaxRole::Unknown, "unknown", &[], "No role assigned."),
];

/// Return the canonical spelling for a syntax role.
pub fn role_as_str(id: SyntaxRole) -> &'static str {
    role_info_for(id).canonical
}

/// Return the full metadata entry for a syntax role.
pub fn role_info_for(id: SyntaxRole) -> &'static SyntaxRoleInfo {
    &SYNTAX_ROLES[id as usize]
}

/// Resolve a syntax role spelling (or alias) to its identifier.
pub fn role_from_str(s: &str) -> Option<SyntaxRole> {
    lookup(SYNTAX_ROLES, s)
}
