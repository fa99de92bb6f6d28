//! Lexical token kinds.
//!
//! The lexer classifies every character of the source into exactly one token of one of these kinds. Kinds are
//! grammar-independent: grammars refine them through keyword tables and quote/prefix/suffix metadata, never by
//! adding kinds.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive** and uses the upper-snake spelling.
//!
//! ## Examples
//! ```rust
//! use strata_core::lang::tokens::{self, TokenKind};
//!
//! assert_eq!(tokens::from_str("INTEGER_WITH_SUFFIX"), Some(TokenKind::IntegerWithSuffix));
//! assert_eq!(tokens::as_str(TokenKind::Newline), "NEWLINE");
//! assert!(TokenKind::BlockComment.is_ignorable());
//! ```

use super::registry::{LangItemInfo, item};

/// Characters that make up `GRAPHICS` tokens.
pub const GRAPHICS_CHARS: &str = "~!@#$%^&*-+=|\\/:<>?.";

/// Return `true` if `c` may appear in a `GRAPHICS` token.
pub fn is_graphics_char(c: char) -> bool {
    GRAPHICS_CHARS.contains(c)
}

/// Broad grouping of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    /// Whitespace, newlines and comments.
    Trivia,
    /// Identifiers.
    Word,
    /// Numeric literals.
    Number,
    /// String literals.
    Text,
    /// `,` `;` `{` `}` and brackets.
    Punctuation,
    /// Operator character runs.
    Graphics,
    /// End of input.
    Eof,
}

/// Stable identifier for token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Eof,
    Identifier,
    Integer,
    IntegerWithSuffix,
    Float,
    FloatWithSuffix,
    String,
    MultilineString,
    PrefixedString,
    PrefixedMultilineString,
    Graphics,
    LineComment,
    BlockComment,
    DocComment,
    Whitespace,
    Newline,
    Comma,
    Semicolon,
    LeftCurly,
    RightCurly,
    Bracket,
}

impl TokenKind {
    pub fn category(self) -> TokenCategory {
        info_for(self).category
    }

    /// Whitespace, newlines and all comment forms.
    pub fn is_ignorable(self) -> bool {
        self.category() == TokenCategory::Trivia
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DocComment)
    }

    pub fn is_string(self) -> bool {
        self.category() == TokenCategory::Text
    }

    pub fn is_number(self) -> bool {
        self.category() == TokenCategory::Number
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(as_str(*self))
    }
}

/// Metadata for a token kind.
#[derive(Debug, Clone, Copy)]
pub struct TokenKindInfo {
    pub item: LangItemInfo<TokenKind>,
    pub category: TokenCategory,
}

/// Registry of all token kinds, ordered by [`TokenKind`] discriminant.
pub const TOKEN_KINDS: &[TokenKindInfo] = &[
    info(TokenKind::Eof, "EOF", TokenCategory::Eof, "End of input, synthesized exactly once."),
    info(
        TokenKind::Identifier,
        "IDENTIFIER",
        TokenCategory::Word,
        "A run of letters, digits and underscores starting with a letter or underscore.",
    ),
    info(TokenKind::Integer, "INTEGER", TokenCategory::Number, "Decimal or radix integer literal."),
    info(
        TokenKind::IntegerWithSuffix,
        "INTEGER_WITH_SUFFIX",
        TokenCategory::Number,
        "Integer literal followed directly by an identifier suffix.",
    ),
    info(
        TokenKind::Float,
        "FLOAT",
        TokenCategory::Number,
        "Number with a fraction or an exponent.",
    ),
    info(
        TokenKind::FloatWithSuffix,
        "FLOAT_WITH_SUFFIX",
        TokenCategory::Number,
        "Float literal followed directly by an identifier suffix.",
    ),
    info(TokenKind::String, "STRING", TokenCategory::Text, "Single-line quoted string."),
    info(
        TokenKind::MultilineString,
        "MULTILINE_STRING",
        TokenCategory::Text,
        "Triple-quoted string that may span lines.",
    ),
    info(
        TokenKind::PrefixedString,
        "PREFIXED_STRING",
        TokenCategory::Text,
        "Single-line string preceded directly by an identifier prefix.",
    ),
    info(
        TokenKind::PrefixedMultilineString,
        "PREFIXED_MULTILINE_STRING",
        TokenCategory::Text,
        "Triple-quoted string preceded directly by an identifier prefix.",
    ),
    info(
        TokenKind::Graphics,
        "GRAPHICS",
        TokenCategory::Graphics,
        "A run of operator characters.",
    ),
    info(
        TokenKind::LineComment,
        "LINE_COMMENT",
        TokenCategory::Trivia,
        "`//` comment up to the end of the line, or a `#!` line at the start of the source.",
    ),
    info(TokenKind::BlockComment, "BLOCK_COMMENT", TokenCategory::Trivia, "`/* ... */` comment."),
    info(
        TokenKind::DocComment,
        "DOC_COMMENT",
        TokenCategory::Trivia,
        "`///` comment up to the end of the line.",
    ),
    info(
        TokenKind::Whitespace,
        "WHITESPACE",
        TokenCategory::Trivia,
        "A run of whitespace without line breaks.",
    ),
    info(
        TokenKind::Newline,
        "NEWLINE",
        TokenCategory::Trivia,
        "One line break; `\\r\\n` is a single token.",
    ),
    info(TokenKind::Comma, "COMMA", TokenCategory::Punctuation, "`,`"),
    info(TokenKind::Semicolon, "SEMICOLON", TokenCategory::Punctuation, "`;`"),
    info(TokenKind::LeftCurly, "LEFT_CURLY", TokenCategory::Punctuation, "`{`"),
    info(TokenKind::RightCurly, "RIGHT_CURLY", TokenCategory::Punctuation, "`}`"),
    info(
        TokenKind::Bracket,
        "BRACKET",
        TokenCategory::Punctuation,
        "One of `(` `)` `[` `]`.",
    ),
];

/// Return the canonical spelling for a token kind.
pub fn as_str(id: TokenKind) -> &'static str {
    info_for(id).item.canonical
}

/// Return the full metadata entry for a token kind.
pub fn info_for(id: TokenKind) -> &'static TokenKindInfo {
    &TOKEN_KINDS[id as usize]
}

/// Resolve a token kind spelling to its identifier.
pub fn from_str(s: &str) -> Option<TokenKind> {
    TOKEN_KINDS.iter().find(|t| t.item.canonical == s).map(|t| t.item.id)
}

/// Iterate the token kind items, for code shared with the other registries.
pub fn items() -> impl Iterator<Item = &'static LangItemInfo<TokenKind>> {
    TOKEN_KINDS.iter().map(|t| &t.item)
}

const fn info(
    id: TokenKind,
    canonical: &'static str,
    category: TokenCategory,
    description: &'static str,
) -> TokenKindInfo {
    TokenKindInfo {
        item: item(id, canonical, &[], description),
        category,
    }
}
