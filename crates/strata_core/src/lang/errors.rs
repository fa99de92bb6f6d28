//! Built-in error codes.
//!
//! This registry is the single source of error code strings and message templates for every layer of the
//! pipeline. Templates use positional slots (`{0}`, `{1}`) filled from the arguments stored in an
//! [`ErrorInfo`](crate::ErrorInfo).
//!
//! ## Notes
//! - Code strings are stable identifiers of the form `layer.Name`; tooling may match on them.
//! - Grammars define further codes at runtime with [`ErrorCode::custom`](crate::ErrorCode::custom); those never
//!   resolve through [`from_str`].
//!
//! ## Examples
//! ```rust
//! use strata_core::lang::errors::{self, ErrorCodeId, ErrorLayer};
//!
//! assert_eq!(errors::code(ErrorCodeId::UnmatchedClosingCurly), "phrase.UnmatchedClosingCurly");
//! assert_eq!(errors::from_str("lexical.InvalidEscape"), Some(ErrorCodeId::InvalidEscape));
//! assert_eq!(errors::layer(ErrorCodeId::UnterminatedString), ErrorLayer::Lexical);
//! ```

/// The pipeline layer that reports an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorLayer {
    Lexical,
    Phrase,
    Term,
    Doctype,
    Grammar,
}

impl ErrorLayer {
    pub fn prefix(self) -> &'static str {
        match self {
            ErrorLayer::Lexical => "lexical",
            ErrorLayer::Phrase => "phrase",
            ErrorLayer::Term => "term",
            ErrorLayer::Doctype => "doctype",
            ErrorLayer::Grammar => "grammar",
        }
    }
}

/// Stable identifier for built-in error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCodeId {
    // Lexical
    UnterminatedString,
    UnterminatedBlockComment,
    InvalidEscape,
    InvalidRadix,
    DigitOutOfRadix,
    UnterminatedRadixNumber,
    MissingRadixDigits,
    MissingExponentDigits,
    InvalidCharacter,
    TooManyCharacters,

    // Phrase
    UnmatchedClosingCurly,
    UnterminatedBlock,

    // Term
    UnexpectedToken,
    UnexpectedStatementEnd,

    // Doctype
    MissingDoctypeString,
    UnknownContext,

    // Grammar
    GrammarNotFound,
    GrammarHasErrors,
}

/// Metadata for a built-in error code.
#[derive(Debug, Clone, Copy)]
pub struct ErrorCodeInfo {
    pub id: ErrorCodeId,
    pub code: &'static str,
    pub template: &'static str,
    pub layer: ErrorLayer,
}

/// Registry of all built-in error codes, ordered by [`ErrorCodeId`] discriminant.
pub const ERROR_CODES: &[ErrorCodeInfo] = &[
    // Lexical
    info(
        ErrorCodeId::UnterminatedString,
        "lexical.UnterminatedString",
        "unterminated string literal",
        ErrorLayer::Lexical,
    ),
    info(
        ErrorCodeId::UnterminatedBlockComment,
        "lexical.UnterminatedBlockComment",
        "unterminated block comment",
        ErrorLayer::Lexical,
    ),
    info(
        ErrorCodeId::InvalidEscape,
        "lexical.InvalidEscape",
        "invalid escape sequence '\\{0}'",
        ErrorLayer::Lexical,
    ),
    info(
        ErrorCodeId::InvalidRadix,
        "lexical.InvalidRadix",
        "invalid radix {0}, expected a radix between 2 and 36",
        ErrorLayer::Lexical,
    ),
    info(
        ErrorCodeId::DigitOutOfRadix,
        "lexical.DigitOutOfRadix",
        "digit '{0}' is out of range for radix {1}",
        ErrorLayer::Lexical,
    ),
    info(
        ErrorCodeId::UnterminatedRadixNumber,
        "lexical.UnterminatedRadixNumber",
        "radix number is missing its closing '#'",
        ErrorLayer::Lexical,
    ),
    info(
        ErrorCodeId::MissingRadixDigits,
        "lexical.MissingRadixDigits",
        "radix number has no digits",
        ErrorLayer::Lexical,
    ),
    info(
        ErrorCodeId::MissingExponentDigits,
        "lexical.MissingExponentDigits",
        "exponent has no digits",
        ErrorLayer::Lexical,
    ),
    info(
        ErrorCodeId::InvalidCharacter,
        "lexical.InvalidCharacter",
        "invalid character '{0}'",
        ErrorLayer::Lexical,
    ),
    info(
        ErrorCodeId::TooManyCharacters,
        "lexical.TooManyCharacters",
        "token reaches the length limit of {0} characters",
        ErrorLayer::Lexical,
    ),
    // Phrase
    info(
        ErrorCodeId::UnmatchedClosingCurly,
        "phrase.UnmatchedClosingCurly",
        "unmatched '}'",
        ErrorLayer::Phrase,
    ),
    info(
        ErrorCodeId::UnterminatedBlock,
        "phrase.UnterminatedBlock",
        "block opened at {0} is not closed",
        ErrorLayer::Phrase,
    ),
    // Term
    info(
        ErrorCodeId::UnexpectedToken,
        "term.UnexpectedToken",
        "unexpected token '{0}'",
        ErrorLayer::Term,
    ),
    info(
        ErrorCodeId::UnexpectedStatementEnd,
        "term.UnexpectedStatementEnd",
        "statement ended before {0}",
        ErrorLayer::Term,
    ),
    // Doctype
    info(
        ErrorCodeId::MissingDoctypeString,
        "doctype.MissingString",
        "expected a string after '{0}'",
        ErrorLayer::Doctype,
    ),
    info(
        ErrorCodeId::UnknownContext,
        "doctype.UnknownContext",
        "grammar has no statement context named '{0}'",
        ErrorLayer::Doctype,
    ),
    // Grammar
    info(
        ErrorCodeId::GrammarNotFound,
        "grammar.NotFound",
        "grammar '{0}' could not be resolved",
        ErrorLayer::Grammar,
    ),
    info(
        ErrorCodeId::GrammarHasErrors,
        "grammar.HasErrors",
        "grammar '{0}' was loaded with errors",
        ErrorLayer::Grammar,
    ),
];

/// Return the stable code string for an error code.
pub fn code(id: ErrorCodeId) -> &'static str {
    info_for(id).code
}

/// Return the message template for an error code.
pub fn template(id: ErrorCodeId) -> &'static str {
    info_for(id).template
}

/// Return the layer that reports an error code.
pub fn layer(id: ErrorCodeId) -> ErrorLayer {
    info_for(id).layer
}

/// Return the full metadata entry for an error code.
pub fn info_for(id: ErrorCodeId) -> &'static ErrorCodeInfo {
    &ERROR_CODES[id as usize]
}

/// Resolve a code string to its identifier.
pub fn from_str(s: &str) -> Option<ErrorCodeId> {
    ERROR_CODES.iter().find(|e| e.code == s).map(|e| e.id)
}

const fn info(id: ErrorCodeId, code: &'static str, template: &'static str, layer: ErrorLayer) -> ErrorCodeInfo {
    ErrorCodeInfo {
        id,
        code,
        template,
        layer,
    }
}
