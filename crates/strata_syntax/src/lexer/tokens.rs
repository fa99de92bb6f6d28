//! Lexical tokens.
//!
//! Tokens are immutable once produced. Their text is shared (`Arc<str>`) so phrase and term tokens can wrap a
//! token by cloning it without copying source text.

use std::sync::Arc;

use strata_core::lang::tokens::TokenKind;
use strata_core::{ErrorInfo, TextPos};

// ============================================================================
// TOKEN KEY
// ============================================================================

/// The dispatch key of a token: its kind plus literal metadata.
///
/// Grammars select on keys, for example "a double-quoted string" or "an integer with suffix `U`".
///
/// ## Notes
/// - `prefix` is set for prefixed strings, `suffix` for numbers with a suffix.
/// - `quote` and `triple` are set for every string kind.
///
/// ## Examples
/// ```rust
/// use strata_core::lang::tokens::TokenKind;
/// use strata_syntax::lexer::TokenKey;
///
/// let key = TokenKey::string('"', false).with_prefix("r");
/// assert_eq!(key.kind, TokenKind::PrefixedString);
/// assert_eq!(key.kind_only(), TokenKey::simple(TokenKind::PrefixedString));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenKey {
    pub kind: TokenKind,
    pub prefix: Option<Arc<str>>,
    pub quote: Option<char>,
    pub triple: bool,
    pub suffix: Option<Arc<str>>,
}

impl TokenKey {
    /// A key carrying only a kind.
    pub fn simple(kind: TokenKind) -> Self {
        Self {
            kind,
            prefix: None,
            quote: None,
            triple: false,
            suffix: None,
        }
    }

    /// An unprefixed string key.
    pub fn string(quote: char, triple: bool) -> Self {
        let kind = if triple {
            TokenKind::MultilineString
        } else {
            TokenKind::String
        };
        Self {
            quote: Some(quote),
            triple,
            ..Self::simple(kind)
        }
    }

    /// Turn a string key into its prefixed form.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.kind = match self.kind {
            TokenKind::String => TokenKind::PrefixedString,
            TokenKind::MultilineString => TokenKind::PrefixedMultilineString,
            other => other,
        };
        self.prefix = Some(Arc::from(prefix));
        self
    }

    /// Turn a number key into its suffixed form.
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.kind = match self.kind {
            TokenKind::Integer => TokenKind::IntegerWithSuffix,
            TokenKind::Float => TokenKind::FloatWithSuffix,
            other => other,
        };
        self.suffix = Some(Arc::from(suffix));
        self
    }

    /// The same kind without literal metadata, used as the fallback dispatch key.
    pub fn kind_only(&self) -> TokenKey {
        TokenKey::simple(self.kind)
    }
}

impl std::fmt::Display for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(prefix) = &self.prefix {
            write!(f, " prefix={prefix}")?;
        }
        if let Some(quote) = self.quote {
            let quotes: String = std::iter::repeat_n(quote, if self.triple { 3 } else { 1 }).collect();
            write!(f, " quote={quotes}")?;
        }
        if let Some(suffix) = &self.suffix {
            write!(f, " suffix={suffix}")?;
        }
        Ok(())
    }
}

// ============================================================================
// TOKEN
// ============================================================================

/// A token with its text, position range and any lexical errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Arc<str>,
    pub start: TextPos,
    pub end: TextPos,
    pub error: Option<ErrorInfo>,
    pub key: TokenKey,
}

impl Token {
    /// Construct a token whose key carries only its kind.
    pub fn new(kind: TokenKind, text: impl Into<Arc<str>>, start: TextPos, end: TextPos) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
            error: None,
            key: TokenKey::simple(kind),
        }
    }

    /// The zero-width end-of-input token at `pos`.
    pub fn eof(pos: TextPos) -> Self {
        Self::new(TokenKind::Eof, "", pos, pos)
    }

    pub fn with_key(mut self, key: TokenKey) -> Self {
        self.kind = key.kind;
        self.key = key;
        self
    }

    pub fn with_error(mut self, error: Option<ErrorInfo>) -> Self {
        self.error = error;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_ignorable(&self) -> bool {
        self.kind.is_ignorable()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?} @{}", self.kind, self.text(), self.start)
    }
}
