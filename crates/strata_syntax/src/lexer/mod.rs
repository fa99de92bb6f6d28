//! Streaming lexer.
//!
//! Turns a character buffer that arrives in arbitrary fragments into a stream of immutable [`Token`]s, tracking
//! line, column and offset as it goes.
//!
//! ## Module Structure
//!
//! - `buffer` - Pending input ([`TextBuffer`])
//! - `tokens` - Token types ([`Token`], [`TokenKey`])
//! - `strings` - String literal scanning
//! - `numbers` - Numeric literal scanning
//!
//! ## Notes
//! - Every token is scanned from scratch against the pending buffer. If the token under the cursor could still
//!   grow once more text arrives, the lexer reports `InputNeeded` and consumes nothing, so the token stream does
//!   not depend on how the input was split.
//! - Malformed input never stops the lexer: the error is attached to the token that exposed it.

mod buffer;
mod numbers;
mod strings;
pub mod tokens;

pub use buffer::TextBuffer;
pub use tokens::{Token, TokenKey};

use std::sync::Arc;

use strata_core::lang::errors::ErrorCodeId;
use strata_core::lang::tokens::{TokenKind, is_graphics_char};
use strata_core::{ErrorInfo, SourceLocation, TextPos};

use crate::config::ParserConfig;
use crate::diagnostics::{ContractError, Layer};
use crate::state::ParserState;

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// Lexer state diagram:
//
// [unstarted] → start() → [scanning] ⇄ parse()/read()
//                              ↓ buffer empty and end of input
//                          [EOF pending] → read() → [done]
// ============================================================================

/// Streaming lexer.
///
/// ## Examples
/// ```rust
/// use strata_core::TextPos;
/// use strata_syntax::lexer::{Lexer, TextBuffer};
/// use strata_syntax::{ParserConfig, ParserState};
///
/// let mut lexer = Lexer::new(&ParserConfig::default());
/// lexer.start("demo", TextPos::START).unwrap();
///
/// let mut buffer = TextBuffer::from("ab");
/// // `ab` may continue in the next chunk.
/// assert_eq!(lexer.parse(&mut buffer, false).unwrap(), ParserState::InputNeeded);
/// buffer.push_str("c ");
/// assert_eq!(lexer.parse(&mut buffer, false).unwrap(), ParserState::OutputAvailable);
/// assert_eq!(lexer.read().unwrap().text(), "abc");
/// ```
#[derive(Debug)]
pub struct Lexer {
    source_id: Option<Arc<str>>,
    pos: TextPos,
    prev: Option<char>,
    at_source_start: bool,
    max_token_length: usize,
    doc_comments: bool,
    pending: Option<Token>,
    eof_produced: bool,
}

impl Lexer {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            source_id: None,
            pos: TextPos::START,
            prev: None,
            at_source_start: true,
            max_token_length: config.max_token_length.max(1),
            doc_comments: config.doc_comments,
            pending: None,
            eof_produced: false,
        }
    }

    /// Bind the lexer to a source; may be called once.
    pub fn start(&mut self, source_id: impl Into<Arc<str>>, start: TextPos) -> Result<(), ContractError> {
        if self.source_id.is_some() {
            return Err(ContractError::AlreadyStarted(Layer::Lexer));
        }
        self.source_id = Some(source_id.into());
        self.pos = start;
        Ok(())
    }

    /// Scan at most one token from `buffer`.
    ///
    /// ## Parameters
    /// - `buffer`: pending text; consumed text is removed from its front.
    /// - `end_of_input`: no more text will ever be appended to `buffer`.
    ///
    /// ## Returns
    /// - `OutputAvailable` when a token is ready for [`Lexer::read`].
    /// - `InputNeeded` when the buffer is empty or the token under the cursor may continue.
    /// - `Eof` once the end-of-input token has been read.
    pub fn parse(&mut self, buffer: &mut TextBuffer, end_of_input: bool) -> Result<ParserState, ContractError> {
        let Some(source_id) = self.source_id.clone() else {
            return Err(ContractError::NotStarted(Layer::Lexer));
        };
        if self.pending.is_some() {
            return Ok(ParserState::OutputAvailable);
        }
        if self.eof_produced {
            return Ok(ParserState::Eof);
        }
        if buffer.is_empty() {
            if !end_of_input {
                return Ok(ParserState::InputNeeded);
            }
            tracing::trace!(pos = %self.pos, "lexer reached end of input");
            self.pending = Some(Token::eof(self.pos));
            self.eof_produced = true;
            return Ok(ParserState::OutputAvailable);
        }

        let Some(scanned) = self.scan(buffer.as_str(), end_of_input) else {
            return Ok(ParserState::InputNeeded);
        };

        let text = &buffer.as_str()[..scanned.len];
        let start = self.pos;
        let mut end = start;
        for c in text.chars() {
            end = end.advance(c, self.prev);
            self.prev = Some(c);
        }
        let error = scanned.errors.into_iter().fold(None, |chain, (code, args)| {
            let location = SourceLocation::new(source_id.clone(), start, end);
            Some(ErrorInfo::extend(chain.as_ref(), code, args, location))
        });

        let token = Token::new(scanned.key.kind, text, start, end)
            .with_key(scanned.key)
            .with_error(error);
        buffer.consume(scanned.len);
        self.pos = end;
        self.at_source_start = false;
        self.pending = Some(token);
        Ok(ParserState::OutputAvailable)
    }

    /// Take the token produced by the last `parse` call.
    pub fn read(&mut self) -> Result<Token, ContractError> {
        self.pending.take().ok_or(ContractError::NothingToRead(Layer::Lexer))
    }

    /// Position after the last scanned token.
    pub fn position(&self) -> TextPos {
        self.pos
    }
}

// ============================================================================
// SCANNER
// ============================================================================

impl Lexer {
    /// Scan the token at the front of `text`.
    ///
    /// The first pass may look one character past the length limit, so a token of exactly the limit is not
    /// flagged just for peeking at its delimiter. Only a token that really runs past the limit is scanned again
    /// with the strict limit, which cuts it and reports `TooManyCharacters`.
    fn scan(&self, text: &str, end_of_input: bool) -> Option<Scanned> {
        let scanner = |limit| Scanner::new(text, end_of_input, limit, self.at_source_start, self.doc_comments);
        let scanned = scanner(self.max_token_length.saturating_add(1)).scan_token()?;
        if scanned.chars <= self.max_token_length {
            return Some(scanned);
        }
        scanner(self.max_token_length).scan_token()
    }
}

/// Result of scanning one token from the front of the buffer.
struct Scanned {
    len: usize,
    /// Length in characters.
    chars: usize,
    key: TokenKey,
    errors: Vec<(ErrorCodeId, Vec<String>)>,
}

/// One-shot scanner for the token at the front of the pending text.
struct Scanner<'a> {
    text: &'a str,
    current_pos: usize,
    /// Characters consumed so far.
    consumed: usize,
    limit: usize,
    end_of_input: bool,
    /// A lookahead ran past the end of the buffer.
    hit_end: bool,
    /// A lookahead was refused because the token reached `limit`.
    truncated: bool,
    at_source_start: bool,
    doc_comments: bool,
    errors: Vec<(ErrorCodeId, Vec<String>)>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, end_of_input: bool, limit: usize, at_source_start: bool, doc_comments: bool) -> Self {
        Self {
            text,
            current_pos: 0,
            consumed: 0,
            limit,
            end_of_input,
            hit_end: false,
            truncated: false,
            at_source_start,
            doc_comments,
            errors: Vec::new(),
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    /// Look `n` characters past the cursor.
    ///
    /// Characters beyond the token length limit are hidden; seeing one marks the token as truncated.
    fn peek_at(&mut self, n: usize) -> Option<char> {
        let c = self.text[self.current_pos..].chars().nth(n);
        if c.is_none() {
            self.hit_end = true;
            return None;
        }
        if self.consumed + n >= self.limit {
            self.truncated = true;
            return None;
        }
        c
    }

    fn peek(&mut self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_next(&mut self) -> Option<char> {
        self.peek_at(1)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.text[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        self.consumed += 1;
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    fn error(&mut self, code: ErrorCodeId, args: Vec<String>) {
        self.errors.push((code, args));
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    /// Scan one token, or `None` if it may continue past the buffer.
    fn scan_token(mut self) -> Option<Scanned> {
        let c = self.advance()?;
        let key = match c {
            '\n' => TokenKey::simple(TokenKind::Newline),
            '\r' => {
                self.match_char('\n');
                TokenKey::simple(TokenKind::Newline)
            }
            ',' => TokenKey::simple(TokenKind::Comma),
            ';' => TokenKey::simple(TokenKind::Semicolon),
            '{' => TokenKey::simple(TokenKind::LeftCurly),
            '}' => TokenKey::simple(TokenKind::RightCurly),
            '(' | ')' | '[' | ']' => TokenKey::simple(TokenKind::Bracket),
            '"' | '\'' => self.scan_string(c, None),
            '#' if self.at_source_start && self.peek() == Some('!') => {
                self.scan_rest_of_line();
                TokenKey::simple(TokenKind::LineComment)
            }
            '/' if self.peek() == Some('/') => self.scan_line_comment(),
            '/' if self.peek() == Some('*') => self.scan_block_comment(),
            _ if is_graphics_char(c) => self.scan_graphics(),
            '0'..='9' => self.scan_number(),
            _ if is_ident_start(c) => self.scan_identifier(),
            _ if c.is_whitespace() => {
                self.advance_while(|c| c.is_whitespace() && c != '\n' && c != '\r');
                TokenKey::simple(TokenKind::Whitespace)
            }
            _ => {
                self.error(ErrorCodeId::InvalidCharacter, vec![c.escape_debug().to_string()]);
                TokenKey::simple(TokenKind::Graphics)
            }
        };

        if self.truncated {
            self.error(ErrorCodeId::TooManyCharacters, vec![self.limit.to_string()]);
        } else if self.hit_end && !self.end_of_input {
            return None;
        }

        Some(Scanned {
            len: self.current_pos,
            chars: self.consumed,
            key,
            errors: self.errors,
        })
    }

    // ========================================================================
    // Comments, graphics and identifiers
    // ========================================================================

    fn scan_rest_of_line(&mut self) {
        self.advance_while(|c| c != '\n' && c != '\r');
    }

    /// `//` or `///` comment; the first `/` is consumed.
    fn scan_line_comment(&mut self) -> TokenKey {
        self.advance();
        let is_doc = self.peek() == Some('/') && self.peek_next() != Some('/');
        self.scan_rest_of_line();
        if is_doc && self.doc_comments {
            TokenKey::simple(TokenKind::DocComment)
        } else {
            TokenKey::simple(TokenKind::LineComment)
        }
    }

    /// `/* ... */` comment; the `/` is consumed.
    fn scan_block_comment(&mut self) -> TokenKey {
        self.advance();
        loop {
            match self.peek() {
                Some('*') if self.peek_next() == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
                None => {
                    self.error(ErrorCodeId::UnterminatedBlockComment, vec![]);
                    break;
                }
            }
        }
        TokenKey::simple(TokenKind::BlockComment)
    }

    /// Operator characters up to, but not including, a comment opener.
    fn scan_graphics(&mut self) -> TokenKey {
        while let Some(c) = self.peek() {
            if !is_graphics_char(c) {
                break;
            }
            if c == '/' && matches!(self.peek_next(), Some('/' | '*')) {
                break;
            }
            self.advance();
        }
        TokenKey::simple(TokenKind::Graphics)
    }

    /// Identifier, or the prefix of a prefixed string.
    fn scan_identifier(&mut self) -> TokenKey {
        self.advance_while(is_ident_continue);
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let prefix = &self.text[..self.current_pos];
                self.advance();
                self.scan_string(quote, Some(prefix))
            }
            _ => TokenKey::simple(TokenKind::Identifier),
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lex a complete source string in one go.
///
/// The returned stream always ends with the `EOF` token.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source_id: &str, source: &str, config: &ParserConfig) -> Result<Vec<Token>, ContractError> {
    let mut lexer = Lexer::new(config);
    lexer.start(source_id, TextPos::START)?;
    let mut buffer = TextBuffer::from(source);
    let mut tokens = Vec::new();
    loop {
        match lexer.parse(&mut buffer, true)? {
            ParserState::OutputAvailable => tokens.push(lexer.read()?),
            ParserState::Eof | ParserState::InputNeeded | ParserState::ResourceNeeded => break,
        }
    }
    Ok(tokens)
}

// ============================================================================
// TESTS
// ============================================================================
