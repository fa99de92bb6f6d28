//! Phrase parser: groups tokens into statements and `{ }` blocks.
//!
//! The phrase layer knows nothing about any grammar. It only decides where statements and blocks begin and end,
//! inserting synthetic boundaries where the source leaves them implicit and reporting brace mismatches.
//!
//! ## Notes
//! - A newline inside a statement becomes a `SOFT_STATEMENT_END`; whether it really ends the statement is decided
//!   by the grammar in the term layer.
//! - `}` and end of input close the statement in front of them with a zero-width `STATEMENT_END` and are left in
//!   the input cell, so the following `parse` call sees them again in the next state.

pub mod tokens;

pub use tokens::PhraseToken;

use std::sync::Arc;

use strata_core::lang::errors::ErrorCodeId;
use strata_core::lang::phrases::PhraseKind;
use strata_core::lang::tokens::TokenKind;
use strata_core::{ErrorInfo, SourceLocation, TextPos};

use crate::cell::Cell;
use crate::diagnostics::{ContractError, Layer};
use crate::lexer::Token;
use crate::state::ParserState;

// ============================================================================
// PHRASE STATE
// ----------------------------------------------------------------------------
//
//  STATEMENT_SEQUENCE ──significant──▶ STATEMENT ──newline──▶ STATEMENT_AFTER_SOFT
//         ▲     │                        │  ▲  ▲                    │
//         │     └──'{'──▶ AFTER_BLOCK_START │  └────significant─────┘
//         │                 (sequence)   │  │
//         └──────────';'─────────────────┘  └── END_BLOCK ◀── BEFORE_BLOCK_END ◀── '}'
//
//  EOF: ── STATEMENT_END ──▶ BEFORE_EOF ── (open block? END_BLOCK) ──▶ ... ──▶ AFTER_EOF
// ============================================================================

/// State of the phrase machine between `parse` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhraseState {
    /// Between statements.
    StatementSequence,
    /// Inside a statement.
    Statement,
    /// Inside a statement, after a soft statement end.
    StatementAfterSoft,
    /// Between statements, right after `{`.
    AfterBlockStart,
    /// The statement in front of a `}` was closed; the `}` is next.
    BeforeBlockEnd,
    /// The statement in front of end of input was closed; open blocks are closed next.
    BeforeEof,
    /// `EOF` was emitted.
    AfterEof,
}

/// An open `{`.
#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    start: TextPos,
    end: TextPos,
}

/// Phrase parser.
///
/// ## Examples
/// ```rust
/// use strata_core::TextPos;
/// use strata_core::lang::phrases::PhraseKind;
/// use strata_core::lang::tokens::TokenKind;
/// use strata_syntax::lexer::Token;
/// use strata_syntax::phrase::PhraseParser;
/// use strata_syntax::{Cell, ParserState};
///
/// let mut parser = PhraseParser::new();
/// parser.start("demo").unwrap();
/// let end = TextPos::new(1, 2, 1);
/// let mut input = Cell::with(Token::new(TokenKind::Identifier, "x", TextPos::START, end));
///
/// assert_eq!(parser.parse(&mut input).unwrap(), ParserState::OutputAvailable);
/// assert_eq!(parser.read().unwrap().kind, PhraseKind::Significant);
/// assert!(input.is_empty());
/// ```
#[derive(Debug)]
pub struct PhraseParser {
    source_id: Option<Arc<str>>,
    state: PhraseState,
    blocks: Vec<OpenBlock>,
    pending: Option<PhraseToken>,
    last_pos: TextPos,
}

impl Default for PhraseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseParser {
    pub fn new() -> Self {
        Self {
            source_id: None,
            state: PhraseState::StatementSequence,
            blocks: Vec::new(),
            pending: None,
            last_pos: TextPos::START,
        }
    }

    /// Bind the parser to a source; may be called once.
    pub fn start(&mut self, source_id: impl Into<Arc<str>>) -> Result<(), ContractError> {
        if self.source_id.is_some() {
            return Err(ContractError::AlreadyStarted(Layer::PhraseParser));
        }
        self.source_id = Some(source_id.into());
        Ok(())
    }

    pub fn state(&self) -> PhraseState {
        self.state
    }

    /// Number of `{` not yet matched.
    pub fn open_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Classify the token in `input`, producing at most one phrase token.
    ///
    /// The token is taken out of `input` when it has been consumed; synthetic boundaries leave it in place.
    pub fn parse(&mut self, input: &mut Cell<Token>) -> Result<ParserState, ContractError> {
        let Some(source_id) = self.source_id.clone() else {
            return Err(ContractError::NotStarted(Layer::PhraseParser));
        };
        if self.pending.is_some() {
            return Ok(ParserState::OutputAvailable);
        }
        if self.state == PhraseState::AfterEof {
            return Ok(ParserState::Eof);
        }
        let Some(token) = input.peek() else {
            return Ok(ParserState::InputNeeded);
        };
        let kind = token.kind;
        let pos = token.start;
        self.last_pos = pos;

        let output = match self.state {
            PhraseState::StatementSequence | PhraseState::AfterBlockStart => {
                self.between_statements(input, kind, &source_id)
            }
            PhraseState::Statement | PhraseState::StatementAfterSoft => self.in_statement(input, kind, pos),
            PhraseState::BeforeBlockEnd => {
                if kind == TokenKind::RightCurly {
                    self.close_block(input)
                } else {
                    self.state = PhraseState::StatementSequence;
                    self.between_statements(input, kind, &source_id)
                }
            }
            PhraseState::BeforeEof => self.before_eof(input, pos, &source_id),
            PhraseState::AfterEof => None,
        };

        match output {
            Some(phrase) => {
                tracing::trace!(kind = %phrase.kind, state = ?self.state, "phrase token");
                self.pending = Some(phrase);
                Ok(ParserState::OutputAvailable)
            }
            // A state change without output; the token is still in the cell.
            None => self.parse(input),
        }
    }

    /// Take the phrase token produced by the last `parse` call.
    ///
    /// After `EOF` was emitted this keeps returning an `EOF` sentinel.
    pub fn read(&mut self) -> Result<PhraseToken, ContractError> {
        if let Some(phrase) = self.pending.take() {
            return Ok(phrase);
        }
        if self.state == PhraseState::AfterEof {
            return Ok(PhraseToken::synthetic(PhraseKind::Eof, self.last_pos));
        }
        Err(ContractError::NothingToRead(Layer::PhraseParser))
    }

    // ========================================================================
    // State handlers
    // ========================================================================

    fn between_statements(
        &mut self,
        input: &mut Cell<Token>,
        kind: TokenKind,
        source_id: &Arc<str>,
    ) -> Option<PhraseToken> {
        match kind {
            TokenKind::Eof => {
                self.state = PhraseState::BeforeEof;
                None
            }
            TokenKind::Semicolon => consume(input, PhraseKind::Control),
            TokenKind::LeftCurly => self.open_block(input),
            TokenKind::RightCurly if !self.blocks.is_empty() => self.close_block(input),
            TokenKind::RightCurly => {
                let phrase = consume(input, PhraseKind::Control)?;
                let location = SourceLocation::new(source_id.clone(), phrase.start(), phrase.end());
                tracing::debug!(pos = %phrase.pos, "unmatched closing curly");
                Some(phrase.with_error(ErrorInfo::new(ErrorCodeId::UnmatchedClosingCurly, vec![], location)))
            }
            _ if kind.is_ignorable() => consume(input, PhraseKind::Ignorable),
            _ => {
                self.state = PhraseState::Statement;
                consume(input, PhraseKind::Significant)
            }
        }
    }

    fn in_statement(&mut self, input: &mut Cell<Token>, kind: TokenKind, pos: TextPos) -> Option<PhraseToken> {
        match kind {
            TokenKind::Eof => {
                self.state = PhraseState::BeforeEof;
                Some(PhraseToken::synthetic(PhraseKind::StatementEnd, pos))
            }
            TokenKind::RightCurly => {
                self.state = if self.blocks.is_empty() {
                    PhraseState::StatementSequence
                } else {
                    PhraseState::BeforeBlockEnd
                };
                Some(PhraseToken::synthetic(PhraseKind::StatementEnd, pos))
            }
            TokenKind::Semicolon => {
                self.state = PhraseState::StatementSequence;
                consume(input, PhraseKind::StatementEnd)
            }
            TokenKind::LeftCurly => self.open_block(input),
            TokenKind::Newline if self.state == PhraseState::Statement => {
                self.state = PhraseState::StatementAfterSoft;
                consume(input, PhraseKind::SoftStatementEnd)
            }
            _ if kind.is_ignorable() => consume(input, PhraseKind::Ignorable),
            _ => {
                self.state = PhraseState::Statement;
                consume(input, PhraseKind::Significant)
            }
        }
    }

    fn before_eof(&mut self, input: &mut Cell<Token>, pos: TextPos, source_id: &Arc<str>) -> Option<PhraseToken> {
        match self.blocks.pop() {
            Some(block) => {
                self.state = PhraseState::Statement;
                let location = SourceLocation::new(source_id.clone(), block.start, block.end);
                let error = ErrorInfo::new(ErrorCodeId::UnterminatedBlock, vec![block.start.to_string()], location);
                tracing::debug!(open = %block.start, "closing unterminated block at end of input");
                Some(PhraseToken::synthetic(PhraseKind::EndBlock, pos).with_error(error))
            }
            None => {
                self.state = PhraseState::AfterEof;
                consume(input, PhraseKind::Eof)
            }
        }
    }

    fn open_block(&mut self, input: &mut Cell<Token>) -> Option<PhraseToken> {
        let phrase = consume(input, PhraseKind::StartBlock)?;
        self.blocks.push(OpenBlock {
            start: phrase.start(),
            end: phrase.end(),
        });
        self.state = PhraseState::AfterBlockStart;
        Some(phrase)
    }

    fn close_block(&mut self, input: &mut Cell<Token>) -> Option<PhraseToken> {
        self.blocks.pop();
        // The block is part of the statement that opened it, which continues after `}`.
        self.state = PhraseState::Statement;
        consume(input, PhraseKind::EndBlock)
    }
}

fn consume(input: &mut Cell<Token>, kind: PhraseKind) -> Option<PhraseToken> {
    input.take().map(|token| PhraseToken::new(kind, token))
}

// ============================================================================
// TESTS
// ============================================================================
