//! State shared by all frames of one term parser.

use std::sync::Arc;

use strata_core::lang::phrases::PhraseKind;
use strata_core::lang::tokens::TokenKind;
use strata_core::{ErrorCode, ErrorInfo, SourceLocation, TextPos};

use super::keywords::KeywordStack;
use super::tokens::TermToken;
use crate::cell::Cell;
use crate::diagnostics::ContractError;
use crate::grammar::{CompiledGrammar, ResourceRequest};
use crate::marked_queue::MarkedQueue;
use crate::phrase::PhraseToken;

#[derive(Debug)]
pub(crate) struct TermParserContext {
    pub source_id: Arc<str>,
    pub grammar: Option<Arc<CompiledGrammar>>,
    /// The grammar came from `force_grammar` rather than a resolved request.
    pub forced: bool,
    pub request: Option<ResourceRequest>,
    pub queue: MarkedQueue<TermToken>,
    pub keywords: KeywordStack,
    /// End of the last consumed token; end events are placed here.
    pub last_end: TextPos,
    /// An unwind towards a voting frame is in progress.
    pub recovering: bool,
    soft_end_disabled: usize,
}

impl TermParserContext {
    pub fn new() -> Self {
        Self {
            source_id: Arc::from(""),
            grammar: None,
            forced: false,
            request: None,
            queue: MarkedQueue::new(),
            keywords: KeywordStack::default(),
            last_end: TextPos::START,
            recovering: false,
            soft_end_disabled: 0,
        }
    }

    // ========================================================================
    // Output
    // ========================================================================

    fn stamp(&self, mut term: TermToken) -> TermToken {
        if term.grammar_source.is_none() {
            term.grammar_source = self.grammar.as_ref().map(|g| g.system_id().clone());
        }
        term
    }

    pub fn report(&mut self, term: TermToken) {
        let term = self.stamp(term);
        self.queue.append(term);
    }

    /// Insert at the innermost uncommitted mark, or append when there is none.
    pub fn report_at_mark(&mut self, term: TermToken) -> Result<(), ContractError> {
        let term = self.stamp(term);
        if self.queue.has_active_mark() {
            self.queue.insert_at_mark(term)
        } else {
            self.queue.append(term);
            Ok(())
        }
    }

    /// Stamp a statement start in front of everything queued since the statement's mark.
    pub fn report_statement_start(&mut self, term: TermToken) -> Result<(), ContractError> {
        let term = self.stamp(term);
        if self.queue.mark_count() == 1 {
            self.queue.insert_before_mark(term)
        } else {
            self.queue.insert_at_mark(term)
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Take the current phrase token.
    pub fn consume(&mut self, input: &mut Cell<PhraseToken>) -> Option<PhraseToken> {
        let phrase = input.take()?;
        if phrase.has_token() {
            self.last_end = phrase.end();
        }
        self.keywords.invalidate();
        Some(phrase)
    }

    /// Consume the current token as an `IGNORABLE` term.
    pub fn skip_ignorable(&mut self, input: &mut Cell<PhraseToken>) {
        if let Some(phrase) = self.consume(input) {
            self.report(TermToken::ignorable(phrase));
        }
    }

    /// Trivia for `Advance`: plain comments and whitespace always, doc comments on request, soft ends while
    /// disabled.
    pub fn is_skippable(&self, phrase: &PhraseToken, skip_doc_comments: bool) -> bool {
        match phrase.kind {
            PhraseKind::Ignorable => {
                skip_doc_comments || !phrase.token.as_ref().is_some_and(|t| t.kind == TokenKind::DocComment)
            }
            PhraseKind::SoftStatementEnd => !self.soft_end_enabled(),
            _ => false,
        }
    }

    // ========================================================================
    // Soft statement ends
    // ========================================================================

    pub fn soft_end_enabled(&self) -> bool {
        self.soft_end_disabled == 0
    }

    /// Enter a block: soft ends count again regardless of enclosing rules. Returns the count to restore.
    pub fn start_soft_end_context(&mut self) -> usize {
        std::mem::replace(&mut self.soft_end_disabled, 0)
    }

    pub fn end_soft_end_context(&mut self, saved: usize) {
        self.soft_end_disabled = saved;
    }

    pub fn disable_soft_end(&mut self) {
        self.soft_end_disabled += 1;
    }

    pub fn enable_soft_end(&mut self) {
        self.soft_end_disabled = self.soft_end_disabled.saturating_sub(1);
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub fn error(&self, code: impl Into<ErrorCode>, args: Vec<String>, start: TextPos, end: TextPos) -> ErrorInfo {
        ErrorInfo::new(code, args, SourceLocation::new(self.source_id.clone(), start, end))
    }
}
