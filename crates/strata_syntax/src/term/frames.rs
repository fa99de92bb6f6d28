//! Built-in structural frames: statement sequences, statements and blocks.
//!
//! These frames do the work every grammar shares, so grammars only describe what happens *inside* a statement.

use std::sync::Arc;

use strata_core::lang::errors::ErrorCodeId;
use strata_core::lang::phrases::PhraseKind;
use strata_core::lang::terms::{SyntaxRole, TermKind};

use super::actions::ActionState;
use super::context::TermParserContext;
use super::stack::{CallResult, Frame, Step};
use super::tokens::TermToken;
use crate::cell::Cell;
use crate::diagnostics::ContractError;
use crate::grammar::{CompiledGrammar, ContextId};
use crate::phrase::PhraseToken;

// ============================================================================
// SEQUENCE
// ============================================================================

/// Statements of one context until the enclosing block or the document ends.
#[derive(Debug)]
pub(crate) struct SequenceFrame {
    grammar: Arc<CompiledGrammar>,
    context: ContextId,
}

impl SequenceFrame {
    pub fn new(grammar: Arc<CompiledGrammar>, context: ContextId) -> Self {
        Self { grammar, context }
    }

    pub fn step(&mut self, ctx: &mut TermParserContext, input: &mut Cell<PhraseToken>) -> Step {
        let Some(phrase) = input.peek() else {
            return Step::NeedInput;
        };
        match phrase.kind {
            PhraseKind::EndBlock | PhraseKind::Eof => Step::Exit(CallResult::Success),
            PhraseKind::Control => {
                if let Some(phrase) = ctx.consume(input) {
                    ctx.report(TermToken::wrap(TermKind::Control, SyntaxRole::Control, phrase));
                }
                Step::Continue
            }
            PhraseKind::StatementEnd => {
                // A statement already closed by a soft end leaves its phrase-level end behind.
                if let Some(phrase) = ctx.consume(input) {
                    if phrase.has_token() {
                        ctx.report(TermToken::wrap(TermKind::Control, SyntaxRole::Control, phrase));
                    }
                }
                Step::Continue
            }
            _ => Step::Push(Frame::Statement(StatementFrame::new(Arc::clone(&self.grammar), self.context))),
        }
    }
}

// ============================================================================
// STATEMENT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementPhase {
    Start,
    Leading,
    Body,
    Tail,
}

/// One statement: leading trivia, the start stamp, the context's entry rule, trailing tokens and the end.
#[derive(Debug)]
pub(crate) struct StatementFrame {
    grammar: Arc<CompiledGrammar>,
    context: ContextId,
    phase: StatementPhase,
    rule_succeeded: bool,
    reported_leftover: bool,
}

impl StatementFrame {
    pub fn new(grammar: Arc<CompiledGrammar>, context: ContextId) -> Self {
        Self {
            grammar,
            context,
            phase: StatementPhase::Start,
            rule_succeeded: false,
            reported_leftover: false,
        }
    }

    pub fn step(
        &mut self,
        ctx: &mut TermParserContext,
        input: &mut Cell<PhraseToken>,
        result: CallResult,
    ) -> Result<Step, ContractError> {
        match self.phase {
            StatementPhase::Start => {
                // Trivia before the first token is queued behind this mark so the start can go in front of it.
                ctx.queue.push_mark();
                self.phase = StatementPhase::Leading;
                Ok(Step::Continue)
            }
            StatementPhase::Leading => self.leading(ctx, input),
            StatementPhase::Body => {
                self.rule_succeeded = result == CallResult::Success;
                ctx.recovering = false;
                self.phase = StatementPhase::Tail;
                Ok(Step::Continue)
            }
            StatementPhase::Tail => Ok(self.tail(ctx, input)),
        }
    }

    fn leading(&mut self, ctx: &mut TermParserContext, input: &mut Cell<PhraseToken>) -> Result<Step, ContractError> {
        let Some(phrase) = input.peek() else {
            return Ok(Step::NeedInput);
        };
        match phrase.kind {
            PhraseKind::Ignorable | PhraseKind::SoftStatementEnd => {
                ctx.skip_ignorable(input);
                Ok(Step::Continue)
            }
            PhraseKind::Control | PhraseKind::StatementEnd | PhraseKind::EndBlock | PhraseKind::Eof => {
                // Only trivia: no statement here.
                ctx.queue.pop_mark()?;
                Ok(Step::Exit(CallResult::None))
            }
            PhraseKind::Significant | PhraseKind::StartBlock => {
                let start = ctx
                    .queue
                    .peek_object_after_mark()
                    .map_or(phrase.start(), |first| first.start);
                ctx.report_statement_start(TermToken::at(TermKind::StatementStart, SyntaxRole::Unknown, start))?;
                ctx.queue.pop_mark()?;
                self.phase = StatementPhase::Body;
                let entry = ActionState::for_context(Arc::clone(&self.grammar), self.context);
                Ok(Step::Push(Frame::Rule(entry)))
            }
        }
    }

    fn tail(&mut self, ctx: &mut TermParserContext, input: &mut Cell<PhraseToken>) -> Step {
        let Some(phrase) = input.peek() else {
            return Step::NeedInput;
        };
        match phrase.kind {
            PhraseKind::Ignorable => {
                ctx.skip_ignorable(input);
                Step::Continue
            }
            PhraseKind::SoftStatementEnd if !ctx.soft_end_enabled() => {
                ctx.skip_ignorable(input);
                Step::Continue
            }
            PhraseKind::StatementEnd | PhraseKind::SoftStatementEnd => {
                if let Some(phrase) = ctx.consume(input) {
                    let role = if phrase.has_token() { SyntaxRole::Separator } else { SyntaxRole::Unknown };
                    ctx.report(TermToken::wrap(TermKind::StatementEnd, role, phrase));
                }
                Step::Exit(CallResult::Success)
            }
            PhraseKind::EndBlock | PhraseKind::Eof | PhraseKind::Control => {
                let at = phrase.start();
                ctx.report(TermToken::at(TermKind::StatementEnd, SyntaxRole::Unknown, at));
                Step::Exit(CallResult::Success)
            }
            PhraseKind::StartBlock => Step::Push(Frame::Block(BlockFrame::new(Arc::clone(&self.grammar), self.context))),
            PhraseKind::Significant => {
                if self.rule_succeeded && !self.reported_leftover {
                    self.reported_leftover = true;
                    let error = ctx.error(
                        ErrorCodeId::UnexpectedToken,
                        vec![phrase.text().to_string()],
                        phrase.start(),
                        phrase.end(),
                    );
                    let at = phrase.start();
                    ctx.report(TermToken::at(TermKind::SyntaxError, SyntaxRole::Unknown, at).with_error(error));
                }
                if let Some(phrase) = ctx.consume(input) {
                    ctx.report(TermToken::wrap(TermKind::Ignorable, SyntaxRole::Skipped, phrase));
                }
                Step::Continue
            }
        }
    }
}

// ============================================================================
// BLOCK
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockPhase {
    Open,
    Body,
    Close,
}

/// `{`, a statement sequence of the block's context, `}`.
#[derive(Debug)]
pub(crate) struct BlockFrame {
    grammar: Arc<CompiledGrammar>,
    context: ContextId,
    phase: BlockPhase,
    saved_soft_end: usize,
}

impl BlockFrame {
    pub fn new(grammar: Arc<CompiledGrammar>, context: ContextId) -> Self {
        Self {
            grammar,
            context,
            phase: BlockPhase::Open,
            saved_soft_end: 0,
        }
    }

    pub fn step(&mut self, ctx: &mut TermParserContext, input: &mut Cell<PhraseToken>) -> Step {
        match self.phase {
            BlockPhase::Open => {
                let Some(phrase) = input.peek() else {
                    return Step::NeedInput;
                };
                if phrase.kind != PhraseKind::StartBlock {
                    return Step::Exit(CallResult::Failure);
                }
                if let Some(phrase) = ctx.consume(input) {
                    ctx.report(TermToken::wrap(TermKind::BlockStart, SyntaxRole::Separator, phrase));
                }
                self.saved_soft_end = ctx.start_soft_end_context();
                self.phase = BlockPhase::Body;
                Step::Push(Frame::Sequence(SequenceFrame::new(Arc::clone(&self.grammar), self.context)))
            }
            BlockPhase::Body => {
                self.phase = BlockPhase::Close;
                Step::Continue
            }
            BlockPhase::Close => {
                let Some(phrase) = input.peek() else {
                    return Step::NeedInput;
                };
                let term = if phrase.kind == PhraseKind::EndBlock {
                    match ctx.consume(input) {
                        Some(phrase) => TermToken::wrap(TermKind::BlockEnd, SyntaxRole::Separator, phrase),
                        None => return Step::NeedInput,
                    }
                } else {
                    TermToken::at(TermKind::BlockEnd, SyntaxRole::Unknown, phrase.start())
                };
                ctx.report(term);
                ctx.end_soft_end_context(self.saved_soft_end);
                Step::Exit(CallResult::Success)
            }
        }
    }
}
