//! The action interpreter.
//!
//! An [`ActionState`] runs one rule (or one statement context entry) of a compiled grammar. Each step executes a
//! single [`Action`]; the engine keeps stepping until a frame needs input, output can be released, or the stack
//! changes.

use std::sync::Arc;

use strata_core::lang::phrases::PhraseKind;
use strata_core::lang::terms::{SyntaxRole, TermKind};

use super::context::TermParserContext;
use super::frames::BlockFrame;
use super::recovery;
use super::stack::{CallResult, Frame, StateStack, Step};
use super::tokens::TermToken;
use crate::cell::Cell;
use crate::diagnostics::ContractError;
use crate::grammar::{Action, ActionId, CompiledGrammar, ContextId, KeywordContextId, RuleBody, RuleId};
use crate::phrase::PhraseToken;

#[derive(Debug)]
pub(crate) struct ActionState {
    pub(super) grammar: Arc<CompiledGrammar>,
    name: Arc<str>,
    pub(super) current: ActionId,
    entered: bool,
    marked: bool,
    keywords: Option<KeywordContextId>,
    keywords_pushed: bool,
    disables_soft_end: bool,
    /// Keyword stack depth right after entry; recovery tests classify at this depth.
    pub(super) keyword_depth: usize,
    pub(super) recovery_test: Option<ActionId>,
    /// `RecoveryChoice` this frame voted to resume at.
    pub(super) active_choice: Option<ActionId>,
}

impl ActionState {
    fn new(grammar: Arc<CompiledGrammar>, name: Arc<str>, entry: ActionId) -> Self {
        Self {
            grammar,
            name,
            current: entry,
            entered: false,
            marked: false,
            keywords: None,
            keywords_pushed: false,
            disables_soft_end: false,
            keyword_depth: 0,
            recovery_test: None,
            active_choice: None,
        }
    }

    /// The statement entry of a context.
    pub fn for_context(grammar: Arc<CompiledGrammar>, context: ContextId) -> Self {
        let ctx = grammar.context(context);
        let (name, entry, keywords) = (ctx.name.clone(), ctx.entry, ctx.keywords);
        let mut state = Self::new(grammar, name, entry);
        state.keywords = keywords;
        state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn enter(&mut self, ctx: &mut TermParserContext) {
        self.entered = true;
        if self.marked {
            ctx.queue.push_mark();
        }
        if let Some(keywords) = self.keywords {
            ctx.keywords.push(keywords);
            self.keywords_pushed = true;
        }
        self.keyword_depth = ctx.keywords.depth();
        if self.disables_soft_end {
            ctx.disable_soft_end();
        }
    }

    fn leave(&mut self, ctx: &mut TermParserContext) -> Result<(), ContractError> {
        if self.marked {
            ctx.queue.pop_mark()?;
        }
        if self.keywords_pushed {
            ctx.keywords.pop();
            self.keywords_pushed = false;
        }
        if self.disables_soft_end {
            ctx.enable_soft_end();
        }
        Ok(())
    }

    /// Execute one action.
    pub fn step(
        &mut self,
        ancestors: &mut StateStack,
        ctx: &mut TermParserContext,
        input: &mut Cell<PhraseToken>,
        result: CallResult,
    ) -> Result<Step, ContractError> {
        if !self.entered {
            self.enter(ctx);
        }
        let grammar = Arc::clone(&self.grammar);
        let id = self.current;

        match grammar.action(id) {
            Action::Advance {
                skip_doc_comments,
                next,
            } => {
                let Some(phrase) = input.peek() else {
                    return Ok(Step::NeedInput);
                };
                if ctx.is_skippable(phrase, *skip_doc_comments) {
                    ctx.skip_ignorable(input);
                } else {
                    self.current = *next;
                }
            }

            Action::Call { rule, success, failure } => match result {
                CallResult::None => return Ok(Step::Push(frame_for_rule(&grammar, *rule))),
                CallResult::Success => self.current = *success,
                CallResult::Failure => self.current = *failure,
            },

            Action::Choice(table) => {
                let Some(phrase) = input.peek() else {
                    return Ok(Step::NeedInput);
                };
                let keyword = ctx.keywords.classify(&grammar, phrase);
                self.current = table.select(phrase.kind, phrase.token.as_ref().map(|t| &t.key), keyword);
            }

            Action::ReportToken {
                kind,
                role,
                structural,
                consume,
                next,
            } => {
                let Some(phrase) = input.peek() else {
                    return Ok(Step::NeedInput);
                };
                let term = if *consume && !belongs_to_enclosing_frame(phrase.kind) {
                    let Some(phrase) = ctx.consume(input) else {
                        return Ok(Step::NeedInput);
                    };
                    TermToken::wrap(*kind, *role, phrase)
                } else if kind.is_end() {
                    TermToken::at(*kind, *role, ctx.last_end)
                } else {
                    TermToken::at(*kind, *role, phrase.start())
                };
                ctx.report(term.with_structural(structural.clone()));
                self.current = *next;
            }

            Action::ReportBeforeMark { kind, structural, next } => {
                let start = ctx
                    .queue
                    .peek_object_after_mark()
                    .map(|t| t.start)
                    .or_else(|| input.peek().map(PhraseToken::start))
                    .unwrap_or(ctx.last_end);
                let term = TermToken::at(*kind, SyntaxRole::Unknown, start).with_structural(structural.clone());
                ctx.report_at_mark(term)?;
                self.current = *next;
            }

            Action::ReportError { code, args, next } => {
                let Some(phrase) = input.peek() else {
                    return Ok(Step::NeedInput);
                };
                let args = if args.is_empty() {
                    vec![phrase.text().to_string()]
                } else {
                    args.clone()
                };
                let (start, end) = (phrase.start(), phrase.end());
                let error = ctx.error(code.clone(), args, start, end);
                ctx.report(TermToken::at(TermKind::SyntaxError, SyntaxRole::Unknown, start).with_error(error));
                self.current = *next;
            }

            Action::RecoverySetup { test, next } => {
                self.recovery_test = Some(*test);
                self.current = *next;
            }

            Action::RecoveryVote { next, .. } => self.current = *next,

            Action::RecoveryChoice { normal, recovery } => {
                if self.active_choice == Some(id) {
                    tracing::debug!(rule = %self.name, "resuming after recovery");
                    self.active_choice = None;
                    ctx.recovering = false;
                    self.current = *recovery;
                } else if ctx.recovering {
                    self.current = *recovery;
                } else {
                    let Some(phrase) = input.peek() else {
                        return Ok(Step::NeedInput);
                    };
                    if recovery::enclosing_vote(ancestors, ctx, phrase) {
                        ctx.recovering = true;
                        self.current = *recovery;
                    } else {
                        self.current = *normal;
                    }
                }
            }

            Action::PopKeywords { next } => {
                if self.keywords_pushed {
                    ctx.keywords.pop();
                    self.keywords_pushed = false;
                }
                self.current = *next;
            }

            Action::Return { success } => {
                self.leave(ctx)?;
                return Ok(Step::Exit(CallResult::from_success(*success)));
            }
        }
        Ok(Step::Continue)
    }
}

/// Statement ends, block ends and end of input are consumed by statement, block and document frames only.
fn belongs_to_enclosing_frame(kind: PhraseKind) -> bool {
    kind.closes_statement() || kind == PhraseKind::StatementEnd
}

fn frame_for_rule(grammar: &Arc<CompiledGrammar>, id: RuleId) -> Frame {
    let rule = grammar.rule(id);
    match rule.body {
        RuleBody::Block(context) => Frame::Block(BlockFrame::new(Arc::clone(grammar), context)),
        RuleBody::Actions(entry) => {
            let mut state = ActionState::new(Arc::clone(grammar), rule.name.clone(), entry);
            state.marked = rule.marked;
            state.keywords = rule.keywords;
            state.disables_soft_end = rule.disables_soft_end;
            Frame::Rule(state)
        }
    }
}
