//! Term parser: phrase tokens to term tokens, driven by a compiled grammar.
//!
//! The parser is a stack of explicit frames (document, sequence, statement, block, rule). `parse` steps the top
//! frame until output can be released, the input cell is empty, a grammar is needed, or the stack is empty.
//! Output goes through a [`MarkedQueue`](crate::MarkedQueue) so start events can be inserted in front of tokens
//! that were reported before the parser knew what they start.
//!
//! ## Notes
//! - The grammar is supplied either up front with [`TermParser::force_grammar`] or on request: `parse` returns
//!   [`ParserState::ResourceNeeded`], [`TermParser::resource_request`] says what is needed, and
//!   [`TermParser::provide_grammar`] hands it over.
//! - Syntax errors never stop the parser; they surface as `SYNTAX_ERROR` terms and errors on wrapped tokens.

mod actions;
mod context;
mod doctype;
mod frames;
mod keywords;
mod recovery;
mod stack;
pub mod tokens;

use std::sync::Arc;

pub use doctype::{DOCTYPE_KEYWORD, DOCTYPE_NAMESPACE, DOCTYPE_OBJECT};
pub use tokens::TermToken;

use context::TermParserContext;
use doctype::DocumentFrame;
use stack::{Frame, FrameSlot, StateStack, Step};

use crate::cell::Cell;
use crate::diagnostics::{ContractError, Layer};
use crate::grammar::{CompiledGrammar, ResolvedObject, ResourceRequest};
use crate::phrase::PhraseToken;
use crate::state::ParserState;

/// The grammar-driven top layer of the pipeline.
///
/// ## Examples
/// ```rust
/// use strata_syntax::grammar::default_script_grammar;
/// use strata_syntax::term::TermParser;
///
/// let mut parser = TermParser::new();
/// parser.force_grammar(default_script_grammar().unwrap()).unwrap();
/// parser.start("doc").unwrap();
/// ```
#[derive(Debug)]
pub struct TermParser {
    ctx: TermParserContext,
    stack: StateStack,
    started: bool,
    finished: bool,
}

impl Default for TermParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TermParser {
    pub fn new() -> Self {
        Self {
            ctx: TermParserContext::new(),
            stack: StateStack::default(),
            started: false,
            finished: false,
        }
    }

    /// Use `grammar` regardless of any doctype. A script grammar also skips doctype detection.
    pub fn force_grammar(&mut self, grammar: Arc<CompiledGrammar>) -> Result<(), ContractError> {
        if self.ctx.grammar.is_some() {
            return Err(ContractError::GrammarAlreadyProvided);
        }
        self.ctx.grammar = Some(grammar);
        self.ctx.forced = true;
        Ok(())
    }

    /// Answer the parser's [`ResourceRequest`].
    ///
    /// ## Notes
    /// - May also be called before the request is issued; the document then uses this grammar without asking.
    pub fn provide_grammar(&mut self, resolved: ResolvedObject<CompiledGrammar>) -> Result<(), ContractError> {
        if self.ctx.grammar.is_some() {
            return Err(ContractError::GrammarAlreadyProvided);
        }
        tracing::debug!(
            reference = %resolved.request.reference,
            grammar = %resolved.object.system_id(),
            "grammar provided"
        );
        self.ctx.grammar = Some(resolved.object);
        Ok(())
    }

    /// The outstanding grammar request, if `parse` returned [`ParserState::ResourceNeeded`].
    pub fn resource_request(&self) -> Option<&ResourceRequest> {
        if self.ctx.grammar.is_some() {
            return None;
        }
        self.ctx.request.as_ref()
    }

    pub fn start(&mut self, source_id: impl Into<Arc<str>>) -> Result<(), ContractError> {
        if self.started {
            return Err(ContractError::AlreadyStarted(Layer::TermParser));
        }
        self.started = true;
        self.ctx.source_id = source_id.into();
        self.stack.push(Frame::Document(DocumentFrame::new()));
        Ok(())
    }

    /// Advance until output is available or more input or a grammar is needed.
    ///
    /// ## Parameters
    /// - `input`: the current phrase token; the parser takes it when it is consumed and leaves it otherwise.
    ///
    /// ## Returns
    /// - `OutputAvailable`: call [`TermParser::read`] until it reports nothing to read.
    /// - `InputNeeded`: put the next phrase token into `input`.
    /// - `ResourceNeeded`: resolve [`TermParser::resource_request`] and call [`TermParser::provide_grammar`].
    /// - `Eof`: all terms including `EOF` have been read. Repeated calls keep returning `Eof`.
    pub fn parse(&mut self, input: &mut Cell<PhraseToken>) -> Result<ParserState, ContractError> {
        if !self.started {
            return Err(ContractError::NotStarted(Layer::TermParser));
        }
        if self.finished {
            return Ok(ParserState::Eof);
        }
        loop {
            if self.ctx.queue.has_output() {
                return Ok(ParserState::OutputAvailable);
            }
            let Some(mut slot) = self.stack.pop() else {
                self.finished = true;
                return Ok(ParserState::Eof);
            };
            match step(&mut slot, &mut self.stack, &mut self.ctx, input)? {
                Step::Continue => self.stack.restore(slot),
                Step::NeedInput => {
                    self.stack.restore(slot);
                    return Ok(ParserState::InputNeeded);
                }
                Step::NeedResource => {
                    self.stack.restore(slot);
                    return Ok(ParserState::ResourceNeeded);
                }
                Step::Push(child) => {
                    self.stack.restore(slot);
                    self.stack.push(child);
                }
                Step::Exit(result) => {
                    tracing::trace!(frame = slot.frame.name(), depth = self.stack.len(), ?result, "pop frame");
                    self.stack.deliver(result);
                }
            }
        }
    }

    /// Dequeue the next term.
    pub fn read(&mut self) -> Result<TermToken, ContractError> {
        if !self.ctx.queue.has_output() {
            return Err(ContractError::NothingToRead(Layer::TermParser));
        }
        self.ctx
            .queue
            .get()?
            .ok_or(ContractError::NothingToRead(Layer::TermParser))
    }
}

fn step(
    slot: &mut FrameSlot,
    ancestors: &mut StateStack,
    ctx: &mut TermParserContext,
    input: &mut Cell<PhraseToken>,
) -> Result<Step, ContractError> {
    let result = std::mem::replace(&mut slot.call_result, stack::CallResult::None);
    match &mut slot.frame {
        Frame::Document(frame) => frame.step(ctx, input),
        Frame::Sequence(frame) => Ok(frame.step(ctx, input)),
        Frame::Statement(frame) => frame.step(ctx, input, result),
        Frame::Block(frame) => Ok(frame.step(ctx, input)),
        Frame::Rule(state) => state.step(ancestors, ctx, input, result),
    }
}
