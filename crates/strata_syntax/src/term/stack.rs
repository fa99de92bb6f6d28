//! The frame stack of the term parser.
//!
//! Every piece of parser state lives in a frame on this stack, never on the Rust call stack, so a parse can stop
//! at any token boundary and resume on the next `parse` call.

use super::actions::ActionState;
use super::doctype::DocumentFrame;
use super::frames::{BlockFrame, SequenceFrame, StatementFrame};

/// Outcome of the last child frame, left on its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallResult {
    None,
    Success,
    Failure,
}

impl CallResult {
    pub fn from_success(success: bool) -> Self {
        if success { CallResult::Success } else { CallResult::Failure }
    }
}

#[derive(Debug)]
pub(crate) enum Frame {
    Document(DocumentFrame),
    Sequence(SequenceFrame),
    Statement(StatementFrame),
    Block(BlockFrame),
    Rule(ActionState),
}

impl Frame {
    pub fn name(&self) -> &str {
        match self {
            Frame::Document(_) => "document",
            Frame::Sequence(_) => "sequence",
            Frame::Statement(_) => "statement",
            Frame::Block(_) => "block",
            Frame::Rule(state) => state.name(),
        }
    }
}

/// What a frame asks the engine to do after one step.
#[derive(Debug)]
pub(crate) enum Step {
    /// Step the same frame again.
    Continue,
    /// The current phrase token is needed and the input cell is empty.
    NeedInput,
    /// The document waits for `provide_grammar`.
    NeedResource,
    /// Run a child frame; its result comes back through [`FrameSlot::call_result`].
    Push(Frame),
    /// Pop this frame and hand the result to the parent.
    Exit(CallResult),
}

#[derive(Debug)]
pub(crate) struct FrameSlot {
    pub frame: Frame,
    pub call_result: CallResult,
}

#[derive(Debug, Default)]
pub(crate) struct StateStack {
    slots: Vec<FrameSlot>,
}

impl StateStack {
    pub fn push(&mut self, frame: Frame) {
        tracing::trace!(frame = frame.name(), depth = self.slots.len(), "push frame");
        self.slots.push(FrameSlot {
            frame,
            call_result: CallResult::None,
        });
    }

    /// Put a frame taken with [`StateStack::pop`] back on top.
    pub fn restore(&mut self, slot: FrameSlot) {
        self.slots.push(slot);
    }

    pub fn pop(&mut self) -> Option<FrameSlot> {
        self.slots.pop()
    }

    /// Deliver a child's result to the frame now on top.
    pub fn deliver(&mut self, result: CallResult) {
        if let Some(top) = self.slots.last_mut() {
            top.call_result = result;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Frames from the top of the stack down.
    pub fn iter_mut_from_top(&mut self) -> impl Iterator<Item = &mut FrameSlot> {
        self.slots.iter_mut().rev()
    }
}
