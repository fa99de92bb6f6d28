//! Recovery voting.
//!
//! When a rule fails at some token, enclosing rules are asked whether they could resume at that token. Each asks
//! its own recovery test, a tiny action graph that is run in isolation: it may only look at the current token
//! (`Advance`, `Choice`) and cast a `RecoveryVote`. The first rule to vote wins; every frame between the failure
//! and the voter unwinds through the recovery branches of its `RecoveryChoice` nodes.

use strata_core::lang::phrases::PhraseKind;

use super::actions::ActionState;
use super::context::TermParserContext;
use super::stack::{Frame, StateStack};
use crate::grammar::Action;
use crate::phrase::PhraseToken;

/// Actions a recovery test may execute before it is abandoned.
const MAX_TEST_STEPS: usize = 64;

/// The answer of one frame's recovery test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecoveryVerdict {
    /// The test ran and did not vote.
    Unknown,
    /// The test voted; the frame's active choice point is set.
    Recover,
    /// The frame has no recovery test.
    Unavailable,
}

impl ActionState {
    /// Run this frame's recovery test against `phrase` without moving the frame.
    pub fn can_recover(&mut self, ctx: &TermParserContext, phrase: &PhraseToken) -> RecoveryVerdict {
        let Some(test) = self.recovery_test else {
            return RecoveryVerdict::Unavailable;
        };
        let keyword = ctx.keywords.classify_at(&self.grammar, self.keyword_depth, phrase);
        let key = phrase.token.as_ref().map(|t| &t.key);

        let mut current = test;
        for _ in 0..MAX_TEST_STEPS {
            match self.grammar.action(current) {
                Action::Advance { next, .. } => current = *next,
                Action::Choice(table) => current = table.select(phrase.kind, key, keyword),
                Action::RecoveryVote { choice, .. } => {
                    self.active_choice = Some(*choice);
                    return RecoveryVerdict::Recover;
                }
                _ => return RecoveryVerdict::Unknown,
            }
        }
        RecoveryVerdict::Unknown
    }
}

/// Ask the enclosing rule frames, nearest first, whether one of them resumes at `phrase`.
///
/// The search stops at the nearest statement or block frame. End of input never triggers a vote.
pub(crate) fn enclosing_vote(ancestors: &mut StateStack, ctx: &TermParserContext, phrase: &PhraseToken) -> bool {
    if phrase.kind == PhraseKind::Eof {
        return false;
    }
    for slot in ancestors.iter_mut_from_top() {
        let Frame::Rule(state) = &mut slot.frame else {
            break;
        };
        if state.can_recover(ctx, phrase) == RecoveryVerdict::Recover {
            tracing::debug!(rule = state.name(), token = phrase.text(), "recovery vote");
            return true;
        }
    }
    false
}
