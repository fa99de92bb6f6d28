//! Keyword-context stack.
//!
//! Whether `if` is a keyword depends on where the parser is: rules push their keyword context on entry and pop it
//! on exit (or earlier, via `PopKeywords`). Classification of the current token against the top context is
//! memoised until the token is consumed or the stack changes.

use strata_core::lang::phrases::PhraseKind;

use crate::grammar::{CompiledGrammar, KeywordContextId, KeywordId};
use crate::phrase::PhraseToken;

#[derive(Debug, Default)]
pub(crate) struct KeywordStack {
    contexts: Vec<KeywordContextId>,
    memo: Option<Option<KeywordId>>,
}

impl KeywordStack {
    pub fn push(&mut self, id: KeywordContextId) {
        self.contexts.push(id);
        self.memo = None;
    }

    pub fn pop(&mut self) -> Option<KeywordContextId> {
        self.memo = None;
        self.contexts.pop()
    }

    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    /// Forget the memoised classification; the current token changed.
    pub fn invalidate(&mut self) {
        self.memo = None;
    }

    /// Classify `phrase` against the top of the stack.
    pub fn classify(&mut self, grammar: &CompiledGrammar, phrase: &PhraseToken) -> Option<KeywordId> {
        if let Some(memo) = self.memo {
            return memo;
        }
        let keyword = self.classify_at(grammar, self.depth(), phrase);
        self.memo = Some(keyword);
        keyword
    }

    /// Classify `phrase` as seen by a frame that entered with `depth` contexts on the stack.
    pub fn classify_at(&self, grammar: &CompiledGrammar, depth: usize, phrase: &PhraseToken) -> Option<KeywordId> {
        if phrase.kind != PhraseKind::Significant {
            return None;
        }
        let context = *self.contexts.get(depth.checked_sub(1)?)?;
        grammar.classify(context, phrase)
    }
}
