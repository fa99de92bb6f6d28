//! Action graph nodes.
//!
//! A compiled grammar is a graph of [`Action`]s held in one arena and addressed by [`ActionId`]. The term parser
//! interprets the graph with a single `match`; actions are plain data.

use std::collections::HashMap;

use strata_core::ErrorCode;
use strata_core::lang::phrases::PhraseKind;
use strata_core::lang::terms::{SyntaxRole, TermKind};

use super::{ActionId, KeywordId, RuleId, StructuralName};
use crate::lexer::TokenKey;

/// One node of the action graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Skip ignorable phrase tokens, reporting each as an `IGNORABLE` term, then continue at `next`.
    ///
    /// Doc comments are skipped only with `skip_doc_comments`; soft statement ends only while soft ends are
    /// disabled.
    Advance { skip_doc_comments: bool, next: ActionId },
    /// Run `rule`, then continue at `success` or `failure`.
    Call {
        rule: RuleId,
        success: ActionId,
        failure: ActionId,
    },
    /// Dispatch on the current phrase token.
    Choice(ChoiceTable),
    /// Report a term for the current token.
    ///
    /// With `consume` the term wraps the current token. Otherwise it is zero-width: start and single kinds sit at
    /// the current token's start, end kinds at the end of the last consumed token.
    ReportToken {
        kind: TermKind,
        role: SyntaxRole,
        structural: Option<StructuralName>,
        consume: bool,
        next: ActionId,
    },
    /// Insert a zero-width term at the innermost mark of the running rule.
    ReportBeforeMark {
        kind: TermKind,
        structural: Option<StructuralName>,
        next: ActionId,
    },
    /// Report a `SYNTAX_ERROR` term at the current token.
    ReportError {
        code: ErrorCode,
        args: Vec<String>,
        next: ActionId,
    },
    /// Register `test` as this rule's recovery test.
    RecoverySetup { test: ActionId, next: ActionId },
    /// Inside a recovery test: vote to resume at `choice`. In normal flow it is a no-op.
    RecoveryVote { choice: ActionId, next: ActionId },
    /// Branch between normal flow and recovery.
    RecoveryChoice { normal: ActionId, recovery: ActionId },
    /// Pop the keyword context pushed when the rule was entered.
    PopKeywords { next: ActionId },
    /// Leave the rule.
    Return { success: bool },
}

impl Action {
    /// Every action id this node refers to.
    pub fn successors(&self) -> Vec<ActionId> {
        match self {
            Action::Advance { next, .. }
            | Action::ReportToken { next, .. }
            | Action::ReportBeforeMark { next, .. }
            | Action::ReportError { next, .. }
            | Action::PopKeywords { next } => vec![*next],
            Action::Call { success, failure, .. } => vec![*success, *failure],
            Action::Choice(table) => table.targets().collect(),
            Action::RecoverySetup { test, next } => vec![*test, *next],
            Action::RecoveryVote { choice, next } => vec![*choice, *next],
            Action::RecoveryChoice { normal, recovery } => vec![*normal, *recovery],
            Action::Return { .. } => Vec::new(),
        }
    }
}

/// Dispatch table of a [`Action::Choice`].
///
/// ## Notes
/// - Significant tokens are resolved by keyword first, then by exact [`TokenKey`], then by the key's kind alone,
///   then by phrase kind.
/// - Other phrase tokens are resolved by phrase kind only; their token key is not consulted.
/// - Anything else goes to `unmatched`.
///
/// ## Examples
/// ```rust
/// use strata_core::lang::phrases::PhraseKind;
/// use strata_core::lang::tokens::TokenKind;
/// use strata_syntax::grammar::{ActionId, ChoiceTable};
/// use strata_syntax::lexer::TokenKey;
///
/// let table = ChoiceTable::new(ActionId::new(0))
///     .on_kind(PhraseKind::StartBlock, ActionId::new(1))
///     .on_token(TokenKey::simple(TokenKind::Identifier), ActionId::new(2));
/// assert_eq!(table.targets().count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceTable {
    pub kinds: HashMap<PhraseKind, ActionId>,
    pub keywords: HashMap<KeywordId, ActionId>,
    pub tokens: HashMap<TokenKey, ActionId>,
    pub unmatched: ActionId,
}

impl ChoiceTable {
    pub fn new(unmatched: ActionId) -> Self {
        Self {
            kinds: HashMap::new(),
            keywords: HashMap::new(),
            tokens: HashMap::new(),
            unmatched,
        }
    }

    pub fn on_kind(mut self, kind: PhraseKind, target: ActionId) -> Self {
        self.kinds.insert(kind, target);
        self
    }

    pub fn on_keyword(mut self, keyword: KeywordId, target: ActionId) -> Self {
        self.keywords.insert(keyword, target);
        self
    }

    pub fn on_token(mut self, key: TokenKey, target: ActionId) -> Self {
        self.tokens.insert(key, target);
        self
    }

    /// Resolve a phrase token.
    ///
    /// ## Parameters
    /// - `kind`: the phrase kind.
    /// - `key`: the wrapped token's key, if any.
    /// - `keyword`: the keyword classification of a significant token, if any.
    pub fn select(&self, kind: PhraseKind, key: Option<&TokenKey>, keyword: Option<KeywordId>) -> ActionId {
        if kind == PhraseKind::Significant {
            if let Some(target) = keyword.and_then(|k| self.keywords.get(&k)) {
                return *target;
            }
            if let Some(target) = key.and_then(|key| self.tokens.get(key).or_else(|| self.tokens.get(&key.kind_only()))) {
                return *target;
            }
        }
        self.kinds.get(&kind).copied().unwrap_or(self.unmatched)
    }

    /// Every target of the table, `unmatched` included.
    pub fn targets(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.kinds
            .values()
            .chain(self.keywords.values())
            .chain(self.tokens.values())
            .copied()
            .chain(std::iter::once(self.unmatched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::lang::tokens::TokenKind;

    fn id(n: u32) -> ActionId {
        ActionId::new(n)
    }

    #[test]
    fn test_select_order() {
        let string = TokenKey::string('"', false);
        let table = ChoiceTable::new(id(0))
            .on_kind(PhraseKind::Significant, id(1))
            .on_keyword(KeywordId::new(0), id(2))
            .on_token(TokenKey::simple(TokenKind::Identifier), id(3))
            .on_token(TokenKey::simple(TokenKind::String), id(4))
            .on_token(string.clone(), id(5));

        let ident = TokenKey::simple(TokenKind::Identifier);
        assert_eq!(table.select(PhraseKind::Significant, Some(&ident), Some(KeywordId::new(0))), id(2));
        assert_eq!(table.select(PhraseKind::Significant, Some(&ident), Some(KeywordId::new(9))), id(3));
        assert_eq!(table.select(PhraseKind::Significant, Some(&string), None), id(5));
        let single = TokenKey::string('\'', false);
        assert_eq!(table.select(PhraseKind::Significant, Some(&single), None), id(4));
        let graphics = TokenKey::simple(TokenKind::Graphics);
        assert_eq!(table.select(PhraseKind::Significant, Some(&graphics), None), id(1));
        assert_eq!(table.select(PhraseKind::Eof, None, None), id(0));
    }

    #[test]
    fn test_keywords_ignored_for_non_significant() {
        let table = ChoiceTable::new(id(0)).on_keyword(KeywordId::new(0), id(1));
        let key = TokenKey::simple(TokenKind::LineComment);
        assert_eq!(table.select(PhraseKind::Ignorable, Some(&key), Some(KeywordId::new(0))), id(0));
    }

    #[test]
    fn test_non_significant_dispatch_on_phrase_kind() {
        let semicolon = TokenKey::simple(TokenKind::Semicolon);
        let curly = TokenKey::simple(TokenKind::RightCurly);
        let table = ChoiceTable::new(id(0))
            .on_kind(PhraseKind::StatementEnd, id(1))
            .on_token(semicolon.clone(), id(2))
            .on_token(curly.clone(), id(3));
        assert_eq!(table.select(PhraseKind::StatementEnd, Some(&semicolon), None), id(1));
        assert_eq!(table.select(PhraseKind::Control, Some(&curly), None), id(0));
    }
}
