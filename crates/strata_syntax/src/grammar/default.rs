//! The built-in grammar.
//!
//! Accepts any statement as a flat run of values and nested blocks. Operators and punctuation are reported as
//! `STRUCTURAL` terms with their role, everything else significant as `VALUE`.

use std::sync::Arc;

use strata_core::lang::phrases::PhraseKind;
use strata_core::lang::terms::{SyntaxRole, TermKind};
use strata_core::lang::tokens::TokenKind;

use super::{Action, ChoiceTable, CompiledGrammar, GrammarBuilder, GrammarError, Rule, RuleBody};
use crate::lexer::TokenKey;

/// System id of the built-in grammar.
pub const DEFAULT_GRAMMAR_ID: &str = "strata:default";

/// Name of the default grammar's only statement context.
pub const STATEMENT_CONTEXT: &str = "statement";

/// The built-in grammar for documents that may start with a doctype.
pub fn default_grammar() -> Result<Arc<CompiledGrammar>, GrammarError> {
    build(false).map(Arc::new)
}

/// The built-in grammar in script mode, for forcing on sources without a doctype.
pub fn default_script_grammar() -> Result<Arc<CompiledGrammar>, GrammarError> {
    build(true).map(Arc::new)
}

/// Build the default grammar; callers may attach load errors before sharing it.
pub fn build(script: bool) -> Result<CompiledGrammar, GrammarError> {
    let mut b = GrammarBuilder::new(DEFAULT_GRAMMAR_ID);
    b.set_script(script);

    let head = b.reserve();
    let statement = b.context(STATEMENT_CONTEXT, head, None)?;
    let block = b.rule(Rule::new("block", RuleBody::Block(statement)));

    let done = b.add(Action::Return { success: true });
    let report = |b: &mut GrammarBuilder, kind, role| {
        b.add(Action::ReportToken {
            kind,
            role,
            structural: None,
            consume: true,
            next: head,
        })
    };
    let value = report(&mut b, TermKind::Value, SyntaxRole::Primary);
    let operator = report(&mut b, TermKind::Structural, SyntaxRole::Operator);
    let separator = report(&mut b, TermKind::Structural, SyntaxRole::Separator);
    let nested = b.add(Action::Call {
        rule: block,
        success: head,
        failure: head,
    });

    let choice = b.add(Action::Choice(
        ChoiceTable::new(done)
            .on_kind(PhraseKind::Significant, value)
            .on_kind(PhraseKind::StartBlock, nested)
            .on_token(TokenKey::simple(TokenKind::Graphics), operator)
            .on_token(TokenKey::simple(TokenKind::Comma), separator)
            .on_token(TokenKey::simple(TokenKind::Bracket), separator),
    ));
    b.define(
        head,
        Action::Advance {
            skip_doc_comments: true,
            next: choice,
        },
    )?;

    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grammar_builds() {
        let g = default_grammar().unwrap();
        assert!(!g.is_script());
        assert_eq!(&**g.system_id(), DEFAULT_GRAMMAR_ID);
        assert_eq!(g.context_by_name(STATEMENT_CONTEXT), Some(g.default_context()));
        assert!(g.errors().is_none());
    }

    #[test]
    fn test_script_variant() {
        assert!(default_script_grammar().unwrap().is_script());
    }
}
