//! End-to-end tests of the term layer: text in, term stream out.

use std::sync::Arc;

use strata_core::TextPos;
use strata_core::lang::errors::ErrorCodeId;
use strata_core::lang::phrases::PhraseKind;
use strata_core::lang::terms::{SyntaxRole, TermKind};
use strata_core::lang::tokens::TokenKind;
use strata_syntax::grammar::{
    Action, ChoiceTable, CompiledGrammar, GrammarBuilder, GrammarReference, ResolvedObject, ResourceRequest, Rule,
    RuleBody, StructuralName, default_grammar, default_script_grammar,
};
use strata_syntax::lexer::TokenKey;
use strata_syntax::pipeline::{self, DefaultResolver, GrammarResolver};
use strata_syntax::{Cell, ContractError, Layer, ParserConfig, ParserState, PhraseToken, TermParser, TermToken};

// ============================================================================
// Helpers
// ============================================================================

fn config() -> ParserConfig {
    ParserConfig::default()
}

/// Significant terms as `KIND text`, trivia dropped.
fn render(terms: &[TermToken]) -> Vec<String> {
    terms
        .iter()
        .filter(|t| !(t.kind == TermKind::Ignorable && t.role == SyntaxRole::Ignorable))
        .map(|t| {
            if t.text().is_empty() {
                t.kind.to_string()
            } else {
                format!("{} {}", t.kind, t.text())
            }
        })
        .collect()
}

fn count(terms: &[TermToken], kind: TermKind) -> usize {
    terms.iter().filter(|t| t.kind == kind).count()
}

fn syntax_errors(terms: &[TermToken]) -> Vec<&TermToken> {
    terms.iter().filter(|t| t.kind == TermKind::SyntaxError).collect()
}

/// `IDENT` as a value, anything else a syntax error.
fn identifier_grammar() -> Arc<CompiledGrammar> {
    let mut b = GrammarBuilder::new("identifier");
    b.set_script(true);
    let done = b.add(Action::Return { success: true });
    let fail = b.add(Action::Return { success: false });
    let value = b.add(Action::ReportToken {
        kind: TermKind::Value,
        role: SyntaxRole::Primary,
        structural: None,
        consume: true,
        next: done,
    });
    let error = b.add(Action::ReportError {
        code: ErrorCodeId::UnexpectedToken.into(),
        args: vec![],
        next: fail,
    });
    let choice = b.add(Action::Choice(
        ChoiceTable::new(error).on_token(TokenKey::simple(TokenKind::Identifier), value),
    ));
    let head = b.add(Action::Advance {
        skip_doc_comments: true,
        next: choice,
    });
    b.context("statement", head, None).unwrap();
    Arc::new(b.build().unwrap())
}

// ============================================================================
// Forced grammars
// ============================================================================

#[test]
fn test_single_statement_positions() {
    let terms = pipeline::terms_with_grammar("doc", "x;", &config(), identifier_grammar()).unwrap();
    let kinds: Vec<_> = terms.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TermKind::StatementStart, TermKind::Value, TermKind::StatementEnd, TermKind::Eof]
    );
    assert_eq!(terms[0].start, TextPos::new(1, 1, 0));
    assert_eq!(terms[0].start, terms[0].end);
    assert_eq!((terms[1].start, terms[1].end), (TextPos::new(1, 1, 0), TextPos::new(1, 2, 1)));
    assert_eq!(terms[2].role, SyntaxRole::Separator);
    assert_eq!(terms[2].text(), ";");
    assert_eq!(terms[3].start, TextPos::new(1, 3, 2));
    assert!(terms.iter().all(|t| !t.has_errors()));
}

#[test]
fn test_terms_name_their_grammar() {
    let terms = pipeline::terms_with_grammar("doc", "x;", &config(), identifier_grammar()).unwrap();
    assert!(terms.iter().all(|t| t.grammar_source.as_deref() == Some("identifier")));
}

#[test]
fn test_display_of_a_statement() {
    let terms = pipeline::terms_with_grammar("doc", "x;", &config(), identifier_grammar()).unwrap();
    let lines: Vec<String> = terms.iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(lines.join("\n"), @r#"
    STATEMENT_START @1:1
    VALUE "x" [primary] @1:1
    STATEMENT_END ";" [separator] @1:2
    EOF "" @1:3
    "#);
}

#[test]
fn test_failed_rule_skips_the_rest_of_the_statement() {
    let terms = pipeline::terms_with_grammar("doc", "1 2; y;", &config(), identifier_grammar()).unwrap();
    assert_eq!(
        render(&terms),
        vec![
            "STATEMENT_START",
            "SYNTAX_ERROR",
            "IGNORABLE 1",
            "IGNORABLE 2",
            "STATEMENT_END ;",
            "STATEMENT_START",
            "VALUE y",
            "STATEMENT_END ;",
            "EOF",
        ]
    );
    let errors = syntax_errors(&terms);
    assert_eq!(errors.len(), 1);
    let error = errors[0].error.as_ref().unwrap();
    assert!(error.contains(ErrorCodeId::UnexpectedToken));
    assert_eq!(error.args(), ["1".to_string()]);
    assert!(terms.iter().filter(|t| t.role == SyntaxRole::Skipped).count() == 2);
}

#[test]
fn test_leftover_tokens_are_reported_once() {
    let terms = pipeline::terms_with_grammar("doc", "x y z;", &config(), identifier_grammar()).unwrap();
    assert_eq!(
        render(&terms),
        vec![
            "STATEMENT_START",
            "VALUE x",
            "SYNTAX_ERROR",
            "IGNORABLE y",
            "IGNORABLE z",
            "STATEMENT_END ;",
            "EOF",
        ]
    );
    assert_eq!(syntax_errors(&terms)[0].error.as_ref().unwrap().args(), ["y".to_string()]);
}

#[test]
fn test_statement_start_precedes_leading_trivia() {
    let terms = pipeline::terms_with_grammar("doc", "  // note\n  x;", &config(), identifier_grammar()).unwrap();
    assert_eq!(terms[0].kind, TermKind::StatementStart);
    assert_eq!(terms[0].start, TextPos::START);
    assert!(terms[1..3].iter().all(|t| t.kind == TermKind::Ignorable));
}

#[test]
fn test_default_script_grammar_blocks() {
    let terms = pipeline::terms_with_grammar("doc", "a { b + c; }", &config(), default_script_grammar().unwrap()).unwrap();
    assert_eq!(
        render(&terms),
        vec![
            "STATEMENT_START",
            "VALUE a",
            "BLOCK_START {",
            "STATEMENT_START",
            "VALUE b",
            "STRUCTURAL +",
            "VALUE c",
            "STATEMENT_END ;",
            "BLOCK_END }",
            "STATEMENT_END",
            "EOF",
        ]
    );
    assert_eq!(count(&terms, TermKind::GrammarIsLoaded), 0);
}

#[test]
fn test_unterminated_block() {
    let terms = pipeline::terms_with_grammar("doc", "a { b", &config(), default_script_grammar().unwrap()).unwrap();
    assert_eq!(count(&terms, TermKind::BlockStart), 1);
    assert_eq!(count(&terms, TermKind::BlockEnd), 1);
    let unterminated = terms
        .iter()
        .flat_map(|t| t.errors())
        .filter(|e| e.contains(ErrorCodeId::UnterminatedBlock))
        .count();
    assert_eq!(unterminated, 1);
    assert_eq!(terms.last().map(|t| t.kind), Some(TermKind::Eof));
}

#[test]
fn test_unmatched_closing_curly_is_control() {
    let terms = pipeline::terms_with_grammar("doc", "a } b", &config(), default_script_grammar().unwrap()).unwrap();
    assert_eq!(
        render(&terms),
        vec![
            "STATEMENT_START",
            "VALUE a",
            "STATEMENT_END",
            "CONTROL }",
            "STATEMENT_START",
            "VALUE b",
            "STATEMENT_END",
            "EOF",
        ]
    );
    let control = terms.iter().find(|t| t.kind == TermKind::Control).unwrap();
    assert!(control.errors().any(|e| e.contains(ErrorCodeId::UnmatchedClosingCurly)));
}

#[test]
fn test_doc_comments_are_documentation() {
    let terms = pipeline::terms_with_grammar("doc", "/// about x\nx", &config(), default_script_grammar().unwrap()).unwrap();
    let doc = terms.iter().find(|t| t.role == SyntaxRole::Documentation).unwrap();
    assert_eq!(doc.kind, TermKind::Ignorable);
    assert_eq!(count(&terms, TermKind::Value), 1);
}

// ============================================================================
// Doctype and grammar loading
// ============================================================================

#[test]
fn test_default_grammar_is_requested_and_announced() {
    let terms = pipeline::terms("doc", "x;", &config()).unwrap();
    assert_eq!(
        render(&terms),
        vec!["GRAMMAR_IS_LOADED", "STATEMENT_START", "VALUE x", "STATEMENT_END ;", "EOF"]
    );
    assert!(terms[0].error.is_none());
    assert_eq!(terms[0].grammar_source.as_deref(), Some("strata:default"));
}

#[test]
fn test_doctype_declaration() {
    let source = "doctype public \"p\" \"strata:default\" context \"statement\";\nx;";
    let terms = pipeline::terms("doc", source, &config()).unwrap();
    assert_eq!(
        render(&terms),
        vec![
            "STATEMENT_START",
            "OBJECT_START",
            "STRUCTURAL doctype",
            "STRUCTURAL public",
            "PROPERTY_START",
            "VALUE \"p\"",
            "PROPERTY_END",
            "PROPERTY_START",
            "VALUE \"strata:default\"",
            "PROPERTY_END",
            "STRUCTURAL context",
            "PROPERTY_START",
            "VALUE \"statement\"",
            "PROPERTY_END",
            "OBJECT_END",
            "STATEMENT_END ;",
            "GRAMMAR_IS_LOADED",
            "STATEMENT_START",
            "VALUE x",
            "STATEMENT_END ;",
            "EOF",
        ]
    );
    assert_eq!(
        terms[1].structural.as_ref().map(ToString::to_string).as_deref(),
        Some("strata:DoctypeDeclaration")
    );
    let properties: Vec<_> = terms
        .iter()
        .filter(|t| t.kind == TermKind::PropertyStart)
        .filter_map(|t| match &t.structural {
            Some(StructuralName::Property(p)) => Some(p.name.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(properties, vec!["publicId", "systemId", "context"]);
    assert!(syntax_errors(&terms).is_empty());
    // Doctype terms precede any grammar.
    assert!(terms[0].grammar_source.is_none());
}

#[test]
fn test_doctype_request_carries_its_ids() {
    struct Recording(Vec<ResourceRequest>);
    impl GrammarResolver for Recording {
        fn resolve(&mut self, request: &ResourceRequest) -> Option<Arc<CompiledGrammar>> {
            self.0.push(request.clone());
            default_grammar().ok()
        }
    }
    let mut resolver = Recording(Vec::new());
    pipeline::run("doc", "doctype public \"p\" \"s\"\nx", &config(), None, &mut resolver).unwrap();
    assert_eq!(resolver.0.len(), 1);
    assert_eq!(resolver.0[0].reference.public_id.as_deref(), Some("p"));
    assert_eq!(resolver.0[0].reference.system_id.as_deref(), Some("s"));
    assert_eq!(resolver.0[0].role, "grammar");
}

#[test]
fn test_missing_doctype_string() {
    let terms = pipeline::terms("doc", "doctype public;", &config()).unwrap();
    let errors = syntax_errors(&terms);
    assert_eq!(errors.len(), 1);
    let error = errors[0].error.as_ref().unwrap();
    assert!(error.contains(ErrorCodeId::MissingDoctypeString));
    assert_eq!(error.args(), ["public".to_string()]);
    assert_eq!(count(&terms, TermKind::ObjectEnd), 1);
}

#[test]
fn test_unexpected_doctype_token() {
    let terms = pipeline::terms("doc", "doctype oops \"strata:default\";", &config()).unwrap();
    let errors = syntax_errors(&terms);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].error.as_ref().unwrap().contains(ErrorCodeId::UnexpectedToken));
    assert!(terms.iter().any(|t| t.role == SyntaxRole::Skipped && t.text() == "oops"));
    assert_eq!(count(&terms, TermKind::GrammarIsLoaded), 1);
}

#[test]
fn test_unknown_context_falls_back_to_default() {
    let terms = pipeline::terms("doc", "doctype context \"nowhere\";\nx;", &config()).unwrap();
    let errors = syntax_errors(&terms);
    assert_eq!(errors.len(), 1);
    let error = errors[0].error.as_ref().unwrap();
    assert!(error.contains(ErrorCodeId::UnknownContext));
    assert_eq!(error.args(), ["nowhere".to_string()]);
    assert_eq!(count(&terms, TermKind::Value), 2);
}

#[test]
fn test_unknown_grammar_falls_back_with_errors() {
    let terms = pipeline::terms("doc", "doctype \"missing.grammar\";\nx;", &config()).unwrap();
    let loaded = terms.iter().find(|t| t.kind == TermKind::GrammarIsLoaded).unwrap();
    let error = loaded.error.as_ref().unwrap();
    assert!(error.contains(ErrorCodeId::GrammarHasErrors));
    let cause = error.cause().unwrap();
    assert!(cause.contains(ErrorCodeId::GrammarNotFound));
    assert_eq!(cause.args(), ["missing.grammar".to_string()]);
    // The document is still parsed with the fallback grammar.
    assert!(terms.iter().any(|t| t.kind == TermKind::Value && t.text() == "x"));
}

#[test]
fn test_forced_grammar_with_errors_is_announced() {
    let location = strata_core::SourceLocation::point(Arc::from("g"), TextPos::START);
    let broken = strata_core::ErrorInfo::new(ErrorCodeId::GrammarNotFound, vec!["g".into()], location);
    let grammar = strata_syntax::grammar::default::build(true).unwrap().with_load_errors(Some(broken));
    let terms = pipeline::terms_with_grammar("doc", "x", &config(), Arc::new(grammar)).unwrap();
    assert_eq!(terms[0].kind, TermKind::GrammarIsLoaded);
    assert!(terms[0].error.as_ref().unwrap().contains(ErrorCodeId::GrammarHasErrors));
}

// ============================================================================
// Recovery voting
// ============================================================================

/// `begin IDENT* end`, where the statement votes to resume at `end`.
fn begin_end_grammar() -> Arc<CompiledGrammar> {
    let mut b = GrammarBuilder::new("begin-end");
    b.set_script(true);
    let keywords = b.keyword_context("statement", &["begin", "end"]);
    let begin = b.keyword("begin");
    let end = b.keyword("end");

    let done = b.add(Action::Return { success: true });
    let fail = b.add(Action::Return { success: false });

    // items: IDENT* up to `end`; anything else is reported and skipped.
    let items_head = b.reserve();
    let item = b.add(Action::ReportToken {
        kind: TermKind::Value,
        role: SyntaxRole::Primary,
        structural: None,
        consume: true,
        next: items_head,
    });
    let skip_head = b.reserve();
    let skip = b.add(Action::ReportToken {
        kind: TermKind::Ignorable,
        role: SyntaxRole::Skipped,
        structural: None,
        consume: true,
        next: skip_head,
    });
    let skip_choice = b.add(Action::Choice(
        ChoiceTable::new(skip)
            .on_kind(PhraseKind::StatementEnd, fail)
            .on_kind(PhraseKind::EndBlock, fail)
            .on_kind(PhraseKind::Eof, fail),
    ));
    let resume = b.add(Action::RecoveryChoice {
        normal: skip_choice,
        recovery: fail,
    });
    b.define(skip_head, Action::Advance { skip_doc_comments: true, next: resume }).unwrap();
    let error = b.add(Action::ReportError {
        code: ErrorCodeId::UnexpectedToken.into(),
        args: vec![],
        next: skip_head,
    });
    let items_choice = b.add(Action::Choice(
        ChoiceTable::new(error)
            .on_keyword(end, done)
            .on_token(TokenKey::simple(TokenKind::Identifier), item),
    ));
    b.define(items_head, Action::Advance { skip_doc_comments: true, next: items_choice }).unwrap();
    let items = b.rule(Rule::new("items", RuleBody::Actions(items_head)));

    // statement: begin items end
    let end_keyword = b.add(Action::ReportToken {
        kind: TermKind::Structural,
        role: SyntaxRole::Keyword,
        structural: None,
        consume: true,
        next: done,
    });
    let expect_end = b.add(Action::Choice(ChoiceTable::new(fail).on_keyword(end, end_keyword)));
    let before_end = b.add(Action::Advance { skip_doc_comments: true, next: expect_end });
    let after_items = b.add(Action::RecoveryChoice {
        normal: before_end,
        recovery: before_end,
    });
    let call_items = b.add(Action::Call {
        rule: items,
        success: after_items,
        failure: after_items,
    });
    let begin_keyword = b.add(Action::ReportToken {
        kind: TermKind::Structural,
        role: SyntaxRole::Keyword,
        structural: None,
        consume: true,
        next: call_items,
    });
    let statement_choice = b.add(Action::Choice(ChoiceTable::new(fail).on_keyword(begin, begin_keyword)));
    let statement_head = b.add(Action::Advance { skip_doc_comments: true, next: statement_choice });

    // Recovery test: vote for `after_items` on `end`.
    let vote = b.add(Action::RecoveryVote { choice: after_items, next: done });
    let test = b.add(Action::Choice(ChoiceTable::new(done).on_keyword(end, vote)));
    let entry = b.add(Action::RecoverySetup { test, next: statement_head });

    b.context("statement", entry, Some(keywords)).unwrap();
    Arc::new(b.build().unwrap())
}

#[test]
fn test_enclosing_rule_resumes_at_its_keyword() {
    let terms = pipeline::terms_with_grammar("doc", "begin a 1 2 end; begin b end;", &config(), begin_end_grammar()).unwrap();
    assert_eq!(
        render(&terms),
        vec![
            "STATEMENT_START",
            "STRUCTURAL begin",
            "VALUE a",
            "SYNTAX_ERROR",
            "IGNORABLE 1",
            "IGNORABLE 2",
            "STRUCTURAL end",
            "STATEMENT_END ;",
            "STATEMENT_START",
            "STRUCTURAL begin",
            "VALUE b",
            "STRUCTURAL end",
            "STATEMENT_END ;",
            "EOF",
        ]
    );
    // No cascade: one error for the whole run of bad tokens.
    assert_eq!(syntax_errors(&terms).len(), 1);
    let keywords: Vec<_> = terms.iter().filter(|t| t.role == SyntaxRole::Keyword).map(|t| t.text()).collect();
    assert_eq!(keywords, vec!["begin", "end", "begin", "end"]);
}

#[test]
fn test_recovery_stops_at_statement_end() {
    let terms = pipeline::terms_with_grammar("doc", "begin a 1; begin b end;", &config(), begin_end_grammar()).unwrap();
    // The first statement never sees `end`; the second parses cleanly.
    assert_eq!(syntax_errors(&terms).len(), 1);
    assert_eq!(count(&terms, TermKind::StatementStart), 2);
    assert_eq!(count(&terms, TermKind::StatementEnd), 2);
    assert!(terms.iter().any(|t| t.kind == TermKind::Value && t.text() == "b"));
}

// ============================================================================
// Soft statement ends and marks
// ============================================================================

/// Values and `( ... )` groups; newlines inside a group do not end the statement.
fn group_grammar() -> Arc<CompiledGrammar> {
    let mut b = GrammarBuilder::new("groups");
    b.set_script(true);
    let keywords = b.keyword_context("statement", &["(", ")"]);
    let open = b.keyword("(");
    let close = b.keyword(")");
    let done = b.add(Action::Return { success: true });
    let fail = b.add(Action::Return { success: false });
    let separator = |b: &mut GrammarBuilder, next| {
        b.add(Action::ReportToken {
            kind: TermKind::Structural,
            role: SyntaxRole::Separator,
            structural: None,
            consume: true,
            next,
        })
    };
    let value = |b: &mut GrammarBuilder, next| {
        b.add(Action::ReportToken {
            kind: TermKind::Value,
            role: SyntaxRole::Primary,
            structural: None,
            consume: true,
            next,
        })
    };

    let group_head = b.reserve();
    let group_close = separator(&mut b, done);
    let group_value = value(&mut b, group_head);
    let group_choice = b.add(Action::Choice(
        ChoiceTable::new(fail)
            .on_keyword(close, group_close)
            .on_kind(PhraseKind::Significant, group_value),
    ));
    b.define(group_head, Action::Advance { skip_doc_comments: true, next: group_choice }).unwrap();
    let group = b.rule(Rule::new("group", RuleBody::Actions(group_head)).disabling_soft_end());

    let head = b.reserve();
    let call = b.add(Action::Call {
        rule: group,
        success: head,
        failure: head,
    });
    let group_open = separator(&mut b, call);
    let statement_value = value(&mut b, head);
    let choice = b.add(Action::Choice(
        ChoiceTable::new(done)
            .on_keyword(open, group_open)
            .on_kind(PhraseKind::Significant, statement_value),
    ));
    b.define(head, Action::Advance { skip_doc_comments: true, next: choice }).unwrap();
    b.context("statement", head, Some(keywords)).unwrap();
    Arc::new(b.build().unwrap())
}

#[test]
fn test_newline_ends_a_statement() {
    let terms = pipeline::terms_with_grammar("doc", "a\nb", &config(), group_grammar()).unwrap();
    assert_eq!(count(&terms, TermKind::StatementStart), 2);
    let soft = terms.iter().find(|t| t.kind == TermKind::StatementEnd).unwrap();
    assert_eq!(soft.text(), "\n");
    assert_eq!(soft.role, SyntaxRole::Separator);
}

#[test]
fn test_newline_inside_group_is_ignorable() {
    let terms = pipeline::terms_with_grammar("doc", "f(a\n b)\ng", &config(), group_grammar()).unwrap();
    assert_eq!(
        render(&terms),
        vec![
            "STATEMENT_START",
            "VALUE f",
            "STRUCTURAL (",
            "VALUE a",
            "VALUE b",
            "STRUCTURAL )",
            "STATEMENT_END \n",
            "STATEMENT_START",
            "VALUE g",
            "STATEMENT_END",
            "EOF",
        ]
    );
    assert!(syntax_errors(&terms).is_empty());
}

/// `VALUE (OP VALUE)*` wrapped in an expression once an operator shows up.
fn expression_grammar() -> Arc<CompiledGrammar> {
    let mut b = GrammarBuilder::new("expressions");
    b.set_script(true);
    let done = b.add(Action::Return { success: true });
    let fail = b.add(Action::Return { success: false });

    let close = b.add(Action::ReportToken {
        kind: TermKind::ExpressionEnd,
        role: SyntaxRole::Unknown,
        structural: None,
        consume: false,
        next: done,
    });
    let rhs_head = b.reserve();
    let rhs_value = b.add(Action::ReportToken {
        kind: TermKind::Value,
        role: SyntaxRole::Primary,
        structural: None,
        consume: true,
        next: close,
    });
    let rhs_choice = b.add(Action::Choice(ChoiceTable::new(fail).on_kind(PhraseKind::Significant, rhs_value)));
    b.define(rhs_head, Action::Advance { skip_doc_comments: true, next: rhs_choice }).unwrap();
    let open = b.add(Action::ReportBeforeMark {
        kind: TermKind::ExpressionStart,
        structural: None,
        next: rhs_head,
    });
    let operator = b.add(Action::ReportToken {
        kind: TermKind::Structural,
        role: SyntaxRole::Operator,
        structural: None,
        consume: true,
        next: open,
    });
    let after_head = b.reserve();
    let after_choice = b.add(Action::Choice(
        ChoiceTable::new(done).on_token(TokenKey::simple(TokenKind::Graphics), operator),
    ));
    b.define(after_head, Action::Advance { skip_doc_comments: true, next: after_choice }).unwrap();
    let lhs_value = b.add(Action::ReportToken {
        kind: TermKind::Value,
        role: SyntaxRole::Primary,
        structural: None,
        consume: true,
        next: after_head,
    });
    let lhs_choice = b.add(Action::Choice(ChoiceTable::new(fail).on_kind(PhraseKind::Significant, lhs_value)));
    let lhs_head = b.add(Action::Advance { skip_doc_comments: true, next: lhs_choice });
    let expr = b.rule(Rule::new("expr", RuleBody::Actions(lhs_head)).marked());

    let entry = b.add(Action::Call {
        rule: expr,
        success: done,
        failure: fail,
    });
    b.context("statement", entry, None).unwrap();
    Arc::new(b.build().unwrap())
}

#[test]
fn test_expression_start_is_inserted_before_its_operand() {
    let terms = pipeline::terms_with_grammar("doc", "a + b;", &config(), expression_grammar()).unwrap();
    assert_eq!(
        render(&terms),
        vec![
            "STATEMENT_START",
            "EXPRESSION_START",
            "VALUE a",
            "STRUCTURAL +",
            "VALUE b",
            "EXPRESSION_END",
            "STATEMENT_END ;",
            "EOF",
        ]
    );
    let start = terms.iter().find(|t| t.kind == TermKind::ExpressionStart).unwrap();
    assert_eq!(start.start, TextPos::START);
    let end = terms.iter().find(|t| t.kind == TermKind::ExpressionEnd).unwrap();
    assert_eq!(end.start, TextPos::new(1, 6, 5));
}

#[test]
fn test_plain_value_has_no_expression() {
    let terms = pipeline::terms_with_grammar("doc", "a;", &config(), expression_grammar()).unwrap();
    assert_eq!(render(&terms), vec!["STATEMENT_START", "VALUE a", "STATEMENT_END ;", "EOF"]);
}

// ============================================================================
// Parser contract
// ============================================================================

#[test]
fn test_contract_errors() {
    let mut parser = TermParser::new();
    let mut cell: Cell<PhraseToken> = Cell::new();
    assert_eq!(parser.parse(&mut cell), Err(ContractError::NotStarted(Layer::TermParser)));
    parser.start("doc").unwrap();
    assert_eq!(parser.start("doc"), Err(ContractError::AlreadyStarted(Layer::TermParser)));
    assert_eq!(parser.read(), Err(ContractError::NothingToRead(Layer::TermParser)));

    parser.force_grammar(default_script_grammar().unwrap()).unwrap();
    assert_eq!(
        parser.force_grammar(default_script_grammar().unwrap()),
        Err(ContractError::GrammarAlreadyProvided)
    );
}

#[test]
fn test_resource_request_round_trip() {
    let mut parser = TermParser::new();
    parser.start("doc").unwrap();
    let mut cell = Cell::new();
    assert_eq!(parser.parse(&mut cell).unwrap(), ParserState::InputNeeded);
    assert!(parser.resource_request().is_none());

    cell.put(PhraseToken::synthetic(PhraseKind::Eof, TextPos::START)).unwrap();
    assert_eq!(parser.parse(&mut cell).unwrap(), ParserState::ResourceNeeded);
    let request = parser.resource_request().cloned().unwrap();
    assert_eq!(request.reference, GrammarReference::default());

    let grammar = default_grammar().unwrap();
    parser.provide_grammar(ResolvedObject::new(request.clone(), grammar.clone())).unwrap();
    assert!(parser.resource_request().is_none());
    assert_eq!(
        parser.provide_grammar(ResolvedObject::new(request, grammar)),
        Err(ContractError::GrammarAlreadyProvided)
    );

    let mut kinds = Vec::new();
    loop {
        match parser.parse(&mut cell).unwrap() {
            ParserState::OutputAvailable => kinds.push(parser.read().unwrap().kind),
            ParserState::Eof => break,
            other => panic!("unexpected state {other:?}"),
        }
    }
    assert_eq!(kinds, vec![TermKind::GrammarIsLoaded, TermKind::Eof]);
    assert!(cell.is_empty());
    for _ in 0..3 {
        assert_eq!(parser.parse(&mut cell).unwrap(), ParserState::Eof);
    }
}

#[test]
fn test_grammar_provided_before_request() {
    let mut pipeline = strata_syntax::Pipeline::new("doc", &config()).unwrap();
    let request = ResourceRequest::grammar(GrammarReference::default());
    pipeline
        .provide_grammar(ResolvedObject::new(request, default_grammar().unwrap()))
        .unwrap();
    pipeline.push_str("x;");
    pipeline.finish();

    let mut terms = Vec::new();
    loop {
        match pipeline.parse().unwrap() {
            ParserState::OutputAvailable => terms.push(pipeline.read().unwrap()),
            ParserState::ResourceNeeded => panic!("grammar was already provided"),
            ParserState::InputNeeded | ParserState::Eof => break,
        }
    }
    assert_eq!(render(&terms)[0], "GRAMMAR_IS_LOADED");
    assert_eq!(terms.last().map(|t| t.kind), Some(TermKind::Eof));
}

#[test]
fn test_default_resolver_is_object_safe() {
    let mut resolver: Box<dyn GrammarResolver> = Box::new(DefaultResolver);
    let terms = pipeline::run("doc", "a b c", &config(), None, resolver.as_mut()).unwrap();
    assert_eq!(count(&terms, TermKind::Value), 3);
}
