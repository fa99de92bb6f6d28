//! Property-based tests for the streaming pipeline.
//!
//! Sources are stitched together from fragments that exercise every layer: identifiers, numbers, strings,
//! comments, braces, statement ends and newlines.

use proptest::prelude::*;
use strata_core::lang::terms::TermKind;
use strata_syntax::ParserConfig;
use strata_syntax::lexer::lex;
use strata_syntax::pipeline::{self, phrases};

const FRAGMENTS: &[&str] = &[
    "a", "bc", " ", "\n", ";", "{", "}", "12", "0x1F", "1.5e3", "\"s\"", "'''m\nl'''", "// c\n", "/* b */", "/// d\n",
    "+", "==", ",", "(", ")", "doctype", "\"strata:default\"", "é", "€", "\"open",
];

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40).prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: the term stream does not depend on how the text is chunked.
    #[test]
    fn terms_are_chunk_invariant(src in source(), size in 1usize..8) {
        let whole = pipeline::terms("p", &src, &ParserConfig::default()).unwrap();
        let chunked = pipeline::terms("p", &src, &ParserConfig::default().with_chunk_size(size)).unwrap();
        prop_assert_eq!(whole, chunked);
    }

    /// Property: phrases do not depend on chunking either.
    #[test]
    fn phrases_are_chunk_invariant(src in source(), size in 1usize..8) {
        let whole = phrases("p", &src, &ParserConfig::default()).unwrap();
        let chunked = phrases("p", &src, &ParserConfig::default().with_chunk_size(size)).unwrap();
        prop_assert_eq!(whole, chunked);
    }

    /// Property: lexical tokens tile the source exactly.
    #[test]
    fn tokens_cover_the_source(src in source()) {
        let tokens = lex("p", &src, &ParserConfig::default()).unwrap();
        let text: String = tokens.iter().map(|t| t.text()).collect();
        prop_assert_eq!(text, src);
        let mut offset = 0;
        for token in &tokens {
            prop_assert_eq!(token.start.offset, offset);
            offset = token.end.offset;
        }
    }

    /// Property: every start term is closed by its matching end, properly nested, and the stream ends with EOF.
    #[test]
    fn terms_are_balanced(src in source()) {
        let terms = pipeline::terms("p", &src, &ParserConfig::default()).unwrap();
        let mut open = Vec::new();
        for term in &terms {
            if let Some(end) = term.kind.matching_end() {
                open.push(end);
            } else if term.kind.is_end() {
                prop_assert_eq!(open.pop(), Some(term.kind));
            }
        }
        prop_assert!(open.is_empty());
        prop_assert_eq!(terms.last().map(|t| t.kind), Some(TermKind::Eof));
        prop_assert_eq!(terms.iter().filter(|t| t.kind == TermKind::Eof).count(), 1);
    }

    /// Property: every non-trivial token of the source reaches the term stream exactly once.
    #[test]
    fn terms_wrap_every_token_once(src in source()) {
        let terms = pipeline::terms("p", &src, &ParserConfig::default()).unwrap();
        let text: String = terms
            .iter()
            .filter_map(|t| t.phrase.as_ref())
            .filter_map(|p| p.token.as_ref())
            .map(|t| t.text())
            .collect();
        prop_assert_eq!(text, src);
    }

    /// Property: terms are emitted in source order.
    #[test]
    fn term_positions_never_go_back(src in source()) {
        let terms = pipeline::terms("p", &src, &ParserConfig::default()).unwrap();
        for pair in terms.windows(2) {
            prop_assert!(pair[0].start.offset <= pair[1].start.offset, "{} then {}", pair[0], pair[1]);
        }
    }
}
