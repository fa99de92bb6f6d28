//! Property-based tests for the CLI helpers.
//!
//! These run the same layers as the `lex` and `terms` commands and check the rendered output, not the parser
//! internals (those have their own properties in `strata_syntax`).

use proptest::prelude::*;
use strata::cli::ParseOptions;
use strata::cli::commands::{format_terms, lex_source, term_source};
use strata::lang::terms::{SyntaxRole, TermKind};

const FRAGMENTS: &[&str] = &[
    "name", "x", " ", "\n", ";", "{", "}", "42", "\"text\"", "// note\n", "/// doc\n", "+", ",", "(", ")", "ü",
];

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..30).prop_map(|parts| parts.concat())
}

/// Sources without strings or comments, whose tokens are all short runs of simple characters.
fn plain_source() -> impl Strategy<Value = String> {
    let plain: Vec<&str> = FRAGMENTS
        .iter()
        .copied()
        .filter(|f| !f.contains('"') && !f.contains('/'))
        .collect();
    prop::collection::vec(prop::sample::select(plain), 0..30).prop_map(|parts| parts.concat())
}

fn script() -> ParseOptions {
    ParseOptions {
        script: true,
        ..ParseOptions::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: with trivia shown, every term is one line, and `EOF` closes the output at depth zero.
    #[test]
    fn rendered_terms_are_one_per_line(src in source()) {
        let terms = term_source("p", &src, &script()).unwrap();
        let out = format_terms(&terms, true);
        prop_assert_eq!(out.lines().count(), terms.len());
        let last = out.lines().last().unwrap_or("");
        prop_assert!(last.starts_with("EOF"), "last line: {last:?}");
    }

    /// Property: hiding trivia drops exactly the whitespace, comment and doc-comment terms.
    #[test]
    fn hiding_trivia_drops_only_trivia(src in source()) {
        let terms = term_source("p", &src, &script()).unwrap();
        let trivia = terms
            .iter()
            .filter(|t| t.kind == TermKind::Ignorable && matches!(t.role, SyntaxRole::Ignorable | SyntaxRole::Documentation))
            .count();
        prop_assert_eq!(format_terms(&terms, false).lines().count(), terms.len() - trivia);
    }

    /// Property: `--max-token-length` bounds every token without losing text.
    #[test]
    fn max_token_length_bounds_tokens(src in plain_source(), limit in 1usize..6) {
        let options = ParseOptions {
            max_token_length: Some(limit),
            ..ParseOptions::default()
        };
        let tokens = lex_source("p", &src, &options).unwrap();
        for token in &tokens {
            prop_assert!(token.text().chars().count() <= limit, "{token}");
        }
        let joined: String = tokens.iter().map(|t| t.text()).collect();
        prop_assert_eq!(joined, src);
    }

    /// Property: `--chunk-size` never changes what the `terms` command prints.
    #[test]
    fn chunk_size_does_not_change_output(src in source(), size in 1usize..6) {
        let chunked = ParseOptions {
            chunk_size: Some(size),
            ..script()
        };
        let whole = format_terms(&term_source("p", &src, &script()).unwrap(), true);
        let pieces = format_terms(&term_source("p", &src, &chunked).unwrap(), true);
        prop_assert_eq!(whole, pieces);
    }
}
