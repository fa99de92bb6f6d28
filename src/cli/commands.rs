//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.
//!
//! Every command prints its layer's tokens to stdout and renders the syntax errors found along the way to stderr
//! with miette. A command fails (exit code 1) when any error was found.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use strata_core::ErrorInfo;
use strata_core::lang::terms::{SyntaxRole, TermKind};
use strata_syntax::grammar::default_script_grammar;
use strata_syntax::pipeline::{self, PipelineError};
use strata_syntax::{ParserConfig, PhraseToken, SyntaxDiagnostic, TermToken, Token, lexer};

use super::{CliError, CliResult, ExitCode, ParseOptions};

/// Maximum source file size (100 MB)
///
/// Files larger than this are rejected to prevent out-of-memory conditions
/// while parsing.
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read source file contents.
///
/// ## Errors
///
/// Returns an error if:
/// - The file cannot be read (I/O error)
/// - The file exceeds `MAX_SOURCE_SIZE` (100 MB)
pub fn read_source(path: &Path) -> CliResult<String> {
    let shown = path.display();
    let metadata = fs::metadata(path).map_err(|e| CliError::failure(format!("Cannot access file '{shown}': {e}")))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            shown,
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{shown}': {e}")))
}

// ============================================================================
// Running the layers
// ============================================================================

/// Lex `source` with the CLI options.
pub fn lex_source(name: &str, source: &str, options: &ParseOptions) -> CliResult<Vec<Token>> {
    lexer::lex(name, source, &options.config()).map_err(|e| CliError::failure(format!("Lexer error: {e}")))
}

/// Run the lexer and phrase parser over `source`.
pub fn phrase_source(name: &str, source: &str, options: &ParseOptions) -> CliResult<Vec<PhraseToken>> {
    pipeline::phrases(name, source, &options.config()).map_err(|e| CliError::failure(format!("Phrase error: {e}")))
}

/// Run the whole pipeline over `source`.
///
/// With `--script` the built-in grammar is forced in script mode; otherwise a doctype may name the grammar and
/// unknown grammars fall back to the built-in one.
pub fn term_source(name: &str, source: &str, options: &ParseOptions) -> CliResult<Vec<TermToken>> {
    let config: ParserConfig = options.config();
    let result = if options.script {
        default_script_grammar()
            .map_err(PipelineError::from)
            .and_then(|grammar| pipeline::terms_with_grammar(name, source, &config, grammar))
    } else {
        pipeline::terms(name, source, &config)
    };
    result.map_err(|e| CliError::failure(format!("Parser error: {e}")))
}

// ============================================================================
// Formatting
// ============================================================================

/// One line per token: `KIND "text" @line:column`.
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(out, "{token}");
    }
    out
}

/// One line per phrase token; synthetic boundaries have no text.
pub fn format_phrases(phrases: &[PhraseToken]) -> String {
    let mut out = String::new();
    for phrase in phrases {
        let _ = writeln!(out, "{phrase}");
    }
    out
}

/// The term stream, indented by nesting depth.
///
/// ## Parameters
/// - `trivia`: include whitespace and comment terms.
pub fn format_terms(terms: &[TermToken], trivia: bool) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for term in terms {
        let is_trivia = term.kind == TermKind::Ignorable
            && matches!(term.role, SyntaxRole::Ignorable | SyntaxRole::Documentation);
        if term.kind.is_end() {
            depth = depth.saturating_sub(1);
        }
        if trivia || !is_trivia {
            let _ = writeln!(out, "{}{term}", "  ".repeat(depth));
        }
        if term.kind.is_start() {
            depth += 1;
        }
    }
    out
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Every error carried by `tokens`, oldest chain node last.
fn token_errors(tokens: &[Token]) -> Vec<&ErrorInfo> {
    tokens
        .iter()
        .filter_map(|t| t.error.as_ref())
        .flat_map(ErrorInfo::iter)
        .collect()
}

fn phrase_errors(phrases: &[PhraseToken]) -> Vec<&ErrorInfo> {
    phrases
        .iter()
        .flat_map(|p| p.error.iter().chain(p.token.as_ref().and_then(|t| t.error.as_ref())))
        .flat_map(ErrorInfo::iter)
        .collect()
}

fn term_errors(terms: &[TermToken]) -> Vec<&ErrorInfo> {
    terms.iter().flat_map(TermToken::errors).collect()
}

/// Render each error as a miette report.
pub fn render_errors(errors: &[&ErrorInfo], name: &str, source: &str) -> String {
    let mut out = String::new();
    for error in errors {
        let report = miette::Report::new(SyntaxDiagnostic::from_error(error, name, source));
        let _ = writeln!(out, "{report:?}");
    }
    out
}

/// Print the errors and turn their count into an exit code.
fn finish(errors: &[&ErrorInfo], name: &str, source: &str) -> ExitCode {
    if errors.is_empty() {
        return ExitCode::SUCCESS;
    }
    eprint!("{}", render_errors(errors, name, source));
    tracing::debug!(errors = errors.len(), file = name, "syntax errors found");
    ExitCode::FAILURE
}

// ============================================================================
// Commands
// ============================================================================

pub fn lex_file(path: &Path, options: &ParseOptions) -> CliResult<ExitCode> {
    let name = path.display().to_string();
    let source = read_source(path)?;
    let tokens = lex_source(&name, &source, options)?;
    print!("{}", format_tokens(&tokens));
    Ok(finish(&token_errors(&tokens), &name, &source))
}

pub fn phrases_file(path: &Path, options: &ParseOptions) -> CliResult<ExitCode> {
    let name = path.display().to_string();
    let source = read_source(path)?;
    let phrases = phrase_source(&name, &source, options)?;
    print!("{}", format_phrases(&phrases));
    Ok(finish(&phrase_errors(&phrases), &name, &source))
}

pub fn terms_file(path: &Path, options: &ParseOptions, trivia: bool) -> CliResult<ExitCode> {
    let name = path.display().to_string();
    let source = read_source(path)?;
    let terms = term_source(&name, &source, options)?;
    print!("{}", format_terms(&terms, trivia));
    Ok(finish(&term_errors(&terms), &name, &source))
}

/// Parse and report; prints a one-line summary instead of the term stream.
pub fn check_file(path: &Path, options: &ParseOptions) -> CliResult<ExitCode> {
    let name = path.display().to_string();
    let source = read_source(path)?;
    let terms = term_source(&name, &source, options)?;
    let errors = term_errors(&terms);
    let code = finish(&errors, &name, &source);
    if errors.is_empty() {
        let statements = terms.iter().filter(|t| t.kind == TermKind::StatementStart).count();
        println!("{name}: ok ({statements} statements)");
    } else {
        println!("{name}: {} syntax error(s)", errors.len());
    }
    Ok(code)
}
