//! CLI module for the Strata parser
//!
//! This module provides the command-line interface for inspecting what each pipeline layer makes of a source
//! file.
//!
//! ## Commands
//!
//! - `lex <file>` - Print lexical tokens
//! - `phrases <file>` - Print phrase tokens
//! - `terms <file>` - Print the term stream
//! - `check <file>` - Parse and report syntax errors (the default when only a file is given)
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use strata_syntax::ParserConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Inspect how Strata sources are lexed, grouped and parsed
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version = VERSION)]
#[command(about = "Streaming parser for Strata documents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// File to check (default action when no subcommand given)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub options: ParseOptions,
}

/// Parser tunables shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ParseOptions {
    /// Longest token in characters before it is cut
    #[arg(long, value_name = "CHARS", global = true)]
    pub max_token_length: Option<usize>,

    /// Treat `///` comments as plain line comments
    #[arg(long, global = true)]
    pub no_doc_comments: bool,

    /// Feed the source in pieces of this many bytes (for testing streaming behavior)
    #[arg(long, value_name = "BYTES", global = true)]
    pub chunk_size: Option<usize>,

    /// Skip doctype detection and parse with the built-in grammar in script mode
    #[arg(long, global = true)]
    pub script: bool,
}

impl ParseOptions {
    pub fn config(&self) -> ParserConfig {
        let mut config = ParserConfig::new().with_doc_comments(!self.no_doc_comments);
        if let Some(max) = self.max_token_length {
            config = config.with_max_token_length(max);
        }
        if let Some(size) = self.chunk_size {
            config = config.with_chunk_size(size);
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print lexical tokens
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print phrase tokens (statement and block structure)
    Phrases {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the term stream
    Terms {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Hide trivia (whitespace and comments)
        #[arg(long)]
        no_trivia: bool,
    },

    /// Parse and report syntax errors
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let options = cli.options;
    match cli.command {
        Some(Command::Lex { file }) => commands::lex_file(&file, &options),
        Some(Command::Phrases { file }) => commands::phrases_file(&file, &options),
        Some(Command::Terms { file, no_trivia }) => commands::terms_file(&file, &options, !no_trivia),
        Some(Command::Check { file }) => commands::check_file(&file, &options),
        None => match cli.file {
            Some(file) => commands::check_file(&file, &options),
            // No command and no file - show help
            None => Err(CliError::new("", ExitCode::FAILURE)),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_lex() {
        let cli = Cli::try_parse_from(["strata", "lex", "doc.st"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Lex { .. })));
    }

    #[test]
    fn test_cli_parse_terms_flags() {
        let cli = Cli::try_parse_from(["strata", "terms", "doc.st", "--no-trivia", "--script"]).unwrap();
        if let Some(Command::Terms { no_trivia, .. }) = cli.command {
            assert!(no_trivia);
        } else {
            panic!("Expected Terms command");
        }
        assert!(cli.options.script);
    }

    #[test]
    fn test_cli_default_is_check() {
        let cli = Cli::try_parse_from(["strata", "doc.st"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.file, Some(PathBuf::from("doc.st")));
    }

    #[test]
    fn test_options_build_config() {
        let cli = Cli::try_parse_from([
            "strata",
            "phrases",
            "doc.st",
            "--max-token-length",
            "12",
            "--no-doc-comments",
            "--chunk-size",
            "3",
        ])
        .unwrap();
        let config = cli.options.config();
        assert_eq!(config.max_token_length, 12);
        assert!(!config.doc_comments);
        assert_eq!(config.chunk_size, 3);
    }

    #[test]
    fn test_default_options_match_default_config() {
        assert_eq!(ParseOptions::default().config(), ParserConfig::default());
    }
}
