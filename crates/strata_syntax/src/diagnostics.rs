//! Contract errors and rendered syntax diagnostics.
//!
//! Syntax problems never abort a parse: they travel as [`ErrorInfo`] chains on tokens. The only `Err` values the
//! layer APIs return are [`ContractError`]s, which signal misuse by the caller (reading with nothing ready,
//! starting twice, providing a grammar twice, dequeuing with live marks).
//!
//! [`SyntaxDiagnostic`] turns one `ErrorInfo` node into a `miette` report with source context.

use miette::{Diagnostic, NamedSource, SourceSpan};
use strata_core::ErrorInfo;
use strata_core::lang::errors::ErrorLayer;

/// The pipeline layer a contract error was raised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Lexer,
    PhraseParser,
    TermParser,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Lexer => write!(f, "lexer"),
            Layer::PhraseParser => write!(f, "phrase parser"),
            Layer::TermParser => write!(f, "term parser"),
        }
    }
}

/// Misuse of a layer API by its caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("{0} was started twice")]
    AlreadyStarted(Layer),
    #[error("{0} was used before start")]
    NotStarted(Layer),
    #[error("{0} has no token ready to read")]
    NothingToRead(Layer),
    #[error("a grammar was already provided to the term parser")]
    GrammarAlreadyProvided,
    #[error("cannot dequeue while {0} mark(s) are live")]
    MarksLive(usize),
    #[error("mark operation without a live uncommitted mark")]
    NoMark,
    #[error("cell already holds a value")]
    CellOccupied,
}

/// One syntax error rendered against its source text.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(strata::syntax))]
pub struct SyntaxDiagnostic {
    /// The stable error code, e.g. `phrase.UnterminatedBlock`.
    pub code: String,
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{label}")]
    pub span: SourceSpan,
    pub label: String,
    #[help]
    pub help: Option<String>,
}

impl SyntaxDiagnostic {
    /// Render the head node of `error` against `source`.
    ///
    /// ## Notes
    /// - The label names the layer that reported the error.
    /// - A `cause` chain is summarised in `help`.
    pub fn from_error(error: &ErrorInfo, source_name: &str, source: &str) -> Self {
        let loc = error.location();
        let start = loc.start.offset.min(source.len());
        let end = loc.end.offset.clamp(start, source.len());
        let label = match error.code().builtin().map(strata_core::lang::errors::layer) {
            Some(ErrorLayer::Lexical) => "lexical error here",
            Some(ErrorLayer::Phrase) => "block structure error here",
            Some(ErrorLayer::Doctype) => "doctype error here",
            Some(ErrorLayer::Grammar) => "grammar error here",
            Some(ErrorLayer::Term) | None => "syntax error here",
        };
        let help = error.cause().map(|cause| {
            cause
                .iter()
                .map(|c| format!("caused by: {}", c.message()))
                .collect::<Vec<_>>()
                .join("\n")
        });

        Self {
            code: error.code().code().to_string(),
            message: error.message(),
            src: NamedSource::new(source_name, source.to_string()),
            span: (start, end - start).into(),
            label: label.to_string(),
            help,
        }
    }

    /// Render every node of `error`, newest first.
    pub fn all(error: &ErrorInfo, source_name: &str, source: &str) -> Vec<Self> {
        error
            .iter()
            .map(|e| Self::from_error(e, source_name, source))
            .collect()
    }
}
