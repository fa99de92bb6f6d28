//! Driving the three layers together.
//!
//! [`Pipeline`] owns a lexer, a phrase parser and a term parser and pumps tokens between them through their input
//! cells. Text is pushed in arbitrary chunks; the term stream does not depend on where the chunks split.
//!
//! The free functions ([`phrases`], [`terms`], [`terms_with_grammar`]) run a whole source string and are what the
//! CLI and most tests use.

use std::sync::Arc;

use strata_core::lang::errors::ErrorCodeId;
use strata_core::{ErrorInfo, SourceLocation, TextPos};

use crate::cell::Cell;
use crate::config::ParserConfig;
use crate::diagnostics::ContractError;
use crate::grammar::default::{self, DEFAULT_GRAMMAR_ID};
use crate::grammar::{CompiledGrammar, GrammarError, ResolvedObject, ResourceRequest};
use crate::lexer::{Lexer, TextBuffer, Token};
use crate::phrase::{PhraseParser, PhraseToken};
use crate::state::ParserState;
use crate::term::{TermParser, TermToken};

/// Errors of the whole-source helpers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),
}

/// Answers grammar requests issued by a document.
pub trait GrammarResolver {
    /// Resolve `request`, or `None` when the grammar is unknown.
    fn resolve(&mut self, request: &ResourceRequest) -> Option<Arc<CompiledGrammar>>;
}

/// Resolves the empty reference and the default grammar's system id to the built-in grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResolver;

impl GrammarResolver for DefaultResolver {
    fn resolve(&mut self, request: &ResourceRequest) -> Option<Arc<CompiledGrammar>> {
        let reference = &request.reference;
        let wants_default = reference.is_empty() || reference.system_id.as_deref() == Some(DEFAULT_GRAMMAR_ID);
        if !wants_default {
            return None;
        }
        default::build(false).ok().map(Arc::new)
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Lexer, phrase parser and term parser wired together.
///
/// ## Examples
/// ```rust
/// use strata_syntax::pipeline::{DefaultResolver, Pipeline};
/// use strata_syntax::{ParserConfig, ParserState};
///
/// let mut pipeline = Pipeline::new("doc", &ParserConfig::default()).unwrap();
/// pipeline.push_str("a b");
/// pipeline.push_str(" c;");
/// pipeline.finish();
///
/// let mut terms = Vec::new();
/// loop {
///     match pipeline.parse().unwrap() {
///         ParserState::OutputAvailable => terms.push(pipeline.read().unwrap()),
///         ParserState::ResourceNeeded => pipeline.resolve_with(&mut DefaultResolver).unwrap(),
///         ParserState::InputNeeded | ParserState::Eof => break,
///     }
/// }
/// assert_eq!(terms.iter().filter(|t| t.text() == "b").count(), 1);
/// ```
#[derive(Debug)]
pub struct Pipeline {
    source_id: Arc<str>,
    buffer: TextBuffer,
    end_of_input: bool,
    lexer: Lexer,
    phrases: PhraseParser,
    terms: TermParser,
    tokens: Cell<Token>,
    phrase_tokens: Cell<PhraseToken>,
}

impl Pipeline {
    pub fn new(source_id: impl Into<Arc<str>>, config: &ParserConfig) -> Result<Self, ContractError> {
        let source_id: Arc<str> = source_id.into();
        let mut lexer = Lexer::new(config);
        lexer.start(source_id.clone(), TextPos::START)?;
        let mut phrases = PhraseParser::new();
        phrases.start(source_id.clone())?;
        let mut terms = TermParser::new();
        terms.start(source_id.clone())?;
        Ok(Self {
            source_id,
            buffer: TextBuffer::new(),
            end_of_input: false,
            lexer,
            phrases,
            terms,
            tokens: Cell::new(),
            phrase_tokens: Cell::new(),
        })
    }

    /// Use `grammar` instead of asking for one. Must be called before the first [`Pipeline::parse`].
    pub fn force_grammar(&mut self, grammar: Arc<CompiledGrammar>) -> Result<(), ContractError> {
        self.terms.force_grammar(grammar)
    }

    pub fn push_str(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
    }

    /// No more text will be pushed.
    pub fn finish(&mut self) {
        self.end_of_input = true;
    }

    pub fn is_finished(&self) -> bool {
        self.end_of_input
    }

    pub fn resource_request(&self) -> Option<&ResourceRequest> {
        self.terms.resource_request()
    }

    pub fn provide_grammar(&mut self, resolved: ResolvedObject<CompiledGrammar>) -> Result<(), ContractError> {
        self.terms.provide_grammar(resolved)
    }

    /// Answer the pending request with `resolver`.
    ///
    /// An unresolvable reference falls back to the default grammar, carrying a `grammar.NotFound` load error.
    pub fn resolve_with(&mut self, resolver: &mut dyn GrammarResolver) -> Result<(), PipelineError> {
        let Some(request) = self.terms.resource_request().cloned() else {
            return Ok(());
        };
        let grammar = match resolver.resolve(&request) {
            Some(grammar) => grammar,
            None => {
                tracing::warn!(reference = %request.reference, "grammar not found, using the default grammar");
                let location = SourceLocation::point(self.source_id.clone(), TextPos::START);
                let error = ErrorInfo::new(ErrorCodeId::GrammarNotFound, vec![request.reference.to_string()], location);
                Arc::new(default::build(false)?.with_load_errors(Some(error)))
            }
        };
        self.terms.provide_grammar(ResolvedObject::new(request, grammar))?;
        Ok(())
    }

    /// Pump the layers until terms are ready, text or a grammar is needed, or the term stream ended.
    pub fn parse(&mut self) -> Result<ParserState, ContractError> {
        loop {
            match self.terms.parse(&mut self.phrase_tokens)? {
                ParserState::InputNeeded => {
                    if !self.fill_phrase()? {
                        return Ok(ParserState::InputNeeded);
                    }
                }
                state => return Ok(state),
            }
        }
    }

    pub fn read(&mut self) -> Result<TermToken, ContractError> {
        self.terms.read()
    }

    /// Put the next phrase token into the term parser's cell. `false` means more text is needed.
    fn fill_phrase(&mut self) -> Result<bool, ContractError> {
        loop {
            match self.phrases.parse(&mut self.tokens)? {
                ParserState::OutputAvailable | ParserState::Eof => {
                    self.phrase_tokens.put(self.phrases.read()?)?;
                    return Ok(true);
                }
                ParserState::InputNeeded => {
                    if !self.fill_token()? {
                        return Ok(false);
                    }
                }
                ParserState::ResourceNeeded => return Ok(false),
            }
        }
    }

    fn fill_token(&mut self) -> Result<bool, ContractError> {
        match self.lexer.parse(&mut self.buffer, self.end_of_input)? {
            ParserState::OutputAvailable => {
                self.tokens.put(self.lexer.read()?)?;
                Ok(true)
            }
            ParserState::InputNeeded | ParserState::ResourceNeeded | ParserState::Eof => Ok(false),
        }
    }
}

// ============================================================================
// WHOLE-SOURCE HELPERS
// ============================================================================

/// Split `source` into pieces of at most `size` bytes on char boundaries.
pub fn chunks(source: &str, size: usize) -> impl Iterator<Item = &str> {
    let size = size.max(1);
    let mut rest = source;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end += 1;
        }
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(head)
    })
}

/// Run the lexer and phrase parser over `source`, feeding it in `config.chunk_size` pieces.
///
/// The returned stream always ends with the `EOF` phrase token.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn phrases(source_id: &str, source: &str, config: &ParserConfig) -> Result<Vec<PhraseToken>, ContractError> {
    let mut lexer = Lexer::new(config);
    lexer.start(source_id, TextPos::START)?;
    let mut parser = PhraseParser::new();
    parser.start(source_id)?;

    let mut buffer = TextBuffer::new();
    let mut pieces = chunks(source, config.chunk_size);
    let mut end_of_input = false;
    let mut tokens = Cell::new();
    let mut out = Vec::new();
    loop {
        match parser.parse(&mut tokens)? {
            ParserState::OutputAvailable => out.push(parser.read()?),
            ParserState::Eof => break,
            ParserState::InputNeeded | ParserState::ResourceNeeded => loop {
                match lexer.parse(&mut buffer, end_of_input)? {
                    ParserState::OutputAvailable => {
                        tokens.put(lexer.read()?)?;
                        break;
                    }
                    ParserState::InputNeeded => match pieces.next() {
                        Some(piece) => buffer.push_str(piece),
                        None if end_of_input => return Ok(out),
                        None => end_of_input = true,
                    },
                    // The phrase parser wants a token after EOF: it never does, but do not spin.
                    ParserState::Eof | ParserState::ResourceNeeded => return Ok(out),
                }
            },
        }
    }
    Ok(out)
}

/// Run the full pipeline over `source`, resolving grammar requests with [`DefaultResolver`].
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn terms(source_id: &str, source: &str, config: &ParserConfig) -> Result<Vec<TermToken>, PipelineError> {
    run(source_id, source, config, None, &mut DefaultResolver)
}

/// Run the full pipeline over `source` with a forced grammar.
#[tracing::instrument(skip_all, fields(source_len = source.len(), grammar = %grammar.system_id()))]
pub fn terms_with_grammar(
    source_id: &str,
    source: &str,
    config: &ParserConfig,
    grammar: Arc<CompiledGrammar>,
) -> Result<Vec<TermToken>, PipelineError> {
    run(source_id, source, config, Some(grammar), &mut DefaultResolver)
}

/// Run the full pipeline over `source`.
///
/// ## Parameters
/// - `grammar`: forced grammar, if any.
/// - `resolver`: answers grammar requests when no grammar is forced.
pub fn run(
    source_id: &str,
    source: &str,
    config: &ParserConfig,
    grammar: Option<Arc<CompiledGrammar>>,
    resolver: &mut dyn GrammarResolver,
) -> Result<Vec<TermToken>, PipelineError> {
    let mut pipeline = Pipeline::new(source_id, config)?;
    if let Some(grammar) = grammar {
        pipeline.force_grammar(grammar)?;
    }
    let mut pieces = chunks(source, config.chunk_size);
    let mut out = Vec::new();
    loop {
        match pipeline.parse()? {
            ParserState::OutputAvailable => out.push(pipeline.read()?),
            ParserState::ResourceNeeded => pipeline.resolve_with(resolver)?,
            ParserState::InputNeeded => match pieces.next() {
                Some(piece) => pipeline.push_str(piece),
                None if pipeline.is_finished() => break,
                None => pipeline.finish(),
            },
            ParserState::Eof => break,
        }
    }
    tracing::debug!(terms = out.len(), "term stream complete");
    Ok(out)
}
