//! The document frame: doctype detection, grammar loading, the top-level sequence and end of input.
//!
//! ```text
//! doctype ["public" STRING] [STRING] ["context" STRING]
//! ```
//!
//! The doctype is reported as a statement holding one `DoctypeDeclaration` object. Its strings are taken
//! verbatim between the quotes; escapes are not decoded.

use std::sync::Arc;

use strata_core::lang::errors::ErrorCodeId;
use strata_core::lang::phrases::PhraseKind;
use strata_core::lang::terms::{SyntaxRole, TermKind};
use strata_core::lang::tokens::TokenKind;
use strata_core::{ErrorInfo, SourceLocation, TextPos};

use super::context::TermParserContext;
use super::frames::SequenceFrame;
use super::stack::{CallResult, Frame, Step};
use super::tokens::TermToken;
use crate::cell::Cell;
use crate::diagnostics::ContractError;
use crate::grammar::{
    CompiledGrammar, ContextId, GrammarReference, ObjectName, PropertyName, ResourceRequest, StructuralName,
};
use crate::phrase::PhraseToken;

pub const DOCTYPE_KEYWORD: &str = "doctype";
pub const DOCTYPE_NAMESPACE: &str = "strata";
pub const DOCTYPE_OBJECT: &str = "DoctypeDeclaration";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DoctypeProperty {
    PublicId,
    SystemId,
    Context,
}

impl DoctypeProperty {
    fn name(self) -> &'static str {
        match self {
            DoctypeProperty::PublicId => "publicId",
            DoctypeProperty::SystemId => "systemId",
            DoctypeProperty::Context => "context",
        }
    }

    /// The word introducing the property; the system id has none.
    fn keyword(self) -> &'static str {
        match self {
            DoctypeProperty::PublicId => "public",
            DoctypeProperty::SystemId => "",
            DoctypeProperty::Context => "context",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentPhase {
    Start,
    Leading,
    Properties,
    ExpectString(DoctypeProperty),
    SelectGrammar,
    AwaitGrammar,
    Loaded,
    Body,
    Done,
}

#[derive(Debug)]
pub(crate) struct DocumentFrame {
    phase: DocumentPhase,
    public_id: Option<Arc<str>>,
    system_id: Option<Arc<str>>,
    context: Option<(Arc<str>, TextPos, TextPos)>,
    body: Option<(Arc<CompiledGrammar>, ContextId)>,
}

impl DocumentFrame {
    pub fn new() -> Self {
        Self {
            phase: DocumentPhase::Start,
            public_id: None,
            system_id: None,
            context: None,
            body: None,
        }
    }

    pub fn step(&mut self, ctx: &mut TermParserContext, input: &mut Cell<PhraseToken>) -> Result<Step, ContractError> {
        match self.phase {
            DocumentPhase::Start => {
                let script = ctx.forced && ctx.grammar.as_ref().is_some_and(|g| g.is_script());
                if script {
                    self.phase = DocumentPhase::SelectGrammar;
                } else {
                    ctx.queue.push_mark();
                    self.phase = DocumentPhase::Leading;
                }
                Ok(Step::Continue)
            }
            DocumentPhase::Leading => self.leading(ctx, input),
            DocumentPhase::Properties => Ok(self.properties(ctx, input)),
            DocumentPhase::ExpectString(property) => Ok(self.expect_string(ctx, input, property)),
            DocumentPhase::SelectGrammar => {
                if ctx.grammar.is_some() {
                    self.phase = DocumentPhase::Loaded;
                    return Ok(Step::Continue);
                }
                let reference = GrammarReference::new(self.public_id.clone(), self.system_id.clone());
                tracing::debug!(reference = %reference, "requesting grammar");
                ctx.request = Some(ResourceRequest::grammar(reference));
                self.phase = DocumentPhase::AwaitGrammar;
                Ok(Step::NeedResource)
            }
            DocumentPhase::AwaitGrammar => {
                if ctx.grammar.is_none() {
                    return Ok(Step::NeedResource);
                }
                self.phase = DocumentPhase::Loaded;
                Ok(Step::Continue)
            }
            DocumentPhase::Loaded => Ok(self.loaded(ctx)),
            DocumentPhase::Body => Ok(self.body(ctx, input)),
            DocumentPhase::Done => Ok(Step::Exit(CallResult::Success)),
        }
    }

    fn leading(&mut self, ctx: &mut TermParserContext, input: &mut Cell<PhraseToken>) -> Result<Step, ContractError> {
        let Some(phrase) = input.peek() else {
            return Ok(Step::NeedInput);
        };
        match phrase.kind {
            PhraseKind::Ignorable | PhraseKind::SoftStatementEnd => ctx.skip_ignorable(input),
            PhraseKind::Significant if is_word(phrase, DOCTYPE_KEYWORD) => {
                let start = ctx
                    .queue
                    .peek_object_after_mark()
                    .map_or(phrase.start(), |first| first.start);
                let at = phrase.start();
                ctx.report_statement_start(TermToken::at(TermKind::StatementStart, SyntaxRole::Unknown, start))?;
                ctx.queue.pop_mark()?;
                let object = StructuralName::Object(ObjectName::new(DOCTYPE_NAMESPACE, DOCTYPE_OBJECT));
                ctx.report(TermToken::at(TermKind::ObjectStart, SyntaxRole::Unknown, at).with_structural(Some(object)));
                report_keyword(ctx, input);
                self.phase = DocumentPhase::Properties;
            }
            _ => {
                ctx.queue.pop_mark()?;
                self.phase = DocumentPhase::SelectGrammar;
            }
        }
        Ok(Step::Continue)
    }

    fn properties(&mut self, ctx: &mut TermParserContext, input: &mut Cell<PhraseToken>) -> Step {
        let Some(phrase) = input.peek() else {
            return Step::NeedInput;
        };
        match phrase.kind {
            PhraseKind::Ignorable => ctx.skip_ignorable(input),
            PhraseKind::Significant if is_word(phrase, DoctypeProperty::PublicId.keyword()) => {
                report_keyword(ctx, input);
                self.phase = DocumentPhase::ExpectString(DoctypeProperty::PublicId);
            }
            PhraseKind::Significant if is_word(phrase, DoctypeProperty::Context.keyword()) => {
                report_keyword(ctx, input);
                self.phase = DocumentPhase::ExpectString(DoctypeProperty::Context);
            }
            PhraseKind::Significant if is_string(phrase) => self.property(ctx, input, DoctypeProperty::SystemId),
            PhraseKind::Significant => {
                let (start, end) = (phrase.start(), phrase.end());
                let error = ctx.error(ErrorCodeId::UnexpectedToken, vec![phrase.text().to_string()], start, end);
                ctx.report(TermToken::at(TermKind::SyntaxError, SyntaxRole::Unknown, start).with_error(error));
                if let Some(phrase) = ctx.consume(input) {
                    ctx.report(TermToken::wrap(TermKind::Ignorable, SyntaxRole::Skipped, phrase));
                }
            }
            PhraseKind::StatementEnd | PhraseKind::SoftStatementEnd => {
                ctx.report(TermToken::at(TermKind::ObjectEnd, SyntaxRole::Unknown, ctx.last_end));
                if let Some(phrase) = ctx.consume(input) {
                    ctx.report(TermToken::wrap(TermKind::StatementEnd, SyntaxRole::Separator, phrase));
                }
                self.phase = DocumentPhase::SelectGrammar;
            }
            _ => {
                let at = phrase.start();
                ctx.report(TermToken::at(TermKind::ObjectEnd, SyntaxRole::Unknown, ctx.last_end));
                ctx.report(TermToken::at(TermKind::StatementEnd, SyntaxRole::Unknown, at));
                self.phase = DocumentPhase::SelectGrammar;
            }
        }
        Step::Continue
    }

    fn expect_string(
        &mut self,
        ctx: &mut TermParserContext,
        input: &mut Cell<PhraseToken>,
        property: DoctypeProperty,
    ) -> Step {
        let Some(phrase) = input.peek() else {
            return Step::NeedInput;
        };
        match phrase.kind {
            PhraseKind::Ignorable => ctx.skip_ignorable(input),
            PhraseKind::Significant if is_string(phrase) => {
                self.property(ctx, input, property);
                self.phase = DocumentPhase::Properties;
            }
            _ => {
                let at = phrase.start();
                let error = ctx.error(
                    ErrorCodeId::MissingDoctypeString,
                    vec![property.keyword().to_string()],
                    at,
                    phrase.end(),
                );
                ctx.report(TermToken::at(TermKind::SyntaxError, SyntaxRole::Unknown, at).with_error(error));
                self.phase = DocumentPhase::Properties;
            }
        }
        Step::Continue
    }

    /// Report the string at the input as a doctype property and remember its value.
    fn property(&mut self, ctx: &mut TermParserContext, input: &mut Cell<PhraseToken>, property: DoctypeProperty) {
        let Some(phrase) = input.peek() else {
            return;
        };
        let value = string_body(phrase);
        let start = phrase.start();
        let name = StructuralName::Property(PropertyName::new(property.name()));
        ctx.report(TermToken::at(TermKind::PropertyStart, SyntaxRole::Unknown, start).with_structural(Some(name)));
        if let Some(phrase) = ctx.consume(input) {
            ctx.report(TermToken::wrap(TermKind::Value, SyntaxRole::Primary, phrase));
        }
        ctx.report(TermToken::at(TermKind::PropertyEnd, SyntaxRole::Unknown, ctx.last_end));

        match property {
            DoctypeProperty::PublicId => self.public_id = value,
            DoctypeProperty::SystemId => self.system_id = value,
            DoctypeProperty::Context => self.context = value.map(|v| (v, start, ctx.last_end)),
        }
    }

    fn loaded(&mut self, ctx: &mut TermParserContext) -> Step {
        let Some(grammar) = ctx.grammar.clone() else {
            self.phase = DocumentPhase::AwaitGrammar;
            return Step::NeedResource;
        };
        let at = ctx.last_end;

        if !ctx.forced || grammar.errors().is_some() {
            let mut term = TermToken::at(TermKind::GrammarIsLoaded, SyntaxRole::Unknown, at);
            if let Some(errors) = grammar.errors() {
                let location = SourceLocation::point(ctx.source_id.clone(), at);
                term = term.with_error(ErrorInfo::with_cause(
                    ErrorCodeId::GrammarHasErrors,
                    vec![grammar.system_id().to_string()],
                    location,
                    errors.clone(),
                ));
            }
            ctx.report(term);
        }

        let context = match &self.context {
            None => grammar.default_context(),
            Some((name, start, end)) => grammar.context_by_name(name).unwrap_or_else(|| {
                let error = ctx.error(ErrorCodeId::UnknownContext, vec![name.to_string()], *start, *end);
                ctx.report(TermToken::at(TermKind::SyntaxError, SyntaxRole::Unknown, *start).with_error(error));
                grammar.default_context()
            }),
        };
        tracing::debug!(grammar = %grammar.system_id(), context = %grammar.context(context).name, "grammar loaded");

        self.body = Some((Arc::clone(&grammar), context));
        self.phase = DocumentPhase::Body;
        Step::Push(Frame::Sequence(SequenceFrame::new(grammar, context)))
    }

    fn body(&mut self, ctx: &mut TermParserContext, input: &mut Cell<PhraseToken>) -> Step {
        let Some(phrase) = input.peek() else {
            return Step::NeedInput;
        };
        if phrase.kind == PhraseKind::Eof {
            if let Some(phrase) = ctx.consume(input) {
                ctx.report(TermToken::wrap(TermKind::Eof, SyntaxRole::Unknown, phrase));
            }
            self.phase = DocumentPhase::Done;
            return Step::Exit(CallResult::Success);
        }
        // A block end with no block open; the phrase layer reports these as control tokens, so this is rare.
        if let Some(phrase) = ctx.consume(input) {
            ctx.report(TermToken::wrap(TermKind::Control, SyntaxRole::Control, phrase));
        }
        match &self.body {
            Some((grammar, context)) => Step::Push(Frame::Sequence(SequenceFrame::new(Arc::clone(grammar), *context))),
            None => Step::Continue,
        }
    }
}

fn is_word(phrase: &PhraseToken, word: &str) -> bool {
    phrase
        .token
        .as_ref()
        .is_some_and(|t| t.kind == TokenKind::Identifier && t.text() == word)
}

fn is_string(phrase: &PhraseToken) -> bool {
    phrase.token.as_ref().is_some_and(|t| t.kind.is_string())
}

fn report_keyword(ctx: &mut TermParserContext, input: &mut Cell<PhraseToken>) {
    if let Some(phrase) = ctx.consume(input) {
        ctx.report(TermToken::wrap(TermKind::Structural, SyntaxRole::Keyword, phrase));
    }
}

/// Text between the quotes of a string token, undecoded.
fn string_body(phrase: &PhraseToken) -> Option<Arc<str>> {
    let token = phrase.token.as_ref()?;
    let quote = token.key.quote?;
    let delimiter: String = std::iter::repeat_n(quote, if token.key.triple { 3 } else { 1 }).collect();
    let prefix = token.key.prefix.as_deref().map_or(0, str::len);
    let body = token.text().get(prefix + delimiter.len()..)?;
    Some(Arc::from(body.strip_suffix(delimiter.as_str()).unwrap_or(body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Token, TokenKey};

    fn string_phrase(text: &str, key: TokenKey) -> PhraseToken {
        let token = Token::new(key.kind, text, TextPos::START, TextPos::START.advance_str(text)).with_key(key);
        PhraseToken::new(PhraseKind::Significant, token)
    }

    #[test]
    fn test_string_body() {
        let plain = string_phrase("\"a.grammar\"", TokenKey::string('"', false));
        assert_eq!(string_body(&plain).as_deref(), Some("a.grammar"));

        let triple = string_phrase("'''x'''", TokenKey::string('\'', true));
        assert_eq!(string_body(&triple).as_deref(), Some("x"));

        let prefixed = string_phrase("r\"raw\\n\"", TokenKey::string('"', false).with_prefix("r"));
        assert_eq!(string_body(&prefixed).as_deref(), Some("raw\\n"));

        let unterminated = string_phrase("\"open", TokenKey::string('"', false));
        assert_eq!(string_body(&unterminated).as_deref(), Some("open"));

        let empty = string_phrase("\"\"", TokenKey::string('"', false));
        assert_eq!(string_body(&empty).as_deref(), Some(""));
    }
}
