//! Compiled grammars.
//!
//! A [`CompiledGrammar`] is immutable once built and shared behind an `Arc`: many term parsers may run the same
//! grammar concurrently. Actions, rules, statement contexts and keyword contexts live in arenas addressed by
//! small integer ids, so recursive rules are just ids that point back into the arena.
//!
//! Grammars are assembled with [`GrammarBuilder`], which validates every reference on `build()`.

pub mod action;
pub mod builder;
pub mod default;
pub mod resource;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strata_core::ErrorInfo;

pub use action::{Action, ChoiceTable};
pub use builder::GrammarBuilder;
pub use default::{DEFAULT_GRAMMAR_ID, default_grammar, default_script_grammar};
pub use resource::{GRAMMAR_ROLE, GrammarReference, ResolvedObject, ResourceRequest};

use crate::phrase::PhraseToken;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

arena_id!(
    /// Index of an [`Action`] in its grammar.
    ActionId
);
arena_id!(
    /// Index of a [`Rule`] in its grammar.
    RuleId
);
arena_id!(
    /// Index of a statement [`Context`] in its grammar.
    ContextId
);
arena_id!(
    /// Index of an interned keyword.
    KeywordId
);
arena_id!(
    /// Index of a [`KeywordContext`].
    KeywordContextId
);

// ============================================================================
// STRUCTURAL NAMES
// ============================================================================

/// Name of an object kind, qualified by the grammar namespace that defines it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName {
    pub namespace: Arc<str>,
    pub name: Arc<str>,
}

impl ObjectName {
    pub fn new(namespace: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// Name of an object property; list properties collect several values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyName {
    pub name: Arc<str>,
    pub list: bool,
}

impl PropertyName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            list: false,
        }
    }

    pub fn list(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            list: true,
        }
    }
}

/// What an `OBJECT_START` or `PROPERTY_START` term opens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StructuralName {
    Object(ObjectName),
    Property(PropertyName),
}

impl fmt::Display for StructuralName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralName::Object(o) if o.namespace.is_empty() => write!(f, "{}", o.name),
            StructuralName::Object(o) => write!(f, "{}:{}", o.namespace, o.name),
            StructuralName::Property(p) if p.list => write!(f, "{}[]", p.name),
            StructuralName::Property(p) => write!(f, "{}", p.name),
        }
    }
}

// ============================================================================
// RULES AND CONTEXTS
// ============================================================================

/// What running a rule does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleBody {
    /// Interpret the action graph starting at the entry action.
    Actions(ActionId),
    /// Parse `{ ... }` with statements of the given context.
    Block(ContextId),
}

/// A callable piece of grammar.
///
/// ## Notes
/// - `marked` rules push a queue mark on entry so they can insert start terms in front of what they already
///   reported (expressions learn they are expressions late).
/// - `keywords` is pushed on the keyword stack for the rule's lifetime.
/// - `disables_soft_end` makes newlines ignorable inside the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: Arc<str>,
    pub body: RuleBody,
    pub marked: bool,
    pub keywords: Option<KeywordContextId>,
    pub disables_soft_end: bool,
}

impl Rule {
    pub fn new(name: impl Into<Arc<str>>, body: RuleBody) -> Self {
        Self {
            name: name.into(),
            body,
            marked: false,
            keywords: None,
            disables_soft_end: false,
        }
    }

    pub fn marked(mut self) -> Self {
        self.marked = true;
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordContextId) -> Self {
        self.keywords = Some(keywords);
        self
    }

    pub fn disabling_soft_end(mut self) -> Self {
        self.disables_soft_end = true;
        self
    }
}

/// A named statement context: what statements a sequence of that context may contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub name: Arc<str>,
    /// Action graph run once per statement.
    pub entry: ActionId,
    pub keywords: Option<KeywordContextId>,
}

/// A set of words that are keywords while the context is on top of the keyword stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordContext {
    pub name: Arc<str>,
    words: HashMap<Arc<str>, KeywordId>,
}

impl KeywordContext {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            words: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, text: Arc<str>, id: KeywordId) {
        self.words.insert(text, id);
    }

    /// Keyword id of `text` in this context.
    pub fn lookup(&self, text: &str) -> Option<KeywordId> {
        self.words.get(text).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = KeywordId> + '_ {
        self.words.values().copied()
    }
}

// ============================================================================
// COMPILED GRAMMAR
// ============================================================================

/// An immutable, validated grammar.
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    pub(crate) actions: Vec<Action>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) contexts: Vec<Context>,
    pub(crate) default_context: ContextId,
    pub(crate) keywords: Vec<Arc<str>>,
    pub(crate) keyword_contexts: Vec<KeywordContext>,
    pub(crate) script_mode: bool,
    pub(crate) system_id: Arc<str>,
    pub(crate) errors: Option<ErrorInfo>,
}

impl CompiledGrammar {
    /// Attach errors found while loading the grammar; they surface on the `GRAMMAR_IS_LOADED` term.
    pub fn with_load_errors(mut self, errors: Option<ErrorInfo>) -> Self {
        self.errors = ErrorInfo::join(errors.as_ref(), self.errors.as_ref());
        self
    }

    pub fn default_context(&self) -> ContextId {
        self.default_context
    }

    /// All statement contexts, in definition order.
    pub fn statement_contexts(&self) -> impl Iterator<Item = (ContextId, &Context)> {
        self.contexts
            .iter()
            .enumerate()
            .map(|(i, c)| (ContextId::new(i as u32), c))
    }

    pub fn context_by_name(&self, name: &str) -> Option<ContextId> {
        self.statement_contexts()
            .find(|(_, c)| &*c.name == name)
            .map(|(id, _)| id)
    }

    /// Script grammars skip doctype detection.
    pub fn is_script(&self) -> bool {
        self.script_mode
    }

    pub fn system_id(&self) -> &Arc<str> {
        &self.system_id
    }

    pub fn errors(&self) -> Option<&ErrorInfo> {
        self.errors.as_ref()
    }

    pub fn action(&self, id: ActionId) -> &Action {
        &self.actions[id.index()]
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    pub fn context(&self, id: ContextId) -> &Context {
        &self.contexts[id.index()]
    }

    pub fn keyword_context(&self, id: KeywordContextId) -> &KeywordContext {
        &self.keyword_contexts[id.index()]
    }

    pub fn keyword_text(&self, id: KeywordId) -> &str {
        &self.keywords[id.index()]
    }

    /// Classify a significant phrase token against one keyword context.
    pub fn classify(&self, keywords: KeywordContextId, phrase: &PhraseToken) -> Option<KeywordId> {
        let token = phrase.token.as_ref()?;
        self.keyword_context(keywords).lookup(token.text())
    }
}

/// Errors raised while assembling a grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("action {0} was reserved but never defined")]
    UndefinedAction(ActionId),
    #[error("action {0} is defined twice")]
    ActionRedefined(ActionId),
    #[error("rule '{0}' was reserved but never defined")]
    UndefinedRule(String),
    #[error("rule '{0}' is defined twice")]
    RuleRedefined(String),
    #[error("{from} refers to missing {what} {id}")]
    DanglingReference { from: String, what: &'static str, id: u32 },
    #[error("statement context '{0}' is defined twice")]
    DuplicateContext(String),
    #[error("grammar defines no statement context")]
    NoContexts,
}
