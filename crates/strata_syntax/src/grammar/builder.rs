//! Assembling grammars.
//!
//! Action graphs are full of cycles (a statement loops back to its own choice, rules call themselves), so the
//! builder hands out ids before the nodes exist: [`GrammarBuilder::reserve`] and
//! [`GrammarBuilder::reserve_rule`] create placeholders that must be filled before [`GrammarBuilder::build`].

use std::collections::HashMap;
use std::sync::Arc;

use strata_core::ErrorInfo;

use super::{
    Action, ActionId, CompiledGrammar, Context, ContextId, GrammarError, KeywordContext, KeywordContextId, KeywordId,
    Rule, RuleBody, RuleId,
};

/// Mutable grammar under construction.
///
/// ## Examples
/// ```rust
/// use strata_core::lang::phrases::PhraseKind;
/// use strata_core::lang::terms::{SyntaxRole, TermKind};
/// use strata_syntax::grammar::{Action, ChoiceTable, GrammarBuilder};
///
/// let mut b = GrammarBuilder::new("values");
/// let done = b.add(Action::Return { success: true });
/// let head = b.reserve();
/// let value = b.add(Action::ReportToken {
///     kind: TermKind::Value,
///     role: SyntaxRole::Primary,
///     structural: None,
///     consume: true,
///     next: head,
/// });
/// let choice = b.add(Action::Choice(ChoiceTable::new(done).on_kind(PhraseKind::Significant, value)));
/// b.define(head, Action::Advance { skip_doc_comments: true, next: choice }).unwrap();
/// b.context("statement", head, None).unwrap();
///
/// let grammar = b.build().unwrap();
/// assert_eq!(grammar.context_by_name("statement"), Some(grammar.default_context()));
/// ```
#[derive(Debug)]
pub struct GrammarBuilder {
    system_id: Arc<str>,
    script_mode: bool,
    actions: Vec<Option<Action>>,
    rules: Vec<(Arc<str>, Option<Rule>)>,
    contexts: Vec<Context>,
    default_context: Option<ContextId>,
    keywords: Vec<Arc<str>>,
    keyword_ids: HashMap<Arc<str>, KeywordId>,
    keyword_contexts: Vec<KeywordContext>,
    errors: Option<ErrorInfo>,
}

impl GrammarBuilder {
    pub fn new(system_id: impl Into<Arc<str>>) -> Self {
        Self {
            system_id: system_id.into(),
            script_mode: false,
            actions: Vec::new(),
            rules: Vec::new(),
            contexts: Vec::new(),
            default_context: None,
            keywords: Vec::new(),
            keyword_ids: HashMap::new(),
            keyword_contexts: Vec::new(),
            errors: None,
        }
    }

    /// Script grammars are forced on documents without a doctype.
    pub fn set_script(&mut self, script: bool) -> &mut Self {
        self.script_mode = script;
        self
    }

    pub fn set_errors(&mut self, errors: Option<ErrorInfo>) -> &mut Self {
        self.errors = errors;
        self
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Hand out an id for an action defined later with [`GrammarBuilder::define`].
    pub fn reserve(&mut self) -> ActionId {
        self.actions.push(None);
        ActionId::new((self.actions.len() - 1) as u32)
    }

    pub fn define(&mut self, id: ActionId, action: Action) -> Result<(), GrammarError> {
        let slot = self
            .actions
            .get_mut(id.index())
            .ok_or(GrammarError::UndefinedAction(id))?;
        if slot.is_some() {
            return Err(GrammarError::ActionRedefined(id));
        }
        *slot = Some(action);
        Ok(())
    }

    pub fn add(&mut self, action: Action) -> ActionId {
        self.actions.push(Some(action));
        ActionId::new((self.actions.len() - 1) as u32)
    }

    // ========================================================================
    // Keywords
    // ========================================================================

    /// Intern a keyword; the same text always yields the same id.
    pub fn keyword(&mut self, text: &str) -> KeywordId {
        if let Some(id) = self.keyword_ids.get(text) {
            return *id;
        }
        let text: Arc<str> = Arc::from(text);
        let id = KeywordId::new(self.keywords.len() as u32);
        self.keywords.push(text.clone());
        self.keyword_ids.insert(text, id);
        id
    }

    pub fn keyword_context(&mut self, name: &str, words: &[&str]) -> KeywordContextId {
        let mut context = KeywordContext::new(name);
        for word in words {
            let id = self.keyword(word);
            context.insert(Arc::from(*word), id);
        }
        self.keyword_contexts.push(context);
        KeywordContextId::new((self.keyword_contexts.len() - 1) as u32)
    }

    // ========================================================================
    // Rules and contexts
    // ========================================================================

    pub fn reserve_rule(&mut self, name: &str) -> RuleId {
        self.rules.push((Arc::from(name), None));
        RuleId::new((self.rules.len() - 1) as u32)
    }

    pub fn define_rule(&mut self, id: RuleId, rule: Rule) -> Result<(), GrammarError> {
        let (name, slot) = self
            .rules
            .get_mut(id.index())
            .ok_or_else(|| GrammarError::UndefinedRule(rule.name.to_string()))?;
        if slot.is_some() {
            return Err(GrammarError::RuleRedefined(name.to_string()));
        }
        *slot = Some(rule);
        Ok(())
    }

    pub fn rule(&mut self, rule: Rule) -> RuleId {
        self.rules.push((rule.name.clone(), Some(rule)));
        RuleId::new((self.rules.len() - 1) as u32)
    }

    /// Define a statement context. The first context defined is the default unless overridden.
    pub fn context(
        &mut self,
        name: &str,
        entry: ActionId,
        keywords: Option<KeywordContextId>,
    ) -> Result<ContextId, GrammarError> {
        if self.contexts.iter().any(|c| &*c.name == name) {
            return Err(GrammarError::DuplicateContext(name.to_string()));
        }
        self.contexts.push(Context {
            name: Arc::from(name),
            entry,
            keywords,
        });
        Ok(ContextId::new((self.contexts.len() - 1) as u32))
    }

    pub fn set_default_context(&mut self, id: ContextId) -> &mut Self {
        self.default_context = Some(id);
        self
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check every placeholder and reference, then freeze the grammar.
    pub fn build(self) -> Result<CompiledGrammar, GrammarError> {
        if self.contexts.is_empty() {
            return Err(GrammarError::NoContexts);
        }

        let mut actions = Vec::with_capacity(self.actions.len());
        for (index, slot) in self.actions.into_iter().enumerate() {
            let id = ActionId::new(index as u32);
            actions.push(slot.ok_or(GrammarError::UndefinedAction(id))?);
        }
        let mut rules = Vec::with_capacity(self.rules.len());
        for (name, slot) in self.rules {
            rules.push(slot.ok_or_else(|| GrammarError::UndefinedRule(name.to_string()))?);
        }

        let grammar = CompiledGrammar {
            actions,
            rules,
            contexts: self.contexts,
            default_context: self.default_context.unwrap_or(ContextId::new(0)),
            keywords: self.keywords,
            keyword_contexts: self.keyword_contexts,
            script_mode: self.script_mode,
            system_id: self.system_id,
            errors: self.errors,
        };
        validate(&grammar)?;
        Ok(grammar)
    }
}

fn check(from: impl FnOnce() -> String, what: &'static str, index: usize, len: usize) -> Result<(), GrammarError> {
    if index < len {
        return Ok(());
    }
    Err(GrammarError::DanglingReference {
        from: from(),
        what,
        id: index as u32,
    })
}

fn validate(g: &CompiledGrammar) -> Result<(), GrammarError> {
    let (n_actions, n_rules, n_contexts) = (g.actions.len(), g.rules.len(), g.contexts.len());
    let (n_keywords, n_keyword_contexts) = (g.keywords.len(), g.keyword_contexts.len());

    for (index, action) in g.actions.iter().enumerate() {
        let from = || format!("action #{index}");
        for next in action.successors() {
            check(from, "action", next.index(), n_actions)?;
        }
        match action {
            Action::Call { rule, .. } => check(from, "rule", rule.index(), n_rules)?,
            Action::Choice(table) => {
                for keyword in table.keywords.keys() {
                    check(from, "keyword", keyword.index(), n_keywords)?;
                }
            }
            _ => {}
        }
    }

    for rule in &g.rules {
        let from = || format!("rule '{}'", rule.name);
        match rule.body {
            RuleBody::Actions(entry) => check(from, "action", entry.index(), n_actions)?,
            RuleBody::Block(context) => check(from, "context", context.index(), n_contexts)?,
        }
        if let Some(keywords) = rule.keywords {
            check(from, "keyword context", keywords.index(), n_keyword_contexts)?;
        }
    }

    for context in &g.contexts {
        let from = || format!("context '{}'", context.name);
        check(from, "action", context.entry.index(), n_actions)?;
        if let Some(keywords) = context.keywords {
            check(from, "keyword context", keywords.index(), n_keyword_contexts)?;
        }
    }

    for context in &g.keyword_contexts {
        for id in context.ids() {
            check(|| format!("keyword context '{}'", context.name), "keyword", id.index(), n_keywords)?;
        }
    }

    check(|| "grammar".to_string(), "context", g.default_context.index(), n_contexts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> GrammarBuilder {
        let mut b = GrammarBuilder::new("t");
        let ret = b.add(Action::Return { success: true });
        b.context("statement", ret, None).unwrap();
        b
    }

    #[test]
    fn test_minimal_grammar_builds() {
        let g = minimal().build().unwrap();
        assert_eq!(g.default_context(), ContextId::new(0));
        assert!(!g.is_script());
        assert_eq!(&**g.system_id(), "t");
        assert!(g.errors().is_none());
    }

    #[test]
    fn test_no_contexts() {
        assert_eq!(GrammarBuilder::new("t").build().unwrap_err(), GrammarError::NoContexts);
    }

    #[test]
    fn test_reserved_action_must_be_defined() {
        let mut b = minimal();
        let id = b.reserve();
        assert_eq!(b.build().unwrap_err(), GrammarError::UndefinedAction(id));
    }

    #[test]
    fn test_define_twice() {
        let mut b = minimal();
        let id = b.reserve();
        b.define(id, Action::Return { success: false }).unwrap();
        assert_eq!(
            b.define(id, Action::Return { success: true }),
            Err(GrammarError::ActionRedefined(id))
        );
    }

    #[test]
    fn test_reserved_rule_must_be_defined() {
        let mut b = minimal();
        b.reserve_rule("expr");
        assert_eq!(b.build().unwrap_err(), GrammarError::UndefinedRule("expr".to_string()));
    }

    #[test]
    fn test_dangling_action_reference() {
        let mut b = minimal();
        b.add(Action::PopKeywords { next: ActionId::new(42) });
        assert!(matches!(
            b.build().unwrap_err(),
            GrammarError::DanglingReference { what: "action", id: 42, .. }
        ));
    }

    #[test]
    fn test_dangling_rule_reference() {
        let mut b = minimal();
        let ret = ActionId::new(0);
        b.add(Action::Call {
            rule: RuleId::new(3),
            success: ret,
            failure: ret,
        });
        assert!(matches!(
            b.build().unwrap_err(),
            GrammarError::DanglingReference { what: "rule", id: 3, .. }
        ));
    }

    #[test]
    fn test_duplicate_context() {
        let mut b = minimal();
        assert_eq!(
            b.context("statement", ActionId::new(0), None),
            Err(GrammarError::DuplicateContext("statement".to_string()))
        );
    }

    #[test]
    fn test_keywords_are_interned() {
        let mut b = minimal();
        let a = b.keyword("if");
        let ctx = b.keyword_context("stmt", &["if", "else"]);
        let g = b.build().unwrap();
        let kc = g.keyword_context(ctx);
        assert_eq!(kc.lookup("if"), Some(a));
        assert_eq!(g.keyword_text(a), "if");
        assert_eq!(kc.len(), 2);
        assert_eq!(kc.lookup("then"), None);
    }

    #[test]
    fn test_default_context_override() {
        let mut b = minimal();
        let second = b.context("inner", ActionId::new(0), None).unwrap();
        b.set_default_context(second);
        let g = b.build().unwrap();
        assert_eq!(g.default_context(), second);
        assert_eq!(g.context_by_name("inner"), Some(second));
        assert_eq!(g.statement_contexts().count(), 2);
    }
}
