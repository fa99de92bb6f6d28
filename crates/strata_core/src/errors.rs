//! Immutable error chains attached to tokens.
//!
//! Every layer reports problems by attaching an [`ErrorInfo`] to the token (or term event) that exposed them,
//! never by aborting. An `ErrorInfo` is a prepend-only singly linked list: nodes are shared by reference
//! counting and are never mutated, so a token can be cloned across layers and queues freely.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::lang::errors::{self, ErrorCodeId};
use crate::text::SourceLocation;

/// An error code plus its message template.
///
/// Built-in codes come from the [`crate::lang::errors`] registry; grammars may define their own codes with
/// [`ErrorCode::custom`].
///
/// ## Notes
/// - Templates use positional slots `{0}`, `{1}`, ... that are filled from [`ErrorInfo::args`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    code: Cow<'static, str>,
    template: Cow<'static, str>,
}

impl ErrorCode {
    /// A grammar-defined error code.
    pub fn custom(code: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            code: Cow::Owned(code.into()),
            template: Cow::Owned(template.into()),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Return the registry id when this is a built-in code.
    pub fn builtin(&self) -> Option<ErrorCodeId> {
        errors::from_str(&self.code)
    }

    /// Render the template with positional arguments.
    ///
    /// Slots without a matching argument are left as written.
    pub fn render(&self, args: &[String]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest: &str = &self.template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let slot = after
                .find('}')
                .and_then(|close| after[..close].parse::<usize>().ok().map(|idx| (idx, close)));
            match slot {
                Some((idx, close)) if idx < args.len() => {
                    out.push_str(&args[idx]);
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl From<ErrorCodeId> for ErrorCode {
    fn from(id: ErrorCodeId) -> Self {
        let info = errors::info_for(id);
        Self {
            code: Cow::Borrowed(info.code),
            template: Cow::Borrowed(info.template),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ErrorNode {
    code: ErrorCode,
    args: Vec<String>,
    location: SourceLocation,
    cause: Option<ErrorInfo>,
    next: Option<ErrorInfo>,
}

/// One or more located errors, newest first.
///
/// ## Notes
/// - `next` links to older errors reported for the same token; `cause` links to an independent chain that
///   explains this error (for example grammar load errors behind a failed grammar load).
/// - Extension never mutates: [`ErrorInfo::prepend`] returns a new head sharing the old list.
///
/// ## Examples
/// ```rust
/// use std::sync::Arc;
/// use strata_core::{ErrorInfo, SourceLocation, TextPos};
/// use strata_core::lang::errors::ErrorCodeId;
///
/// let loc = SourceLocation::point(Arc::from("demo"), TextPos::START);
/// let first = ErrorInfo::new(ErrorCodeId::UnterminatedString, vec![], loc.clone());
/// let both = first.prepend(ErrorCodeId::InvalidEscape, vec!["q".to_string()], loc);
/// assert_eq!(both.len(), 2);
/// assert_eq!(first.len(), 1);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ErrorInfo(Arc<ErrorNode>);

impl ErrorInfo {
    pub fn new(code: impl Into<ErrorCode>, args: Vec<String>, location: SourceLocation) -> Self {
        Self::extend(None, code, args, location)
    }

    /// Create an error explained by `cause`.
    pub fn with_cause(
        code: impl Into<ErrorCode>,
        args: Vec<String>,
        location: SourceLocation,
        cause: ErrorInfo,
    ) -> Self {
        ErrorInfo(Arc::new(ErrorNode {
            code: code.into(),
            args,
            location,
            cause: Some(cause),
            next: None,
        }))
    }

    /// Create a new head in front of `next` (which may be empty).
    pub fn extend(
        next: Option<&ErrorInfo>,
        code: impl Into<ErrorCode>,
        args: Vec<String>,
        location: SourceLocation,
    ) -> Self {
        ErrorInfo(Arc::new(ErrorNode {
            code: code.into(),
            args,
            location,
            cause: None,
            next: next.cloned(),
        }))
    }

    /// Return a new chain with one more error in front of this one.
    pub fn prepend(&self, code: impl Into<ErrorCode>, args: Vec<String>, location: SourceLocation) -> Self {
        Self::extend(Some(self), code, args, location)
    }

    /// Join two optional chains, `first` ahead of `second`.
    ///
    /// Nodes of `first` are copied (chains are immutable); `second` is shared.
    pub fn join(first: Option<&ErrorInfo>, second: Option<&ErrorInfo>) -> Option<ErrorInfo> {
        let Some(first) = first else {
            return second.cloned();
        };
        let nodes: Vec<&ErrorInfo> = first.iter().collect();
        let mut head = second.cloned();
        for node in nodes.into_iter().rev() {
            head = Some(ErrorInfo(Arc::new(ErrorNode {
                code: node.0.code.clone(),
                args: node.0.args.clone(),
                location: node.0.location.clone(),
                cause: node.0.cause.clone(),
                next: head,
            })));
        }
        head
    }

    pub fn code(&self) -> &ErrorCode {
        &self.0.code
    }

    pub fn args(&self) -> &[String] {
        &self.0.args
    }

    pub fn location(&self) -> &SourceLocation {
        &self.0.location
    }

    pub fn cause(&self) -> Option<&ErrorInfo> {
        self.0.cause.as_ref()
    }

    pub fn next(&self) -> Option<&ErrorInfo> {
        self.0.next.as_ref()
    }

    /// The rendered message of this node only.
    pub fn message(&self) -> String {
        self.0.code.render(&self.0.args)
    }

    /// Iterate this node and every older node of the chain.
    pub fn iter(&self) -> impl Iterator<Item = &ErrorInfo> {
        std::iter::successors(Some(self), |e| e.next())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// An `ErrorInfo` always holds at least one node.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Return `true` if any node of the chain carries the built-in code `id`.
    pub fn contains(&self, id: ErrorCodeId) -> bool {
        self.iter().any(|e| e.code().builtin() == Some(id))
    }
}

impl fmt::Debug for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|e| (e.code().code(), e.message(), e.location().start)))
            .finish()
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.location(), self.message(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextPos;

    fn loc() -> SourceLocation {
        SourceLocation::point(Arc::from("t"), TextPos::START)
    }

    #[test]
    fn test_render_fills_slots() {
        let code = ErrorCode::custom("x.Y", "expected {0} but found {1}");
        assert_eq!(code.render(&["a".into(), "b".into()]), "expected a but found b");
        assert_eq!(code.render(&["a".into()]), "expected a but found {1}");
    }

    #[test]
    fn test_render_keeps_stray_braces() {
        let code = ErrorCode::custom("x.Y", "{ not a slot } {0}");
        assert_eq!(code.render(&["z".into()]), "{ not a slot } z");
    }

    #[test]
    fn test_prepend_shares_tail() {
        let base = ErrorInfo::new(ErrorCodeId::UnterminatedString, vec![], loc());
        let head = base.prepend(ErrorCodeId::InvalidEscape, vec!["q".into()], loc());
        assert_eq!(head.len(), 2);
        assert!(head.contains(ErrorCodeId::UnterminatedString));
        assert!(head.contains(ErrorCodeId::InvalidEscape));
        assert_eq!(head.next(), Some(&base));
    }

    #[test]
    fn test_join_orders_first_ahead() {
        let a = ErrorInfo::new(ErrorCodeId::UnmatchedClosingCurly, vec![], loc());
        let b = ErrorInfo::new(ErrorCodeId::UnterminatedBlock, vec![], loc());
        let joined = ErrorInfo::join(Some(&a), Some(&b)).unwrap();
        let codes: Vec<_> = joined.iter().map(|e| e.code().builtin()).collect();
        assert_eq!(
            codes,
            vec![Some(ErrorCodeId::UnmatchedClosingCurly), Some(ErrorCodeId::UnterminatedBlock)]
        );
        assert_eq!(ErrorInfo::join(None, Some(&b)), Some(b.clone()));
        assert_eq!(ErrorInfo::join(None, None), None);
    }

    #[test]
    fn test_custom_code_is_not_builtin() {
        let e = ErrorInfo::new(ErrorCode::custom("demo.Bad", "bad"), vec![], loc());
        assert_eq!(e.code().builtin(), None);
        assert_eq!(e.message(), "bad");
    }
}
