//! Grammar resolution handshake.
//!
//! The term parser never loads grammars itself. When a document needs one it publishes a [`ResourceRequest`],
//! reports `RESOURCE_NEEDED`, and waits for the caller to hand back a [`ResolvedObject`].

use std::fmt;
use std::sync::Arc;

/// Role of a request for the document's grammar.
pub const GRAMMAR_ROLE: &str = "grammar";

/// Identifies a grammar by public and/or system id. Both empty asks for the default grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GrammarReference {
    pub public_id: Option<Arc<str>>,
    pub system_id: Option<Arc<str>>,
}

impl GrammarReference {
    pub fn new(public_id: Option<Arc<str>>, system_id: Option<Arc<str>>) -> Self {
        Self { public_id, system_id }
    }

    pub fn is_empty(&self) -> bool {
        self.public_id.is_none() && self.system_id.is_none()
    }
}

impl fmt::Display for GrammarReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.public_id, &self.system_id) {
            (Some(public), Some(system)) => write!(f, "{public} ({system})"),
            (Some(public), None) => write!(f, "{public}"),
            (None, Some(system)) => write!(f, "{system}"),
            (None, None) => write!(f, "<default>"),
        }
    }
}

/// A resource the parser cannot continue without.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRequest {
    pub reference: GrammarReference,
    pub role: &'static str,
}

impl ResourceRequest {
    pub fn grammar(reference: GrammarReference) -> Self {
        Self {
            reference,
            role: GRAMMAR_ROLE,
        }
    }
}

/// The answer to a [`ResourceRequest`].
#[derive(Debug, Clone)]
pub struct ResolvedObject<T> {
    pub request: ResourceRequest,
    pub object: Arc<T>,
}

impl<T> ResolvedObject<T> {
    pub fn new(request: ResourceRequest, object: Arc<T>) -> Self {
        Self { request, object }
    }
}
