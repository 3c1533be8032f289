//! Deferred evaluation thunk used by the dynamic data structure evaluator.

use std::cell::Cell;

use crate::runner::ds::operations::type_conversion::to_display_string;
use crate::runner::ds::value::{RecordRef, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DirectiveKind {
    /// Code is an expression; its value is the result.
    Expression,
    /// Code is a statement list; the result is whatever it returns.
    Execution,
}

/// A record marked with an evaluation directive together with the scope it
/// has to be evaluated against. See `runner::eval::dynamic` for `force`.
pub struct LazyValue {
    target: RecordRef,
    kind: DirectiveKind,
    directive_key: String,
    scope: RecordRef,
    forcing: Cell<bool>,
}

impl LazyValue {
    pub fn new(target: RecordRef, kind: DirectiveKind, directive_key: &str, scope: RecordRef) -> Self {
        LazyValue {
            target,
            kind,
            directive_key: directive_key.to_string(),
            scope,
            forcing: Cell::new(false),
        }
    }

    /// The raw record this thunk wraps.
    pub fn target(&self) -> &RecordRef {
        &self.target
    }

    pub fn kind(&self) -> DirectiveKind {
        self.kind
    }

    pub fn directive_key(&self) -> &str {
        &self.directive_key
    }

    pub fn scope(&self) -> &RecordRef {
        &self.scope
    }

    /// Marks the thunk as being forced. Returns false when it already is,
    /// i.e. its code ended up reading itself.
    pub fn begin_forcing(&self) -> bool {
        !self.forcing.replace(true)
    }

    pub fn end_forcing(&self) {
        self.forcing.set(false);
    }

    /// Current directive code. Read on every call so later edits of the raw
    /// record are honoured.
    pub fn code(&self) -> String {
        match self.target.borrow().get(&self.directive_key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => to_display_string(other),
            None => String::new(),
        }
    }
}
