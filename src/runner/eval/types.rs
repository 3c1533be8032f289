//! Core types for the evaluation engine.

use indexmap::IndexMap;

use crate::runner::ds::error::EvalErrorType;
use crate::runner::ds::value::{RecordRef, Value};

/// Completion record type.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionType {
    /// Normal completion - execution continues.
    Normal,
    /// Return completion - the script returns.
    Return,
}

/// Completion record.
/// Every statement execution returns a completion record.
pub struct Completion {
    pub completion_type: CompletionType,
    pub value: Option<Value>,
}

impl Completion {
    pub fn normal() -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: None,
        }
    }

    pub fn normal_with_value(value: Value) -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: Some(value),
        }
    }

    pub fn return_value(value: Value) -> Self {
        Completion {
            completion_type: CompletionType::Return,
            value: Some(value),
        }
    }

    pub fn is_abrupt(&self) -> bool {
        self.completion_type != CompletionType::Normal
    }

    /// Get the value, or undefined if none.
    pub fn get_value(&self) -> Value {
        self.value.clone().unwrap_or(Value::Undefined)
    }
}

pub type ValueResult = Result<Value, EvalErrorType>;
pub type EvalResult = Result<Completion, EvalErrorType>;

struct Binding {
    value: Value,
    mutable: bool,
}

/// Bindings visible to a running script.
///
/// The caller supplied scope record is read-only from inside a script:
/// declarations and assignments land in script local block scopes which
/// shadow scope entries of the same name.
pub struct EvalContext {
    scope: RecordRef,
    block_scopes: Vec<IndexMap<String, Binding>>,
}

impl EvalContext {
    pub fn new(scope: RecordRef) -> Self {
        EvalContext {
            scope,
            block_scopes: vec![IndexMap::new()],
        }
    }

    pub fn scope(&self) -> &RecordRef {
        &self.scope
    }

    /// Names of the caller supplied scope, in insertion order.
    pub fn variable_names(&self) -> Vec<String> {
        self.scope.borrow().keys()
    }

    pub fn push_block_scope(&mut self) {
        self.block_scopes.push(IndexMap::new());
    }

    pub fn pop_block_scope(&mut self) {
        if self.block_scopes.len() > 1 {
            self.block_scopes.pop();
        }
    }

    pub fn has_binding(&self, name: &str) -> bool {
        self.block_scopes.iter().any(|scope| scope.contains_key(name))
            || self.scope.borrow().has_own_property(name)
    }

    pub fn get_binding(&self, name: &str) -> Result<Value, EvalErrorType> {
        for scope in self.block_scopes.iter().rev() {
            if let Some(binding) = scope.get(name) {
                return Ok(binding.value.clone());
            }
        }
        match self.scope.borrow().get(name) {
            Some(value) => Ok(value.clone()),
            None => Err(EvalErrorType::ReferenceError(format!("{} is not defined", name))),
        }
    }

    /// Declares `name` in the innermost block scope.
    pub fn create_binding(&mut self, name: &str, value: Value, mutable: bool, redeclarable: bool) -> Result<(), EvalErrorType> {
        let depth = self.block_scopes.len() - 1;
        let innermost = &mut self.block_scopes[depth];
        if let Some(existing) = innermost.get_mut(name) {
            if !redeclarable || !existing.mutable {
                return Err(EvalErrorType::SyntaxError(format!(
                    "Identifier '{}' has already been declared",
                    name
                )));
            }
            existing.value = value;
            return Ok(());
        }
        innermost.insert(name.to_string(), Binding { value, mutable });
        Ok(())
    }

    /// `var` declarations are hoisted to the script level. Redeclaring without
    /// an initializer keeps the current value.
    pub fn declare_var(&mut self, name: &str, value: Option<Value>) -> Result<(), EvalErrorType> {
        let script_scope = &mut self.block_scopes[0];
        match script_scope.get_mut(name) {
            Some(existing) if !existing.mutable => Err(EvalErrorType::SyntaxError(format!(
                "Identifier '{}' has already been declared",
                name
            ))),
            Some(existing) => {
                if let Some(v) = value {
                    existing.value = v;
                }
                Ok(())
            }
            None => {
                script_scope.insert(
                    name.to_string(),
                    Binding {
                        value: value.unwrap_or(Value::Undefined),
                        mutable: true,
                    },
                );
                Ok(())
            }
        }
    }

    /// Assigns to the nearest local binding, or creates a script level local
    /// shadowing the scope entry.
    pub fn set_binding(&mut self, name: &str, value: Value) -> Result<(), EvalErrorType> {
        for scope in self.block_scopes.iter_mut().rev() {
            if let Some(binding) = scope.get_mut(name) {
                if !binding.mutable {
                    return Err(EvalErrorType::TypeError(
                        "Assignment to constant variable".to_string(),
                    ));
                }
                binding.value = value;
                return Ok(());
            }
        }
        self.block_scopes[0].insert(name.to_string(), Binding { value, mutable: true });
        Ok(())
    }
}
