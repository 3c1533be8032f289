//! Dynamic data structures: records carrying an evaluation directive
//! (`{"__evaluate__": "<expression>"}` or `{"__execute__": "<statements>"}`)
//! stand for the value their code produces.
//!
//! Evaluating a graph replaces every nested directive record by a
//! `Value::Lazy` thunk. A thunk is forced whenever it is read through the
//! interpreter, through `get_substructure` or explicitly, and re-runs its code
//! on every force. All code sees the caller's scope plus `self` (the graph
//! root) and `resolve` (forces every thunk below its argument).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::parser::parse_to_ast;
use crate::runner::config::ToolsConfig;
use crate::runner::ds::error::{EvalErrorType, GraphError};
use crate::runner::ds::function_object::FunctionObject;
use crate::runner::ds::lazy::{DirectiveKind, LazyValue};
use crate::runner::ds::object::RecordObject;
use crate::runner::ds::operations::traversal::CycleTracker;
use crate::runner::ds::value::{RecordRef, Value};

use super::statement::execute_program;
use super::types::EvalContext;

pub const RESOLVE_FUNCTION_NAME: &str = "resolve";

/// How many directives may be running inside each other before evaluation
/// gives up.
pub const MAX_NESTED_EVALUATIONS: usize = 32;

const STACK_EXCEEDED: &str = "Maximum call stack size exceeded";

thread_local! {
    static EVALUATION_DEPTH: Cell<usize> = Cell::new(0);
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Option<DepthGuard> {
        EVALUATION_DEPTH.with(|depth| {
            if depth.get() >= MAX_NESTED_EVALUATIONS {
                None
            } else {
                depth.set(depth.get() + 1);
                Some(DepthGuard)
            }
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EVALUATION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

struct ForcingGuard<'a>(&'a LazyValue);

impl Drop for ForcingGuard<'_> {
    fn drop(&mut self) {
        self.0.end_forcing();
    }
}

fn stack_exceeded(code: String, variables: Vec<String>) -> GraphError {
    GraphError::EvaluationFailure {
        code,
        variables,
        message: EvalErrorType::RangeError(STACK_EXCEEDED.to_string()).to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct DynamicOptions {
    pub self_reference_name: String,
    pub expression_indicator_key: String,
    pub execution_indicator_key: String,
}

impl Default for DynamicOptions {
    fn default() -> Self {
        DynamicOptions {
            self_reference_name: "self".to_string(),
            expression_indicator_key: "__evaluate__".to_string(),
            execution_indicator_key: "__execute__".to_string(),
        }
    }
}

impl DynamicOptions {
    pub fn from_config(config: &ToolsConfig) -> Self {
        let directives = &config.directives;
        DynamicOptions {
            self_reference_name: directives.self_reference_name.clone(),
            expression_indicator_key: directives.evaluate_key.clone(),
            execution_indicator_key: directives.execute_key.clone(),
        }
    }

    /// The directive a record carries. Expression directives win when both
    /// keys are present.
    fn directive_of(&self, record: &RecordRef) -> Option<(DirectiveKind, &str)> {
        let record = record.borrow();
        if record.has_own_property(&self.expression_indicator_key) {
            Some((DirectiveKind::Expression, self.expression_indicator_key.as_str()))
        } else if record.has_own_property(&self.execution_indicator_key) {
            Some((DirectiveKind::Execution, self.execution_indicator_key.as_str()))
        } else {
            None
        }
    }
}

impl LazyValue {
    /// Runs the directive code against the captured scope. A thunk whose code
    /// reads itself, directly or through other thunks, fails instead of
    /// recursing.
    pub fn force(&self) -> Result<Value, GraphError> {
        let code = self.code();
        if !self.begin_forcing() {
            debug!("Directive \"{}\" depends on itself", code);
            return Err(stack_exceeded(code, vec![]));
        }
        let _forcing = ForcingGuard(self);
        trace!("Forcing {:?} directive \"{}\"", self.kind(), code);
        evaluate_code(&code, self.kind(), self.scope())
    }
}

/// Compiles and runs one directive. Expressions are evaluated as
/// `return <code>`.
pub fn evaluate_code(code: &str, kind: DirectiveKind, scope: &RecordRef) -> Result<Value, GraphError> {
    let source = match kind {
        DirectiveKind::Expression => format!("return {}", code),
        DirectiveKind::Execution => code.to_string(),
    };
    let program = parse_to_ast(&source).map_err(|e| GraphError::CompilationFailure {
        code: source.clone(),
        message: e.to_string(),
    })?;
    let mut ctx = EvalContext::new(scope.clone());
    let _depth = match DepthGuard::enter() {
        Some(guard) => guard,
        None => return Err(stack_exceeded(source, ctx.variable_names())),
    };
    execute_program(&program, &mut ctx).map_err(|e| {
        debug!("Evaluation of \"{}\" failed: {}", source, e);
        GraphError::EvaluationFailure {
            code: source,
            variables: ctx.variable_names(),
            message: e.to_string(),
        }
    })
}

pub fn evaluate_dynamic_data_structure(graph: &Value, scope: &RecordRef) -> Result<Value, GraphError> {
    evaluate_dynamic_data_structure_with(graph, scope, &DynamicOptions::default())
}

/// Prepares `graph` for lazy evaluation against `scope`.
///
/// Non container values are returned unchanged. A root record carrying a
/// directive is evaluated right away and its raw result returned. Otherwise
/// the graph is returned with nested directive records replaced by thunks.
pub fn evaluate_dynamic_data_structure_with(
    graph: &Value,
    scope: &RecordRef,
    options: &DynamicOptions,
) -> Result<Value, GraphError> {
    if !graph.is_container() {
        return Ok(graph.clone());
    }
    {
        let mut scope_record = scope.borrow_mut();
        if !scope_record.has_own_property(&options.self_reference_name) {
            scope_record.set(options.self_reference_name.clone(), graph.clone());
        }
        scope_record.set(
            RESOLVE_FUNCTION_NAME.to_string(),
            Value::new_function(resolve_function()),
        );
    }
    if let Value::Record(record) = graph {
        if let Some((kind, key)) = options.directive_of(record) {
            let code = LazyValue::new(record.clone(), kind, key, scope.clone()).code();
            debug!("Evaluating root directive \"{}\"", code);
            return evaluate_code(&code, kind, scope);
        }
    }
    let mut tracker = CycleTracker::new();
    add_thunks(graph, scope, options, &mut tracker);
    Ok(graph.clone())
}

fn resolve_function() -> FunctionObject {
    FunctionObject::new(RESOLVE_FUNCTION_NAME, |args| {
        let data = args.first().cloned().unwrap_or(Value::Undefined);
        resolve_dynamic_data_structure(&data).map_err(EvalErrorType::from)
    })
}

fn thunk_for(child: &Value, scope: &RecordRef, options: &DynamicOptions) -> Option<Value> {
    let record = child.as_record()?;
    let (kind, key) = options.directive_of(record)?;
    Some(Value::Lazy(Rc::new(LazyValue::new(
        record.clone(),
        kind,
        key,
        scope.clone(),
    ))))
}

fn add_thunks(value: &Value, scope: &RecordRef, options: &DynamicOptions, tracker: &mut CycleTracker) {
    if tracker.contains(value) {
        return;
    }
    tracker.record(value, value);
    match value {
        Value::Record(r) => {
            let entries = r.borrow().entries();
            for (key, child) in entries {
                if !child.is_container() {
                    continue;
                }
                add_thunks(&child, scope, options, tracker);
                if let Some(thunk) = thunk_for(&child, scope, options) {
                    r.borrow_mut().set(key, thunk);
                }
            }
        }
        Value::Sequence(s) => {
            let items = s.borrow().clone();
            for (index, child) in items.iter().enumerate() {
                if !child.is_container() {
                    continue;
                }
                add_thunks(child, scope, options, tracker);
                if let Some(thunk) = thunk_for(child, scope, options) {
                    s.borrow_mut()[index] = thunk;
                }
            }
        }
        _ => {}
    }
}

/// Forces every thunk reachable from `graph`, replacing it in place with its
/// value. A thunk root is forced and its value returned.
pub fn resolve_dynamic_data_structure(graph: &Value) -> Result<Value, GraphError> {
    let mut tracker = CycleTracker::new();
    resolve_value(graph, &mut tracker)
}

fn resolve_value(value: &Value, tracker: &mut CycleTracker) -> Result<Value, GraphError> {
    if let Value::Lazy(lazy) = value {
        let forced = lazy.force()?;
        return resolve_value(&forced, tracker);
    }
    if !value.is_container() || tracker.contains(value) {
        return Ok(value.clone());
    }
    tracker.record(value, value);
    match value {
        Value::Record(r) => {
            let entries = r.borrow().entries();
            for (key, child) in entries {
                let resolved = resolve_value(&child, tracker)?;
                if let Value::Lazy(_) = child {
                    r.borrow_mut().set(key, resolved);
                }
            }
        }
        Value::Sequence(s) => {
            let items = s.borrow().clone();
            for (index, child) in items.iter().enumerate() {
                let resolved = resolve_value(child, tracker)?;
                if let Value::Lazy(_) = child {
                    s.borrow_mut()[index] = resolved;
                }
            }
        }
        Value::Mapping(m) => {
            let entries = m.borrow().entries();
            for (key, child) in entries {
                let resolved = resolve_value(&child, tracker)?;
                if let Value::Lazy(_) = child {
                    m.borrow_mut().set(key, resolved);
                }
            }
        }
        Value::Set(s) => {
            for item in s.borrow().values() {
                resolve_value(&item, tracker)?;
            }
        }
        _ => {}
    }
    Ok(value.clone())
}

/// Replaces every thunk reachable from `graph` by the raw directive record it
/// wraps. Idempotent; a thunk root yields its raw record.
pub fn unwrap_dynamic(graph: &Value) -> Value {
    let mut tracker = CycleTracker::new();
    unwrap_value(graph, &mut tracker)
}

fn raw(value: &Value) -> Value {
    match value {
        Value::Lazy(lazy) => Value::Record(lazy.target().clone()),
        other => other.clone(),
    }
}

fn unwrap_value(value: &Value, tracker: &mut CycleTracker) -> Value {
    let value = raw(value);
    if !value.is_container() || tracker.contains(&value) {
        return value;
    }
    tracker.record(&value, &value);
    match &value {
        Value::Record(r) => {
            let entries = r.borrow().entries();
            for (key, child) in entries {
                let unwrapped = unwrap_value(&child, tracker);
                if let Value::Lazy(_) = child {
                    r.borrow_mut().set(key, unwrapped);
                }
            }
        }
        Value::Sequence(s) => {
            let items = s.borrow().clone();
            for (index, child) in items.iter().enumerate() {
                let unwrapped = unwrap_value(child, tracker);
                if let Value::Lazy(_) = child {
                    s.borrow_mut()[index] = unwrapped;
                }
            }
        }
        Value::Mapping(m) => {
            let entries = m.borrow().entries();
            for (key, child) in entries {
                let unwrapped = unwrap_value(&child, tracker);
                if let Value::Lazy(_) = child {
                    m.borrow_mut().set(key, unwrapped);
                }
            }
        }
        _ => {}
    }
    value
}

/// Empty scope record.
pub fn new_scope() -> RecordRef {
    Rc::new(RefCell::new(RecordObject::new()))
}

/// Scope record holding the given variables.
pub fn scope_from(variables: Vec<(&str, Value)>) -> RecordRef {
    let scope = new_scope();
    for (name, value) in variables {
        scope.borrow_mut().set(name.to_string(), value);
    }
    scope
}
