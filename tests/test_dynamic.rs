extern crate just_tools;

use just_tools::runner::api::Tools;
use just_tools::runner::config::ToolsConfig;
use just_tools::runner::ds::error::GraphError;
use just_tools::runner::ds::lazy::DirectiveKind;
use just_tools::runner::ds::operations::convert::{from_json, get_substructure};
use just_tools::runner::ds::operations::copy::copy;
use just_tools::runner::ds::operations::test_and_comparison::equals;
use just_tools::runner::ds::value::{same_reference, Value};
use just_tools::runner::eval::dynamic::{
    evaluate_code, evaluate_dynamic_data_structure, new_scope, resolve_dynamic_data_structure,
    scope_from, unwrap_dynamic, MAX_NESTED_EVALUATIONS,
};
use serde_json::json;

fn evaluate(code: &str) -> Value {
    Value::new_record(vec![("__evaluate__", Value::string(code))])
}

fn execute(code: &str) -> Value {
    Value::new_record(vec![("__execute__", Value::string(code))])
}

#[test]
fn test_sibling_reference_through_self() {
    let graph = Value::new_record(vec![("a", Value::integer(2)), ("b", evaluate("self.a * factor"))]);
    let scope = scope_from(vec![("factor", Value::integer(21))]);
    let evaluated = evaluate_dynamic_data_structure(&graph, &scope).unwrap();
    let resolved = resolve_dynamic_data_structure(&evaluated).unwrap();
    assert!(same_reference(&resolved, &graph));
    assert_eq!(resolved.get_property("b"), Value::integer(42));
}

#[test]
fn test_thunks_depending_on_thunks() {
    let graph = from_json(&json!({
        "base": 10,
        "double": {"__evaluate__": "self.triple - self.base"},
        "triple": {"__evaluate__": "self.base * 3"},
        "list": [1, {"__evaluate__": "self.double + 1"}]
    }));
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    let resolved = resolve_dynamic_data_structure(&evaluated).unwrap();
    assert_eq!(resolved.get_property("double"), Value::integer(20));
    assert_eq!(resolved.get_property("triple"), Value::integer(30));
    let expected = Value::new_sequence(vec![Value::integer(1), Value::integer(21)]);
    assert!(equals(&resolved.get_property("list"), &expected));
}

#[test]
fn test_thunk_is_re_evaluated_on_every_read() {
    let graph = Value::new_record(vec![("a", Value::integer(1)), ("b", evaluate("self.a + 1"))]);
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    let thunk = match evaluated.get_property("b") {
        Value::Lazy(lazy) => lazy,
        other => panic!("expected a thunk, got {:?}", other),
    };
    assert_eq!(thunk.force().unwrap(), Value::integer(2));
    if let Value::Record(r) = &graph {
        r.borrow_mut().set("a".to_string(), Value::integer(5));
    }
    assert_eq!(thunk.force().unwrap(), Value::integer(6));
}

#[test]
fn test_execution_directive() {
    let graph = Value::new_record(vec![
        ("a", Value::integer(4)),
        ("b", Value::integer(9)),
        (
            "size",
            execute("const total = self.a + self.b;\nif (total > 10) { return 'big' } else { return 'small' }"),
        ),
    ]);
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    let resolved = resolve_dynamic_data_structure(&evaluated).unwrap();
    assert_eq!(resolved.get_property("size"), Value::string("big"));
}

#[test]
fn test_execution_without_return_yields_undefined() {
    let result = evaluate_code("let x = 1; x = x + 1", DirectiveKind::Execution, &new_scope()).unwrap();
    assert_eq!(result, Value::Undefined);
}

#[test]
fn test_root_directive_is_evaluated_immediately() {
    let scope = scope_from(vec![("name", Value::string("world"))]);
    let result = evaluate_dynamic_data_structure(&evaluate("'hello ' + name"), &scope).unwrap();
    assert_eq!(result, Value::string("hello world"));
}

#[test]
fn test_evaluate_then_unwrap_restores_the_graph() {
    let graph = from_json(&json!({
        "a": 1,
        "b": {"__evaluate__": "self.a"},
        "c": [{"__execute__": "return 2"}, {"plain": true}],
        "d": {"nested": {"__evaluate__": "3"}}
    }));
    let original = copy(&graph);
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    assert!(matches!(evaluated.get_property("b"), Value::Lazy(_)));
    let unwrapped = unwrap_dynamic(&evaluated);
    assert!(equals(&unwrapped, &original));
    assert!(equals(&unwrap_dynamic(&unwrapped), &original));
}

#[test]
fn test_resolve_function_in_scripts() {
    let graph = from_json(&json!({
        "list": [{"__evaluate__": "1 + 1"}, 3],
        "sum": {"__execute__": "const list = resolve(self.list); return list[0] + list[1]"}
    }));
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    let sum = get_substructure(&evaluated, "sum", ".").unwrap();
    let sum = match sum {
        Value::Lazy(lazy) => lazy.force().unwrap(),
        other => other,
    };
    assert_eq!(sum, Value::integer(5));
}

#[test]
fn test_get_substructure_forces_thunks_on_the_way() {
    let graph = from_json(&json!({
        "config": {"__execute__": "return {port: 80 + offset}"}
    }));
    let scope = scope_from(vec![("offset", Value::integer(8))]);
    let evaluated = evaluate_dynamic_data_structure(&graph, &scope).unwrap();
    assert_eq!(
        get_substructure(&evaluated, "config.port", ".").unwrap(),
        Value::integer(88)
    );
}

#[test]
fn test_existing_self_in_scope_is_kept() {
    let other = Value::new_record(vec![("value", Value::integer(7))]);
    let scope = scope_from(vec![("self", other)]);
    let graph = Value::new_record(vec![("x", evaluate("self.value"))]);
    let evaluated = evaluate_dynamic_data_structure(&graph, &scope).unwrap();
    let resolved = resolve_dynamic_data_structure(&evaluated).unwrap();
    assert_eq!(resolved.get_property("x"), Value::integer(7));
}

#[test]
fn test_cyclic_graph_is_evaluated() {
    let graph = Value::new_record(vec![("a", Value::integer(1)), ("b", evaluate("self.a + 1"))]);
    if let Value::Record(r) = &graph {
        r.borrow_mut().set("me".to_string(), graph.clone());
    }
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    let resolved = resolve_dynamic_data_structure(&evaluated).unwrap();
    assert_eq!(resolved.get_property("b"), Value::integer(2));
    assert!(same_reference(&resolved.get_property("me"), &graph));
}

#[test]
fn test_failures_are_reported_on_resolve() {
    let graph = Value::new_record(vec![("broken", evaluate("missing + 1"))]);
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    match resolve_dynamic_data_structure(&evaluated) {
        Err(GraphError::EvaluationFailure { code, message, .. }) => {
            assert_eq!(code, "return missing + 1");
            assert!(message.contains("missing is not defined"));
        }
        other => panic!("expected an evaluation failure, got {:?}", other),
    }

    let graph = Value::new_record(vec![("broken", evaluate("1 +"))]);
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    assert!(matches!(
        resolve_dynamic_data_structure(&evaluated),
        Err(GraphError::CompilationFailure { .. })
    ));
}

#[test]
fn test_configured_directive_keys() {
    let config = ToolsConfig::parse(
        r#"{"directives": {"evaluate_key": "$eval", "self_reference_name": "root"}}"#,
    )
    .unwrap();
    let tools = Tools::new(config);
    let graph = from_json(&json!({"a": 3, "b": {"$eval": "root.a * 2"}}));
    let resolved = tools
        .resolve_dynamic_data_structure(&graph, &new_scope())
        .unwrap();
    assert_eq!(resolved.get_property("b"), Value::integer(6));
}

#[test]
fn test_plain_graph_round_trip() {
    let graph = from_json(&json!({"a": [1, {"b": null}], "c": {"d": "text"}}));
    let original = copy(&graph);
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    assert!(equals(&unwrap_dynamic(&evaluated), &original));
}

fn assert_stack_exceeded(result: Result<Value, GraphError>) {
    match result {
        Err(GraphError::EvaluationFailure { message, .. }) => {
            assert!(message.contains("Maximum call stack size exceeded"), "{}", message);
        }
        other => panic!("expected an evaluation failure, got {:?}", other),
    }
}

#[test]
fn test_self_referencing_thunk_fails() {
    let graph = from_json(&json!({"a": {"__evaluate__": "self.a"}}));
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    assert_stack_exceeded(resolve_dynamic_data_structure(&evaluated));

    let graph = from_json(&json!({
        "a": {"__evaluate__": "self.b + 1"},
        "b": {"__execute__": "return self.a"}
    }));
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    assert_stack_exceeded(resolve_dynamic_data_structure(&evaluated));
}

#[test]
fn test_thunk_can_be_forced_again_after_failure() {
    let graph = Value::new_record(vec![("a", Value::integer(1)), ("b", evaluate("self.a.x.y"))]);
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    let thunk = match evaluated.get_property("b") {
        Value::Lazy(lazy) => lazy,
        other => panic!("expected a thunk, got {:?}", other),
    };
    assert!(thunk.force().is_err());
    if let Value::Record(r) = &graph {
        r.borrow_mut()
            .set("a".to_string(), from_json(&json!({"x": {"y": 3}})));
    }
    assert_eq!(thunk.force().unwrap(), Value::integer(3));
}

fn chain(length: usize) -> Value {
    let graph = Value::new_record(vec![]);
    if let Value::Record(r) = &graph {
        let mut r = r.borrow_mut();
        for i in 0..length {
            r.set(format!("k{}", i), evaluate(&format!("self.k{}", i + 1)));
        }
        r.set(format!("k{}", length), Value::integer(1));
    }
    graph
}

#[test]
fn test_nesting_depth_is_limited() {
    let graph = chain(MAX_NESTED_EVALUATIONS - 1);
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    let resolved = resolve_dynamic_data_structure(&evaluated).unwrap();
    assert_eq!(resolved.get_property("k0"), Value::integer(1));

    let graph = chain(MAX_NESTED_EVALUATIONS + 8);
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    assert_stack_exceeded(resolve_dynamic_data_structure(&evaluated));
}

#[test]
fn test_huge_sequence_index_fails() {
    let graph = from_json(&json!({
        "list": [1],
        "grow": {"__execute__": "self.list[1000000000000000] = 1; return 1"}
    }));
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    match resolve_dynamic_data_structure(&evaluated) {
        Err(GraphError::EvaluationFailure { message, .. }) => {
            assert!(message.contains("Invalid array length"), "{}", message);
        }
        other => panic!("expected an evaluation failure, got {:?}", other),
    }
    assert_eq!(graph.get_property("list").size(), Some(1));
}

#[test]
fn test_scripts_can_test_patterns() {
    use just_tools::runner::ds::pattern::Pattern;
    let graph = Value::new_record(vec![
        ("p", Value::new_pattern(Pattern::new("^a+$", "").unwrap())),
        ("hit", evaluate("self.p.test('aaa') && !self.p.global")),
        ("miss", evaluate("self.p.test('ab')")),
    ]);
    let evaluated = evaluate_dynamic_data_structure(&graph, &new_scope()).unwrap();
    let resolved = resolve_dynamic_data_structure(&evaluated).unwrap();
    assert_eq!(resolved.get_property("hit"), Value::Boolean(true));
    assert_eq!(resolved.get_property("miss"), Value::Boolean(false));
}
