//! Tests for structural copy.

extern crate just_tools;

use just_tools::runner::ds::error::GraphError;
use just_tools::runner::ds::function_object::FunctionObject;
use just_tools::runner::ds::operations::copy::{copy, copy_with, CopyOptions};
use just_tools::runner::ds::operations::test_and_comparison::equals;
use just_tools::runner::ds::pattern::Pattern;
use just_tools::runner::ds::temporal::Temporal;
use just_tools::runner::ds::value::{same_reference, Value};

fn identity() -> FunctionObject {
    FunctionObject::new("identity", |args| Ok(args.first().cloned().unwrap_or(Value::Undefined)))
}

fn sample_graph() -> Value {
    Value::new_record(vec![
        ("name", Value::string("graph")),
        ("count", Value::integer(3)),
        ("ratio", Value::float(0.5)),
        ("missing", Value::Null),
        (
            "list",
            Value::new_sequence(vec![
                Value::integer(1),
                Value::new_record(vec![("deep", Value::Boolean(true))]),
            ]),
        ),
        (
            "lookup",
            Value::new_mapping(vec![(Value::integer(1), Value::string("one"))]),
        ),
        ("tags", Value::new_set(vec![Value::string("a"), Value::string("b")])),
        ("created", Value::new_temporal(Temporal::from_millis(86_400_000))),
        ("matcher", Value::new_pattern(Pattern::new("^a+$", "i").unwrap())),
    ])
}

#[test]
fn test_copy_is_equal_but_not_identical() {
    let graph = sample_graph();
    let duplicate = copy(&graph);
    assert!(equals(&duplicate, &graph));
    assert!(!same_reference(&duplicate, &graph));
    assert!(!same_reference(
        &duplicate.get_property("list"),
        &graph.get_property("list")
    ));
    assert!(!same_reference(
        &duplicate.get_property("created"),
        &graph.get_property("created")
    ));
}

#[test]
fn test_copy_does_not_mutate_source() {
    let graph = sample_graph();
    let duplicate = copy(&graph);
    if let Value::Record(r) = &duplicate {
        r.borrow_mut().set("name".to_string(), Value::string("changed"));
    }
    assert_eq!(graph.get_property("name"), Value::string("graph"));
}

#[test]
fn test_cycle_collapses_onto_copy() {
    let graph = Value::new_record(vec![("value", Value::integer(1))]);
    if let Value::Record(r) = &graph {
        r.borrow_mut().set("self".to_string(), graph.clone());
    }
    let duplicate = copy(&graph);
    assert!(same_reference(&duplicate.get_property("self"), &duplicate));
    assert!(!same_reference(&duplicate.get_property("self"), &graph));
}

#[test]
fn test_self_containing_sequence() {
    let sequence = Value::new_sequence(vec![Value::integer(1)]);
    if let Value::Sequence(items) = &sequence {
        items.borrow_mut().push(sequence.clone());
    }
    let duplicate = copy(&sequence);
    match &duplicate {
        Value::Sequence(items) => assert!(same_reference(&items.borrow()[1], &duplicate)),
        other => panic!("expected a sequence, got {:?}", other),
    }
}

#[test]
fn test_shared_subgraph_stays_shared() {
    let shared = Value::new_sequence(vec![Value::integer(1)]);
    let graph = Value::new_record(vec![("a", shared.clone()), ("b", shared)]);
    let duplicate = copy(&graph);
    assert!(same_reference(
        &duplicate.get_property("a"),
        &duplicate.get_property("b")
    ));
}

#[test]
fn test_recursion_limit_replaces_nested_containers() {
    let graph = Value::new_record(vec![(
        "outer",
        Value::new_record(vec![("inner", Value::new_sequence(vec![]))]),
    )]);
    let duplicate = copy_with(&graph, &CopyOptions::with_recursion_limit(1), None).unwrap();
    let outer = duplicate.get_property("outer");
    assert!(outer.as_record().is_some());
    assert_eq!(outer.get_property("inner"), Value::Null);
}

#[test]
fn test_scalars_and_functions_are_returned_as_is() {
    assert_eq!(copy(&Value::integer(7)), Value::integer(7));
    let function = Value::new_function(identity());
    assert!(same_reference(&copy(&function), &function));
}

#[test]
fn test_copy_into_destination() {
    let source = Value::new_sequence(vec![Value::integer(1), Value::integer(2)]);
    let destination = Value::new_sequence(vec![Value::string("old")]);
    let result = copy_with(&source, &CopyOptions::default(), Some(&destination)).unwrap();
    assert!(same_reference(&result, &destination));
    assert!(equals(&destination, &source));
}

#[test]
fn test_copy_onto_itself_is_rejected() {
    let source = Value::new_record(vec![]);
    let result = copy_with(&source, &CopyOptions::default(), Some(&source));
    assert!(matches!(result, Err(GraphError::InvalidOperation(_))));
}

#[test]
fn test_pattern_cursor_is_copied() {
    let pattern = Value::new_pattern(Pattern::new("a", "g").unwrap());
    if let Value::Pattern(p) = &pattern {
        assert!(p.borrow_mut().test("xa"));
    }
    let duplicate = copy(&pattern);
    match (&pattern, &duplicate) {
        (Value::Pattern(original), Value::Pattern(copied)) => {
            assert_eq!(original.borrow().last_index, copied.borrow().last_index);
            assert_eq!(copied.borrow().to_string(), "/a/g");
        }
        _ => panic!("expected patterns"),
    }
}
