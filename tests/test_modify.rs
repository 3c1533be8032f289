extern crate just_tools;

use just_tools::runner::config::ToolsConfig;
use just_tools::runner::ds::operations::modify::{modify_object, modify_object_with, ModifyOptions};
use just_tools::runner::ds::operations::test_and_comparison::equals;
use just_tools::runner::ds::value::{same_reference, Value};

fn ints(values: &[i64]) -> Value {
    Value::new_sequence(values.iter().map(|v| Value::integer(*v)).collect())
}

#[test]
fn test_remove_by_index_marker() {
    let target = ints(&[10, 20, 30]);
    let patch = Value::new_record(vec![("__remove__", Value::new_sequence(vec![Value::string("__1__")]))]);
    let result = modify_object(&target, &patch);
    assert!(same_reference(&result, &target));
    assert!(equals(&target, &ints(&[10, 30])));
}

#[test]
fn test_remove_with_negative_index() {
    let target = ints(&[1, 2, 3]);
    let patch = Value::new_record(vec![("__remove__", Value::string("__-1__"))]);
    modify_object(&target, &patch);
    assert!(equals(&target, &ints(&[1, 2])));
}

#[test]
fn test_remove_literal_values() {
    let target = Value::new_sequence(vec![Value::string("a"), Value::string("b"), Value::string("c")]);
    let patch = Value::new_record(vec![(
        "__remove__",
        Value::new_sequence(vec![Value::string("c"), Value::string("a"), Value::string("z")]),
    )]);
    modify_object(&target, &patch);
    assert!(equals(&target, &Value::new_sequence(vec![Value::string("b")])));
}

#[test]
fn test_prepend_and_append_in_nested_record() {
    let target = Value::new_record(vec![
        ("list", ints(&[2])),
        ("other", Value::string("unchanged")),
    ]);
    let patch = Value::new_record(vec![(
        "list",
        Value::new_record(vec![
            ("__prepend__", ints(&[0, 1])),
            ("__append__", Value::integer(3)),
        ]),
    )]);
    modify_object(&target, &patch);
    assert!(equals(&target.get_property("list"), &ints(&[0, 1, 2, 3])));
    assert_eq!(target.get_property("other"), Value::string("unchanged"));
}

#[test]
fn test_applied_directives_are_consumed() {
    let target = Value::new_record(vec![("list", ints(&[1]))]);
    let patch = Value::new_record(vec![(
        "list",
        Value::new_record(vec![("__append__", Value::integer(2))]),
    )]);
    modify_object(&target, &patch);
    assert_eq!(patch.size(), Some(0));
}

#[test]
fn test_patching_sequence_items_by_position() {
    let target = Value::new_sequence(vec![ints(&[1]), ints(&[2])]);
    let patch = Value::new_sequence(vec![
        Value::new_record(vec![]),
        Value::new_record(vec![("__append__", Value::integer(3))]),
    ]);
    modify_object(&target, &patch);
    let expected = Value::new_sequence(vec![ints(&[1]), ints(&[2, 3])]);
    assert!(equals(&target, &expected));
}

#[test]
fn test_record_keys_can_be_removed() {
    let target = Value::new_record(vec![
        ("a", Value::integer(1)),
        ("b", Value::integer(2)),
        ("c", Value::integer(3)),
    ]);
    let patch = Value::new_record(vec![(
        "__remove__",
        Value::new_sequence(vec![Value::string("a"), Value::string("c")]),
    )]);
    modify_object(&target, &patch);
    assert!(equals(&target, &Value::new_record(vec![("b", Value::integer(2))])));
}

#[test]
fn test_patch_through_mapping() {
    let list = ints(&[1]);
    let target = Value::new_mapping(vec![(Value::string("k"), list.clone())]);
    let patch = Value::new_mapping(vec![(
        Value::string("k"),
        Value::new_record(vec![("__append__", Value::integer(2))]),
    )]);
    modify_object(&target, &patch);
    assert!(equals(&list, &ints(&[1, 2])));
}

#[test]
fn test_configured_directive_keys() {
    let config = ToolsConfig::parse(
        r##"{"directives": {"append_key": "+", "position_prefix": "#", "position_suffix": "", "remove_key": "-"}}"##,
    )
    .unwrap();
    let options = ModifyOptions::from_config(&config);
    let target = ints(&[1, 2, 3]);
    let patch = Value::new_record(vec![
        ("-", Value::string("#0")),
        ("+", Value::integer(4)),
    ]);
    modify_object_with(&target, &patch, &options);
    assert!(equals(&target, &ints(&[2, 3, 4])));
}

#[test]
fn test_cyclic_patch_terminates() {
    let target = Value::new_record(vec![("a", Value::new_record(vec![]))]);
    let patch = Value::new_record(vec![]);
    if let Value::Record(r) = &patch {
        r.borrow_mut().set("a".to_string(), patch.clone());
    }
    let result = modify_object(&target, &patch);
    assert!(same_reference(&result, &target));
}
