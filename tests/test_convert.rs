extern crate just_tools;

use just_tools::runner::ds::operations::convert::{
    convert_circular_object_to_json, convert_map_to_record, convert_record_to_map, from_json,
    get_substructure, remove_keys, sorted_keys, to_json,
};
use just_tools::runner::ds::operations::test_and_comparison::equals;
use just_tools::runner::ds::value::{same_reference, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_json_round_trip_of_plain_data() {
    let json = json!({"a": [1, 2.5, "x", null, true], "b": {"c": {}}});
    assert_eq!(to_json(&from_json(&json)), json);
}

#[test]
fn test_cycles_are_replaced_in_json() {
    let graph = Value::new_record(vec![("a", Value::integer(1))]);
    if let Value::Record(r) = &graph {
        r.borrow_mut().set("self".to_string(), graph.clone());
    }
    assert_eq!(to_json(&graph), json!({"a": 1, "self": "__circularReference__"}));
    assert_eq!(
        convert_circular_object_to_json(&graph, &json!(null), 0).unwrap(),
        r#"{"a":1,"self":null}"#
    );
    assert_eq!(
        convert_circular_object_to_json(&graph, &json!("seen"), 2).unwrap(),
        "{\n  \"a\": 1,\n  \"self\": \"seen\"\n}"
    );
}

#[test]
fn test_map_and_record_conversion() {
    let mapping = Value::new_mapping(vec![
        (Value::integer(1), Value::string("one")),
        (
            Value::string("inner"),
            Value::new_mapping(vec![(Value::string("x"), Value::Boolean(true))]),
        ),
    ]);
    let shallow = convert_map_to_record(&mapping, false);
    assert_eq!(shallow.get_property("1"), Value::string("one"));
    assert!(matches!(shallow.get_property("inner"), Value::Mapping(_)));

    let deep = convert_map_to_record(&mapping, true);
    assert_eq!(deep.get_property("inner").get_property("x"), Value::Boolean(true));

    let back = convert_record_to_map(&deep, true);
    let expected = Value::new_mapping(vec![
        (Value::string("1"), Value::string("one")),
        (
            Value::string("inner"),
            Value::new_mapping(vec![(Value::string("x"), Value::Boolean(true))]),
        ),
    ]);
    assert!(equals(&back, &expected));
}

#[test]
fn test_conversion_keeps_shared_structure() {
    let shared = Value::new_record(vec![("v", Value::integer(1))]);
    let list = Value::new_sequence(vec![shared.clone(), shared]);
    let converted = convert_record_to_map(&list, true);
    assert!(same_reference(&converted, &list));
    match &converted {
        Value::Sequence(items) => {
            let items = items.borrow();
            assert!(matches!(items[0], Value::Mapping(_)));
            assert!(same_reference(&items[0], &items[1]));
        }
        other => panic!("expected a sequence, got {:?}", other),
    }
}

#[test]
fn test_get_substructure() {
    let graph = from_json(&json!({"a": {"b": [10, {"c": "found"}]}}));
    assert_eq!(
        get_substructure(&graph, "a.b.1.c", ".").unwrap(),
        Value::string("found")
    );
    assert_eq!(
        get_substructure(&graph, "a/missing/b/0", "/").unwrap(),
        Value::integer(10)
    );
}

#[test]
fn test_remove_keys() {
    let graph = from_json(&json!({
        "keep": 1,
        "meta": 2,
        "meta12": 3,
        "metadata": 4,
        "list": ["meta:drop", "keep", {"meta": 5, "x": 6}]
    }));
    remove_keys(&graph, &["meta"]);
    assert_eq!(
        to_json(&graph),
        json!({"keep": 1, "metadata": 4, "list": ["keep", {"x": 6}]})
    );
}

#[test]
fn test_sorted_keys() {
    let record = Value::new_record(vec![("b", Value::Null), ("a", Value::Null)]);
    assert_eq!(sorted_keys(&record), vec![Value::string("a"), Value::string("b")]);
    let sequence = Value::new_sequence(vec![Value::Null, Value::Null]);
    assert_eq!(sorted_keys(&sequence), vec![Value::integer(0), Value::integer(1)]);
    assert!(sorted_keys(&Value::integer(1)).is_empty());
}
