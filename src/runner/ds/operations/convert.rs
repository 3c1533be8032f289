//! Conversions between value graph shapes and to or from JSON.

use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map as JsonMap, Number as JsonNumber, Serializer, Value as JsonValue};

use crate::runner::ds::error::GraphError;
use crate::runner::ds::operations::traversal::CycleTracker;
use crate::runner::ds::operations::type_conversion::to_display_string;
use crate::runner::ds::value::{NumberType, Value};

pub const CIRCULAR_REFERENCE_REPLACEMENT: &str = "__circularReference__";

/// Converts to JSON, replacing every container met a second time with
/// `"__circularReference__"`.
pub fn to_json(value: &Value) -> JsonValue {
    let replacement = JsonValue::String(CIRCULAR_REFERENCE_REPLACEMENT.to_string());
    let mut seen = vec![];
    json_value(value, &replacement, &mut seen).unwrap_or(JsonValue::Null)
}

/// Serializes `value` as JSON text. Containers already emitted are replaced
/// by `replacement`. `number_of_spaces` of zero gives compact output.
pub fn convert_circular_object_to_json(
    value: &Value,
    replacement: &JsonValue,
    number_of_spaces: usize,
) -> Result<String, GraphError> {
    let mut seen = vec![];
    let json = json_value(value, replacement, &mut seen).unwrap_or(JsonValue::Null);
    if number_of_spaces == 0 {
        return serde_json::to_string(&json).map_err(|e| GraphError::InvalidOperation(e.to_string()));
    }
    let indent = " ".repeat(number_of_spaces);
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent.as_bytes()));
    json.serialize(&mut serializer)
        .map_err(|e| GraphError::InvalidOperation(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| GraphError::InvalidOperation(e.to_string()))
}

/// `None` marks values JSON has no representation for; they are dropped from
/// records and become `null` in arrays.
fn json_value(value: &Value, replacement: &JsonValue, seen: &mut Vec<usize>) -> Option<JsonValue> {
    if let Some(address) = value.reference_address() {
        if value.is_container() || matches!(value, Value::Lazy(_)) {
            if seen.contains(&address) {
                return Some(replacement.clone());
            }
            seen.push(address);
        }
    }
    Some(match value {
        Value::Undefined | Value::Function(_) => return None,
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Number(NumberType::Integer(i)) => JsonValue::Number(JsonNumber::from(*i)),
        Value::Number(n) => JsonNumber::from_f64(n.as_f64())
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Temporal(t) => match t.borrow().get_time() {
            Some(_) => JsonValue::String(t.borrow().to_string()),
            None => JsonValue::Null,
        },
        Value::Pattern(_) | Value::Blob(_) => JsonValue::Object(JsonMap::new()),
        Value::Sequence(items) => {
            let items = items.borrow().clone();
            JsonValue::Array(
                items
                    .iter()
                    .map(|item| json_value(item, replacement, seen).unwrap_or(JsonValue::Null))
                    .collect(),
            )
        }
        Value::Set(s) => {
            let items = s.borrow().values();
            JsonValue::Array(
                items
                    .iter()
                    .map(|item| json_value(item, replacement, seen).unwrap_or(JsonValue::Null))
                    .collect(),
            )
        }
        Value::Mapping(m) => {
            let entries = m.borrow().entries();
            let mut object = JsonMap::new();
            for (key, item) in entries {
                if let Some(json) = json_value(&item, replacement, seen) {
                    object.insert(to_display_string(&key), json);
                }
            }
            JsonValue::Object(object)
        }
        Value::Record(r) => json_object(r.borrow().entries(), replacement, seen),
        Value::Lazy(l) => json_object(l.target().borrow().entries(), replacement, seen),
    })
}

fn json_object(entries: Vec<(String, Value)>, replacement: &JsonValue, seen: &mut Vec<usize>) -> JsonValue {
    let mut object = JsonMap::new();
    for (key, item) in entries {
        if let Some(json) = json_value(&item, replacement, seen) {
            object.insert(key, json);
        }
    }
    JsonValue::Object(object)
}

/// Builds a value graph from JSON. Objects become records, arrays sequences.
pub fn from_json(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::integer(i),
            None => Value::float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::new_sequence(items.iter().map(from_json).collect()),
        JsonValue::Object(object) => {
            let record = Value::new_record(vec![]);
            if let Value::Record(r) = &record {
                let mut r = r.borrow_mut();
                for (key, item) in object {
                    r.set(key.clone(), from_json(item));
                }
            }
            record
        }
    }
}

/// Replaces mappings by records keyed with the textual form of each key.
/// Containers other than mappings are converted in place when `deep` is set.
pub fn convert_map_to_record(value: &Value, deep: bool) -> Value {
    let mut tracker = CycleTracker::new();
    convert_shape(value, deep, true, &mut tracker)
}

/// Replaces records by mappings with string keys. Containers other than
/// records are converted in place when `deep` is set.
pub fn convert_record_to_map(value: &Value, deep: bool) -> Value {
    let mut tracker = CycleTracker::new();
    convert_shape(value, deep, false, &mut tracker)
}

fn convert_shape(value: &Value, deep: bool, to_record: bool, tracker: &mut CycleTracker) -> Value {
    if !value.is_container() {
        return value.clone();
    }
    if let Some(converted) = tracker.lookup(value) {
        return converted;
    }
    match value {
        Value::Mapping(m) if to_record => {
            let result = Value::new_record(vec![]);
            tracker.record(value, &result);
            let entries = m.borrow().entries();
            for (key, item) in entries {
                let item = if deep {
                    convert_shape(&item, deep, to_record, tracker)
                } else {
                    item
                };
                if let Value::Record(r) = &result {
                    r.borrow_mut().set(to_display_string(&key), item);
                }
            }
            result
        }
        Value::Record(r) if !to_record => {
            let result = Value::new_mapping(vec![]);
            tracker.record(value, &result);
            let entries = r.borrow().entries();
            for (key, item) in entries {
                let item = if deep {
                    convert_shape(&item, deep, to_record, tracker)
                } else {
                    item
                };
                if let Value::Mapping(m) = &result {
                    m.borrow_mut().set(Value::String(key), item);
                }
            }
            result
        }
        _ if !deep => value.clone(),
        Value::Sequence(items) => {
            tracker.record(value, value);
            let snapshot = items.borrow().clone();
            let converted: Vec<Value> = snapshot
                .iter()
                .map(|item| convert_shape(item, deep, to_record, tracker))
                .collect();
            *items.borrow_mut() = converted;
            value.clone()
        }
        Value::Set(s) => {
            tracker.record(value, value);
            let snapshot = s.borrow().values();
            let converted: Vec<Value> = snapshot
                .iter()
                .map(|item| convert_shape(item, deep, to_record, tracker))
                .collect();
            let mut set = s.borrow_mut();
            set.clear();
            for item in converted {
                set.add(item);
            }
            drop(set);
            value.clone()
        }
        Value::Mapping(m) => {
            tracker.record(value, value);
            let entries = m.borrow().entries();
            for (key, item) in entries {
                let converted = convert_shape(&item, deep, to_record, tracker);
                m.borrow_mut().set(key, converted);
            }
            value.clone()
        }
        Value::Record(r) => {
            tracker.record(value, value);
            let entries = r.borrow().entries();
            for (key, item) in entries {
                let converted = convert_shape(&item, deep, to_record, tracker);
                r.borrow_mut().set(key, converted);
            }
            value.clone()
        }
        _ => value.clone(),
    }
}

/// Follows `selector` (components separated by `delimiter`) through records,
/// mappings with string keys and sequence indices. Components that do not
/// resolve are skipped. Thunks on the way are forced.
pub fn get_substructure(target: &Value, selector: &str, delimiter: &str) -> Result<Value, GraphError> {
    let mut result = target.clone();
    for name in selector.split(delimiter) {
        if let Value::Lazy(l) = &result {
            let forced = l.force()?;
            result = forced;
        }
        let next = match &result {
            Value::Record(r) => r.borrow().get(name).cloned(),
            Value::Mapping(m) => m.borrow().get(&Value::string(name)).cloned(),
            Value::Sequence(items) => name
                .parse::<usize>()
                .ok()
                .and_then(|index| items.borrow().get(index).cloned()),
            _ => None,
        };
        if let Some(next) = next {
            result = next;
        }
    }
    Ok(result)
}

/// Recursively removes record and mapping keys matching `^<key>[0-9]*$` and
/// sequence or set strings starting with `<key>:`.
pub fn remove_keys(value: &Value, keys: &[&str]) -> Value {
    let patterns: Vec<Regex> = keys
        .iter()
        .filter_map(|key| Regex::new(&format!("^{}[0-9]*$", regex::escape(key))).ok())
        .collect();
    let prefixes: Vec<String> = keys.iter().map(|key| format!("{}:", key)).collect();
    let mut tracker = CycleTracker::new();
    strip(value, &patterns, &prefixes, &mut tracker);
    value.clone()
}

fn strip(value: &Value, patterns: &[Regex], prefixes: &[String], tracker: &mut CycleTracker) {
    if !value.is_container() || tracker.contains(value) {
        return;
    }
    tracker.record(value, value);
    let is_tagged = |item: &Value| match item {
        Value::String(s) => prefixes.iter().any(|prefix| s.starts_with(prefix.as_str())),
        _ => false,
    };
    let matches_key = |key: &str| patterns.iter().any(|pattern| pattern.is_match(key));
    match value {
        Value::Sequence(items) => {
            items.borrow_mut().retain(|item| !is_tagged(item));
            let snapshot = items.borrow().clone();
            for item in snapshot.iter() {
                strip(item, patterns, prefixes, tracker);
            }
        }
        Value::Set(s) => {
            let snapshot = s.borrow().values();
            for item in snapshot.iter() {
                if is_tagged(item) {
                    s.borrow_mut().delete(item);
                } else {
                    strip(item, patterns, prefixes, tracker);
                }
            }
        }
        Value::Mapping(m) => {
            let entries = m.borrow().entries();
            for (key, item) in entries.iter() {
                match key {
                    Value::String(k) if matches_key(k) => {
                        m.borrow_mut().delete(key);
                    }
                    _ => strip(item, patterns, prefixes, tracker),
                }
            }
        }
        Value::Record(r) => {
            let entries = r.borrow().entries();
            for (key, item) in entries.iter() {
                if matches_key(key) {
                    r.borrow_mut().delete(key);
                } else {
                    strip(item, patterns, prefixes, tracker);
                }
            }
        }
        _ => {}
    }
}

/// Indices of a sequence or the sorted keys of a mapping or record.
pub fn sorted_keys(value: &Value) -> Vec<Value> {
    let mut keys: Vec<Value> = match value {
        Value::Sequence(items) => (0..items.borrow().len()).map(|i| Value::integer(i as i64)).collect(),
        Value::Mapping(m) => m.borrow().iter().map(|(key, _)| key.clone()).collect(),
        Value::Record(r) => r.borrow().keys().into_iter().map(Value::String).collect(),
        _ => vec![],
    };
    keys.sort_by_key(to_display_string);
    keys
}
