use crate::runner::ds::operations::test_and_comparison::strict_equals;
use crate::runner::ds::value::{same_reference, Value};

/// Merges `sources` from left to right into `target` and returns the result.
///
/// Records merge into records and mappings into mappings, key by key. Sets,
/// temporals, patterns and blobs carry no own keys, so merging one of them
/// with a record leaves the record target untouched. Any other combination
/// replaces the accumulated target with the source, so the returned value is
/// not necessarily `target`. With `deep` set, nested
/// records and mappings are merged recursively. Sequences, sets and scalars
/// are always replaced, never merged element-wise.
pub fn extend(deep: bool, target: Value, sources: &[Value]) -> Value {
    let mut target = target;
    for source in sources {
        let merged = match (&target, source) {
            (Value::Record(t), Value::Record(s)) if !same_reference(&target, source) => {
                let entries = s.borrow().entries();
                for (key, value) in entries {
                    let existing = t.borrow().get(&key).cloned().unwrap_or(Value::Undefined);
                    let result = merge_value(deep, &existing, &value);
                    t.borrow_mut().set(key, result);
                }
                true
            }
            (Value::Mapping(t), Value::Mapping(s)) if !same_reference(&target, source) => {
                let entries = s.borrow().entries();
                for (key, value) in entries {
                    let existing = t.borrow().get(&key).cloned().unwrap_or(Value::Undefined);
                    let result = merge_value(deep, &existing, &value);
                    t.borrow_mut().set(key, result);
                }
                true
            }
            (Value::Record(_), other) if is_keyless_object(other) => true,
            _ => false,
        };
        if !merged {
            target = source.clone();
        }
    }
    target
}

fn is_keyless_object(value: &Value) -> bool {
    matches!(
        value,
        Value::Set(_) | Value::Temporal(_) | Value::Pattern(_) | Value::Blob(_)
    )
}

fn merge_value(deep: bool, existing: &Value, incoming: &Value) -> Value {
    if strict_equals(incoming, existing) {
        return existing.clone();
    }
    if deep {
        match incoming {
            Value::Mapping(_) => {
                let clone = match existing {
                    Value::Mapping(_) => existing.clone(),
                    _ => Value::new_mapping(vec![]),
                };
                return extend(deep, clone, &[incoming.clone()]);
            }
            Value::Record(_) => {
                let clone = match existing {
                    Value::Record(_) => existing.clone(),
                    _ => Value::new_record(vec![]),
                };
                return extend(deep, clone, &[incoming.clone()]);
            }
            _ => {}
        }
    }
    incoming.clone()
}
