//! Structural copy of value graphs.

use crate::runner::ds::error::GraphError;
use crate::runner::ds::operations::traversal::CycleTracker;
use crate::runner::ds::operations::type_conversion::classify;
use crate::runner::ds::value::{same_reference, Value};

/// Configuration of a structural copy.
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Deepest level to copy containers at, `-1` means unlimited. Containers
    /// below that level are replaced by `Null`.
    pub recursion_limit: i64,
    /// When set, repeated sub graphs are copied again on every occurrence
    /// instead of being referenced. Cyclic sources never terminate then.
    pub cyclic: bool,
}

impl CopyOptions {
    pub fn new() -> Self {
        CopyOptions {
            recursion_limit: -1,
            cyclic: false,
        }
    }

    pub fn with_recursion_limit(recursion_limit: i64) -> Self {
        CopyOptions {
            recursion_limit,
            cyclic: false,
        }
    }
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copies `source` with default options.
pub fn copy(source: &Value) -> Value {
    let mut tracker = CycleTracker::new();
    copy_value(source, &CopyOptions::default(), &mut tracker, 0)
}

/// Deep copies `source`, optionally into an existing `destination` container
/// of the same variant.
pub fn copy_with(
    source: &Value,
    options: &CopyOptions,
    destination: Option<&Value>,
) -> Result<Value, GraphError> {
    let mut tracker = CycleTracker::new();
    let destination = match destination {
        None => return Ok(copy_value(source, options, &mut tracker, 0)),
        Some(d) => d,
    };
    if !source.is_reference() {
        return Ok(destination.clone());
    }
    if same_reference(source, destination) {
        return Err(GraphError::InvalidOperation(
            "Can't copy because source and destination are identical.".to_string(),
        ));
    }
    let source_variant = classify(source);
    let destination_variant = classify(destination);
    if source_variant != destination_variant {
        return Err(GraphError::InvalidOperation(format!(
            "Can't copy a source of type \"{}\" into a destination of type \"{}\".",
            source_variant.as_str(),
            destination_variant.as_str()
        )));
    }
    match (source, destination) {
        (Value::Temporal(s), Value::Temporal(d)) => {
            let time = s.borrow().get_time();
            d.borrow_mut().set_time(time);
            Ok(destination.clone())
        }
        (Value::Pattern(s), Value::Pattern(d)) => {
            let reconstructed = s.borrow().reconstruct();
            *d.borrow_mut() = reconstructed;
            Ok(destination.clone())
        }
        _ => Ok(fill(source, destination, options, &mut tracker, 0)),
    }
}

fn copy_value(source: &Value, options: &CopyOptions, tracker: &mut CycleTracker, level: i64) -> Value {
    match source {
        Value::Sequence(_) => fill(source, &Value::new_sequence(vec![]), options, tracker, level),
        Value::Mapping(_) => fill(source, &Value::new_mapping(vec![]), options, tracker, level),
        Value::Set(_) => fill(source, &Value::new_set(vec![]), options, tracker, level),
        Value::Record(_) => fill(source, &Value::new_record(vec![]), options, tracker, level),
        Value::Temporal(t) => Value::new_temporal(t.borrow().clone()),
        Value::Pattern(p) => Value::new_pattern(p.borrow().reconstruct()),
        _ => source.clone(),
    }
}

/// Copies the children of `source` into `destination`, which has to be of
/// the same container variant.
fn fill(
    source: &Value,
    destination: &Value,
    options: &CopyOptions,
    tracker: &mut CycleTracker,
    level: i64,
) -> Value {
    if options.recursion_limit != -1 && options.recursion_limit < level {
        return Value::Null;
    }
    if !options.cyclic {
        if let Some(existing) = tracker.lookup(source) {
            trace!(level, "copy reuses an already copied sub graph");
            return existing;
        }
        tracker.record(source, destination);
    }
    match (source, destination) {
        (Value::Sequence(s), Value::Sequence(d)) => {
            let items = s.borrow().clone();
            for item in items {
                let copied = copy_child(&item, options, tracker, level);
                d.borrow_mut().push(copied);
            }
        }
        (Value::Mapping(s), Value::Mapping(d)) => {
            let entries = s.borrow().entries();
            for (key, value) in entries {
                let copied = copy_child(&value, options, tracker, level);
                d.borrow_mut().set(key, copied);
            }
        }
        (Value::Set(s), Value::Set(d)) => {
            let values = s.borrow().values();
            for value in values {
                let copied = copy_child(&value, options, tracker, level);
                d.borrow_mut().add(copied);
            }
        }
        (Value::Record(s), Value::Record(d)) => {
            let entries = s.borrow().entries();
            for (key, value) in entries {
                let copied = copy_child(&value, options, tracker, level);
                d.borrow_mut().set(key, copied);
            }
        }
        _ => {}
    }
    destination.clone()
}

fn copy_child(value: &Value, options: &CopyOptions, tracker: &mut CycleTracker, level: i64) -> Value {
    let result = copy_value(value, options, tracker, level + 1);
    if !options.cyclic && value.is_reference() && !tracker.contains(value) {
        tracker.record(value, &result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::pattern::Pattern;
    use crate::runner::ds::temporal::Temporal;

    #[test]
    fn test_scalars_are_returned_unchanged() {
        assert_eq!(copy(&Value::integer(3)), Value::integer(3));
        assert_eq!(copy(&Value::Null), Value::Null);
    }

    #[test]
    fn test_copy_onto_itself_fails() {
        let source = Value::new_sequence(vec![Value::integer(1)]);
        let result = copy_with(&source, &CopyOptions::default(), Some(&source));
        assert!(matches!(result, Err(GraphError::InvalidOperation(_))));
    }

    #[test]
    fn test_copy_into_other_variant_fails() {
        let source = Value::new_sequence(vec![]);
        let destination = Value::new_record(vec![]);
        assert!(copy_with(&source, &CopyOptions::default(), Some(&destination)).is_err());
    }

    #[test]
    fn test_copy_into_destination_appends() {
        let source = Value::new_sequence(vec![Value::integer(2)]);
        let destination = Value::new_sequence(vec![Value::integer(1)]);
        let result = copy_with(&source, &CopyOptions::default(), Some(&destination)).unwrap();
        assert!(same_reference(&result, &destination));
        assert_eq!(destination.size(), Some(2));
    }

    #[test]
    fn test_recursion_limit_replaces_deep_containers() {
        let source = Value::new_record(vec![
            ("flat", Value::integer(1)),
            ("nested", Value::new_record(vec![("x", Value::integer(2))])),
        ]);
        let result = copy_with(&source, &CopyOptions::with_recursion_limit(0), None).unwrap();
        assert_eq!(result.get_property("flat"), Value::integer(1));
        assert_eq!(result.get_property("nested"), Value::Null);
    }

    #[test]
    fn test_leaf_objects_are_reconstructed() {
        let mut pattern = Pattern::new("a", "g").unwrap();
        pattern.last_index = 4;
        let source = Value::new_sequence(vec![
            Value::new_temporal(Temporal::from_millis(1000)),
            Value::new_pattern(pattern),
        ]);
        let result = copy(&source);
        let (original_items, copied_items) = match (&source, &result) {
            (Value::Sequence(a), Value::Sequence(b)) => (a.borrow().clone(), b.borrow().clone()),
            _ => panic!("expected sequences"),
        };
        assert!(!same_reference(&original_items[0], &copied_items[0]));
        match (&copied_items[0], &copied_items[1]) {
            (Value::Temporal(t), Value::Pattern(p)) => {
                assert_eq!(t.borrow().get_time(), Some(1000));
                assert_eq!(p.borrow().last_index, 4);
                assert_eq!(p.borrow().to_string(), "/a/g");
            }
            _ => panic!("unexpected copy result"),
        }
    }

    #[test]
    fn test_shared_sub_graph_stays_shared() {
        let shared = Value::new_record(vec![("x", Value::integer(1))]);
        let source = Value::new_sequence(vec![shared.clone(), shared]);
        let result = copy(&source);
        if let Value::Sequence(items) = &result {
            let items = items.borrow();
            assert!(same_reference(&items[0], &items[1]));
        } else {
            panic!("expected a sequence");
        }
    }
}
