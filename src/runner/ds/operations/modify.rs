//! Structural patching driven by directive keys.
//!
//! A patch source mirrors the shape of its target. Ordinary keys descend into
//! the matching child of the target, directive keys change the container they
//! sit in:
//!
//! * `__remove__` lists sequence items to drop (literal values, or `__<n>__`
//!   for the item at index `n`) or record keys to delete.
//! * `__prepend__` / `__append__` list items to put in front of or behind a
//!   sequence.
//!
//! Applied directives are consumed: the directive key is deleted from the
//! source and the source record itself is deleted from its parent source.

use crate::runner::config::ToolsConfig;
use crate::runner::ds::operations::test_and_comparison::same_value_zero;
use crate::runner::ds::operations::traversal::CycleTracker;
use crate::runner::ds::value::Value;

#[derive(Debug, Clone)]
pub struct ModifyOptions {
    pub remove_key: String,
    pub prepend_key: String,
    pub append_key: String,
    pub position_prefix: String,
    pub position_suffix: String,
}

impl Default for ModifyOptions {
    fn default() -> Self {
        ModifyOptions {
            remove_key: "__remove__".to_string(),
            prepend_key: "__prepend__".to_string(),
            append_key: "__append__".to_string(),
            position_prefix: "__".to_string(),
            position_suffix: "__".to_string(),
        }
    }
}

impl ModifyOptions {
    pub fn from_config(config: &ToolsConfig) -> Self {
        let directives = &config.directives;
        ModifyOptions {
            remove_key: directives.remove_key.clone(),
            prepend_key: directives.prepend_key.clone(),
            append_key: directives.append_key.clone(),
            position_prefix: directives.position_prefix.clone(),
            position_suffix: directives.position_suffix.clone(),
        }
    }

    fn is_directive(&self, key: &str) -> bool {
        key == self.remove_key || key == self.prepend_key || key == self.append_key
    }

    /// Index encoded as `<prefix><n><suffix>`, negative values count from
    /// the end.
    fn position(&self, value: &Value, length: usize) -> Option<usize> {
        let text = value.as_str()?;
        if text.len() < self.position_prefix.len() + self.position_suffix.len()
            || !text.starts_with(self.position_prefix.as_str())
            || !text.ends_with(self.position_suffix.as_str())
        {
            return None;
        }
        let inner = &text[self.position_prefix.len()..text.len() - self.position_suffix.len()];
        let index = inner.parse::<i64>().ok()?;
        let index = if index < 0 { length as i64 + index } else { index };
        if index < 0 {
            None
        } else {
            Some(index as usize)
        }
    }
}

pub fn modify_object(target: &Value, source: &Value) -> Value {
    modify_object_with(target, source, &ModifyOptions::default())
}

/// Applies `source` onto `target` in place and returns `target`.
pub fn modify_object_with(target: &Value, source: &Value, options: &ModifyOptions) -> Value {
    let mut tracker = CycleTracker::new();
    modify(target, source, options, None, &mut tracker)
}

/// Wraps a directive's value into a list.
fn as_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Sequence(items) => items.borrow().clone(),
        other => vec![other.clone()],
    }
}

fn delete_from_parent(parent: Option<(&Value, &Value)>) {
    match parent {
        Some((Value::Record(r), Value::String(key))) => {
            r.borrow_mut().delete(key);
        }
        Some((Value::Mapping(m), key)) => {
            m.borrow_mut().delete(key);
        }
        _ => {}
    }
}

fn apply_to_sequence(target: &Value, key: &str, value: &Value, options: &ModifyOptions) {
    let items = match target {
        Value::Sequence(items) => items,
        _ => return,
    };
    let values = as_list(value);
    if key == options.remove_key {
        for value_to_remove in values {
            let length = items.borrow().len();
            let index = match options.position(&value_to_remove, length) {
                Some(index) => Some(index),
                None => items
                    .borrow()
                    .iter()
                    .position(|item| same_value_zero(item, &value_to_remove)),
            };
            if let Some(index) = index {
                if index < length {
                    items.borrow_mut().remove(index);
                }
            }
        }
    } else if key == options.prepend_key {
        let mut combined = values;
        combined.extend(items.borrow().iter().cloned());
        *items.borrow_mut() = combined;
    } else {
        items.borrow_mut().extend(values);
    }
}

fn child_of(target: &Value, key: &str) -> Option<Value> {
    match target {
        Value::Record(r) => r.borrow().get(key).cloned(),
        Value::Sequence(items) => {
            let index = key.parse::<usize>().ok()?;
            items.borrow().get(index).cloned()
        }
        _ => None,
    }
}

fn replace_child(target: &Value, key: &str, value: Value) {
    match target {
        Value::Record(r) => r.borrow_mut().set(key.to_string(), value),
        Value::Sequence(items) => {
            if let Ok(index) = key.parse::<usize>() {
                if let Some(slot) = items.borrow_mut().get_mut(index) {
                    *slot = value;
                }
            }
        }
        _ => {}
    }
}

fn modify(
    target: &Value,
    source: &Value,
    options: &ModifyOptions,
    parent: Option<(&Value, &Value)>,
    tracker: &mut CycleTracker,
) -> Value {
    if source.is_container() {
        if tracker.contains(source) {
            trace!("patch source visited already, skipping");
            return target.clone();
        }
        tracker.record(source, target);
    }
    match (target, source) {
        (Value::Mapping(t), Value::Mapping(s)) => {
            let entries = s.borrow().entries();
            for (key, value) in entries {
                let child = t.borrow().get(&key).cloned();
                if let Some(child) = child {
                    modify(&child, &value, options, Some((source, &key)), tracker);
                }
            }
        }
        (Value::Record(_), Value::Record(s)) | (Value::Sequence(_), Value::Record(s)) => {
            let entries = s.borrow().entries();
            for (key, value) in entries {
                if options.is_directive(&key) {
                    match target {
                        Value::Sequence(_) => apply_to_sequence(target, &key, &value, options),
                        Value::Record(t) if key == options.remove_key => {
                            for name in as_list(&value) {
                                if let Value::String(name) = name {
                                    t.borrow_mut().delete(&name);
                                }
                            }
                        }
                        _ => {}
                    }
                    debug!(directive = key.as_str(), "applied patch directive");
                    s.borrow_mut().delete(&key);
                    delete_from_parent(parent);
                } else if let Some(child) = child_of(target, &key) {
                    let key_value = Value::String(key.clone());
                    let result = modify(&child, &value, options, Some((source, &key_value)), tracker);
                    replace_child(target, &key, result);
                }
            }
        }
        (Value::Sequence(_), Value::Sequence(s)) | (Value::Record(_), Value::Sequence(s)) => {
            let items = s.borrow().clone();
            for (index, value) in items.iter().enumerate() {
                let key = index.to_string();
                if let Some(child) = child_of(target, &key) {
                    let result = modify(&child, value, options, None, tracker);
                    replace_child(target, &key, result);
                }
            }
        }
        _ => {}
    }
    target.clone()
}
