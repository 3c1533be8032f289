use indexmap::IndexMap;

use crate::runner::ds::operations::test_and_comparison::same_value_zero;
use crate::runner::ds::value::Value;

/// Keyed collection whose keys may be any value. Keys are unique under
/// SameValueZero and iterate in insertion order.
pub struct MappingObject {
    entries: Vec<(Value, Value)>,
}
impl MappingObject {
    pub fn new() -> Self {
        MappingObject {
            entries: Vec::new(),
        }
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.entries.iter().position(|(k, _)| same_value_zero(k, key))
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn has(&self, key: &Value) -> bool {
        self.position(key).is_some()
    }

    /// Overwrites an existing entry in place, otherwise appends.
    pub fn set(&mut self, key: Value, value: Value) {
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn delete(&mut self, key: &Value) -> bool {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }

    /// Owned copy of all entries, safe to hold while the mapping is mutated.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.entries.clone()
    }
}

/// Collection of unique values (SameValueZero) in insertion order.
pub struct SetObject {
    items: Vec<Value>,
}
impl SetObject {
    pub fn new() -> Self {
        SetObject { items: Vec::new() }
    }

    pub fn add(&mut self, value: Value) -> bool {
        if self.has(&value) {
            false
        } else {
            self.items.push(value);
            true
        }
    }

    pub fn has(&self, value: &Value) -> bool {
        self.items.iter().any(|v| same_value_zero(v, value))
    }

    pub fn delete(&mut self, value: &Value) -> bool {
        match self.items.iter().position(|v| same_value_zero(v, value)) {
            Some(i) => {
                self.items.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    pub fn values(&self) -> Vec<Value> {
        self.items.clone()
    }
}

/// Plain keyed record: string keys, own properties only, insertion ordered.
pub struct RecordObject {
    properties: IndexMap<String, Value>,
}
impl RecordObject {
    pub fn new() -> Self {
        RecordObject {
            properties: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn has_own_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn set(&mut self, key: String, value: Value) {
        self.properties.insert(key, value);
    }

    /// Removes a property keeping the order of the remaining ones.
    pub fn delete(&mut self, key: &str) -> bool {
        self.properties.shift_remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.properties.iter()
    }

    pub fn entries(&self) -> Vec<(String, Value)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
