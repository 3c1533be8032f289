//! Cycle tracking shared by the recursive graph operations.
//!
//! A tracker records pairs of (visited source, materialized destination).
//! Before descending into a child the caller asks the tracker whether that
//! child's source was seen already and, if so, reuses the destination stored
//! at the same index instead of recursing. Lookups are by identity, never by
//! value. A tracker lives for exactly one top-level call and is threaded
//! through every recursive call by `&mut`.

use crate::runner::ds::value::{same_reference, Value};

#[derive(Default)]
pub struct CycleTracker {
    sources: Vec<Value>,
    destinations: Vec<Value>,
}

impl CycleTracker {
    pub fn new() -> Self {
        CycleTracker {
            sources: Vec::new(),
            destinations: Vec::new(),
        }
    }

    fn index_of(&self, source: &Value) -> Option<usize> {
        self.sources.iter().position(|s| same_reference(s, source))
    }

    /// Destination materialized for `source`, if it was visited before.
    pub fn lookup(&self, source: &Value) -> Option<Value> {
        self.index_of(source).map(|i| self.destinations[i].clone())
    }

    pub fn contains(&self, source: &Value) -> bool {
        self.index_of(source).is_some()
    }

    /// Records a visit. Scalars carry no identity and are ignored.
    pub fn record(&mut self, source: &Value, destination: &Value) {
        if source.is_reference() {
            self.sources.push(source.clone());
            self.destinations.push(destination.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
