//! `Tools` bundles the graph operations with a configuration and owns the
//! named critical sections.

use std::future::Future;

use crate::runner::config::ToolsConfig;
use crate::runner::ds::error::GraphError;
use crate::runner::ds::operations::copy::{copy_with, CopyOptions};
use crate::runner::ds::operations::extend::extend;
use crate::runner::ds::operations::modify::{modify_object_with, ModifyOptions};
use crate::runner::ds::operations::represent::{represent_object_with, RepresentOptions};
use crate::runner::ds::operations::test_and_comparison::{equals_with, Equality, EqualsOptions};
use crate::runner::ds::value::{RecordRef, Value};
use crate::runner::eval::dynamic::{
    evaluate_dynamic_data_structure_with, resolve_dynamic_data_structure, DynamicOptions,
};
use crate::runner::sync::{LockManager, LockTicket, Semaphore};

pub struct Tools {
    config: ToolsConfig,
    locks: LockManager,
}

impl Default for Tools {
    fn default() -> Self {
        Tools::new(ToolsConfig::default())
    }
}

impl Tools {
    pub fn new(config: ToolsConfig) -> Self {
        Tools {
            config,
            locks: LockManager::new(),
        }
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    pub fn copy(&self, source: &Value) -> Value {
        crate::runner::ds::operations::copy::copy(source)
    }

    pub fn copy_with(
        &self,
        source: &Value,
        options: &CopyOptions,
        destination: Option<&Value>,
    ) -> Result<Value, GraphError> {
        copy_with(source, options, destination)
    }

    pub fn equals(&self, first: &Value, second: &Value) -> bool {
        crate::runner::ds::operations::test_and_comparison::equals(first, second)
    }

    pub fn equals_with(&self, first: &Value, second: &Value, options: &EqualsOptions) -> Equality {
        equals_with(first, second, options)
    }

    pub fn extend(&self, deep: bool, target: Value, sources: &[Value]) -> Value {
        extend(deep, target, sources)
    }

    /// Applies `source` as a patch using the configured directive keys.
    pub fn modify_object(&self, target: &Value, source: &Value) -> Value {
        modify_object_with(target, source, &ModifyOptions::from_config(&self.config))
    }

    pub fn represent_object(&self, value: &Value) -> String {
        represent_object_with(value, &RepresentOptions::from_config(&self.config))
    }

    pub fn evaluate_dynamic_data_structure(
        &self,
        graph: &Value,
        scope: &RecordRef,
    ) -> Result<Value, GraphError> {
        evaluate_dynamic_data_structure_with(graph, scope, &DynamicOptions::from_config(&self.config))
    }

    /// Evaluates `graph` and forces every deferred value in it.
    pub fn resolve_dynamic_data_structure(
        &self,
        graph: &Value,
        scope: &RecordRef,
    ) -> Result<Value, GraphError> {
        let evaluated = self.evaluate_dynamic_data_structure(graph, scope)?;
        resolve_dynamic_data_structure(&evaluated)
    }

    pub async fn acquire_lock<F, Fut, T>(&self, description: &str, callback: F, auto_release: bool) -> T
    where
        F: FnOnce(LockTicket) -> Fut,
        Fut: Future<Output = T>,
    {
        self.locks.acquire_lock(description, callback, auto_release).await
    }

    pub fn release_lock(&self, description: &str) -> bool {
        self.locks.release(description)
    }

    pub fn locks(&self) -> &LockManager {
        &self.locks
    }

    /// A fresh semaphore sized by the configuration.
    pub fn get_semaphore(&self) -> Semaphore {
        Semaphore::new(self.config.semaphore_resources)
    }
}
