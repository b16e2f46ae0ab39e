// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A generation of tabular state for one task manager, as persisted to
//! the data space.

use std::collections::BTreeMap;
use std::fmt;

use de_core::{GenerationId, Product};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifies the task manager a data block belongs to: a channel's
/// workflow task manager, or a source worker persisting its own output
/// independent of any channel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskManagerId(String);

impl TaskManagerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskManagerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One generation of tabular state, identified by
/// `(taskmanager_id, generation_id, sequence_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBlock {
    pub taskmanager_id: TaskManagerId,
    pub generation: GenerationId,
    pub sequence_id: u64,
    /// One JSON value per product this block carries, keyed by product
    /// name. The data space does not interpret the values beyond
    /// storing and returning them.
    pub products: BTreeMap<Product, Value>,
}

impl DataBlock {
    pub fn new(
        taskmanager_id: TaskManagerId,
        generation: GenerationId,
        sequence_id: u64,
    ) -> Self {
        Self { taskmanager_id, generation, sequence_id, products: BTreeMap::new() }
    }

    pub fn with_product(mut self, product: Product, value: Value) -> Self {
        self.products.insert(product, value);
        self
    }
}
