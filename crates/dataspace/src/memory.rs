// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `DataSpace`, used by tests and as the default when no
//! external store is configured.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use de_core::GenerationId;
use parking_lot::Mutex;

use crate::{DataBlock, DataSpace, DataSpaceError, TaskManagerId};

#[derive(Clone, Default)]
pub struct InMemoryDataSpace {
    blocks: Arc<Mutex<HashMap<TaskManagerId, BTreeMap<GenerationId, DataBlock>>>>,
}

impl InMemoryDataSpace {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSpace for InMemoryDataSpace {
    async fn put(&self, block: DataBlock) -> Result<(), DataSpaceError> {
        let mut blocks = self.blocks.lock();
        blocks.entry(block.taskmanager_id.clone()).or_default().insert(block.generation, block);
        Ok(())
    }

    async fn get(
        &self,
        taskmanager_id: &TaskManagerId,
        generation: GenerationId,
    ) -> Result<Option<DataBlock>, DataSpaceError> {
        let blocks = self.blocks.lock();
        Ok(blocks.get(taskmanager_id).and_then(|g| g.get(&generation)).cloned())
    }

    async fn latest(
        &self,
        taskmanager_id: &TaskManagerId,
    ) -> Result<Option<DataBlock>, DataSpaceError> {
        let blocks = self.blocks.lock();
        Ok(blocks.get(taskmanager_id).and_then(|g| g.values().next_back()).cloned())
    }

    async fn history(
        &self,
        taskmanager_id: &TaskManagerId,
    ) -> Result<Vec<DataBlock>, DataSpaceError> {
        let blocks = self.blocks.lock();
        Ok(blocks.get(taskmanager_id).map(|g| g.values().cloned().collect()).unwrap_or_default())
    }

    async fn clear(&self, taskmanager_id: &TaskManagerId) -> Result<(), DataSpaceError> {
        self.blocks.lock().remove(taskmanager_id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
