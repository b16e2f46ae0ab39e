// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `DataSpace` trait seam: the persistence layer that stores
//! serialized frames keyed by (taskmanager, generation). Out of scope
//! in the behavioral spec — this crate only defines the seam plus an
//! in-memory implementation good enough for tests and as a default.

use async_trait::async_trait;
use de_core::GenerationId;
use thiserror::Error;

use crate::{DataBlock, TaskManagerId};

#[derive(Debug, Error)]
pub enum DataSpaceError {
    #[error("data space backend error: {0}")]
    Backend(String),
}

/// Persistence layer for data blocks. A channel's task manager reads the
/// referenced generation on each incoming message and writes the
/// resulting generation back; a source worker persists its own output
/// under its own task manager id.
#[async_trait]
pub trait DataSpace: Send + Sync {
    /// Persist a new generation. Concurrent writers are keyed by
    /// distinct `(taskmanager_id, generation)` pairs, so this never
    /// needs to merge with an existing entry.
    async fn put(&self, block: DataBlock) -> Result<(), DataSpaceError>;

    /// Fetch one specific generation, if it still exists.
    async fn get(
        &self,
        taskmanager_id: &TaskManagerId,
        generation: GenerationId,
    ) -> Result<Option<DataBlock>, DataSpaceError>;

    /// The most recently written generation for a task manager, if any.
    async fn latest(
        &self,
        taskmanager_id: &TaskManagerId,
    ) -> Result<Option<DataBlock>, DataSpaceError>;

    /// Every generation still held for a task manager, oldest first.
    /// Backs `query_tool`'s `start_time` filter, which has nothing but
    /// generation order to filter on since a `DataBlock` carries no
    /// wall-clock timestamp.
    async fn history(
        &self,
        taskmanager_id: &TaskManagerId,
    ) -> Result<Vec<DataBlock>, DataSpaceError>;

    /// Drop every block for a task manager. Used when a channel or
    /// source is permanently removed, not by the (external) reaper's
    /// expiry sweep.
    async fn clear(&self, taskmanager_id: &TaskManagerId) -> Result<(), DataSpaceError>;
}
