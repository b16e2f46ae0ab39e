// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The module capability trait: `{produces, consumes, step}`. Loaders
//! hand back a boxed `Module` keyed by module-class-identifier; no
//! inheritance hierarchy is needed, only this one seam.

use std::collections::BTreeSet;

use async_trait::async_trait;
use de_core::Product;
use de_dataspace::DataBlock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module {module} failed to step: {message}")]
    Step { module: String, message: String },
}

/// A runnable module instance. Concrete implementations live outside
/// this workspace; this trait is the seam a module loader hands
/// instances back through, keyed by module-class-identifier.
#[async_trait]
pub trait Module: Send + Sync {
    /// Product names this module declares it writes.
    fn produces(&self) -> &BTreeSet<Product>;

    /// Product names this module declares it reads.
    fn consumes(&self) -> &BTreeSet<Product>;

    /// Advance one step: read whatever of `input`'s products this
    /// module consumes, and return a block carrying whatever it
    /// produces. Transforms and logic modules return a new block merged
    /// into the channel's generation by the task manager; publishers
    /// return the input unchanged after performing their side effect.
    async fn step(&self, input: DataBlock) -> Result<DataBlock, ModuleError>;
}

/// Loads a boxed [`Module`] instance for a module-class-identifier and
/// its config. Out of scope to implement for real modules here — this
/// is the seam `de-engine` depends on.
pub trait ModuleLoader: Send + Sync {
    fn load(
        &self,
        module_class: &str,
        config: &serde_json::Value,
    ) -> Result<Box<dyn Module>, ModuleError>;
}
