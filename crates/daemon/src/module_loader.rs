// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The concrete source/transform/logic/publisher implementations a
//! deployment runs are an external collaborator, supplied at the edges
//! this crate exposes rather than vendored here. `UnimplementedModuleLoader`
//! keeps the worker entrypoints honest about that boundary: it is a real
//! `ModuleLoader` that every worker subcommand wires up, and it reports
//! a clear fault for any class it's asked to load rather than silently
//! returning a no-op module.

use de_modules::{Module, ModuleError, ModuleLoader};

#[derive(Debug, Default)]
pub struct UnimplementedModuleLoader;

impl ModuleLoader for UnimplementedModuleLoader {
    fn load(&self, module_class: &str, _config: &serde_json::Value) -> Result<Box<dyn Module>, ModuleError> {
        Err(ModuleError::Step {
            module: module_class.to_string(),
            message: "no module implementation is registered for this class".to_string(),
        })
    }
}

#[cfg(test)]
#[path = "module_loader_tests.rs"]
mod tests;
