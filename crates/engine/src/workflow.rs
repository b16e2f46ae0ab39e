// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C8 — the workflow validator. Builds a directed graph from declared
//! `produces`/`consumes` sets over a channel's transforms, logic, and
//! publisher modules, and returns a topologically ordered execution
//! plan.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use de_core::Product;
use de_modules::ModuleDeclaration;

use crate::EngineError;

/// The topologically ordered module execution plan for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowPlan {
    pub order: Vec<String>,
}

/// Validate and order `modules` (a channel's `transforms`, `logic`, and
/// `publishers` declarations) given the product names already declared
/// by its sources.
pub fn validate(
    channel: &str,
    source_products: &BTreeSet<Product>,
    modules: &[ModuleDeclaration],
) -> Result<WorkflowPlan, EngineError> {
    let invalid = |reason: String| EngineError::WorkflowInvalid { channel: channel.to_string(), reason };

    for module in modules {
        if module.violates_publisher_produces() {
            return Err(invalid(format!("publisher {:?} declares produces", module.name)));
        }
    }

    let mut producer_of: HashMap<Product, String> = HashMap::new();
    for module in modules {
        for product in &module.produces {
            if let Some(existing) = producer_of.insert(product.clone(), module.name.clone()) {
                return Err(invalid(format!(
                    "product {product:?} has multiple producers: {existing:?} and {:?}",
                    module.name
                )));
            }
        }
    }

    let mut known_products: BTreeSet<Product> = source_products.clone();
    known_products.extend(producer_of.keys().cloned());

    for module in modules {
        for product in &module.consumes {
            if !known_products.contains(product) {
                return Err(invalid(format!(
                    "module {:?} consumes unknown product {product:?}",
                    module.name
                )));
            }
        }
    }

    // Kahn's algorithm with a lexicographic tie-break: BTreeSet keeps
    // the ready set sorted by module name at all times.
    let mut in_degree: BTreeMap<String, usize> =
        modules.iter().map(|m| (m.name.clone(), 0)).collect();
    let mut dependents: HashMap<String, Vec<String>> =
        modules.iter().map(|m| (m.name.clone(), Vec::new())).collect();

    for module in modules {
        for product in &module.consumes {
            if let Some(producer) = producer_of.get(product) {
                if producer != &module.name {
                    dependents.entry(producer.clone()).or_default().push(module.name.clone());
                    if let Some(degree) = in_degree.get_mut(&module.name) {
                        *degree += 1;
                    }
                }
            }
        }
    }

    let mut ready: BTreeSet<String> =
        in_degree.iter().filter(|(_, &deg)| deg == 0).map(|(name, _)| name.clone()).collect();
    let mut order = Vec::with_capacity(modules.len());

    while let Some(name) = ready.iter().next().cloned() {
        ready.remove(&name);
        order.push(name.clone());
        if let Some(children) = dependents.get(&name) {
            for child in children {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(child.clone());
                    }
                }
            }
        }
    }

    if order.len() != modules.len() {
        return Err(invalid("module graph contains a cycle".to_string()));
    }

    Ok(WorkflowPlan { order })
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
