// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The static declaration of a module as it appears in a channel's
//! config: name, class, kind, and declared product sets. This is what
//! the workflow validator (C8) consumes to build the execution graph —
//! it never touches a live `Module` instance.

use std::collections::BTreeSet;

use de_core::Product;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ModuleKind;

/// One module entry inside a channel's `transforms`, `logic`, or
/// `publishers` config section (sources are declared separately and
/// deduplicated through the source registry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    /// The name this module is referred to by within the channel (used
    /// for the lexicographic tie-break in the topological sort).
    pub name: String,
    /// The fully-qualified implementation identifier.
    pub module_class: String,
    #[serde(flatten)]
    pub kind: ModuleKind,
    #[serde(default)]
    pub produces: BTreeSet<Product>,
    #[serde(default)]
    pub consumes: BTreeSet<Product>,
    #[serde(default)]
    pub config: Value,
}

impl ModuleDeclaration {
    /// Whether this declaration violates the "publisher must not
    /// produce" rule the workflow validator enforces.
    pub fn violates_publisher_produces(&self) -> bool {
        !self.kind.may_produce() && !self.produces.is_empty()
    }
}
