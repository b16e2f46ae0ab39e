// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Product names used by the workflow dependency graph.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// The name of a data product a module consumes or produces.
///
/// Product names are compared and hashed as opaque strings; the engine
/// does not interpret their contents beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(SmolStr);

impl Product {
    /// Wrap an existing name as a product.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    /// Borrow the product name as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Product {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Product {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for Product {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
#[path = "product_tests.rs"]
mod tests;
