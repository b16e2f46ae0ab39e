// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source identity: the `(module-class, canonicalized-config)` pair used
//! to deduplicate source workers across channels.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;
use thiserror::Error;

/// The fully-qualified name of a module implementation, e.g.
/// `decisionengine.sources.JobSource`. Opaque to the engine beyond
/// equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleClass(SmolStr);

impl ModuleClass {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ModuleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ModuleClass {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Failures that can arise while building a [`SourceIdentity`].
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("failed to canonicalize source config: {0}")]
    Canonicalize(#[from] serde_json::Error),
}

/// The `(module-class, canonicalized-config)` pair that identifies a
/// source feed. Two source declarations with equal identity denote the
/// same upstream feed and MUST share a single worker.
///
/// Canonicalization is deep value equality modulo key order: object keys
/// are recursively sorted before comparison and hashing, so two configs
/// differing only in key order produce equal identities.
#[derive(Debug, Clone)]
pub struct SourceIdentity {
    module_class: ModuleClass,
    config: Value,
}

impl SourceIdentity {
    /// Build an identity from a module class and a config value,
    /// recursively sorting object keys so that key order never affects
    /// equality or hashing.
    pub fn new(module_class: ModuleClass, config: Value) -> Result<Self, IdentityError> {
        let config = canonicalize(config);
        Ok(Self { module_class, config })
    }

    /// Build an identity from a module class and a config serializable
    /// value, going through `serde_json` first.
    pub fn from_serializable<T: Serialize>(
        module_class: ModuleClass,
        config: &T,
    ) -> Result<Self, IdentityError> {
        let value = serde_json::to_value(config)?;
        Self::new(module_class, value)
    }

    pub fn module_class(&self) -> &ModuleClass {
        &self.module_class
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Render the canonicalized config as compact JSON text; used to
    /// derive routing keys and queue names.
    pub fn canonical_json(&self) -> String {
        // Canonicalized at construction time; serialization cannot fail.
        serde_json::to_string(&self.config).unwrap_or_default()
    }
}

/// Recursively sort the keys of every object in `value`, so structurally
/// identical configs serialize identically regardless of field order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

impl PartialEq for SourceIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.module_class == other.module_class && self.config == other.config
    }
}

impl Eq for SourceIdentity {}

impl Hash for SourceIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.module_class.hash(state);
        self.canonical_json().hash(state);
    }
}

impl fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.module_class, self.canonical_json())
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
