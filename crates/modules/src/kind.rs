// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The tagged variant carrying type-specific extras alongside a
//! module's declared `produces`/`consumes` sets.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What role a module plays in a channel's workflow. No inheritance is
/// needed between variants; each just carries its own extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleKind {
    /// Produces a product on a fixed schedule; owns a real source
    /// worker process, never runs inside a channel's task manager.
    Source {
        #[serde(with = "period_secs")]
        period: Duration,
    },
    /// Consumes one or more products and produces one or more others.
    Transform,
    /// Consumes products to make a decision; does not itself produce.
    Logic,
    /// Consumes products to take an external action. MUST NOT declare
    /// any `produces` (enforced by the workflow validator, not here).
    Publisher,
}

impl ModuleKind {
    /// Whether this kind is permitted to declare `produces` at all.
    /// Only `Publisher` is forbidden from producing.
    pub fn may_produce(&self) -> bool {
        !matches!(self, Self::Publisher)
    }
}

mod period_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(period: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(period.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
