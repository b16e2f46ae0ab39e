// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker URL validation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("broker url {0:?} does not parse as <scheme>://<rest>")]
    Malformed(String),
    #[error("unsupported broker scheme {scheme:?}: only \"redis\" is supported")]
    UnsupportedScheme { scheme: String },
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// A validated broker connection URL. The only supported scheme is
/// `redis`; anything else is rejected at construction time so a
/// misconfigured broker fails fast at startup rather than on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerUrl {
    raw: String,
}

impl BrokerUrl {
    pub const DEFAULT: &'static str = "redis://localhost:6379/0";

    /// Parse and validate a broker URL. Only `scheme == "redis"` is
    /// accepted; any other scheme (or a string with no `://`) is fatal.
    pub fn parse(raw: &str) -> Result<Self, BusError> {
        let scheme = raw
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| BusError::Malformed(raw.to_string()))?;
        if scheme != "redis" {
            return Err(BusError::UnsupportedScheme { scheme: scheme.to_string() });
        }
        Ok(Self { raw: raw.to_string() })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for BrokerUrl {
    // `DEFAULT` is a constant, known-valid "redis://..." URL.
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self::parse(Self::DEFAULT).expect("default broker url is always valid")
    }
}

#[cfg(test)]
#[path = "broker_url_tests.rs"]
mod tests;
