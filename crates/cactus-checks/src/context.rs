// SPDX-License-Identifier: MIT OR Apache-2.0
//! The per-step check context and the `check-result` contract.

use cactus_model::ClientConfig;
use cactus_store::ResourceStore;

/// Everything a check needs beyond its own resolved parameters: a
/// read-only view of the owning client's store, plus its static
/// configuration (needed for mRID re-derivation).
pub struct CheckContext<'a> {
    /// This client's static configuration.
    pub client_config: &'a ClientConfig,
    /// The resource-owning client's store.
    pub store: &'a ResourceStore,
}

/// The outcome of one check invocation.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Whether the check's predicate held.
    pub passed: bool,
    /// Human-readable detail: counts examined/matched and, on failure,
    /// enough of the rejected candidates' detail to reproduce the failure.
    pub description: Option<String>,
}

impl CheckResult {
    /// A passing result carrying a description.
    #[must_use]
    pub fn passed(description: impl Into<String>) -> Self {
        Self { passed: true, description: Some(description.into()) }
    }

    /// A failing result carrying a description.
    #[must_use]
    pub fn failed(description: impl Into<String>) -> Self {
        Self { passed: false, description: Some(description.into()) }
    }
}
