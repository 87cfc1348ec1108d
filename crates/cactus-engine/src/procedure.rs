// SPDX-License-Identifier: MIT OR Apache-2.0
//! A loaded test procedure: the ordered steps an [`crate::Engine`] run
//! executes, each attributed to the client alias that drives it.
//!
//! Parsing a procedure document into this shape is out of scope for this
//! harness; callers hand in already-resolved
//! [`cactus_model::Step`]s.

use cactus_model::Step;

/// One procedure step, attributed to the client(s) that run it.
#[derive(Debug, Clone)]
pub struct ProcedureStep {
    /// The step itself.
    pub step: Step,
    /// Alias of the client that drives this step's action/checks.
    pub owning_client_alias: String,
    /// Alias of the client whose store the step's action targets, if
    /// different from `owning_client_alias` (cross-client scenarios).
    pub resource_owning_client_alias: Option<String>,
}

/// An ordered sequence of steps to run. Priority follows document order:
/// earlier steps get lower (higher-priority) `primacy`.
#[derive(Debug, Clone, Default)]
pub struct Procedure {
    /// Stable identifier, recorded in the run's `.testprocedureid` file.
    pub id: String,
    /// Steps in authoring order.
    pub steps: Vec<ProcedureStep>,
}

impl Procedure {
    /// Every step id in document order, for results evaluation.
    #[must_use]
    pub fn step_ids(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.step.id.clone()).collect()
    }
}
