// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised while assembling a run. Failures that occur *during* the
//! execution loop itself are not represented here — an
//! action or check failure degrades to a non-passing [`cactus_track::StepResult`]
//! and, for repeat-until-pass steps, a retry; it never unwinds the engine.

use cactus_error::{ConfigKind, NotificationKind, RequestKind};

/// Failures that can prevent a run from starting.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The run config named a client alias absent from the global config.
    #[error("run config named unknown client alias {alias:?}")]
    UnknownClientAlias {
        /// The offending alias.
        alias: String,
    },
    /// Building a client's protocol identity failed (bad cert/key, TLS setup).
    #[error("failed to build protocol client: {0}")]
    Request(#[from] RequestKind),
    /// A config document failed validation while assembling the run.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigKind),
    /// Tearing down a client's notification endpoints failed during setup
    /// (only reachable if a future revision probes the collector eagerly).
    #[error("notification subsystem error: {0}")]
    Notification(#[from] NotificationKind),
}
