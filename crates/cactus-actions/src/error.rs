// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error aggregation for action execution.

use cactus_error::{NotificationKind, RequestKind, TestDefinitionKind};

/// Any uncaught failure from an action: on an uncaught failure, the engine
/// records the exception and terminates the run. `refresh-resource`'s
/// connection-error handling is the one documented exception — it catches
/// [`RequestKind::Transport`] itself and reports a failed [`crate::ActionResult`]
/// instead of propagating.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// A protocol-client call failed.
    #[error(transparent)]
    Request(#[from] RequestKind),
    /// A notification-subsystem call failed.
    #[error(transparent)]
    Notification(#[from] NotificationKind),
    /// The step's parameters were malformed or referenced an unknown alias.
    #[error(transparent)]
    TestDefinition(#[from] TestDefinitionKind),
}
