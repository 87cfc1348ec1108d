// SPDX-License-Identifier: MIT OR Apache-2.0
//! The per-step execution context every action runs against, and the
//! `action-result` contract.

use cactus_model::ClientConfig;
use cactus_notify::NotificationsContext;
use cactus_protocol::{ProtocolClient, RequestContext};
use cactus_store::ResourceStore;
use std::time::SystemTime;

/// Everything an action needs beyond its own resolved parameters: the
/// owning client's protocol identity and store, the shared notification
/// context, and the scheduler's view of "now" and the current repeat
/// count.
pub struct ActionContext<'a> {
    /// Protocol client for the resource-owning client.
    pub client: &'a ProtocolClient,
    /// This client's device-capability URI, the discovery root.
    pub device_capability_uri: &'a str,
    /// Request-tracking context (client alias, step id).
    pub request_ctx: &'a RequestContext,
    /// This client's static configuration.
    pub client_config: &'a ClientConfig,
    /// The resource-owning client's store.
    pub store: &'a mut ResourceStore,
    /// The resource-owning client's notification context.
    pub notifications: &'a mut NotificationsContext,
    /// Wall-clock time this execution began.
    pub now: SystemTime,
    /// Zero-indexed repeat counter of the current step execution.
    pub repeat_number: u32,
}

/// The outcome of one action invocation.
#[derive(Debug, Clone, Default)]
pub struct ActionResult {
    /// Whether the action's work for this invocation is done.
    pub completed: bool,
    /// Whether the scheduler should enqueue another repeat of this step.
    pub repeat: bool,
    /// Earliest time the next repeat (or retry) may run.
    pub not_before: Option<SystemTime>,
    /// Human-readable detail, set on both success and failure paths.
    pub description: Option<String>,
}

impl ActionResult {
    /// A simple, non-repeating success.
    #[must_use]
    pub fn done() -> Self {
        Self { completed: true, ..Self::default() }
    }

    /// A simple, non-repeating success carrying a description.
    #[must_use]
    pub fn done_with(description: impl Into<String>) -> Self {
        Self { completed: true, description: Some(description.into()), ..Self::default() }
    }

    /// A non-fatal, retriable failure (`refresh-resource`'s documented
    /// connection-error handling). Callers with `repeat-until-pass` set
    /// will retry; otherwise the step (and the run) ends here.
    #[must_use]
    pub fn failed(description: impl Into<String>) -> Self {
        Self { completed: false, description: Some(description.into()), ..Self::default() }
    }

    /// Success, with another repeat enqueued no earlier than `not_before`.
    #[must_use]
    pub fn repeat_not_before(not_before: SystemTime) -> Self {
        Self { completed: true, repeat: true, not_before: Some(not_before), ..Self::default() }
    }
}
