// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-client runtime state: the protocol identity, resource store and
//! notification context a single client alias needs to participate in a run.

use crate::error::EngineError;
use cactus_config::GlobalConfig;
use cactus_model::ClientConfig;
use cactus_notify::NotificationsContext;
use cactus_protocol::validate::NoopValidator;
use cactus_protocol::{ProtocolClient, SharedObserver};
use cactus_store::ResourceStore;
use std::sync::Arc;

/// Everything one client alias needs for the duration of a run.
pub struct ClientRuntime {
    /// This client's static configuration.
    pub config: ClientConfig,
    /// Its protocol client, wired to the run's shared [`cactus_track::ResponseTracker`].
    pub client: ProtocolClient,
    /// Its view of the server's resource tree.
    pub store: ResourceStore,
    /// Its registered webhook endpoints.
    pub notifications: NotificationsContext,
}

impl ClientRuntime {
    /// Build the runtime for `alias`, wiring `observer` in as every
    /// request's [`cactus_protocol::RequestObserver`].
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownClientAlias`] if `alias` isn't one of
    /// `global.clients`; [`EngineError::Request`] if the client's TLS
    /// identity can't be built from its cert/key files.
    pub fn build(global: &GlobalConfig, alias: &str, observer: SharedObserver) -> Result<Self, EngineError> {
        let config = global.client(alias).ok_or_else(|| EngineError::UnknownClientAlias { alias: alias.to_string() })?.clone();
        let client = ProtocolClient::with_validator_and_observer(&global.server, &config, Arc::new(NoopValidator), observer)?;
        let notifications = NotificationsContext::new(global.server.notification_collector_uri.clone());
        Ok(Self { config, client, store: ResourceStore::new(), notifications })
    }
}
