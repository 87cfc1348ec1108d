// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subscription — a push-delivery registration against a single resource.

use serde::{Deserialize, Serialize};

/// Wire encoding requested for notification bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationEncoding {
    /// XML-encoded notification bodies.
    Xml,
}

/// A subscription registered against a single resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// This resource's own href, once created.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Requested notification body encoding.
    pub encoding: NotificationEncoding,
    /// Subscription security level (e.g. `+S1`).
    pub level: String,
    /// Maximum number of notifications the server may batch per delivery.
    pub limit: u32,
    /// The webhook URI notifications should be POSTed to.
    pub notification_uri: String,
    /// The href of the resource being subscribed to.
    pub subscribed_resource: String,
}

impl Subscription {
    /// The harness's one concrete subscription shape, as built by `create-subscription`.
    #[must_use]
    pub fn for_resource(notification_uri: impl Into<String>, subscribed_resource: impl Into<String>) -> Self {
        Self {
            href: None,
            encoding: NotificationEncoding::Xml,
            level: "+S1".into(),
            limit: 100,
            notification_uri: notification_uri.into(),
            subscribed_resource: subscribed_resource.into(),
        }
    }
}
