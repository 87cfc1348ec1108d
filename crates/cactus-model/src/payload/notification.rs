// SPDX-License-Identifier: MIT OR Apache-2.0
//! The push-notification envelope delivered to a subscription's webhook.

use crate::kind::ResourceKind;
use serde::{Deserialize, Serialize};

/// Status carried by a notification envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// The embedded resource is a normal update.
    Default,
    /// The subscription this notification was delivered for was cancelled.
    SubscriptionCancelled,
}

/// A parsed notification envelope.
#[derive(Debug, Clone)]
pub struct Notification {
    /// The subscribed resource's href, as carried by the envelope.
    pub subscribed_resource: String,
    /// The notification's status.
    pub status: NotificationStatus,
    /// The `xsi:type`-decoded resource kind of the embedded body, when
    /// `status` is [`NotificationStatus::Default`].
    pub resource_kind: Option<ResourceKind>,
    /// The embedded resource body, still as raw XML (the caller decodes it
    /// per `resource_kind` using the same parser `GET` uses).
    pub resource_xml: Option<String>,
    /// `Content-Type` header observed on the HTTP POST, if any.
    pub content_type: Option<String>,
}

/// Closed lookup table from `xsi:type` strings to [`ResourceKind`], used to
/// decode the embedded resource of a notification envelope.
#[must_use]
pub fn resource_kind_from_xsi_type(xsi_type: &str) -> Option<ResourceKind> {
    match xsi_type {
        "EndDevice" => Some(ResourceKind::EndDevice),
        "DERControl" => Some(ResourceKind::DerControl),
        "DefaultDERControl" => Some(ResourceKind::DefaultDerControl),
        "DERProgram" => Some(ResourceKind::DerProgram),
        "DERProgramList" => Some(ResourceKind::DerProgramList),
        "DERControlList" => Some(ResourceKind::DerControlList),
        "Subscription" => Some(ResourceKind::Subscription),
        "FunctionSetAssignments" => Some(ResourceKind::FunctionSetAssignments),
        "MirrorUsagePoint" => Some(ResourceKind::MirrorUsagePoint),
        "DER" => Some(ResourceKind::Der),
        "DERStatus" => Some(ResourceKind::DerStatus),
        "DERSettings" => Some(ResourceKind::DerSettings),
        "DERCapability" => Some(ResourceKind::DerCapability),
        _ => None,
    }
}
