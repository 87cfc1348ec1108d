// SPDX-License-Identifier: MIT OR Apache-2.0
//! DeviceCapability — the discovery root.

use serde::{Deserialize, Serialize};

/// The device-capability resource: the single known starting point for
/// discovery. Link hrefs are optional — a server need not expose all of
/// them, and the discovery walker silently skips what is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceCapability {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Link to the server `Time` resource.
    #[serde(rename = "TimeLink")]
    pub time_link: Option<Link>,
    /// Link to the `EndDeviceList`.
    #[serde(rename = "EndDeviceListLink")]
    pub end_device_list_link: Option<Link>,
    /// Link to the `MirrorUsagePointList`.
    #[serde(rename = "MirrorUsagePointListLink")]
    pub mirror_usage_point_list_link: Option<Link>,
}

/// A link to another resource, carrying only its href.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// The href of the linked resource.
    #[serde(rename = "@href")]
    pub href: String,
}

impl Link {
    /// Construct a link to `href`.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// The server's `Time` singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerTime {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Current server time, unix seconds.
    pub current_time: i64,
}
