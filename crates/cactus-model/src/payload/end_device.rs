// SPDX-License-Identifier: MIT OR Apache-2.0
//! EndDevice and the resources that hang directly off it.

use super::device_capability::Link;
use serde::{Deserialize, Serialize};

/// Device category — the harness only ever creates photovoltaic devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceCategory {
    /// Photovoltaic (solar) system.
    Photovoltaic,
}

impl DeviceCategory {
    /// The wire (hex-binary, per the 2030.5 `DeviceCategoryType` bitmask) code.
    #[must_use]
    pub fn hex_code(self) -> &'static str {
        match self {
            Self::Photovoltaic => "0400",
        }
    }
}

/// A single end device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndDevice {
    /// This resource's own href, once discovered/created.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Long-form device identifier, 40 hex chars.
    pub l_fdi: String,
    /// Short-form device identifier, derived from `l_fdi`.
    pub s_fdi: u64,
    /// Device category (hex-binary bitmask).
    pub device_category: String,
    /// Whether this end device currently has connection-point enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Nominal status-post rate, seconds.
    pub post_rate: Option<u32>,
    /// Link to the connection point.
    #[serde(rename = "ConnectionPointLink")]
    pub connection_point_link: Option<Link>,
    /// Link to the registration resource.
    #[serde(rename = "RegistrationLink")]
    pub registration_link: Option<Link>,
    /// Link to this device's function-set-assignments list.
    #[serde(rename = "FunctionSetAssignmentsListLink")]
    pub function_set_assignments_list_link: Option<Link>,
    /// Link to this device's DER list.
    #[serde(rename = "DERListLink")]
    pub der_list_link: Option<Link>,
    /// Link to this device's subscription list.
    #[serde(rename = "SubscriptionListLink")]
    pub subscription_list_link: Option<Link>,
}

/// An end device's connection point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionPoint {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// The connection-point (e.g. NMI) identifier.
    pub connection_point_id: String,
}

/// An end device's registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Device PIN used to confirm registration.
    pub pin: u32,
}
