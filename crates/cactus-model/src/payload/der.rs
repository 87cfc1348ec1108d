// SPDX-License-Identifier: MIT OR Apache-2.0
//! FunctionSetAssignments, DERProgram, and the DER device-state resources.

use super::device_capability::Link;
use serde::{Deserialize, Serialize};

/// A function-set-assignments entry under an end device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSetAssignments {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Link to this entry's DER program list.
    #[serde(rename = "DERProgramListLink")]
    pub der_program_list_link: Option<Link>,
}

/// A DER program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerProgram {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Program's mRID.
    #[serde(rename = "mRID")]
    pub mrid: String,
    /// Scheduling primacy for controls under this program.
    pub primacy: u8,
    /// Link to the program's default DER control.
    #[serde(rename = "DefaultDERControlLink")]
    pub default_der_control_link: Option<Link>,
    /// Link to the program's DER control list.
    #[serde(rename = "DERControlListLink")]
    pub der_control_list_link: Option<Link>,
}

/// A default DER control (applies when no scheduled control is active).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultDerControl {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// mRID of this default control.
    #[serde(rename = "mRID")]
    pub mrid: String,
    /// Nominal set point, signed percent (×0.01).
    pub set_max_w_percent: Option<i32>,
}

/// A single DER device entry under an end device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Der {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Link to the DER's capability resource.
    #[serde(rename = "DERCapabilityLink")]
    pub der_capability_link: Option<Link>,
    /// Link to the DER's settings resource.
    #[serde(rename = "DERSettingsLink")]
    pub der_settings_link: Option<Link>,
    /// Link to the DER's status resource.
    #[serde(rename = "DERStatusLink")]
    pub der_status_link: Option<Link>,
}

/// DER nameplate capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerCapability {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Nominal real power rating, signed watts.
    pub rtg_max_w: i32,
}

/// DER settings (nominal operating configuration, writable by the client).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerSettings {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Nominal max real power, signed watts.
    pub set_max_w: i32,
    /// Wire timestamp of the last update, unix seconds.
    pub updated_time: Option<i64>,
}

/// DER status (live operating state, writable by the client).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerStatus {
    /// This resource's own href.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Bitmask of currently active DER control types.
    pub der_control_mode: u32,
    /// Wire timestamp of the last update, unix seconds.
    pub read_time: Option<i64>,
}
