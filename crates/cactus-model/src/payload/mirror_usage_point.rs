// SPDX-License-Identifier: MIT OR Apache-2.0
//! MirrorUsagePoint / MirrorMeterReading — client-hosted telemetry uploads.

use super::common::ReadingType;
use serde::{Deserialize, Serialize};

/// A single mirror meter reading container (one per reading type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorMeterReading {
    /// This reading container's mRID.
    #[serde(rename = "mRID")]
    pub mrid: String,
    /// The reading type this container reports.
    pub reading_type: ReadingType,
    /// Power-of-ten multiplier applied to raw reading values.
    pub pow10_multiplier: i8,
    /// Readings posted under this container (most recent last).
    #[serde(default)]
    pub readings: Vec<Reading>,
}

/// A single interval reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Reading {
    /// Interval start, unix seconds.
    pub time_period_start: i64,
    /// Interval duration, seconds.
    pub time_period_duration: u32,
    /// The raw (pre-multiplier) value.
    pub value: i64,
}

/// A mirror usage point — a client-hosted proxy for a meter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorUsagePoint {
    /// This resource's own href, once created.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// Role flags (device vs. site location, Table 2).
    pub role_flags: u16,
    /// LFDI of the device this mirror usage point reports on behalf of.
    pub device_l_fdi: String,
    /// This mirror usage point's mRID.
    #[serde(rename = "mRID")]
    pub mrid: String,
    /// Status — `1` means active.
    pub status: u8,
    /// Service category — `0` is electricity.
    pub service_category_kind: u8,
    /// Mirror meter readings. The server does not echo these back on GET,
    /// so the action layer copies them from the submitted request into the
    /// stored copy after refetch.
    #[serde(default)]
    pub meter_readings: Vec<MirrorMeterReading>,
}
