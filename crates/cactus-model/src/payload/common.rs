// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared value types used across several payload kinds.

use serde::{Deserialize, Serialize};

/// Unit-of-measure codes (subset of the standard UomType code list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Uom {
    /// Real power, watts.
    RealPowerWatt,
    /// Reactive power, VAR.
    ReactivePowerVar,
    /// Frequency, hertz.
    FrequencyHz,
    /// Voltage, volts.
    Voltage,
}

impl Uom {
    /// The wire (integer) code for this unit.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::RealPowerWatt => 61,
            Self::ReactivePowerVar => 63,
            Self::FrequencyHz => 33,
            Self::Voltage => 29,
        }
    }
}

/// Commodity "kind" codes for mirror meter readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementKind {
    /// Power.
    Power,
}

impl MeasurementKind {
    /// The wire (integer) code for this kind.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Power => 37,
        }
    }
}

/// Data-qualifier codes describing how a reading was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataQualifier {
    /// Time-averaged value.
    Average,
    /// Instantaneous/standard (unprocessed) value.
    Standard,
    /// Maximum value observed over the interval.
    Maximum,
    /// Minimum value observed over the interval.
    Minimum,
}

impl DataQualifier {
    /// The wire (integer) code for this qualifier.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Average => 2,
            Self::Standard => 0,
            Self::Maximum => 8,
            Self::Minimum => 9,
        }
    }
}

/// The measurement families a mirror usage point can report (Table 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingTypeFamily {
    /// Active (real) power.
    ActivePower,
    /// Reactive power.
    ReactivePower,
    /// Frequency.
    Frequency,
    /// Single-phase voltage.
    VoltageSinglePhase,
}

impl ReadingTypeFamily {
    /// The `(uom, kind)` pair this family reports under, per Table 1.
    #[must_use]
    pub fn uom_and_kind(self) -> (Uom, MeasurementKind) {
        let uom = match self {
            Self::ActivePower => Uom::RealPowerWatt,
            Self::ReactivePower => Uom::ReactivePowerVar,
            Self::Frequency => Uom::FrequencyHz,
            Self::VoltageSinglePhase => Uom::Voltage,
        };
        (uom, MeasurementKind::Power)
    }
}

/// A fully-qualified reading type: a measurement family plus the
/// data-qualifier describing how the value was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReadingType {
    /// Measurement family (e.g. active power).
    pub family: ReadingTypeFamily,
    /// How the value was derived (average/instantaneous/max/min).
    pub qualifier: DataQualifier,
}

impl ReadingType {
    /// Construct a reading type.
    #[must_use]
    pub fn new(family: ReadingTypeFamily, qualifier: DataQualifier) -> Self {
        Self { family, qualifier }
    }

    /// Stable string key used for sorting/seed derivation (Table 1 is
    /// order-insensitive, so mRID derivation sorts by this key).
    #[must_use]
    pub fn sort_key(&self) -> String {
        format!("{:?}:{:?}", self.family, self.qualifier)
    }
}

/// Role flags as used for mirror usage points (Table 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFlags(pub u16);

impl RoleFlags {
    /// `IS_MIRROR` bit.
    pub const IS_MIRROR: u16 = 0x0001;
    /// `IS_PREMISES_AGGREGATION_POINT` bit.
    pub const IS_PREMISES_AGGREGATION_POINT: u16 = 0x0002;
    /// `IS_DER` bit.
    pub const IS_DER: u16 = 0x0004;
    /// `IS_SUBMETER` bit.
    pub const IS_SUBMETER: u16 = 0x0008;

    /// Role flags for a device-location mirror usage point.
    #[must_use]
    pub fn device() -> Self {
        Self(Self::IS_MIRROR | Self::IS_DER | Self::IS_SUBMETER)
    }

    /// Role flags for a site-location mirror usage point.
    #[must_use]
    pub fn site() -> Self {
        Self(Self::IS_MIRROR | Self::IS_PREMISES_AGGREGATION_POINT)
    }
}

/// Where a mirror usage point is reporting from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// At the DER device itself.
    Device,
    /// At the site (premises aggregation point).
    Site,
}

impl Location {
    /// The role flags implied by this location (Table 2).
    #[must_use]
    pub fn role_flags(self) -> RoleFlags {
        match self {
            Self::Device => RoleFlags::device(),
            Self::Site => RoleFlags::site(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Device => write!(f, "device"),
            Self::Site => write!(f, "site"),
        }
    }
}

/// A time interval with a start (unix seconds) and duration (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeInterval {
    /// Interval start, unix seconds.
    pub start: i64,
    /// Interval duration, seconds.
    pub duration: u32,
}

impl DateTimeInterval {
    /// The unix-second timestamp the interval ends at.
    #[must_use]
    pub fn end(&self) -> i64 {
        self.start + i64::from(self.duration)
    }
}
