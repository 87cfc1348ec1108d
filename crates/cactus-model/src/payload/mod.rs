// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire payload types for every stored [`crate::kind::ResourceKind`].
//!
//! Each kind is hand-modelled rather than reflected, so that attribute
//! casing, `xsi:type`, and optional-field absence stay exactly controllable
//! (see the Design Notes on XML ↔ typed payloads).

pub mod common;
pub mod der;
pub mod der_control;
pub mod device_capability;
pub mod end_device;
pub mod error;
pub mod list;
pub mod mirror_usage_point;
pub mod notification;
pub mod subscription;

use crate::kind::ResourceKind;
use der::{Der, DerCapability, DerSettings, DerStatus, DefaultDerControl, DerProgram, FunctionSetAssignments};
use der_control::DerControl;
use device_capability::{DeviceCapability, ServerTime};
use end_device::{ConnectionPoint, EndDevice, Registration};
use mirror_usage_point::MirrorUsagePoint;
use subscription::Subscription;

/// A parsed payload for any storable resource kind.
///
/// This is the "parsed payload" half of a [`crate::resource::StoredResource`].
/// List kinds are stored item-by-item (the list envelope itself is consumed
/// by the discovery walker / pagination and is not retained).
#[derive(Debug, Clone)]
pub enum Payload {
    /// [`ResourceKind::DeviceCapability`]
    DeviceCapability(DeviceCapability),
    /// [`ResourceKind::Time`]
    Time(ServerTime),
    /// [`ResourceKind::EndDevice`]
    EndDevice(EndDevice),
    /// [`ResourceKind::ConnectionPoint`]
    ConnectionPoint(ConnectionPoint),
    /// [`ResourceKind::Registration`]
    Registration(Registration),
    /// [`ResourceKind::Subscription`]
    Subscription(Subscription),
    /// [`ResourceKind::FunctionSetAssignments`]
    FunctionSetAssignments(FunctionSetAssignments),
    /// [`ResourceKind::DerProgram`]
    DerProgram(DerProgram),
    /// [`ResourceKind::DefaultDerControl`]
    DefaultDerControl(DefaultDerControl),
    /// [`ResourceKind::DerControl`]
    DerControl(DerControl),
    /// [`ResourceKind::Der`]
    Der(Der),
    /// [`ResourceKind::DerCapability`]
    DerCapability(DerCapability),
    /// [`ResourceKind::DerSettings`]
    DerSettings(DerSettings),
    /// [`ResourceKind::DerStatus`]
    DerStatus(DerStatus),
    /// [`ResourceKind::MirrorUsagePoint`]
    MirrorUsagePoint(MirrorUsagePoint),
}

impl Payload {
    /// The [`ResourceKind`] this payload represents.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::DeviceCapability(_) => ResourceKind::DeviceCapability,
            Self::Time(_) => ResourceKind::Time,
            Self::EndDevice(_) => ResourceKind::EndDevice,
            Self::ConnectionPoint(_) => ResourceKind::ConnectionPoint,
            Self::Registration(_) => ResourceKind::Registration,
            Self::Subscription(_) => ResourceKind::Subscription,
            Self::FunctionSetAssignments(_) => ResourceKind::FunctionSetAssignments,
            Self::DerProgram(_) => ResourceKind::DerProgram,
            Self::DefaultDerControl(_) => ResourceKind::DefaultDerControl,
            Self::DerControl(_) => ResourceKind::DerControl,
            Self::Der(_) => ResourceKind::Der,
            Self::DerCapability(_) => ResourceKind::DerCapability,
            Self::DerSettings(_) => ResourceKind::DerSettings,
            Self::DerStatus(_) => ResourceKind::DerStatus,
            Self::MirrorUsagePoint(_) => ResourceKind::MirrorUsagePoint,
        }
    }

    /// The resource's own href, if the payload carries one.
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        match self {
            Self::DeviceCapability(p) => p.href.as_deref(),
            Self::Time(p) => p.href.as_deref(),
            Self::EndDevice(p) => p.href.as_deref(),
            Self::ConnectionPoint(p) => p.href.as_deref(),
            Self::Registration(p) => p.href.as_deref(),
            Self::Subscription(p) => p.href.as_deref(),
            Self::FunctionSetAssignments(p) => p.href.as_deref(),
            Self::DerProgram(p) => p.href.as_deref(),
            Self::DefaultDerControl(p) => p.href.as_deref(),
            Self::DerControl(p) => p.href.as_deref(),
            Self::Der(p) => p.href.as_deref(),
            Self::DerCapability(p) => p.href.as_deref(),
            Self::DerSettings(p) => p.href.as_deref(),
            Self::DerStatus(p) => p.href.as_deref(),
            Self::MirrorUsagePoint(p) => p.href.as_deref(),
        }
    }

    /// This resource's own mRID, for payload kinds that carry one.
    #[must_use]
    pub fn mrid(&self) -> Option<&str> {
        match self {
            Self::DerProgram(p) => Some(&p.mrid),
            Self::DefaultDerControl(p) => Some(&p.mrid),
            Self::DerControl(p) => Some(&p.mrid),
            Self::MirrorUsagePoint(p) => Some(&p.mrid),
            _ => None,
        }
    }

    /// Project this payload's child-link hrefs, keyed by the child
    /// [`ResourceKind`] they point to, for `append`/`upsert` to follow.
    #[must_use]
    pub fn child_links(&self) -> Vec<(ResourceKind, String)> {
        let mut out = Vec::new();
        match self {
            Self::DeviceCapability(p) => {
                if let Some(l) = &p.time_link {
                    out.push((ResourceKind::Time, l.href.clone()));
                }
                if let Some(l) = &p.end_device_list_link {
                    out.push((ResourceKind::EndDeviceList, l.href.clone()));
                }
                if let Some(l) = &p.mirror_usage_point_list_link {
                    out.push((ResourceKind::MirrorUsagePointList, l.href.clone()));
                }
            }
            Self::EndDevice(p) => {
                if let Some(l) = &p.connection_point_link {
                    out.push((ResourceKind::ConnectionPoint, l.href.clone()));
                }
                if let Some(l) = &p.registration_link {
                    out.push((ResourceKind::Registration, l.href.clone()));
                }
                if let Some(l) = &p.function_set_assignments_list_link {
                    out.push((ResourceKind::FunctionSetAssignmentsList, l.href.clone()));
                }
                if let Some(l) = &p.der_list_link {
                    out.push((ResourceKind::DerList, l.href.clone()));
                }
                if let Some(l) = &p.subscription_list_link {
                    out.push((ResourceKind::SubscriptionList, l.href.clone()));
                }
            }
            Self::FunctionSetAssignments(p) => {
                if let Some(l) = &p.der_program_list_link {
                    out.push((ResourceKind::DerProgramList, l.href.clone()));
                }
            }
            Self::DerProgram(p) => {
                if let Some(l) = &p.default_der_control_link {
                    out.push((ResourceKind::DefaultDerControl, l.href.clone()));
                }
                if let Some(l) = &p.der_control_list_link {
                    out.push((ResourceKind::DerControlList, l.href.clone()));
                }
            }
            Self::Der(p) => {
                if let Some(l) = &p.der_capability_link {
                    out.push((ResourceKind::DerCapability, l.href.clone()));
                }
                if let Some(l) = &p.der_settings_link {
                    out.push((ResourceKind::DerSettings, l.href.clone()));
                }
                if let Some(l) = &p.der_status_link {
                    out.push((ResourceKind::DerStatus, l.href.clone()));
                }
            }
            // Connection point, registration, subscription, default DER
            // control, DER control, DER capability/settings/status, mirror
            // usage point, and time project nothing further.
            _ => {}
        }
        out
    }
}
