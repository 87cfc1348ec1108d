// SPDX-License-Identifier: MIT OR Apache-2.0
//! The closed set of protocol resource kinds and the static resource tree.

use serde::{Deserialize, Serialize};

/// A protocol resource kind.
///
/// This is a closed set — the harness never discovers a kind outside this
/// enum. [`ResourceKind::Notification`] is not part of the static resource
/// tree: it is the collector's wire envelope, not a stored resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Root of the resource tree.
    DeviceCapability,
    /// Server time resource.
    Time,
    /// List of end devices.
    EndDeviceList,
    /// A single end device.
    EndDevice,
    /// An end device's connection point.
    ConnectionPoint,
    /// An end device's registration.
    Registration,
    /// List of subscriptions under an end device.
    SubscriptionList,
    /// A single subscription.
    Subscription,
    /// List of function set assignments under an end device.
    FunctionSetAssignmentsList,
    /// A single function set assignments entry.
    FunctionSetAssignments,
    /// List of DER programs under a function set assignments entry.
    DerProgramList,
    /// A single DER program.
    DerProgram,
    /// Default DER control under a DER program.
    DefaultDerControl,
    /// List of DER controls under a DER program.
    DerControlList,
    /// A single DER control.
    DerControl,
    /// List of DERs under an end device.
    DerList,
    /// A single DER.
    Der,
    /// A DER's capability resource.
    DerCapability,
    /// A DER's settings resource.
    DerSettings,
    /// A DER's status resource.
    DerStatus,
    /// List of mirror usage points.
    MirrorUsagePointList,
    /// A single mirror usage point.
    MirrorUsagePoint,
    /// A push notification envelope (not a stored-tree member).
    Notification,
}

impl ResourceKind {
    /// `true` for kinds whose instances live as children under a list parent.
    #[must_use]
    pub fn is_list_kind(self) -> bool {
        matches!(
            self,
            Self::EndDeviceList
                | Self::SubscriptionList
                | Self::FunctionSetAssignmentsList
                | Self::DerProgramList
                | Self::DerControlList
                | Self::DerList
                | Self::MirrorUsagePointList
        )
    }

    /// For a list kind, the kind of the items it contains.
    #[must_use]
    pub fn item_kind(self) -> Option<Self> {
        match self {
            Self::EndDeviceList => Some(Self::EndDevice),
            Self::SubscriptionList => Some(Self::Subscription),
            Self::FunctionSetAssignmentsList => Some(Self::FunctionSetAssignments),
            Self::DerProgramList => Some(Self::DerProgram),
            Self::DerControlList => Some(Self::DerControl),
            Self::DerList => Some(Self::Der),
            Self::MirrorUsagePointList => Some(Self::MirrorUsagePoint),
            _ => None,
        }
    }

    /// The kind's parent in the static resource tree, or `None` at the root
    /// (or for [`ResourceKind::Notification`], which is outside the tree).
    #[must_use]
    pub fn parent_kind(self) -> Option<Self> {
        match self {
            Self::DeviceCapability => None,
            Self::Time => Some(Self::DeviceCapability),
            Self::EndDeviceList => Some(Self::DeviceCapability),
            Self::MirrorUsagePointList => Some(Self::DeviceCapability),
            Self::EndDevice => Some(Self::EndDeviceList),
            Self::ConnectionPoint => Some(Self::EndDevice),
            Self::Registration => Some(Self::EndDevice),
            Self::SubscriptionList => Some(Self::EndDevice),
            Self::DerList => Some(Self::EndDevice),
            Self::FunctionSetAssignmentsList => Some(Self::EndDevice),
            Self::Subscription => Some(Self::SubscriptionList),
            Self::FunctionSetAssignments => Some(Self::FunctionSetAssignmentsList),
            Self::DerProgramList => Some(Self::FunctionSetAssignments),
            Self::DerProgram => Some(Self::DerProgramList),
            Self::DefaultDerControl => Some(Self::DerProgram),
            Self::DerControlList => Some(Self::DerProgram),
            Self::DerControl => Some(Self::DerControlList),
            Self::Der => Some(Self::DerList),
            Self::DerCapability => Some(Self::Der),
            Self::DerSettings => Some(Self::Der),
            Self::DerStatus => Some(Self::Der),
            Self::MirrorUsagePoint => Some(Self::MirrorUsagePointList),
            Self::Notification => None,
        }
    }

    /// All ancestors of `self`, nearest first, root last.
    #[must_use]
    pub fn ancestors(self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut cur = self.parent_kind();
        while let Some(k) = cur {
            out.push(k);
            cur = k.parent_kind();
        }
        out
    }
}

/// Compute an ordered walk plan covering every ancestor of every target kind,
/// with no duplicates, ancestors always preceding their descendants.
///
/// The order is deterministic: targets (and their ancestor chains) are
/// visited in the order given; a kind already placed is never repeated.
#[must_use]
pub fn walk_plan(targets: &[ResourceKind]) -> Vec<ResourceKind> {
    let mut plan = Vec::new();
    let mut seen = std::collections::HashSet::new();

    fn insert_chain(
        kind: ResourceKind,
        plan: &mut Vec<ResourceKind>,
        seen: &mut std::collections::HashSet<ResourceKind>,
    ) {
        if seen.contains(&kind) {
            return;
        }
        if let Some(parent) = kind.parent_kind() {
            insert_chain(parent, plan, seen);
        }
        seen.insert(kind);
        plan.push(kind);
    }

    for &target in targets {
        insert_chain(target, &mut plan, &mut seen);
    }
    plan
}
