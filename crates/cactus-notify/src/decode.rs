// SPDX-License-Identifier: MIT OR Apache-2.0
//! Re-parse of a notification's embedded resource XML into a typed
//! [`Payload`] — the same hand-modelled-per-kind dispatch
//! `cactus-discovery`'s `payload_io` does for GET responses, restricted to
//! the subset of kinds `resource_kind_from_xsi_type` recognises.

use cactus_model::payload::der::{Der, DerCapability, DerProgram, DerSettings, DerStatus, DefaultDerControl, FunctionSetAssignments};
use cactus_model::payload::der_control::DerControl;
use cactus_model::payload::end_device::EndDevice;
use cactus_model::payload::list::ListEnvelope;
use cactus_model::payload::mirror_usage_point::MirrorUsagePoint;
use cactus_model::payload::subscription::Subscription;
use cactus_model::payload::Payload;
use cactus_model::ResourceKind;

/// A decoded notification resource: either a single resource, or (for the
/// two list-subscribable kinds) every item of an embedded list.
#[derive(Debug, Clone)]
pub enum DecodedResource {
    /// A single resource.
    Single(Payload),
    /// Every item of an embedded list resource.
    List(Vec<Payload>),
}

/// Decode `xml` — the embedded resource of a notification envelope — as
/// `kind`.
///
/// # Errors
///
/// Returns a human-readable reason if `xml` fails to parse, or if `kind` is
/// outside the set of kinds a notification can ever carry.
pub fn decode_resource_xml(kind: ResourceKind, xml: &str) -> Result<DecodedResource, String> {
    macro_rules! single {
        ($ty:ty, $variant:ident) => {
            quick_xml::de::from_str::<$ty>(xml)
                .map(|p| DecodedResource::Single(Payload::$variant(p)))
                .map_err(|e| e.to_string())
        };
    }
    macro_rules! list {
        ($ty:ty, $variant:ident) => {
            quick_xml::de::from_str::<ListEnvelope<$ty>>(xml)
                .map(|l| DecodedResource::List(l.items.into_iter().map(Payload::$variant).collect()))
                .map_err(|e| e.to_string())
        };
    }

    match kind {
        ResourceKind::EndDevice => single!(EndDevice, EndDevice),
        ResourceKind::DerControl => single!(DerControl, DerControl),
        ResourceKind::DefaultDerControl => single!(DefaultDerControl, DefaultDerControl),
        ResourceKind::DerProgram => single!(DerProgram, DerProgram),
        ResourceKind::Subscription => single!(Subscription, Subscription),
        ResourceKind::FunctionSetAssignments => single!(FunctionSetAssignments, FunctionSetAssignments),
        ResourceKind::MirrorUsagePoint => single!(MirrorUsagePoint, MirrorUsagePoint),
        ResourceKind::Der => single!(Der, Der),
        ResourceKind::DerStatus => single!(DerStatus, DerStatus),
        ResourceKind::DerSettings => single!(DerSettings, DerSettings),
        ResourceKind::DerCapability => single!(DerCapability, DerCapability),
        ResourceKind::DerProgramList => list!(DerProgram, DerProgram),
        ResourceKind::DerControlList => list!(DerControl, DerControl),
        other => Err(format!("{other:?} is not a notifiable resource kind")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_single_end_device() {
        let device = EndDevice {
            href: Some("/edev/1".into()),
            l_fdi: "AA".repeat(20),
            s_fdi: 1,
            device_category: "0400".into(),
            enabled: true,
            post_rate: None,
            connection_point_link: None,
            registration_link: None,
            function_set_assignments_list_link: None,
            der_list_link: None,
            subscription_list_link: None,
        };
        let xml = quick_xml::se::to_string(&device).unwrap();
        let decoded = decode_resource_xml(ResourceKind::EndDevice, &xml).unwrap();
        assert!(matches!(decoded, DecodedResource::Single(Payload::EndDevice(_))));
    }

    #[test]
    fn rejects_a_non_notifiable_kind() {
        assert!(decode_resource_xml(ResourceKind::EndDeviceList, "<EndDeviceList/>").is_err());
    }
}
