// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-kind dispatch between [`ResourceKind`] and its concrete wire type.
//!
//! The payload types are hand-modelled, so there is no single generic
//! GET/parse call that works for every kind — this module is the one place
//! that knows the mapping.

use cactus_error::RequestKind;
use cactus_model::payload::der::{Der, DerCapability, DerProgram, DerSettings, DerStatus, DefaultDerControl, FunctionSetAssignments};
use cactus_model::payload::der_control::DerControl;
use cactus_model::payload::device_capability::DeviceCapability;
use cactus_model::payload::end_device::{ConnectionPoint, EndDevice, Registration};
use cactus_model::payload::mirror_usage_point::MirrorUsagePoint;
use cactus_model::payload::subscription::Subscription;
use cactus_model::payload::Payload;
use cactus_model::ResourceKind;
use cactus_protocol::{paginate_list, ProtocolClient, RequestContext, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};

/// GET a singleton resource of `kind` at `href` and wrap it as a [`Payload`].
///
/// # Errors
///
/// Returns [`RequestKind::ParseFailure`] if `kind` is a list kind (list
/// items are only ever populated via [`fetch_list_items`]), or any error
/// from the underlying GET.
pub async fn fetch_singleton_payload(
    client: &ProtocolClient,
    ctx: &RequestContext,
    kind: ResourceKind,
    href: &str,
) -> Result<Payload, RequestKind> {
    Ok(match kind {
        ResourceKind::DeviceCapability => Payload::DeviceCapability(client.get::<DeviceCapability>(kind, ctx, href).await?),
        ResourceKind::EndDevice => Payload::EndDevice(client.get::<EndDevice>(kind, ctx, href).await?),
        ResourceKind::ConnectionPoint => Payload::ConnectionPoint(client.get::<ConnectionPoint>(kind, ctx, href).await?),
        ResourceKind::Registration => Payload::Registration(client.get::<Registration>(kind, ctx, href).await?),
        ResourceKind::Subscription => Payload::Subscription(client.get::<Subscription>(kind, ctx, href).await?),
        ResourceKind::FunctionSetAssignments => {
            Payload::FunctionSetAssignments(client.get::<FunctionSetAssignments>(kind, ctx, href).await?)
        }
        ResourceKind::DerProgram => Payload::DerProgram(client.get::<DerProgram>(kind, ctx, href).await?),
        ResourceKind::DefaultDerControl => Payload::DefaultDerControl(client.get::<DefaultDerControl>(kind, ctx, href).await?),
        ResourceKind::DerControl => Payload::DerControl(client.get::<DerControl>(kind, ctx, href).await?),
        ResourceKind::Der => Payload::Der(client.get::<Der>(kind, ctx, href).await?),
        ResourceKind::DerCapability => Payload::DerCapability(client.get::<DerCapability>(kind, ctx, href).await?),
        ResourceKind::DerSettings => Payload::DerSettings(client.get::<DerSettings>(kind, ctx, href).await?),
        ResourceKind::DerStatus => Payload::DerStatus(client.get::<DerStatus>(kind, ctx, href).await?),
        ResourceKind::MirrorUsagePoint => Payload::MirrorUsagePoint(client.get::<MirrorUsagePoint>(kind, ctx, href).await?),
        other => {
            return Err(RequestKind::ParseFailure {
                kind: format!("{other:?}"),
                reason: "not a singleton resource kind".into(),
            })
        }
    })
}

/// Paginate every page of the list at `href` and return each item's own
/// href (if the server supplied one) alongside its parsed [`Payload`], plus
/// any cross-page consistency warnings.
///
/// # Errors
///
/// Returns [`RequestKind::ParseFailure`] if `list_kind` is not a list kind,
/// or any error from the underlying pagination.
pub async fn fetch_list_items(
    client: &ProtocolClient,
    ctx: &RequestContext,
    list_kind: ResourceKind,
    href: &str,
) -> Result<(Vec<(Option<String>, Payload)>, Vec<String>), RequestKind> {
    macro_rules! paginate_as {
        ($item_ty:ty, $variant:ident) => {{
            let outcome = paginate_list::<$item_ty>(client, list_kind, ctx, href, DEFAULT_PAGE_SIZE, DEFAULT_MAX_PAGES).await?;
            let items = outcome
                .items
                .into_iter()
                .map(|item| (item.href.clone(), Payload::$variant(item)))
                .collect();
            (items, outcome.warnings)
        }};
    }

    Ok(match list_kind {
        ResourceKind::EndDeviceList => paginate_as!(EndDevice, EndDevice),
        ResourceKind::SubscriptionList => paginate_as!(Subscription, Subscription),
        ResourceKind::FunctionSetAssignmentsList => paginate_as!(FunctionSetAssignments, FunctionSetAssignments),
        ResourceKind::DerProgramList => paginate_as!(DerProgram, DerProgram),
        ResourceKind::DerControlList => paginate_as!(DerControl, DerControl),
        ResourceKind::DerList => paginate_as!(Der, Der),
        ResourceKind::MirrorUsagePointList => paginate_as!(MirrorUsagePoint, MirrorUsagePoint),
        other => {
            return Err(RequestKind::ParseFailure {
                kind: format!("{other:?}"),
                reason: "not a list resource kind".into(),
            })
        }
    })
}
