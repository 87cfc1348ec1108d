// SPDX-License-Identifier: MIT OR Apache-2.0
//! cactus-discovery
//!
//! The resource-tree discovery walker: given a set of target kinds,
//! visits the ordered ancestors-first walk plan ([`cactus_model::walk_plan`])
//! and either paginates a list kind's items into the store (replacing the
//! prior snapshot atomically) or GETs a singleton kind and upserts it.
//! Missing parent links are a silent skip; a list item with no href of its
//! own is rejected (recorded as a warning) rather than folded into the
//! list's href, which would risk colliding with a sibling item's id.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod payload_io;

use cactus_error::RequestKind;
use cactus_model::{walk_plan, ResourceId, ResourceKind, StoredResource};
use cactus_protocol::{ProtocolClient, RequestContext};
use cactus_store::ResourceStore;
use std::collections::BTreeMap;
use std::time::SystemTime;

pub use payload_io::{fetch_list_items, fetch_singleton_payload};

/// Non-fatal divergences observed while discovering (pagination count
/// mismatches). Never fails the walk.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    /// Warnings collected across every list kind visited.
    pub warnings: Vec<String>,
}

/// Run the discovery walker for `targets` against `store`.
///
/// # Errors
///
/// Returns any [`RequestKind`] raised by the underlying protocol client
/// (transport failure, unexpected status, parse failure, pagination
/// overflow). A missing parent link is a silent skip, not an error.
pub async fn run_discovery(
    client: &ProtocolClient,
    device_capability_uri: &str,
    ctx: &RequestContext,
    store: &mut ResourceStore,
    targets: &[ResourceKind],
) -> Result<DiscoveryOutcome, RequestKind> {
    let mut warnings = Vec::new();
    let plan = walk_plan(targets);

    for kind in plan {
        if kind == ResourceKind::DeviceCapability {
            discover_root(client, device_capability_uri, ctx, store).await?;
            continue;
        }

        let Some(parent_kind) = kind.parent_kind() else {
            continue;
        };

        if parent_kind.is_list_kind() {
            // `kind` is a list-item kind; it is populated entirely by the
            // list-kind branch below when we visited its parent list kind.
            continue;
        }

        let parent_ids: Vec<ResourceId> = store.get_by_kind(parent_kind).into_iter().map(|r| r.id.clone()).collect();

        for parent_id in parent_ids {
            let Some(href) = store.get_by_id(&parent_id).and_then(|p| p.child_links.get(&kind).cloned()) else {
                tracing::debug!(target: "cactus.discovery", ?kind, parent = %parent_id, "no link for kind, skipping");
                continue;
            };

            if kind.is_list_kind() {
                let page_warnings = discover_list(client, ctx, store, kind, &href, &parent_id).await?;
                warnings.extend(page_warnings);
            } else {
                discover_singleton(client, ctx, store, kind, &href, &parent_id).await?;
            }
        }
    }

    Ok(DiscoveryOutcome { warnings })
}

async fn discover_root(
    client: &ProtocolClient,
    device_capability_uri: &str,
    ctx: &RequestContext,
    store: &mut ResourceStore,
) -> Result<(), RequestKind> {
    let payload = fetch_singleton_payload(client, ctx, ResourceKind::DeviceCapability, device_capability_uri).await?;
    let child_links: BTreeMap<ResourceKind, String> = payload.child_links().into_iter().collect();
    let id = ResourceId::root(ResourceKind::DeviceCapability, device_capability_uri);
    store.upsert(StoredResource {
        id,
        created_at: SystemTime::now(),
        payload,
        child_links,
        member_of_list: None,
    });
    Ok(())
}

async fn discover_singleton(
    client: &ProtocolClient,
    ctx: &RequestContext,
    store: &mut ResourceStore,
    kind: ResourceKind,
    href: &str,
    parent_id: &ResourceId,
) -> Result<(), RequestKind> {
    let payload = fetch_singleton_payload(client, ctx, kind, href).await?;
    let child_links: BTreeMap<ResourceKind, String> = payload.child_links().into_iter().collect();
    let id = ResourceId::new(kind, href, Some(parent_id));
    store.upsert(StoredResource {
        id,
        created_at: SystemTime::now(),
        payload,
        child_links,
        member_of_list: None,
    });
    Ok(())
}

async fn discover_list(
    client: &ProtocolClient,
    ctx: &RequestContext,
    store: &mut ResourceStore,
    list_kind: ResourceKind,
    href: &str,
    parent_id: &ResourceId,
) -> Result<Vec<String>, RequestKind> {
    let item_kind = list_kind.item_kind().expect("list_kind.is_list_kind() implies item_kind()");
    let (items, mut warnings) = fetch_list_items(client, ctx, list_kind, href).await?;

    let list_id = ResourceId::new(list_kind, href, Some(parent_id));
    store.clear_descendants_of_kind(item_kind, &list_id);

    for (item_href, payload) in items {
        let Some(item_href) = item_href.filter(|h| !h.is_empty()) else {
            tracing::warn!(target: "cactus.discovery", ?item_kind, list = %href, "item has no href, rejecting");
            warnings.push(format!("{item_kind:?} item in list {href} has no href and was rejected"));
            continue;
        };
        let child_links: BTreeMap<ResourceKind, String> = payload.child_links().into_iter().collect();
        let id = ResourceId::new(item_kind, item_href, Some(&list_id));
        store.append(StoredResource {
            id,
            created_at: SystemTime::now(),
            payload,
            child_links,
            member_of_list: Some(list_kind),
        });
    }

    Ok(warnings)
}
