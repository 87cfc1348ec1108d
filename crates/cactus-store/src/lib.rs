// SPDX-License-Identifier: MIT OR Apache-2.0
//! cactus-store
//!
//! The in-memory resource store: a dual-indexed table of
//! [`StoredResource`]s keyed by [`ResourceId`] and by [`ResourceKind`], plus
//! an [`Annotations`] side-table so tags and aliases survive a payload
//! `upsert`.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use cactus_model::{Annotations, ResourceId, ResourceKind, StoredResource};
use std::collections::{BTreeSet, HashMap};

/// A single client's view of discovered/created protocol resources.
///
/// Each test client gets its own `ResourceStore`: resources are
/// never shared across clients, since two clients may legitimately see
/// different representations of what is nominally the same server
/// resource (e.g. per-client `EndDeviceList` pagination).
#[derive(Debug, Default)]
pub struct ResourceStore {
    by_id: HashMap<ResourceId, StoredResource>,
    by_kind: HashMap<ResourceKind, BTreeSet<ResourceId>>,
    annotations: HashMap<ResourceId, Annotations>,
}

impl ResourceStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly discovered resource. Returns `false` without
    /// modifying the store if `resource`'s id is already present — callers
    /// that intend to overwrite should use [`Self::upsert`] instead.
    pub fn append(&mut self, resource: StoredResource) -> bool {
        if self.by_id.contains_key(&resource.id) {
            tracing::debug!(target: "cactus.store", id = %resource.id, "append: already present");
            return false;
        }
        tracing::debug!(target: "cactus.store", id = %resource.id, "append");
        self.index(&resource);
        self.by_id.insert(resource.id.clone(), resource);
        true
    }

    /// Insert `resource`, replacing any existing resource at the same id.
    /// Annotations attached to that id are preserved.
    pub fn upsert(&mut self, resource: StoredResource) {
        tracing::debug!(target: "cactus.store", id = %resource.id, "upsert");
        self.by_kind.entry(resource.kind()).or_default().insert(resource.id.clone());
        self.by_id.insert(resource.id.clone(), resource);
    }

    fn index(&mut self, resource: &StoredResource) {
        self.by_kind.entry(resource.kind()).or_default().insert(resource.id.clone());
    }

    /// Remove and return the resource at `id`, along with its annotations.
    pub fn delete(&mut self, id: &ResourceId) -> Option<StoredResource> {
        if let Some(set) = self.by_kind.get_mut(&id.kind()) {
            set.remove(id);
        }
        self.annotations.remove(id);
        self.by_id.remove(id)
    }

    /// Remove every resource of `kind` (and their annotations). Used before
    /// a full atomic re-discovery of a list kind.
    pub fn clear_kind(&mut self, kind: ResourceKind) {
        let Some(ids) = self.by_kind.remove(&kind) else {
            return;
        };
        for id in ids {
            self.annotations.remove(&id);
            self.by_id.remove(&id);
        }
    }

    /// Remove every resource of `kind` that is a descendant of `parent`.
    /// Used to atomically refresh one parent's list page-set without
    /// disturbing the same list kind under sibling parents.
    pub fn clear_descendants_of_kind(&mut self, kind: ResourceKind, parent: &ResourceId) {
        let Some(ids) = self.by_kind.get(&kind) else {
            return;
        };
        let doomed: Vec<ResourceId> = ids.iter().filter(|id| id.is_descendant_of(parent)).cloned().collect();
        for id in doomed {
            self.delete(&id);
        }
    }

    /// Look up a resource by its exact identifier.
    #[must_use]
    pub fn get_by_id(&self, id: &ResourceId) -> Option<&StoredResource> {
        self.by_id.get(id)
    }

    /// All resources of `kind`, in identifier order.
    #[must_use]
    pub fn get_by_kind(&self, kind: ResourceKind) -> Vec<&StoredResource> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
            .collect()
    }

    /// Find the identifier of a stored resource of `kind` whose own href is
    /// `href`, regardless of its parent chain. Used by callers (e.g. the
    /// notification subsystem) that learn of a resource by href alone and
    /// need to upsert under its existing identity rather than inventing one.
    #[must_use]
    pub fn find_id(&self, kind: ResourceKind, href: &str) -> Option<ResourceId> {
        self.by_kind
            .get(&kind)?
            .iter()
            .find(|id| id.href() == href)
            .cloned()
    }

    /// Find the stored resource of `kind` annotated with `alias` (the many
    /// `*-id alias` parameters actions accept: mup-id, sub-id). `None` if no
    /// resource of that kind carries the alias.
    #[must_use]
    pub fn find_by_alias(&self, kind: ResourceKind, alias: &str) -> Option<&StoredResource> {
        self.by_kind.get(&kind)?.iter().find_map(|id| {
            let annotated = self.annotations.get(id)?.alias.as_deref() == Some(alias);
            annotated.then(|| self.by_id.get(id)).flatten()
        })
    }

    /// All stored resources that are descendants of `ancestor`.
    #[must_use]
    pub fn get_descendants_of(&self, ancestor: &ResourceId) -> Vec<&StoredResource> {
        self.by_id
            .values()
            .filter(|r| r.id.is_descendant_of(ancestor))
            .collect()
    }

    /// The nearest ancestor of `id` with the given `kind`, if one is stored.
    #[must_use]
    pub fn get_ancestor_of(&self, id: &ResourceId, kind: ResourceKind) -> Option<&StoredResource> {
        let mut current = id.parent_id();
        while let Some(candidate) = current {
            if candidate.kind() == kind {
                return self.by_id.get(&candidate);
            }
            current = candidate.parent_id();
        }
        None
    }

    /// Lazily enumerate every stored resource, in no particular order.
    pub fn resources(&self) -> impl Iterator<Item = &StoredResource> {
        self.by_id.values()
    }

    /// Mutable access to `id`'s annotations, creating a default entry on
    /// first use.
    pub fn annotations_mut(&mut self, id: &ResourceId) -> &mut Annotations {
        self.annotations.entry(id.clone()).or_default()
    }

    /// Read-only access to `id`'s annotations, if any have been recorded.
    #[must_use]
    pub fn annotations(&self, id: &ResourceId) -> Option<&Annotations> {
        self.annotations.get(id)
    }

    /// Number of resources currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// `true` iff the store holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cactus_model::payload::device_capability::{DeviceCapability, Link};
    use cactus_model::payload::Payload;
    use std::collections::BTreeMap;
    use std::time::SystemTime;

    fn dcap(href: &str) -> StoredResource {
        StoredResource {
            id: ResourceId::root(ResourceKind::DeviceCapability, href),
            created_at: SystemTime::now(),
            payload: Payload::DeviceCapability(DeviceCapability {
                href: Some(href.to_string()),
                time_link: Some(Link::new("/time")),
                end_device_list_link: Some(Link::new("/edev")),
                mirror_usage_point_list_link: None,
            }),
            child_links: BTreeMap::new(),
            member_of_list: None,
        }
    }

    #[test]
    fn append_rejects_duplicate_id() {
        let mut store = ResourceStore::new();
        assert!(store.append(dcap("/dcap")));
        assert!(!store.append(dcap("/dcap")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn upsert_preserves_annotations() {
        let mut store = ResourceStore::new();
        let r = dcap("/dcap");
        store.append(r.clone());
        store.annotations_mut(&r.id).set_alias("root");
        store.upsert(dcap("/dcap"));
        assert_eq!(store.annotations(&r.id).unwrap().alias.as_deref(), Some("root"));
    }

    #[test]
    fn clear_kind_removes_only_that_kind() {
        let mut store = ResourceStore::new();
        store.append(dcap("/dcap"));
        store.clear_kind(ResourceKind::DeviceCapability);
        assert!(store.is_empty());
    }

    #[test]
    fn delete_removes_resource_and_annotations() {
        let mut store = ResourceStore::new();
        let r = dcap("/dcap");
        store.append(r.clone());
        store.annotations_mut(&r.id).add_tag("ns", "x");
        let removed = store.delete(&r.id);
        assert!(removed.is_some());
        assert!(store.annotations(&r.id).is_none());
    }

    #[test]
    fn descendants_and_ancestor_lookup() {
        let mut store = ResourceStore::new();
        let root = dcap("/dcap");
        store.append(root.clone());
        let edev_list_id = ResourceId::new(ResourceKind::EndDeviceList, "/edev", Some(&root.id));
        let edev_list = StoredResource {
            id: edev_list_id.clone(),
            created_at: SystemTime::now(),
            payload: root.payload.clone(),
            child_links: BTreeMap::new(),
            member_of_list: None,
        };
        store.append(edev_list);

        let descendants = store.get_descendants_of(&root.id);
        assert_eq!(descendants.len(), 1);

        let ancestor = store.get_ancestor_of(&edev_list_id, ResourceKind::DeviceCapability);
        assert_eq!(ancestor.unwrap().id, root.id);
    }

    #[test]
    fn find_by_alias_locates_the_annotated_resource() {
        let mut store = ResourceStore::new();
        let root = dcap("/dcap");
        store.append(root.clone());
        store.annotations_mut(&root.id).set_alias("main-site");

        assert_eq!(store.find_by_alias(ResourceKind::DeviceCapability, "main-site").map(|r| &r.id), Some(&root.id));
        assert!(store.find_by_alias(ResourceKind::DeviceCapability, "other").is_none());
        assert!(store.find_by_alias(ResourceKind::EndDevice, "main-site").is_none());
    }

    #[test]
    fn find_id_locates_by_kind_and_href_regardless_of_parent() {
        let mut store = ResourceStore::new();
        let root = dcap("/dcap");
        store.append(root.clone());

        assert_eq!(store.find_id(ResourceKind::DeviceCapability, "/dcap"), Some(root.id));
        assert_eq!(store.find_id(ResourceKind::DeviceCapability, "/other"), None);
        assert_eq!(store.find_id(ResourceKind::EndDevice, "/dcap"), None);
    }
}
