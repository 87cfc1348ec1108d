// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stored resources and their side-table annotations.

use crate::id::ResourceId;
use crate::kind::ResourceKind;
use crate::payload::Payload;
use std::collections::{BTreeMap, HashSet};
use std::time::SystemTime;

/// A single discovered/created resource, as kept by the store.
#[derive(Debug, Clone)]
pub struct StoredResource {
    /// The resource's stable identifier.
    pub id: ResourceId,
    /// Wall-clock instant this resource was first stored.
    pub created_at: SystemTime,
    /// This resource's parsed payload.
    pub payload: Payload,
    /// Child-link hrefs, keyed by child kind (projected from `payload`).
    pub child_links: BTreeMap<ResourceKind, String>,
    /// If this resource is an item of a list kind, which list kind it
    /// belongs to.
    pub member_of_list: Option<ResourceKind>,
}

impl StoredResource {
    /// This resource's kind (delegates to [`ResourceId::kind`]).
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.id.kind()
    }

    /// This resource's own href.
    #[must_use]
    pub fn href(&self) -> &str {
        self.id.href()
    }
}

/// Annotations attached to a stored resource's identifier: a human alias
/// and tag sets grouped by namespace. Lives in a side table so that
/// `upsert` of the payload preserves annotations cheaply.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    /// Caller-assigned alias (e.g. a test-defined mup-id).
    pub alias: Option<String>,
    /// Tag sets, keyed by namespace (e.g. `"responses"`, `"subscription-received"`).
    pub tags: BTreeMap<String, HashSet<String>>,
}

impl Annotations {
    /// Add `tag` under `namespace`.
    pub fn add_tag(&mut self, namespace: impl Into<String>, tag: impl Into<String>) {
        self.tags
            .entry(namespace.into())
            .or_default()
            .insert(tag.into());
    }

    /// `true` if `tag` is present under `namespace`.
    #[must_use]
    pub fn has_tag(&self, namespace: &str, tag: &str) -> bool {
        self.tags
            .get(namespace)
            .is_some_and(|set| set.contains(tag))
    }

    /// Set (overwrite) the human alias.
    pub fn set_alias(&mut self, alias: impl Into<String>) {
        self.alias = Some(alias.into());
    }
}
