// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stored-resource identifiers — parent-chained hrefs from self to root.

use crate::kind::ResourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One `(kind, href)` link in a [`ResourceId`] chain.
pub type IdSegment = (ResourceKind, String);

/// A stored-resource identifier: an ordered chain of `(kind, href)` pairs
/// from the resource itself (index 0) up to the root.
///
/// Identifiers are content-addressed by the server's own hrefs — the
/// harness never invents one. Equality is tuple (chain) equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(Vec<IdSegment>);

impl ResourceId {
    /// Build an identifier by prepending `(kind, href)` in front of a
    /// parent identifier (or as a root identifier, if `parent` is `None`).
    #[must_use]
    pub fn new(kind: ResourceKind, href: impl Into<String>, parent: Option<&ResourceId>) -> Self {
        let mut segments = vec![(kind, href.into())];
        if let Some(p) = parent {
            segments.extend(p.0.iter().cloned());
        }
        Self(segments)
    }

    /// Build a root identifier (no parent chain).
    #[must_use]
    pub fn root(kind: ResourceKind, href: impl Into<String>) -> Self {
        Self(vec![(kind, href.into())])
    }

    /// The resource's own kind.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.0[0].0
    }

    /// The resource's own href.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.0[0].1
    }

    /// The full chain, self first, root last.
    #[must_use]
    pub fn segments(&self) -> &[IdSegment] {
        &self.0
    }

    /// The identifier of this resource's immediate parent, or `None` at the root.
    #[must_use]
    pub fn parent_id(&self) -> Option<ResourceId> {
        if self.0.len() <= 1 {
            None
        } else {
            Some(ResourceId(self.0[1..].to_vec()))
        }
    }

    /// `true` iff `self` is a (possibly indirect) descendant of `ancestor` —
    /// i.e. the tail of `self`'s chain equals `ancestor`'s chain.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &ResourceId) -> bool {
        self != ancestor && self.0.ends_with(&ancestor.0)
    }

    /// `true` iff `other` is a descendant of `self` (see [`Self::is_descendant_of`]).
    #[must_use]
    pub fn is_ancestor_of(&self, other: &ResourceId) -> bool {
        other.is_descendant_of(self)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(k, href)| format!("{k:?}:{href}"))
            .collect();
        write!(f, "{}", parts.join(" < "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_id_drops_head() {
        let root = ResourceId::root(ResourceKind::DeviceCapability, "/dcap");
        let child = ResourceId::new(ResourceKind::EndDeviceList, "/edev", Some(&root));
        assert_eq!(child.parent_id().as_ref(), Some(&root));
        assert_eq!(root.parent_id(), None);
    }

    #[test]
    fn descendant_ancestor_consistency() {
        let a = ResourceId::root(ResourceKind::DeviceCapability, "/dcap");
        let b = ResourceId::new(ResourceKind::EndDeviceList, "/edev", Some(&a));
        let c = ResourceId::new(ResourceKind::EndDevice, "/edev/1", Some(&b));

        assert!(c.is_descendant_of(&a));
        assert!(a.is_ancestor_of(&c));
        assert!(!a.is_descendant_of(&c));
        assert!(!a.is_descendant_of(&a));
    }

    #[test]
    fn equality_is_chain_equality() {
        let a = ResourceId::root(ResourceKind::DeviceCapability, "/dcap");
        let b = ResourceId::root(ResourceKind::DeviceCapability, "/dcap");
        let c = ResourceId::root(ResourceKind::DeviceCapability, "/other");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
