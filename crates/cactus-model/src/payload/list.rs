// SPDX-License-Identifier: MIT OR Apache-2.0
//! Generic paginated-list envelope shared by every list-kind payload.

use serde::{Deserialize, Serialize};

/// A paginated list envelope: `all` is the server's claimed total count,
/// `results` is the count of items on *this* page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    /// The server's claimed total item count across all pages.
    #[serde(rename = "@all")]
    pub all: Option<u32>,
    /// The number of items present on this page.
    #[serde(rename = "@results")]
    pub results: u32,
    /// The href of the list resource itself.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// The items on this page.
    #[serde(default)]
    pub items: Vec<T>,
}

impl<T> ListEnvelope<T> {
    /// `true` when the server reported zero total and zero results —
    /// the "empty list" shape accepted by `client-error-or-empty-list`.
    #[must_use]
    pub fn is_definitely_empty(&self) -> bool {
        self.results == 0 && self.all == Some(0)
    }
}
