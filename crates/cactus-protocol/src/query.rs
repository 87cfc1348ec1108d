// SPDX-License-Identifier: MIT OR Apache-2.0
//! List-request query-string construction.

/// Optional pagination/filter parameters accepted by list requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListQuery {
    /// `s` — zero-indexed start offset.
    pub start: Option<u32>,
    /// `l` — page size limit.
    pub limit: Option<u32>,
    /// `a` — only return items changed after this unix timestamp.
    pub changed_after: Option<i64>,
}

impl ListQuery {
    /// A query requesting the page `[start, start + limit)`.
    #[must_use]
    pub fn page(start: u32, limit: u32) -> Self {
        Self {
            start: Some(start),
            limit: Some(limit),
            changed_after: None,
        }
    }

    /// Render as a `?s=&l=&a=`-style suffix, or the empty string if no
    /// parameter is set.
    #[must_use]
    pub fn to_query_string(self) -> String {
        let mut parts = Vec::new();
        if let Some(s) = self.start {
            parts.push(format!("s={s}"));
        }
        if let Some(l) = self.limit {
            parts.push(format!("l={l}"));
        }
        if let Some(a) = self.changed_after {
            parts.push(format!("a={a}"));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_has_no_suffix() {
        assert_eq!(ListQuery::default().to_query_string(), "");
    }

    #[test]
    fn page_query_orders_s_then_l() {
        assert_eq!(ListQuery::page(20, 10).to_query_string(), "?s=20&l=10");
    }

    #[test]
    fn changed_after_is_appended_last() {
        let q = ListQuery {
            start: Some(0),
            limit: Some(5),
            changed_after: Some(1_700_000_000),
        };
        assert_eq!(q.to_query_string(), "?s=0&l=5&a=1700000000");
    }
}
