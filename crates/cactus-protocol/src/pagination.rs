// SPDX-License-Identifier: MIT OR Apache-2.0
//! List pagination.

use crate::client::{ProtocolClient, RequestContext};
use crate::query::ListQuery;
use cactus_error::RequestKind;
use cactus_model::payload::list::ListEnvelope;
use cactus_model::ResourceKind;
use serde::de::DeserializeOwned;

/// Default page size used when a caller has no specific preference.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Default pagination cap.
pub const DEFAULT_MAX_PAGES: u32 = 20;

/// The items collected across every page, plus any cross-page divergence
/// warnings. Divergences never fail the action.
#[derive(Debug, Clone)]
pub struct PaginateOutcome<T> {
    /// Every item collected, in server-returned order.
    pub items: Vec<T>,
    /// `results`/`all` consistency warnings recorded while paging.
    pub warnings: Vec<String>,
}

/// Fetch every page of `list_href`, stopping when a page yields zero items.
///
/// # Errors
///
/// Returns [`RequestKind::PaginationOverflow`] if more than `max_pages`
/// pages are requested without exhausting the list, or any error raised by
/// the underlying GET.
pub async fn paginate_list<T: DeserializeOwned>(
    client: &ProtocolClient,
    kind: ResourceKind,
    ctx: &RequestContext,
    list_href: &str,
    page_size: u32,
    max_pages: u32,
) -> Result<PaginateOutcome<T>, RequestKind> {
    let mut items = Vec::new();
    let mut warnings = Vec::new();
    let mut claimed_all: Option<u32> = None;
    let mut page = 0u32;

    loop {
        if page >= max_pages {
            return Err(RequestKind::PaginationOverflow {
                href: list_href.to_string(),
                max_pages,
            });
        }

        let query = ListQuery::page(page * page_size, page_size).to_query_string();
        let href = format!("{list_href}{query}");
        let list: ListEnvelope<T> = client.get(kind, ctx, &href).await?;

        if list.items.is_empty() {
            break;
        }

        if list.items.len() as u32 != list.results {
            warnings.push(format!(
                "{list_href}: page {page} reported results={} but yielded {} items",
                list.results,
                list.items.len()
            ));
        }

        match (claimed_all, list.all) {
            (None, Some(a)) => claimed_all = Some(a),
            (Some(prev), Some(a)) if prev != a => {
                warnings.push(format!(
                    "{list_href}: page {page} reported all={a}, an earlier page reported all={prev}"
                ));
            }
            _ => {}
        }

        items.extend(list.items);
        page += 1;
    }

    if let Some(all) = claimed_all {
        if all as usize != items.len() {
            warnings.push(format!(
                "{list_href}: claimed all={all} but yielded {} items total",
                items.len()
            ));
        }
    }

    Ok(PaginateOutcome { items, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RequestContext;
    use cactus_model::payload::end_device::EndDevice;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn device(n: u32) -> EndDevice {
        EndDevice {
            href: Some(format!("/edev/{n}")),
            l_fdi: format!("{n:040}"),
            s_fdi: u64::from(n),
            device_category: "0400".into(),
            enabled: true,
            post_rate: None,
            connection_point_link: None,
            registration_link: None,
            function_set_assignments_list_link: None,
            der_list_link: None,
            subscription_list_link: None,
        }
    }

    #[tokio::test]
    async fn all_count_mismatch_is_a_warning_not_a_failure() {
        let server = MockServer::start().await;

        let first_page = ListEnvelope {
            all: Some(3),
            results: 2,
            href: Some("/edev".into()),
            items: vec![device(1), device(2)],
        };
        let second_page: ListEnvelope<EndDevice> = ListEnvelope {
            all: Some(3),
            results: 0,
            href: Some("/edev".into()),
            items: vec![],
        };

        Mock::given(method("GET"))
            .and(path("/edev"))
            .and(query_param("s", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(quick_xml::se::to_string(&first_page).unwrap()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/edev"))
            .and(query_param("s", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_string(quick_xml::se::to_string(&second_page).unwrap()))
            .mount(&server)
            .await;

        let client = ProtocolClient::unauthenticated(&server.uri(), Duration::from_millis(1));
        let ctx = RequestContext { client_alias: "client-1".into(), step_id: "s1".into() };
        let outcome: PaginateOutcome<EndDevice> =
            paginate_list(&client, ResourceKind::EndDeviceList, &ctx, "/edev", 20, DEFAULT_MAX_PAGES)
                .await
                .unwrap();

        assert_eq!(outcome.items.len(), 2);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("all=3"));
    }
}
