// SPDX-License-Identifier: MIT OR Apache-2.0
//! `upsert-der-capability`, `upsert-der-settings`, `upsert-der-status`,
//! `send-malformed-der-settings`.

use crate::context::{ActionContext, ActionResult};
use crate::error::ActionError;
use crate::params::optional_i64;
use cactus_error::{RequestKind, TestDefinitionKind};
use cactus_model::payload::der::{DerCapability, DerSettings, DerStatus};
use cactus_model::{ParamMap, ResourceId, ResourceKind, StoredResource};
use reqwest::Method;
use std::time::UNIX_EPOCH;

fn unix_now(ctx: &ActionContext<'_>) -> i64 {
    ctx.now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

/// Locate this client's own DER — the single DER entry under the end
/// device that matches this client's LFDI.
fn find_own_der(ctx: &ActionContext<'_>) -> Option<StoredResource> {
    let own_edev = ctx.store.get_by_kind(ResourceKind::EndDevice).into_iter().find(|r| match &r.payload {
        cactus_model::payload::Payload::EndDevice(e) => cactus_util::hex_binary_str_eq(&e.l_fdi, &ctx.client_config.lfdi),
        _ => false,
    })?;
    ctx.store.get_descendants_of(&own_edev.id).into_iter().find(|r| r.kind() == ResourceKind::Der).cloned()
}

fn bad(step_id: &str, name: &str, reason: impl Into<String>) -> ActionError {
    TestDefinitionKind::BadParameter { step_id: step_id.to_string(), name: name.to_string(), reason: reason.into() }.into()
}

/// **upsert-der-capability(rtg-max-w?)**.
pub async fn upsert_der_capability(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let rtg_max_w = optional_i64(params, "rtg-max-w").map_or(ctx.client_config.nominal_max_watts, |n| n as i32);
    let der = find_own_der(ctx).ok_or_else(|| bad(step_id, "rtg-max-w", "no DER found for this client"))?;
    let href = der
        .child_links
        .get(&ResourceKind::DerCapability)
        .cloned()
        .ok_or_else(|| bad(step_id, "rtg-max-w", "this DER has no der-capability link"))?;

    let payload = DerCapability { href: None, rtg_max_w };
    let outcome = ctx
        .client
        .submit_and_refetch(ResourceKind::DerCapability, ctx.request_ctx, Method::PUT, &href, &payload, true)
        .await?;

    let id = ResourceId::new(ResourceKind::DerCapability, &href, Some(&der.id));
    ctx.store.upsert(StoredResource {
        id,
        created_at: ctx.now,
        payload: cactus_model::payload::Payload::DerCapability(outcome.refetched),
        child_links: Default::default(),
        member_of_list: None,
    });

    Ok(match outcome.warning {
        Some(w) => ActionResult::done_with(w),
        None => ActionResult::done(),
    })
}

/// **upsert-der-settings(set-max-w?)**.
pub async fn upsert_der_settings(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let set_max_w = optional_i64(params, "set-max-w").map_or(ctx.client_config.nominal_max_watts, |n| n as i32);
    let der = find_own_der(ctx).ok_or_else(|| bad(step_id, "set-max-w", "no DER found for this client"))?;
    let href = der
        .child_links
        .get(&ResourceKind::DerSettings)
        .cloned()
        .ok_or_else(|| bad(step_id, "set-max-w", "this DER has no der-settings link"))?;

    let payload = DerSettings { href: None, set_max_w, updated_time: Some(unix_now(ctx)) };
    let outcome = ctx
        .client
        .submit_and_refetch(ResourceKind::DerSettings, ctx.request_ctx, Method::PUT, &href, &payload, true)
        .await?;

    let id = ResourceId::new(ResourceKind::DerSettings, &href, Some(&der.id));
    ctx.store.upsert(StoredResource {
        id,
        created_at: ctx.now,
        payload: cactus_model::payload::Payload::DerSettings(outcome.refetched),
        child_links: Default::default(),
        member_of_list: None,
    });

    Ok(match outcome.warning {
        Some(w) => ActionResult::done_with(w),
        None => ActionResult::done(),
    })
}

/// **upsert-der-status(der-control-mode?)**.
pub async fn upsert_der_status(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let der_control_mode = optional_i64(params, "der-control-mode").map_or(0, |n| n as u32);
    let der = find_own_der(ctx).ok_or_else(|| bad(step_id, "der-control-mode", "no DER found for this client"))?;
    let href = der
        .child_links
        .get(&ResourceKind::DerStatus)
        .cloned()
        .ok_or_else(|| bad(step_id, "der-control-mode", "this DER has no der-status link"))?;

    let payload = DerStatus { href: None, der_control_mode, read_time: Some(unix_now(ctx)) };
    let outcome = ctx
        .client
        .submit_and_refetch(ResourceKind::DerStatus, ctx.request_ctx, Method::PUT, &href, &payload, true)
        .await?;

    let id = ResourceId::new(ResourceKind::DerStatus, &href, Some(&der.id));
    ctx.store.upsert(StoredResource {
        id,
        created_at: ctx.now,
        payload: cactus_model::payload::Payload::DerStatus(outcome.refetched),
        child_links: Default::default(),
        member_of_list: None,
    });

    Ok(match outcome.warning {
        Some(w) => ActionResult::done_with(w),
        None => ActionResult::done(),
    })
}

/// **send-malformed-der-settings()** — submit `DERSettings` with an
/// out-of-range `setMaxW` and expect a 4xx.
pub async fn send_malformed_der_settings(_params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let der = find_own_der(ctx).ok_or_else(|| bad(step_id, "der-control-mode", "no DER found for this client"))?;
    let href = der
        .child_links
        .get(&ResourceKind::DerSettings)
        .cloned()
        .ok_or_else(|| bad(step_id, "set-max-w", "this DER has no der-settings link"))?;

    // i32::MAX is well outside any real DERSettings.setMaxW bound (signed
    // power-type, same range `is-invalid-power-type` rejects).
    let payload = DerSettings { href: None, set_max_w: i32::MAX, updated_time: Some(unix_now(ctx)) };
    let xml = quick_xml::se::to_string(&payload).map_err(|e| RequestKind::ParseFailure { kind: "DERSettings".into(), reason: e.to_string() })?;

    match ctx.client.client_error_request(ctx.request_ctx, Method::PUT, &href, Some(xml)).await {
        Ok(_) => Ok(ActionResult::done()),
        Err(RequestKind::UnexpectedStatus { status, .. }) => {
            Ok(ActionResult::failed(format!("send-malformed-der-settings: expected a 4xx rejection, got {status}")))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cactus_model::payload::device_capability::Link;
    use cactus_model::payload::end_device::{DeviceCategory, EndDevice};
    use cactus_model::payload::Payload;
    use cactus_notify::NotificationsContext;
    use cactus_protocol::{ProtocolClient, RequestContext};
    use cactus_store::ResourceStore;
    use std::collections::BTreeMap;
    use std::time::{Duration, SystemTime};

    fn dummy_client_config() -> cactus_model::ClientConfig {
        cactus_model::ClientConfig {
            id: "client-1".into(),
            role: cactus_model::Role::Device,
            cert_path: "cert.pem".into(),
            key_path: "key.pem".into(),
            lfdi: "AB".repeat(20),
            pen: 1,
            pin: 1234,
            nominal_max_watts: 5000,
            user_agent: None,
        }
    }

    fn seed_own_edev_and_der(store: &mut ResourceStore, client_config: &cactus_model::ClientConfig) -> ResourceId {
        let edev_id = ResourceId::root(ResourceKind::EndDevice, "/edev/1");
        store.append(StoredResource {
            id: edev_id.clone(),
            created_at: SystemTime::now(),
            payload: Payload::EndDevice(EndDevice {
                href: Some("/edev/1".into()),
                l_fdi: client_config.lfdi.clone(),
                s_fdi: cactus_util::convert_lfdi_to_sfdi(&client_config.lfdi).unwrap(),
                device_category: DeviceCategory::Photovoltaic.hex_code().to_string(),
                enabled: true,
                post_rate: Some(60),
                connection_point_link: None,
                registration_link: None,
                function_set_assignments_list_link: None,
                der_list_link: Some(Link::new("/der")),
                subscription_list_link: None,
            }),
            child_links: BTreeMap::from([(ResourceKind::DerList, "/der".to_string())]),
            member_of_list: None,
        });

        let der_id = ResourceId::new(ResourceKind::Der, "/der/1", Some(&edev_id));
        store.append(StoredResource {
            id: der_id.clone(),
            created_at: SystemTime::now(),
            payload: Payload::Der(cactus_model::payload::der::Der {
                href: Some("/der/1".into()),
                der_capability_link: Some(Link::new("/der/1/cap")),
                der_settings_link: Some(Link::new("/der/1/set")),
                der_status_link: Some(Link::new("/der/1/stat")),
            }),
            child_links: BTreeMap::from([
                (ResourceKind::DerCapability, "/der/1/cap".to_string()),
                (ResourceKind::DerSettings, "/der/1/set".to_string()),
                (ResourceKind::DerStatus, "/der/1/stat".to_string()),
            ]),
            member_of_list: Some(ResourceKind::DerList),
        });
        der_id
    }

    #[tokio::test]
    async fn upsert_der_settings_submits_nominal_watts_by_default() {
        let server = wiremock::MockServer::start().await;
        let client_config = dummy_client_config();

        let refetched = DerSettings { href: Some("/der/1/set".into()), set_max_w: client_config.nominal_max_watts, updated_time: Some(100) };
        let body = quick_xml::se::to_string(&refetched).unwrap();

        wiremock::Mock::given(wiremock::matchers::method("PUT"))
            .and(wiremock::matchers::path("/der/1/set"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = ProtocolClient::unauthenticated(&server.uri(), Duration::from_millis(1));
        let req_ctx = RequestContext { client_alias: "client-1".into(), step_id: "s1".into() };
        let mut store = ResourceStore::new();
        seed_own_edev_and_der(&mut store, &client_config);
        let mut notifications = NotificationsContext::new(server.uri());
        let params = ParamMap::new();

        let mut ctx = ActionContext {
            client: &client,
            device_capability_uri: "/dcap",
            request_ctx: &req_ctx,
            client_config: &client_config,
            store: &mut store,
            notifications: &mut notifications,
            now: SystemTime::now(),
            repeat_number: 0,
        };

        let result = upsert_der_settings(&params, "s1", &mut ctx).await.unwrap();
        assert!(result.completed);
        assert_eq!(store.get_by_kind(ResourceKind::DerSettings).len(), 1);
    }
}
