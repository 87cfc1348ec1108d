// SPDX-License-Identifier: MIT OR Apache-2.0
//! `insert-end-device`, `upsert-connection-point`.

use crate::context::{ActionContext, ActionResult};
use crate::error::ActionError;
use crate::params::{flag, required_str};
use cactus_error::{RequestKind, TestDefinitionKind};
use cactus_model::payload::end_device::{ConnectionPoint, DeviceCategory, EndDevice};
use cactus_model::{ParamMap, ResourceId, ResourceKind, StoredResource};
use cactus_util::hex_binary_str_eq;
use reqwest::Method;

const NOMINAL_POST_RATE_SECONDS: u32 = 60;

fn find_own_end_device(ctx: &ActionContext<'_>) -> Option<StoredResource> {
    ctx.store
        .get_by_kind(ResourceKind::EndDevice)
        .into_iter()
        .find(|r| match &r.payload {
            cactus_model::payload::Payload::EndDevice(e) => hex_binary_str_eq(&e.l_fdi, &ctx.client_config.lfdi),
            _ => false,
        })
        .cloned()
}

/// **insert-end-device(force-lfdi?, expect-rejection?)**.
pub async fn insert_end_device(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let expect_rejection = flag(params, "expect-rejection");
    let lfdi = match params.get("force-lfdi").and_then(cactus_model::ParamValue::as_str) {
        Some(forced) => forced.to_string(),
        None => ctx.client_config.lfdi.clone(),
    };
    let sfdi = cactus_util::convert_lfdi_to_sfdi(&lfdi).ok_or_else(|| {
        ActionError::from(TestDefinitionKind::BadParameter {
            step_id: step_id.to_string(),
            name: "force-lfdi".into(),
            reason: "not a 40-hex-char LFDI".into(),
        })
    })?;

    let device = EndDevice {
        href: None,
        l_fdi: lfdi,
        s_fdi: sfdi,
        device_category: DeviceCategory::Photovoltaic.hex_code().to_string(),
        enabled: true,
        post_rate: Some(NOMINAL_POST_RATE_SECONDS),
        connection_point_link: None,
        registration_link: None,
        function_set_assignments_list_link: None,
        der_list_link: None,
        subscription_list_link: None,
    };

    let list_href = ctx
        .store
        .get_by_kind(ResourceKind::DeviceCapability)
        .into_iter()
        .find_map(|r| r.child_links.get(&ResourceKind::EndDeviceList).cloned())
        .ok_or_else(|| {
            ActionError::from(TestDefinitionKind::BadParameter {
                step_id: step_id.to_string(),
                name: "end-device-list".into(),
                reason: "end-device-list not yet discovered".into(),
            })
        })?;

    if expect_rejection {
        let xml = quick_xml::se::to_string(&device).map_err(|e| RequestKind::ParseFailure {
            kind: "EndDevice".into(),
            reason: e.to_string(),
        })?;
        return match ctx.client.client_error_request(ctx.request_ctx, Method::POST, &list_href, Some(xml)).await {
            Ok(_) => Ok(ActionResult::done()),
            Err(RequestKind::UnexpectedStatus { status, .. }) => {
                Ok(ActionResult::failed(format!("insert-end-device: expected a 4xx rejection, got {status}")))
            }
            Err(e) => Err(e.into()),
        };
    }

    let outcome = ctx
        .client
        .submit_and_refetch(ResourceKind::EndDevice, ctx.request_ctx, Method::POST, &list_href, &device, false)
        .await?;

    let Some(href) = outcome.refetched.href.clone() else {
        return Err(RequestKind::MissingLocation { href: list_href }.into());
    };
    let parent = ctx
        .store
        .get_by_kind(ResourceKind::DeviceCapability)
        .into_iter()
        .next()
        .map(|r| r.id.clone());
    let id = ResourceId::new(ResourceKind::EndDevice, &href, parent.as_ref());
    let child_links = outcome.refetched.child_links().into_iter().collect();
    ctx.store.upsert(StoredResource {
        id,
        created_at: ctx.now,
        payload: cactus_model::payload::Payload::EndDevice(outcome.refetched),
        child_links,
        member_of_list: Some(ResourceKind::EndDeviceList),
    });

    Ok(match outcome.warning {
        Some(w) => ActionResult::done_with(w),
        None => ActionResult::done(),
    })
}

/// **upsert-connection-point(connection-point-id, expect-rejection?)**.
pub async fn upsert_connection_point(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let connection_point_id = required_str(params, step_id, "connection-point-id")?.to_string();
    let expect_rejection = flag(params, "expect-rejection");

    let own = find_own_end_device(ctx).ok_or_else(|| {
        ActionError::from(TestDefinitionKind::BadParameter {
            step_id: step_id.to_string(),
            name: "connection-point-id".into(),
            reason: "no end device matching this client's LFDI is stored".into(),
        })
    })?;
    let connection_point_href = own.child_links.get(&ResourceKind::ConnectionPoint).cloned().ok_or_else(|| {
        ActionError::from(TestDefinitionKind::BadParameter {
            step_id: step_id.to_string(),
            name: "connection-point-id".into(),
            reason: "own end device has no connection-point link".into(),
        })
    })?;

    let payload = ConnectionPoint { href: None, connection_point_id: connection_point_id.clone() };

    if expect_rejection {
        let xml = quick_xml::se::to_string(&payload).map_err(|e| RequestKind::ParseFailure {
            kind: "ConnectionPoint".into(),
            reason: e.to_string(),
        })?;
        return match ctx
            .client
            .client_error_request(ctx.request_ctx, Method::PUT, &connection_point_href, Some(xml))
            .await
        {
            Ok(error) => {
                // The error envelope's reason code may or may not be present; a
                // mismatch against what the test expected is a warning, not a
                // failure — the protocol doesn't guarantee a specific code here.
                let reason = error.reason_code.as_deref().unwrap_or("none");
                Ok(ActionResult::done_with(format!("rejected: {reason}")))
            }
            Err(RequestKind::UnexpectedStatus { status, .. }) => {
                Ok(ActionResult::failed(format!("upsert-connection-point: expected a 4xx rejection, got {status}")))
            }
            Err(e) => Err(e.into()),
        };
    }

    let outcome = ctx
        .client
        .submit_and_refetch(ResourceKind::ConnectionPoint, ctx.request_ctx, Method::PUT, &connection_point_href, &payload, true)
        .await?;

    let id = ResourceId::new(ResourceKind::ConnectionPoint, &connection_point_href, Some(&own.id));
    ctx.store.upsert(StoredResource {
        id,
        created_at: ctx.now,
        payload: cactus_model::payload::Payload::ConnectionPoint(outcome.refetched.clone()),
        child_links: Default::default(),
        member_of_list: None,
    });

    if outcome.refetched.connection_point_id != connection_point_id {
        return Ok(ActionResult::failed(format!(
            "upsert-connection-point: submitted {connection_point_id:?}, server returned {:?}",
            outcome.refetched.connection_point_id
        )));
    }

    Ok(match outcome.warning {
        Some(w) => ActionResult::done_with(w),
        None => ActionResult::done(),
    })
}
