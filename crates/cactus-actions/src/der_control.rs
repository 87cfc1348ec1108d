// SPDX-License-Identifier: MIT OR Apache-2.0
//! `respond-der-controls`, `send-malformed-response`, and the
//! `next-response` state machine.

use crate::context::{ActionContext, ActionResult};
use crate::error::ActionError;
use cactus_error::{RequestKind, TestDefinitionKind};
use cactus_model::payload::common::DateTimeInterval;
use cactus_model::payload::der_control::{DerControl, EventStatus, Response, ResponseStatus};
use cactus_model::{Annotations, ParamMap, ResourceId, ResourceKind};
use cactus_util::to_hex_binary;
use reqwest::Method;
use std::time::UNIX_EPOCH;

/// `next-response(event-status, annotations, interval, now) -> response-code?`
///
/// Once a CANCELLED or SUPERSEDED response has been sent, no further
/// response is ever sent for this control.
#[must_use]
pub fn next_response(
    event_status: EventStatus,
    annotations: &Annotations,
    interval: &DateTimeInterval,
    now_unix: i64,
) -> Option<ResponseStatus> {
    let sent = |s: ResponseStatus| annotations.has_tag("responses", s.tag());

    if sent(ResponseStatus::EventCancelled) || sent(ResponseStatus::EventSuperseded) {
        return None;
    }
    match event_status {
        EventStatus::Cancelled => Some(ResponseStatus::EventCancelled),
        EventStatus::Superseded => Some(ResponseStatus::EventSuperseded),
        EventStatus::Scheduled => (!sent(ResponseStatus::EventReceived)).then_some(ResponseStatus::EventReceived),
        EventStatus::Active => {
            if !sent(ResponseStatus::EventReceived) {
                return Some(ResponseStatus::EventReceived);
            }
            if now_unix >= interval.start && !sent(ResponseStatus::EventStarted) {
                return Some(ResponseStatus::EventStarted);
            }
            // The discovery walker currently drops expired DERControls before
            // a COMPLETED response can ever be observed here; this branch is
            // kept ready for when discovery retains completed-but-unacknowledged
            // controls.
            if now_unix >= interval.end() && !sent(ResponseStatus::EventCompleted) {
                return Some(ResponseStatus::EventCompleted);
            }
            None
        }
    }
}

fn edev_lfdi_for(ctx: &ActionContext<'_>, der_control_id: &ResourceId) -> Option<String> {
    let edev = ctx.store.get_ancestor_of(der_control_id, ResourceKind::EndDevice)?;
    match &edev.payload {
        cactus_model::payload::Payload::EndDevice(e) => Some(e.l_fdi.clone()),
        _ => None,
    }
}

/// **respond-der-controls()**.
pub async fn respond_der_controls(_params: &ParamMap, _step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let now_unix = ctx.now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64;
    let der_controls: Vec<_> = ctx.store.get_by_kind(ResourceKind::DerControl).into_iter().map(|r| (r.id.clone(), r.clone())).collect();

    let total_found = der_controls.len();
    let mut skipped_no_reply_config = 0u32;
    let mut skipped_already_responded = 0u32;
    let mut responses_sent = 0u32;

    for (id, stored) in der_controls {
        let cactus_model::payload::Payload::DerControl(control) = &stored.payload else { continue };

        let (reply_to, response_required) = (&control.reply_to, &control.response_required);
        match (reply_to, response_required) {
            (None, None) => {
                skipped_no_reply_config += 1;
                continue;
            }
            (Some(_), Some(_)) => {}
            _ => {
                tracing::warn!(target: "cactus.actions", href = control.href.as_deref(), "DERControl has only one of replyTo/responseRequired set");
                skipped_no_reply_config += 1;
                continue;
            }
        }
        let reply_to = reply_to.clone().expect("checked above");

        let annotations = ctx.store.annotations(&id).cloned().unwrap_or_default();
        let Some(status) = next_response(control.event_status, &annotations, &control.interval, now_unix) else {
            skipped_already_responded += 1;
            continue;
        };

        let Some(edev_lfdi) = edev_lfdi_for(ctx, &id) else {
            tracing::warn!(target: "cactus.actions", href = control.href.as_deref(), "could not find EndDevice LFDI for DERControl");
            continue;
        };

        let response = Response::new(edev_lfdi, status, now_unix, control.mrid.clone());
        ctx.client
            .submit_and_refetch(ResourceKind::DerControl, ctx.request_ctx, Method::POST, &reply_to, &response, true)
            .await?;

        ctx.store.annotations_mut(&id).add_tag("responses", status.tag());
        responses_sent += 1;
    }

    Ok(ActionResult::done_with(format!(
        "DERControl responses: {total_found} found, {responses_sent} sent, {skipped_no_reply_config} skipped (no reply config), {skipped_already_responded} skipped (already responded)"
    )))
}

/// **send-malformed-response(mrid-unknown?, lfdi-unknown?, response-invalid?)**.
pub async fn send_malformed_response(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let mrid_unknown = crate::params::flag(params, "mrid-unknown");
    let lfdi_unknown = crate::params::flag(params, "lfdi-unknown");
    let response_invalid = crate::params::flag(params, "response-invalid");

    if !mrid_unknown && !lfdi_unknown && !response_invalid {
        return Err(TestDefinitionKind::BadParameter {
            step_id: step_id.to_string(),
            name: "mrid-unknown|lfdi-unknown|response-invalid".into(),
            reason: "expected at least one flag to be true".into(),
        }
        .into());
    }

    let mut candidates: Vec<_> = ctx
        .store
        .get_by_kind(ResourceKind::DerControl)
        .into_iter()
        .filter(|r| matches!(&r.payload, cactus_model::payload::Payload::DerControl(c) if c.reply_to.is_some()))
        .map(|r| (r.id.clone(), r.clone()))
        .collect();
    candidates.sort_by_key(|(_, r)| r.created_at);
    let (id, most_recent) = candidates.pop().ok_or_else(|| TestDefinitionKind::BadParameter {
        step_id: step_id.to_string(),
        name: "mrid-unknown".into(),
        reason: "no DERControl with replyTo is stored".into(),
    })?;
    let cactus_model::payload::Payload::DerControl(control) = &most_recent.payload else {
        unreachable!("filtered to DerControl above")
    };
    let reply_to = control.reply_to.clone().expect("filtered to Some above");

    let edev_lfdi = if lfdi_unknown {
        to_hex_binary(999_999)
    } else {
        edev_lfdi_for(ctx, &id).ok_or_else(|| TestDefinitionKind::BadParameter {
            step_id: step_id.to_string(),
            name: "lfdi-unknown".into(),
            reason: "could not find EndDevice LFDI for this DERControl".into(),
        })?
    };
    let subject = if mrid_unknown { "0xFFFFFFFF".to_string() } else { control.mrid.clone() };

    let now_unix = ctx.now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64;
    let response = Response::new(edev_lfdi, ResponseStatus::EventReceived, now_unix, subject);
    let mut xml = quick_xml::se::to_string(&response).map_err(|e| RequestKind::ParseFailure { kind: "Response".into(), reason: e.to_string() })?;

    if response_invalid {
        xml = rewrite_status_to_reserved(&xml);
    }

    match ctx.client.client_error_request(ctx.request_ctx, Method::POST, &reply_to, Some(xml)).await {
        Ok(_) => Ok(ActionResult::done()),
        Err(RequestKind::UnexpectedStatus { status, .. }) => {
            Ok(ActionResult::failed(format!("send-malformed-response: expected a 4xx rejection, got {status}")))
        }
        Err(e) => Err(e.into()),
    }
}

fn rewrite_status_to_reserved(xml: &str) -> String {
    let Some(open) = xml.find("<status>") else { return xml.to_string() };
    let Some(close_rel) = xml[open..].find("</status>") else { return xml.to_string() };
    let close = open + close_rel + "</status>".len();
    format!("{}<status>15</status>{}", &xml[..open], &xml[close..])
}
