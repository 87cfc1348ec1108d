// SPDX-License-Identifier: MIT OR Apache-2.0
//! `no-op`, `wait`, `forget`, `discovery`, `refresh-resource`.

use crate::context::{ActionContext, ActionResult};
use crate::error::ActionError;
use crate::params::{flag, optional_str, required_i64, required_kind_list, required_str, resource_kind_param};
use cactus_error::RequestKind;
use cactus_model::{ParamMap, ResourceId, ResourceKind, StoredResource};
use cactus_protocol::RequestContext;
use reqwest::Method;
use std::collections::BTreeSet;
use std::time::Duration;

/// **no-op** — always done.
#[must_use]
pub fn no_op() -> ActionResult {
    ActionResult::done()
}

/// **wait(duration)** — returns `{completed:true, repeat:false}` only after
/// the wall clock has advanced by `duration`: the zeroth invocation
/// schedules a single repeat at `now + duration`; the repeat (which the
/// scheduler will not pop before that time) finishes the step.
pub fn wait(params: &ParamMap, step_id: &str, ctx: &ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let seconds = required_i64(params, step_id, "duration")?;
    if ctx.repeat_number == 0 {
        let not_before = ctx.now + Duration::from_secs(seconds.max(0) as u64);
        Ok(ActionResult::repeat_not_before(not_before))
    } else {
        Ok(ActionResult::done())
    }
}

/// **forget(kinds[])** — `clear-kind` each.
pub fn forget(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let kinds = required_kind_list(params, step_id, "kinds")?;
    for kind in kinds {
        ctx.store.clear_kind(kind);
    }
    Ok(ActionResult::done())
}

/// **discovery(targets)** — invoke the discovery walker.
pub async fn discovery(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let targets = required_kind_list(params, step_id, "targets")?;
    let outcome = cactus_discovery::run_discovery(
        ctx.client,
        ctx.device_capability_uri,
        ctx.request_ctx,
        ctx.store,
        &targets,
    )
    .await?;

    if outcome.warnings.is_empty() {
        Ok(ActionResult::done())
    } else {
        Ok(ActionResult::done_with(outcome.warnings.join("; ")))
    }
}

/// **refresh-resource(kind, expect-rejection?, expect-rejection-or-empty?)**.
pub async fn refresh_resource(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let kind = resource_kind_param(step_id, "kind", required_str(params, step_id, "kind")?)?;
    let expect_rejection = flag(params, "expect-rejection");
    let expect_rejection_or_empty = flag(params, "expect-rejection-or-empty");

    if kind.is_list_kind() {
        return refresh_list(kind, ctx).await;
    }

    let require_rejection = expect_rejection || expect_rejection_or_empty;
    let ids: Vec<ResourceId> = ctx.store.get_by_kind(kind).into_iter().map(|r| r.id.clone()).collect();

    for id in ids {
        let href = id.href().to_string();

        if require_rejection {
            match ctx.client.client_error_request(ctx.request_ctx, Method::GET, &href, None).await {
                Ok(_) => continue,
                Err(RequestKind::Transport { source }) => {
                    return Ok(ActionResult::failed(format!("refresh-resource({href}): {source}")))
                }
                Err(e) => return Err(e.into()),
            }
        }

        let member_of_list = ctx.store.get_by_id(&id).and_then(|r| r.member_of_list);
        match cactus_discovery::fetch_singleton_payload(ctx.client, ctx.request_ctx, kind, &href).await {
            Ok(payload) => {
                let child_links = payload.child_links().into_iter().collect();
                ctx.store.upsert(StoredResource { id, created_at: ctx.now, payload, child_links, member_of_list });
            }
            Err(RequestKind::Transport { source }) => {
                return Ok(ActionResult::failed(format!("refresh-resource({href}): {source}")))
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(ActionResult::done())
}

async fn refresh_list(kind: ResourceKind, ctx: &ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let hrefs: BTreeSet<String> = ctx.store.resources().filter_map(|r| r.child_links.get(&kind).cloned()).collect();

    for href in hrefs {
        match check_list_rejected_or_empty(ctx.client, ctx.request_ctx, kind, &href).await {
            Ok(()) => {}
            Err(ListCheckFailure::Failed(description)) => return Ok(ActionResult::failed(description)),
            Err(ListCheckFailure::Error(e)) => return Err(e.into()),
        }
    }

    Ok(ActionResult::done())
}

enum ListCheckFailure {
    Failed(String),
    Error(RequestKind),
}

async fn check_list_rejected_or_empty(
    client: &cactus_protocol::ProtocolClient,
    ctx: &RequestContext,
    kind: ResourceKind,
    href: &str,
) -> Result<(), ListCheckFailure> {
    use cactus_model::payload::der::{Der, DerProgram, FunctionSetAssignments};
    use cactus_model::payload::der_control::DerControl;
    use cactus_model::payload::end_device::EndDevice;
    use cactus_model::payload::mirror_usage_point::MirrorUsagePoint;
    use cactus_model::payload::subscription::Subscription;

    macro_rules! check_as {
        ($item_ty:ty) => {
            client.client_error_or_empty_list::<$item_ty>(kind, ctx, Method::GET, href, None).await
        };
    }

    let outcome = match kind {
        ResourceKind::EndDeviceList => check_as!(EndDevice),
        ResourceKind::SubscriptionList => check_as!(Subscription),
        ResourceKind::FunctionSetAssignmentsList => check_as!(FunctionSetAssignments),
        ResourceKind::DerProgramList => check_as!(DerProgram),
        ResourceKind::DerControlList => check_as!(DerControl),
        ResourceKind::DerList => check_as!(Der),
        ResourceKind::MirrorUsagePointList => check_as!(MirrorUsagePoint),
        other => {
            return Err(ListCheckFailure::Error(RequestKind::ParseFailure {
                kind: format!("{other:?}"),
                reason: "not a list resource kind".into(),
            }))
        }
    };

    match outcome {
        Ok(_) => Ok(()),
        Err(RequestKind::Transport { source }) => Err(ListCheckFailure::Failed(format!("refresh-resource({href}): {source}"))),
        Err(RequestKind::UnexpectedStatus { status, .. }) => Err(ListCheckFailure::Failed(format!(
            "refresh-resource({href}): expected a 4xx or a definitely-empty list, got {status}"
        ))),
        Err(e) => Err(ListCheckFailure::Error(e)),
    }
}
