// SPDX-License-Identifier: MIT OR Apache-2.0
//! Action handlers and the `run-action` dispatch table.
//!
//! Every handler takes the step's resolved [`ParamMap`], its step id (for
//! error attribution), and a mutable [`ActionContext`], and returns an
//! [`ActionResult`]. [`run_action`] is the single entry point the scheduler
//! calls for every step execution.

pub mod basic;
pub mod context;
pub mod der;
pub mod der_control;
pub mod end_device;
pub mod error;
pub mod mup;
pub mod params;
pub mod simulate;
pub mod subscription;

pub use context::{ActionContext, ActionResult};
pub use error::ActionError;

use cactus_error::TestDefinitionKind;
use cactus_model::{Invocation, ParamMap};

/// Dispatch `invocation` to its action handler and run it.
pub async fn run_action(invocation: &Invocation, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let params: &ParamMap = &invocation.params;

    match invocation.type_name.as_str() {
        "no-op" => Ok(basic::no_op()),
        "wait" => basic::wait(params, step_id, ctx),
        "forget" => basic::forget(params, step_id, ctx),
        "discovery" => basic::discovery(params, step_id, ctx).await,
        "refresh-resource" => basic::refresh_resource(params, step_id, ctx).await,
        "notifications" => subscription::notifications(params, step_id, ctx).await,
        "create-subscription" => subscription::create_subscription(params, step_id, ctx).await,
        "delete-subscription" => subscription::delete_subscription(params, step_id, ctx).await,
        "insert-end-device" => end_device::insert_end_device(params, step_id, ctx).await,
        "upsert-connection-point" => end_device::upsert_connection_point(params, step_id, ctx).await,
        "upsert-mup" => mup::upsert_mup(params, step_id, ctx).await,
        "insert-readings" => mup::insert_readings(params, step_id, ctx).await,
        "upsert-der-capability" => der::upsert_der_capability(params, step_id, ctx).await,
        "upsert-der-settings" => der::upsert_der_settings(params, step_id, ctx).await,
        "upsert-der-status" => der::upsert_der_status(params, step_id, ctx).await,
        "send-malformed-der-settings" => der::send_malformed_der_settings(params, step_id, ctx).await,
        "respond-der-controls" => der_control::respond_der_controls(params, step_id, ctx).await,
        "send-malformed-response" => der_control::send_malformed_response(params, step_id, ctx).await,
        "simulate-client" => simulate::simulate_client(params, step_id, ctx).await,
        other => Err(TestDefinitionKind::BadParameter {
            step_id: step_id.to_string(),
            name: "type".into(),
            reason: format!("unrecognised action type {other:?}"),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognised_action_type_is_a_bad_parameter() {
        let err = TestDefinitionKind::BadParameter {
            step_id: "s1".into(),
            name: "type".into(),
            reason: "unrecognised action type \"bogus\"".into(),
        };
        assert!(err.to_string().contains("bogus"));
    }
}
