// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parameter extraction helpers shared by every action.
//!
//! Actions receive an already-resolved [`ParamMap`]; these helpers
//! turn "key missing or the wrong shape" into a
//! [`TestDefinitionKind::BadParameter`] naming the offending step and key.

use cactus_error::TestDefinitionKind;
use cactus_model::{ParamMap, ParamValue, ResourceKind};

fn bad(step_id: &str, name: &str, reason: impl Into<String>) -> TestDefinitionKind {
    TestDefinitionKind::BadParameter {
        step_id: step_id.to_string(),
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// A required string parameter.
pub fn required_str<'a>(params: &'a ParamMap, step_id: &str, name: &str) -> Result<&'a str, TestDefinitionKind> {
    params
        .get(name)
        .and_then(ParamValue::as_str)
        .ok_or_else(|| bad(step_id, name, "expected a string"))
}

/// An optional string parameter.
#[must_use]
pub fn optional_str<'a>(params: &'a ParamMap, name: &str) -> Option<&'a str> {
    params.get(name).and_then(ParamValue::as_str)
}

/// An optional boolean parameter, defaulting to `false` when absent.
#[must_use]
pub fn flag(params: &ParamMap, name: &str) -> bool {
    params.get(name).and_then(ParamValue::as_bool).unwrap_or(false)
}

/// A required integer parameter.
pub fn required_i64(params: &ParamMap, step_id: &str, name: &str) -> Result<i64, TestDefinitionKind> {
    params
        .get(name)
        .and_then(ParamValue::as_i64)
        .ok_or_else(|| bad(step_id, name, "expected an integer"))
}

/// An optional integer parameter.
#[must_use]
pub fn optional_i64(params: &ParamMap, name: &str) -> Option<i64> {
    params.get(name).and_then(ParamValue::as_i64)
}

/// A required list-valued parameter.
pub fn required_list<'a>(params: &'a ParamMap, step_id: &str, name: &str) -> Result<&'a [ParamValue], TestDefinitionKind> {
    params
        .get(name)
        .and_then(ParamValue::as_list)
        .ok_or_else(|| bad(step_id, name, "expected a list"))
}

/// Map a kebab-case resource-kind parameter string to its [`ResourceKind`].
pub fn resource_kind_param(step_id: &str, name: &str, value: &str) -> Result<ResourceKind, TestDefinitionKind> {
    match value {
        "device-capability" => Ok(ResourceKind::DeviceCapability),
        "time" => Ok(ResourceKind::Time),
        "end-device-list" => Ok(ResourceKind::EndDeviceList),
        "end-device" => Ok(ResourceKind::EndDevice),
        "connection-point" => Ok(ResourceKind::ConnectionPoint),
        "registration" => Ok(ResourceKind::Registration),
        "subscription-list" => Ok(ResourceKind::SubscriptionList),
        "subscription" => Ok(ResourceKind::Subscription),
        "function-set-assignments-list" => Ok(ResourceKind::FunctionSetAssignmentsList),
        "function-set-assignments" => Ok(ResourceKind::FunctionSetAssignments),
        "der-program-list" => Ok(ResourceKind::DerProgramList),
        "der-program" => Ok(ResourceKind::DerProgram),
        "default-der-control" => Ok(ResourceKind::DefaultDerControl),
        "der-control-list" => Ok(ResourceKind::DerControlList),
        "der-control" => Ok(ResourceKind::DerControl),
        "der-list" => Ok(ResourceKind::DerList),
        "der" => Ok(ResourceKind::Der),
        "der-capability" => Ok(ResourceKind::DerCapability),
        "der-settings" => Ok(ResourceKind::DerSettings),
        "der-status" => Ok(ResourceKind::DerStatus),
        "mirror-usage-point-list" => Ok(ResourceKind::MirrorUsagePointList),
        "mirror-usage-point" => Ok(ResourceKind::MirrorUsagePoint),
        other => Err(bad(step_id, name, format!("unrecognised resource kind {other:?}"))),
    }
}

/// A required list of resource-kind parameters (`forget(kinds[])`,
/// `discovery(targets)`).
pub fn required_kind_list(params: &ParamMap, step_id: &str, name: &str) -> Result<Vec<ResourceKind>, TestDefinitionKind> {
    required_list(params, step_id, name)?
        .iter()
        .map(|v| {
            let s = v.as_str().ok_or_else(|| bad(step_id, name, "expected a list of strings"))?;
            resource_kind_param(step_id, name, s)
        })
        .collect()
}
