// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parameter extraction helpers shared by every check.

use cactus_error::TestDefinitionKind;
use cactus_model::{ParamMap, ParamValue};

fn bad(step_id: &str, name: &str, reason: impl Into<String>) -> TestDefinitionKind {
    TestDefinitionKind::BadParameter { step_id: step_id.to_string(), name: name.to_string(), reason: reason.into() }
}

/// A required boolean parameter.
pub fn required_bool(params: &ParamMap, step_id: &str, name: &str) -> Result<bool, TestDefinitionKind> {
    params.get(name).and_then(ParamValue::as_bool).ok_or_else(|| bad(step_id, name, "expected a boolean"))
}

/// An optional boolean parameter.
#[must_use]
pub fn optional_bool(params: &ParamMap, name: &str) -> Option<bool> {
    params.get(name).and_then(ParamValue::as_bool)
}

/// An optional string parameter.
#[must_use]
pub fn optional_str<'a>(params: &'a ParamMap, name: &str) -> Option<&'a str> {
    params.get(name).and_then(ParamValue::as_str)
}

/// An optional integer parameter.
#[must_use]
pub fn optional_i64(params: &ParamMap, name: &str) -> Option<i64> {
    params.get(name).and_then(ParamValue::as_i64)
}

/// An optional list-valued parameter of strings.
pub fn optional_str_list(params: &ParamMap, step_id: &str, name: &str) -> Result<Option<Vec<&str>>, TestDefinitionKind> {
    let Some(list) = params.get(name).and_then(ParamValue::as_list) else { return Ok(None) };
    let strs = list.iter().map(|v| v.as_str().ok_or_else(|| bad(step_id, name, "expected a list of strings"))).collect::<Result<_, _>>()?;
    Ok(Some(strs))
}
