// SPDX-License-Identifier: MIT OR Apache-2.0
//! The check catalogue: pure, read-only predicates over a client's
//! resource store. Unlike [`cactus-actions`], checks never touch the
//! network or notification inbox — they only read what discovery and
//! prior actions have already placed in the store.

pub mod context;
pub mod der_control;
pub mod error;
pub mod mup;
pub mod params;

pub use context::{CheckContext, CheckResult};
pub use error::CheckError;

use cactus_error::TestDefinitionKind;
use cactus_model::step::Invocation;

/// Dispatches a resolved check invocation to its implementation, mirroring
/// `cactus-actions::run_action`'s match-based dispatch.
pub fn run_check(invocation: &Invocation, step_id: &str, ctx: &CheckContext<'_>) -> Result<CheckResult, CheckError> {
    let params = &invocation.params;
    match invocation.type_name.as_str() {
        "check-mirror-usage-point" => mup::check_mirror_usage_point(params, step_id, ctx),
        "check-der-control" => der_control::check_der_control(params, step_id, ctx),
        "check-default-der-control" => der_control::check_default_der_control(params, step_id, ctx),
        other => Err(TestDefinitionKind::BadParameter { step_id: step_id.to_string(), name: "type".into(), reason: format!("unrecognised check type {other:?}") }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cactus_model::{ClientConfig, ParamMap, Role};
    use cactus_store::ResourceStore;

    #[test]
    fn unrecognised_check_type_is_a_bad_parameter() {
        let client_config = ClientConfig {
            id: "client-1".into(),
            role: Role::Device,
            cert_path: "cert.pem".into(),
            key_path: "key.pem".into(),
            lfdi: "AB".repeat(20),
            pen: 1,
            pin: 1234,
            nominal_max_watts: 5000,
            user_agent: None,
        };
        let store = ResourceStore::new();
        let ctx = CheckContext { client_config: &client_config, store: &store };
        let invocation = Invocation { type_name: "check-does-not-exist".into(), params: ParamMap::new() };
        let err = run_check(&invocation, "s1", &ctx).unwrap_err();
        assert!(matches!(err, CheckError::TestDefinition(TestDefinitionKind::BadParameter { .. })));
    }
}
