// SPDX-License-Identifier: MIT OR Apache-2.0
//! `check-der-control`, `check-default-der-control`.

use crate::context::{CheckContext, CheckResult};
use crate::error::CheckError;
use crate::params::{optional_bool, optional_i64, optional_str};
use cactus_error::TestDefinitionKind;
use cactus_model::payload::der::DerProgram;
use cactus_model::payload::der_control::{DerControl, EventStatus};
use cactus_model::payload::Payload;
use cactus_model::{ParamMap, ResourceKind, StoredResource};

fn event_status_code(s: EventStatus) -> i64 {
    match s {
        EventStatus::Scheduled => 0,
        EventStatus::Active => 1,
        EventStatus::Cancelled => 2,
        EventStatus::Superseded => 5,
    }
}

fn derp_primacy(ctx: &CheckContext<'_>, id: &cactus_model::ResourceId, step_id: &str, der_href: &str) -> Result<u8, CheckError> {
    let derp = ctx.store.get_ancestor_of(id, ResourceKind::DerProgram).ok_or_else(|| {
        TestDefinitionKind::BadParameter { step_id: step_id.to_string(), name: "derp-primacy".into(), reason: format!("{der_href} has no link to a parent DERProgram") }
    })?;
    let Payload::DerProgram(DerProgram { primacy, .. }) = &derp.payload else {
        return Err(TestDefinitionKind::BadParameter { step_id: step_id.to_string(), name: "derp-primacy".into(), reason: "ancestor is not a DERProgram".into() }.into());
    };
    Ok(*primacy)
}

fn sub_id_matches(ctx: &CheckContext<'_>, id: &cactus_model::ResourceId, sub_id: &str) -> bool {
    ctx.store.annotations(id).is_some_and(|a| a.has_tag("subscription-received", sub_id))
}

/// **check-der-control(filters…, latest?, minimum-count?, maximum-count?, sub-id?, derp-primacy?)**.
pub fn check_der_control(params: &ParamMap, step_id: &str, ctx: &CheckContext<'_>) -> Result<CheckResult, CheckError> {
    let minimum_count = optional_i64(params, "minimum-count");
    let maximum_count = optional_i64(params, "maximum-count");
    let latest = optional_bool(params, "latest").unwrap_or(false);
    let set_max_w_percent = optional_i64(params, "set-max-w-percent");
    let event_status = optional_i64(params, "event-status");
    let response_required = optional_str(params, "response-required");
    let derp_primacy_filter = optional_i64(params, "derp-primacy");
    let sub_id = optional_str(params, "sub-id");
    let duration = optional_i64(params, "duration");

    let mut candidates: Vec<&StoredResource> = ctx.store.get_by_kind(ResourceKind::DerControl);
    if latest {
        candidates = candidates.into_iter().max_by_key(|r| r.created_at).into_iter().collect();
    }

    let total_found = candidates.len();
    let mut total_matches = 0u32;

    for stored in &candidates {
        let Payload::DerControl(control) = &stored.payload else { continue };

        if let Some(expected) = set_max_w_percent {
            if control.set_max_w_percent.map(i64::from) != Some(expected) {
                continue;
            }
        }
        if let Some(expected) = event_status {
            if event_status_code(control.event_status) != expected {
                continue;
            }
        }
        if let Some(expected) = response_required {
            match &control.response_required {
                Some(actual) if cactus_util::hex_binary_str_eq(actual, expected) => {}
                _ => continue,
            }
        }
        if let Some(expected) = derp_primacy_filter {
            let href = control.href.as_deref().unwrap_or("?");
            if i64::from(derp_primacy(ctx, &stored.id, step_id, href)?) != expected {
                continue;
            }
        }
        if let Some(sub_id) = sub_id {
            if !sub_id_matches(ctx, &stored.id, sub_id) {
                continue;
            }
        }
        if let Some(expected) = duration {
            if i64::from(control.interval.duration) != expected {
                continue;
            }
        }

        total_matches += 1;
    }

    let metadata = if latest {
        format!("Found {total_found} DERControls, examined latest only, {total_matches} matched criteria")
    } else {
        format!("Found {total_found} DERControls, {total_matches} matched criteria")
    };

    evaluate_count(metadata, total_matches, minimum_count, maximum_count)
}

/// **check-default-der-control(filters…, minimum-count?, maximum-count?, sub-id?, derp-primacy?)**.
pub fn check_default_der_control(params: &ParamMap, step_id: &str, ctx: &CheckContext<'_>) -> Result<CheckResult, CheckError> {
    let minimum_count = optional_i64(params, "minimum-count");
    let maximum_count = optional_i64(params, "maximum-count");
    let set_max_w_percent = optional_i64(params, "set-max-w-percent");
    let derp_primacy_filter = optional_i64(params, "derp-primacy");
    let sub_id = optional_str(params, "sub-id");

    let candidates = ctx.store.get_by_kind(ResourceKind::DefaultDerControl);
    if candidates.is_empty() {
        return Ok(CheckResult::failed("No DefaultDERControl found in resource store"));
    }

    let total_found = candidates.len();
    let mut total_matches = 0u32;

    for stored in &candidates {
        let Payload::DefaultDerControl(control) = &stored.payload else { continue };

        if let Some(expected) = set_max_w_percent {
            if control.set_max_w_percent.map(i64::from) != Some(expected) {
                continue;
            }
        }
        if let Some(expected) = derp_primacy_filter {
            let href = control.href.as_deref().unwrap_or("?");
            if i64::from(derp_primacy(ctx, &stored.id, step_id, href)?) != expected {
                continue;
            }
        }
        if let Some(sub_id) = sub_id {
            if !sub_id_matches(ctx, &stored.id, sub_id) {
                continue;
            }
        }

        total_matches += 1;
    }

    let metadata = format!("Found {total_found} DefaultDERControls, {total_matches} matched criteria");
    evaluate_count(metadata, total_matches, minimum_count, maximum_count)
}

fn evaluate_count(metadata: String, total_matches: u32, minimum_count: Option<i64>, maximum_count: Option<i64>) -> Result<CheckResult, CheckError> {
    if let Some(min) = minimum_count {
        if i64::from(total_matches) < min {
            return Ok(CheckResult::failed(format!("{metadata}. Expected at least {min}")));
        }
    }
    if let Some(max) = maximum_count {
        if i64::from(total_matches) > max {
            return Ok(CheckResult::failed(format!("{metadata}. Expected at most {max}")));
        }
    }
    Ok(CheckResult::passed(metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cactus_model::payload::common::DateTimeInterval;
    use cactus_model::payload::der_control::DerControl;
    use cactus_model::{ResourceId, StoredResource};
    use cactus_store::ResourceStore;
    use std::time::SystemTime;

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

    fn seed_control(store: &mut ResourceStore, href: &str, event_status: EventStatus, created_at: SystemTime) {
        store.append(StoredResource {
            id: ResourceId::root(ResourceKind::DerControl, href),
            created_at,
            payload: Payload::DerControl(DerControl {
                href: Some(href.to_string()),
                mrid: "deadbeef00000001".into(),
                event_status,
                interval: DateTimeInterval { start: 100, duration: 300 },
                reply_to: None,
                response_required: None,
                set_max_w_percent: Some(-500),
            }),
            child_links: Default::default(),
            member_of_list: Some(ResourceKind::DerControlList),
        });
    }

    #[test]
    fn latest_picks_the_single_most_recently_created_control() {
        let client_config = dummy_client_config();
        let mut store = ResourceStore::new();
        let t0 = SystemTime::UNIX_EPOCH;
        seed_control(&mut store, "/derc/1", EventStatus::Scheduled, t0);
        seed_control(&mut store, "/derc/2", EventStatus::Active, t0 + std::time::Duration::from_secs(10));
        let ctx = CheckContext { client_config: &client_config, store: &store };

        let mut params = ParamMap::new();
        params.insert("latest".into(), cactus_model::ParamValue::Bool(true));
        params.insert("event-status".into(), cactus_model::ParamValue::Int(event_status_code(EventStatus::Active)));
        let result = check_der_control(&params, "s1", &ctx).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn minimum_count_enforced() {
        let client_config = dummy_client_config();
        let mut store = ResourceStore::new();
        seed_control(&mut store, "/derc/1", EventStatus::Scheduled, SystemTime::now());
        let ctx = CheckContext { client_config: &client_config, store: &store };

        let mut params = ParamMap::new();
        params.insert("minimum-count".into(), cactus_model::ParamValue::Int(2));
        let result = check_der_control(&params, "s1", &ctx).unwrap();
        assert!(!result.passed);
    }

    #[test]
    fn default_der_control_reports_absence() {
        let client_config = dummy_client_config();
        let store = ResourceStore::new();
        let ctx = CheckContext { client_config: &client_config, store: &store };
        let result = check_default_der_control(&ParamMap::new(), "s1", &ctx).unwrap();
        assert!(!result.passed);
    }
}
