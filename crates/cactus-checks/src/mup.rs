// SPDX-License-Identifier: MIT OR Apache-2.0
//! `check-mirror-usage-point`, sharing its mRID/role-flags/reading-type
//! derivation with `cactus-actions::mup::upsert_mup`.

use crate::context::{CheckContext, CheckResult};
use crate::error::CheckError;
use crate::params::{optional_i64, optional_str, optional_str_list, required_bool};
use cactus_model::payload::common::{DataQualifier, Location, ReadingType, ReadingTypeFamily};
use cactus_model::payload::Payload;
use cactus_model::{ParamMap, ParamValue, ResourceKind};
use std::collections::BTreeSet;

fn bad(step_id: &str, name: &str, reason: impl Into<String>) -> CheckError {
    cactus_error::TestDefinitionKind::BadParameter { step_id: step_id.to_string(), name: name.to_string(), reason: reason.into() }.into()
}

fn parse_location(step_id: &str, s: &str) -> Result<Location, CheckError> {
    match s {
        "device" => Ok(Location::Device),
        "site" => Ok(Location::Site),
        other => Err(bad(step_id, "location", format!("unrecognised location {other:?}"))),
    }
}

fn parse_family(step_id: &str, s: &str) -> Result<ReadingTypeFamily, CheckError> {
    match s {
        "active-power" => Ok(ReadingTypeFamily::ActivePower),
        "reactive-power" => Ok(ReadingTypeFamily::ReactivePower),
        "frequency" => Ok(ReadingTypeFamily::Frequency),
        "voltage-single-phase" => Ok(ReadingTypeFamily::VoltageSinglePhase),
        other => Err(bad(step_id, "reading-types", format!("unrecognised reading type {other:?}"))),
    }
}

/// **check-mirror-usage-point(matches, location?, reading-types?, mmr-mrids?, post-rate-seconds?, check-mup-mrid?)**.
pub fn check_mirror_usage_point(params: &ParamMap, step_id: &str, ctx: &CheckContext<'_>) -> Result<CheckResult, CheckError> {
    let matches = required_bool(params, step_id, "matches")?;
    let location = optional_str(params, "location").map(|s| parse_location(step_id, s)).transpose()?;
    let reading_types: Option<Vec<ReadingTypeFamily>> = optional_str_list(params, step_id, "reading-types")?
        .map(|list| list.iter().map(|s| parse_family(step_id, s)).collect::<Result<_, _>>())
        .transpose()?;
    let post_rate_seconds = optional_i64(params, "post-rate-seconds");
    let check_mup_mrid = optional_str(params, "check-mup-mrid");
    let explicit_mmr_mrids = params.get("mmr-mrids").and_then(ParamValue::as_map);

    let target_role_flags = location.map(|l| l.role_flags().0);

    let expected_mrids = match (&location, &reading_types) {
        (Some(location), Some(families)) => {
            let reading_types: Vec<ReadingType> = families.iter().map(|f| ReadingType::new(*f, DataQualifier::Average)).collect();
            let mut sort_keys: Vec<String> = reading_types.iter().map(ReadingType::sort_key).collect();
            sort_keys.sort();
            let pen = ctx.client_config.pen;
            let mup_mrid = match check_mup_mrid {
                Some(explicit) => cactus_util::explicit_mrid(explicit, pen),
                None => cactus_util::mup_mrid(&location.to_string(), &sort_keys, &ctx.client_config.id, pen),
            };
            let mmr_mrids: BTreeSet<String> = reading_types
                .iter()
                .map(|rt| {
                    let key = rt.sort_key();
                    match explicit_mmr_mrids.and_then(|m| m.get(&key)).and_then(ParamValue::as_str) {
                        Some(explicit) => cactus_util::explicit_mrid(explicit, pen),
                        None => cactus_util::mmr_mrid(&mup_mrid, &key, pen),
                    }
                })
                .collect();
            Some((mup_mrid, mmr_mrids))
        }
        _ => None,
    };

    let expected_reading_type_values: Option<BTreeSet<(u16, u32, u32)>> = reading_types.as_ref().map(|families| {
        families
            .iter()
            .map(|f| {
                let (uom, kind) = f.uom_and_kind();
                (uom.code(), kind.code(), DataQualifier::Average.code())
            })
            .collect()
    });

    let all_mups = ctx.store.get_by_kind(ResourceKind::MirrorUsagePoint);
    let total_examined = all_mups.len();
    let mut total_matches = 0u32;
    let mut rejections = Vec::new();

    for stored in &all_mups {
        let Payload::MirrorUsagePoint(mup) = &stored.payload else { continue };
        let label = mup.href.as_deref().unwrap_or(&mup.mrid);

        if let Some(post_rate) = post_rate_seconds {
            let durations: Vec<u32> = mup.meter_readings.iter().flat_map(|mmr| mmr.readings.iter().map(|r| r.time_period_duration)).collect();
            if !durations.is_empty() && durations.iter().any(|d| i64::from(*d) != post_rate) {
                rejections.push(format!("{label}: has a reading with a time-period-duration != expected {post_rate}"));
                continue;
            }
        }

        if let Some(expected) = target_role_flags {
            if mup.role_flags != expected {
                rejections.push(format!("{label}: roleFlags {} != expected {expected}", mup.role_flags));
                continue;
            }
        }

        if let Some((expected_mup_mrid, expected_mmr_mrids)) = &expected_mrids {
            if &mup.mrid != expected_mup_mrid {
                rejections.push(format!("{label}: mRID {} != expected {expected_mup_mrid}", mup.mrid));
                continue;
            }
            let actual_mmr_mrids: BTreeSet<String> = mup.meter_readings.iter().map(|mmr| mmr.mrid.clone()).collect();
            if &actual_mmr_mrids != expected_mmr_mrids {
                rejections.push(format!("{label}: mmr mrids {actual_mmr_mrids:?} != expected {expected_mmr_mrids:?}"));
                continue;
            }
        }

        if let Some(expected) = &expected_reading_type_values {
            let actual: BTreeSet<(u16, u32, u32)> = mup
                .meter_readings
                .iter()
                .map(|mmr| {
                    let (uom, kind) = mmr.reading_type.family.uom_and_kind();
                    (uom.code(), kind.code(), mmr.reading_type.qualifier.code())
                })
                .collect();
            if &actual != expected {
                rejections.push(format!("{label}: reading types {actual:?} != expected {expected:?}"));
                continue;
            }
        }

        total_matches += 1;
    }

    let metadata = format!("Found {total_examined} MirrorUsagePoints, {total_matches} matched criteria");

    if matches && total_matches == 0 {
        let rejection_info = if rejections.is_empty() { String::new() } else { format!(". Rejections: {}", rejections.join("; ")) };
        return Ok(CheckResult::failed(format!("{metadata}{rejection_info}")));
    }
    if !matches && total_matches > 0 {
        return Ok(CheckResult::failed(format!("{metadata}. Expected 0")));
    }

    Ok(CheckResult::passed(metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cactus_model::payload::mirror_usage_point::{MirrorMeterReading, MirrorUsagePoint, Reading};
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

    fn seed_mup(store: &mut ResourceStore, role_flags: u16, post_rate: u32) {
        let rt = ReadingType::new(ReadingTypeFamily::ActivePower, DataQualifier::Average);
        store.append(StoredResource {
            id: ResourceId::root(ResourceKind::MirrorUsagePoint, "/mup/1"),
            created_at: SystemTime::now(),
            payload: Payload::MirrorUsagePoint(MirrorUsagePoint {
                href: Some("/mup/1".into()),
                role_flags,
                device_l_fdi: "AB".repeat(20),
                mrid: "deadbeef".into(),
                status: 1,
                service_category_kind: 0,
                meter_readings: vec![MirrorMeterReading {
                    mrid: "mmr-1".into(),
                    reading_type: rt,
                    pow10_multiplier: 0,
                    readings: vec![Reading { time_period_start: 0, time_period_duration: post_rate, value: 100 }],
                }],
            }),
            child_links: Default::default(),
            member_of_list: Some(ResourceKind::MirrorUsagePointList),
        });
    }

    #[test]
    fn matches_true_requires_at_least_one_surviving_mup() {
        let client_config = dummy_client_config();
        let mut store = ResourceStore::new();
        seed_mup(&mut store, Location::Site.role_flags().0, 300);
        let ctx = CheckContext { client_config: &client_config, store: &store };

        let mut params = ParamMap::new();
        params.insert("matches".into(), ParamValue::Bool(true));
        params.insert("location".into(), ParamValue::String("site".into()));
        let result = check_mirror_usage_point(&params, "s1", &ctx).unwrap();
        assert!(result.passed);

        let mut params = ParamMap::new();
        params.insert("matches".into(), ParamValue::Bool(true));
        params.insert("location".into(), ParamValue::String("device".into()));
        let result = check_mirror_usage_point(&params, "s1", &ctx).unwrap();
        assert!(!result.passed);
    }

    #[test]
    fn matches_false_requires_zero_survivors() {
        let client_config = dummy_client_config();
        let mut store = ResourceStore::new();
        seed_mup(&mut store, Location::Site.role_flags().0, 300);
        let ctx = CheckContext { client_config: &client_config, store: &store };

        let mut params = ParamMap::new();
        params.insert("matches".into(), ParamValue::Bool(false));
        params.insert("location".into(), ParamValue::String("device".into()));
        let result = check_mirror_usage_point(&params, "s1", &ctx).unwrap();
        assert!(result.passed);
    }
}
