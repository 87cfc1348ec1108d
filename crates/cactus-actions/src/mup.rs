// SPDX-License-Identifier: MIT OR Apache-2.0
//! `upsert-mup`, `insert-readings`, and mRID derivation for both.

use crate::context::{ActionContext, ActionResult};
use crate::error::ActionError;
use crate::params::{flag, optional_i64, required_list, required_str};
use cactus_error::{RequestKind, TestDefinitionKind};
use cactus_model::payload::common::{DataQualifier, Location, ReadingType, ReadingTypeFamily};
use cactus_model::payload::mirror_usage_point::{MirrorMeterReading, MirrorUsagePoint, Reading};
use cactus_model::{ParamMap, ParamValue, ResourceId, ResourceKind, StoredResource};
use reqwest::Method;
use std::time::{Duration, UNIX_EPOCH};

fn bad(step_id: &str, name: &str, reason: impl Into<String>) -> ActionError {
    TestDefinitionKind::BadParameter { step_id: step_id.to_string(), name: name.to_string(), reason: reason.into() }.into()
}

fn parse_location(step_id: &str, s: &str) -> Result<Location, ActionError> {
    match s {
        "device" => Ok(Location::Device),
        "site" => Ok(Location::Site),
        other => Err(bad(step_id, "location", format!("unrecognised location {other:?}"))),
    }
}

fn parse_family(step_id: &str, s: &str) -> Result<ReadingTypeFamily, ActionError> {
    match s {
        "active-power" => Ok(ReadingTypeFamily::ActivePower),
        "reactive-power" => Ok(ReadingTypeFamily::ReactivePower),
        "frequency" => Ok(ReadingTypeFamily::Frequency),
        "voltage-single-phase" => Ok(ReadingTypeFamily::VoltageSinglePhase),
        other => Err(bad(step_id, "reading-types", format!("unrecognised reading type {other:?}"))),
    }
}

/// **upsert-mup(mup-id alias, location, reading-types[], mmr-mrids?, pow10-multiplier=0, set-mup-mrid?)**.
pub async fn upsert_mup(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let alias = required_str(params, step_id, "mup-id")?.to_string();
    let location = parse_location(step_id, required_str(params, step_id, "location")?)?;
    let families: Vec<ReadingTypeFamily> = required_list(params, step_id, "reading-types")?
        .iter()
        .map(|v| v.as_str().ok_or_else(|| bad(step_id, "reading-types", "expected a list of strings")).and_then(|s| parse_family(step_id, s)))
        .collect::<Result<_, _>>()?;
    let pow10_multiplier = optional_i64(params, "pow10-multiplier").unwrap_or(0) as i8;
    let explicit_mup_mrid = params.get("set-mup-mrid").and_then(ParamValue::as_str);
    let explicit_mmr_mrids = params.get("mmr-mrids").and_then(ParamValue::as_map);

    let reading_types: Vec<ReadingType> = families.iter().map(|f| ReadingType::new(*f, DataQualifier::Average)).collect();
    let mut sort_keys: Vec<String> = reading_types.iter().map(ReadingType::sort_key).collect();
    sort_keys.sort();

    let pen = ctx.client_config.pen;
    let mup_mrid = match explicit_mup_mrid {
        Some(explicit) => cactus_util::explicit_mrid(explicit, pen),
        None => cactus_util::mup_mrid(&location.to_string(), &sort_keys, &ctx.request_ctx.client_alias, pen),
    };

    let meter_readings: Vec<MirrorMeterReading> = reading_types
        .iter()
        .map(|rt| {
            let key = rt.sort_key();
            let mrid = match explicit_mmr_mrids.and_then(|m| m.get(&key)).and_then(ParamValue::as_str) {
                Some(explicit) => cactus_util::explicit_mrid(explicit, pen),
                None => cactus_util::mmr_mrid(&mup_mrid, &key, pen),
            };
            MirrorMeterReading { mrid, reading_type: *rt, pow10_multiplier, readings: Vec::new() }
        })
        .collect();

    let payload = MirrorUsagePoint {
        href: None,
        role_flags: location.role_flags().0,
        device_l_fdi: ctx.client_config.lfdi.clone(),
        mrid: mup_mrid,
        status: 1,
        service_category_kind: 0,
        meter_readings: meter_readings.clone(),
    };

    let list_href = ctx
        .store
        .get_by_kind(ResourceKind::DeviceCapability)
        .into_iter()
        .find_map(|r| r.child_links.get(&ResourceKind::MirrorUsagePointList).cloned())
        .ok_or_else(|| bad(step_id, "mup-id", "mirror-usage-point-list not yet discovered"))?;

    let outcome = ctx
        .client
        .submit_and_refetch(ResourceKind::MirrorUsagePoint, ctx.request_ctx, Method::POST, &list_href, &payload, false)
        .await?;

    let Some(href) = outcome.refetched.href.clone() else {
        return Err(RequestKind::MissingLocation { href: list_href }.into());
    };
    let parent = ctx.store.get_by_kind(ResourceKind::DeviceCapability).into_iter().next().map(|r| r.id.clone());
    let id = ResourceId::new(ResourceKind::MirrorUsagePoint, &href, parent.as_ref());

    // The server never echoes MirrorMeterReadings back on GET; graft the
    // submitted readings onto the refetched copy.
    let mut stored = outcome.refetched;
    stored.meter_readings = meter_readings;

    ctx.store.upsert(StoredResource {
        id: id.clone(),
        created_at: ctx.now,
        payload: cactus_model::payload::Payload::MirrorUsagePoint(stored),
        child_links: Default::default(),
        member_of_list: Some(ResourceKind::MirrorUsagePointList),
    });
    ctx.store.annotations_mut(&id).set_alias(alias);

    Ok(match outcome.warning {
        Some(w) => ActionResult::done_with(w),
        None => ActionResult::done(),
    })
}

fn truncate_to_minute(t: std::time::SystemTime) -> i64 {
    let secs = t.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64;
    secs - (secs % 60)
}

/// **insert-readings(mup-id alias, values, expect-rejection?)**.
pub async fn insert_readings(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let alias = required_str(params, step_id, "mup-id")?.to_string();
    let expect_rejection = flag(params, "expect-rejection");
    let values = params.get("values").and_then(ParamValue::as_map).ok_or_else(|| bad(step_id, "values", "expected a map"))?;

    let stored = ctx
        .store
        .find_by_alias(ResourceKind::MirrorUsagePoint, &alias)
        .ok_or_else(|| bad(step_id, "mup-id", format!("no mirror-usage-point aliased {alias:?}")))?
        .clone();
    let cactus_model::payload::Payload::MirrorUsagePoint(mut mup) = stored.payload.clone() else {
        return Err(bad(step_id, "mup-id", "aliased resource is not a mirror-usage-point"));
    };

    let repeat_number = i64::from(ctx.repeat_number);
    let mut all_lists = true;
    let mut min_list_len: Option<usize> = None;
    let mut next_reading_time: Option<i64> = None;

    for reading_type in mup.meter_readings.iter_mut() {
        let key = reading_type.reading_type.sort_key();
        let value_param = values.get(&key).ok_or_else(|| bad(step_id, "values", format!("missing values for reading type {key:?}")))?;

        let value = match value_param {
            ParamValue::List(list) => {
                let idx = usize::try_from(repeat_number).unwrap_or(usize::MAX);
                let v = list.get(idx).ok_or_else(|| bad(step_id, "values", format!("repeat {repeat_number} exceeds values list for {key:?}")))?;
                min_list_len = Some(min_list_len.map_or(list.len(), |m| m.min(list.len())));
                v.as_i64().ok_or_else(|| bad(step_id, "values", "expected integer values"))?
            }
            ParamValue::Int(n) => {
                all_lists = false;
                *n
            }
            _ => return Err(bad(step_id, "values", "expected an integer or a list of integers")),
        };

        let post_rate = device_post_rate(ctx).unwrap_or(60);
        let start = truncate_to_minute(ctx.now) + i64::from(post_rate) * repeat_number;
        reading_type.readings.push(Reading { time_period_start: start, time_period_duration: post_rate, value });
        next_reading_time = Some(next_reading_time.map_or(start + i64::from(post_rate), |t| t.max(start + i64::from(post_rate))));
    }

    if expect_rejection {
        let xml = quick_xml::se::to_string(&mup).map_err(|e| RequestKind::ParseFailure { kind: "MirrorUsagePoint".into(), reason: e.to_string() })?;
        return match ctx.client.client_error_request(ctx.request_ctx, Method::PUT, stored.href(), Some(xml)).await {
            Ok(_) => Ok(ActionResult::done()),
            Err(RequestKind::UnexpectedStatus { status, .. }) => Ok(ActionResult::failed(format!("insert-readings: expected a 4xx rejection, got {status}"))),
            Err(e) => Err(e.into()),
        };
    }

    ctx.client
        .submit_and_refetch(ResourceKind::MirrorUsagePoint, ctx.request_ctx, Method::PUT, stored.href(), &mup, true)
        .await?;

    ctx.store.upsert(StoredResource {
        id: stored.id.clone(),
        created_at: stored.created_at,
        payload: cactus_model::payload::Payload::MirrorUsagePoint(mup),
        child_links: stored.child_links.clone(),
        member_of_list: stored.member_of_list,
    });

    let more_repeats_remain = all_lists && min_list_len.is_some_and(|len| (repeat_number + 1) < len as i64);
    if more_repeats_remain {
        if let Some(next) = next_reading_time {
            let post_rate = device_post_rate(ctx).unwrap_or(60);
            let not_before = (ctx.now + Duration::from_secs(post_rate.into())).max(UNIX_EPOCH + Duration::from_secs(next.max(0) as u64));
            return Ok(ActionResult::repeat_not_before(not_before));
        }
    }

    Ok(ActionResult::done())
}

fn device_post_rate(ctx: &ActionContext<'_>) -> Option<u32> {
    ctx.store.get_by_kind(ResourceKind::EndDevice).into_iter().find_map(|r| match &r.payload {
        cactus_model::payload::Payload::EndDevice(e) => e.post_rate,
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mup_and_mmr_mrids_derive_deterministically() {
        let rt = ReadingType::new(ReadingTypeFamily::ActivePower, DataQualifier::Average);
        let mup_mrid = cactus_util::mup_mrid("device", &[rt.sort_key()], "client-1", 42);
        let mmr_mrid = cactus_util::mmr_mrid(&mup_mrid, &rt.sort_key(), 42);
        assert_eq!(mup_mrid.len(), 32);
        assert_eq!(mmr_mrid.len(), 32);
        assert_ne!(mup_mrid, mmr_mrid);
    }

    #[test]
    fn truncate_to_minute_drops_seconds() {
        let t = UNIX_EPOCH + Duration::from_secs(125);
        assert_eq!(truncate_to_minute(t), 120);
    }
}
