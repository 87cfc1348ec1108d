// SPDX-License-Identifier: MIT OR Apache-2.0
//! `simulate-client(frequency-seconds, total-simulations)` — a scripted
//! sequence standing in for a conforming client running unattended.

use crate::context::{ActionContext, ActionResult};
use crate::der_control::respond_der_controls;
use crate::error::ActionError;
use crate::mup::{insert_readings, upsert_mup};
use crate::params::required_i64;
use cactus_model::payload::common::{DataQualifier, ReadingType, ReadingTypeFamily};
use cactus_model::{ParamMap, ParamValue, ResourceKind};
use std::time::Duration;

const SIMULATE_MUP_ALIAS: &str = "simulate-mup-id";

/// Predictable triangle-wave value between `min` and `max` over `cycle_length`
/// repeats, looping (`cycle_length` must be at least 2).
fn fake_reading_value(repeat_number: u32, cycle_length: u32, min_value: i64, max_value: i64) -> i64 {
    let step = i64::from(repeat_number % cycle_length);
    let step_amount = (max_value - min_value) / i64::from(cycle_length - 1);
    min_value + step * step_amount
}

/// **simulate-client(frequency-seconds, total-simulations)**.
pub async fn simulate_client(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let frequency_seconds = required_i64(params, step_id, "frequency-seconds")?;
    let total_simulations = required_i64(params, step_id, "total-simulations")?;

    let targets = [ResourceKind::EndDevice, ResourceKind::MirrorUsagePoint, ResourceKind::DerControl];
    cactus_discovery::run_discovery(ctx.client, ctx.device_capability_uri, ctx.request_ctx, ctx.store, &targets).await?;

    respond_der_controls(&ParamMap::new(), step_id, ctx).await?;

    if ctx.repeat_number == 0 {
        let mut mup_params = ParamMap::new();
        mup_params.insert("mup-id".into(), ParamValue::String(SIMULATE_MUP_ALIAS.into()));
        mup_params.insert("location".into(), ParamValue::String("site".into()));
        mup_params.insert(
            "reading-types".into(),
            ParamValue::List(vec![ParamValue::String("active-power".into()), ParamValue::String("voltage-single-phase".into())]),
        );
        upsert_mup(&mup_params, step_id, ctx).await?;
    } else {
        let active_power_key = ReadingType::new(ReadingTypeFamily::ActivePower, DataQualifier::Average).sort_key();
        let voltage_key = ReadingType::new(ReadingTypeFamily::VoltageSinglePhase, DataQualifier::Average).sort_key();

        let mut values = std::collections::BTreeMap::new();
        values.insert(active_power_key, ParamValue::Int(fake_reading_value(ctx.repeat_number, 5, 2500, 3500)));
        values.insert(voltage_key, ParamValue::Int(fake_reading_value(ctx.repeat_number, 5, 235, 240)));

        let mut readings_params = ParamMap::new();
        readings_params.insert("mup-id".into(), ParamValue::String(SIMULATE_MUP_ALIAS.into()));
        readings_params.insert("values".into(), ParamValue::Map(values));
        insert_readings(&readings_params, step_id, ctx).await?;
    }

    if u64::try_from(ctx.repeat_number).unwrap_or(u64::MAX) >= total_simulations.max(0) as u64 {
        Ok(ActionResult::done())
    } else {
        Ok(ActionResult::repeat_not_before(ctx.now + Duration::from_secs(frequency_seconds.max(0) as u64)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_reading_value_cycles_through_min_and_max() {
        assert_eq!(fake_reading_value(0, 5, 2500, 3500), 2500);
        assert_eq!(fake_reading_value(4, 5, 2500, 3500), 3500);
        assert_eq!(fake_reading_value(5, 5, 2500, 3500), 2500);
    }
}
