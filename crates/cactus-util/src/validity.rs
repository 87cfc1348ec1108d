// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value-range and resource-provenance validity checks.

/// Inclusive bounds of a signed-16 power-type field (watts, etc).
pub const POWER_TYPE_MIN: i32 = i16::MIN as i32;
/// Inclusive bounds of a signed-16 power-type field (watts, etc).
pub const POWER_TYPE_MAX: i32 = i16::MAX as i32;

/// Inclusive bounds of a signed percent field expressed in tenths of a
/// percent (e.g. `setMaxWPercent`), i.e. -100.0%..=100.0%.
pub const SIGNED_PERCENT_MIN: i32 = -1000;
/// Inclusive bounds of a signed percent field expressed in tenths of a
/// percent (e.g. `setMaxWPercent`), i.e. -100.0%..=100.0%.
pub const SIGNED_PERCENT_MAX: i32 = 1000;

/// `true` iff `mrid` is not a well-formed 32-char upper-hex mRID.
#[must_use]
pub fn is_invalid_mrid(mrid: &str) -> bool {
    mrid.len() != 32 || !mrid.chars().all(|c| c.is_ascii_hexdigit())
}

/// `true` iff `value` falls outside the signed-16 range used by
/// power-type fields.
#[must_use]
pub fn is_invalid_power_type(value: i32) -> bool {
    !(POWER_TYPE_MIN..=POWER_TYPE_MAX).contains(&value)
}

/// `true` iff `value` falls outside the `\[-1000, 1000\]` range used by
/// signed-percent fields such as `setMaxWPercent`.
#[must_use]
pub fn is_invalid_signed_percent(value: i32) -> bool {
    !(SIGNED_PERCENT_MIN..=SIGNED_PERCENT_MAX).contains(&value)
}

/// `true` iff a resource's mRID does not carry the server's expected PEN
/// suffix. `MirrorUsagePoint` resources are exempt: their mRID is
/// client-generated, not server-minted, so no PEN check applies.
#[must_use]
pub fn is_invalid_resource(kind: cactus_model::ResourceKind, mrid: Option<&str>, server_pen: u32) -> bool {
    if kind == cactus_model::ResourceKind::MirrorUsagePoint {
        return false;
    }
    match mrid {
        Some(mrid) if mrid.len() == 32 => {
            let suffix = &mrid[24..];
            match suffix.parse::<u32>() {
                Ok(pen) => pen != server_pen,
                Err(_) => true,
            }
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cactus_model::ResourceKind;

    #[test]
    fn mrid_length_and_charset_are_checked() {
        assert!(is_invalid_mrid("not-hex"));
        assert!(is_invalid_mrid("ABCDEF"));
        assert!(!is_invalid_mrid(&"AB".repeat(16)));
    }

    #[test]
    fn power_type_bounds() {
        assert!(!is_invalid_power_type(0));
        assert!(!is_invalid_power_type(i32::from(i16::MAX)));
        assert!(is_invalid_power_type(i32::from(i16::MAX) + 1));
        assert!(is_invalid_power_type(i32::from(i16::MIN) - 1));
    }

    #[test]
    fn signed_percent_bounds() {
        assert!(!is_invalid_signed_percent(1000));
        assert!(!is_invalid_signed_percent(-1000));
        assert!(is_invalid_signed_percent(1001));
        assert!(is_invalid_signed_percent(-1001));
    }

    #[test]
    fn mirror_usage_point_is_exempt_from_pen_check() {
        assert!(!is_invalid_resource(ResourceKind::MirrorUsagePoint, Some("garbage"), 1));
        assert!(!is_invalid_resource(ResourceKind::MirrorUsagePoint, None, 1));
    }

    #[test]
    fn der_control_checks_pen_suffix() {
        let mrid = format!("{}{:08}", "A".repeat(24), 42);
        assert!(!is_invalid_resource(ResourceKind::DerControl, Some(&mrid), 42));
        assert!(is_invalid_resource(ResourceKind::DerControl, Some(&mrid), 7));
        assert!(is_invalid_resource(ResourceKind::DerControl, None, 7));
    }
}
