// SPDX-License-Identifier: MIT OR Apache-2.0
//! hex-binary equivalence and conversion.

/// Parse a hex-binary string (case-insensitive, leading zeros allowed) to
/// its integer value.
#[must_use]
pub fn parse_hex_binary(s: &str) -> Option<u128> {
    u128::from_str_radix(s.trim(), 16).ok()
}

/// `true` iff two hex-binary strings denote the same integer, tolerant of
/// case and leading zeros.
#[must_use]
pub fn hex_binary_str_eq(a: &str, b: &str) -> bool {
    match (parse_hex_binary(a), parse_hex_binary(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// `true` iff `n` and the integer denoted by `hex` are equal.
#[must_use]
pub fn hex_binary_eq(n: u128, hex: &str) -> bool {
    parse_hex_binary(hex) == Some(n)
}

/// Shortest upper-hex representation of `n` with an even number of digits
/// (a leading `0` is prepended when the natural representation is odd).
#[must_use]
pub fn to_hex_binary(n: u128) -> String {
    let mut s = format!("{n:X}");
    if s.len() % 2 == 1 {
        s.insert(0, '0');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tolerates_case_and_zero_padding() {
        assert!(hex_binary_str_eq("ff", "FF"));
        assert!(hex_binary_str_eq("ff", "00FF"));
        assert!(!hex_binary_str_eq("ff", "fe"));
    }

    proptest! {
        #[test]
        fn roundtrip_equivalence(n in 0u128..u64::MAX as u128) {
            let hex = to_hex_binary(n);
            prop_assert!(hex_binary_eq(n, &hex));
            prop_assert!(hex_binary_eq(n, &format!("0{hex}")));
        }

        #[test]
        fn hex_binary_has_even_length(n in 0u128..u64::MAX as u128) {
            prop_assert_eq!(to_hex_binary(n).len() % 2, 0);
        }
    }
}
