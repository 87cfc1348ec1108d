// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tolerant property diffing between a submitted payload and its refetch,
//! used by the submit-and-refetch equivalence check.

use serde_json::Value;

/// Upper bound, in seconds, on the drift tolerated between a submitted and
/// refetched timestamp-shaped field (any object key containing `"time"`,
/// case-insensitively).
pub const MAX_TIME_DRIFT_SECONDS: i64 = 10;

/// One field that differed between `submitted` and `refetched`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff {
    /// Dotted path to the differing field, e.g. `"status.readingTime"`.
    pub path: String,
    /// The value as submitted.
    pub submitted: Value,
    /// The value as refetched.
    pub refetched: Value,
}

/// Compare `submitted` against `refetched`, returning `None` if they are
/// equivalent under the documented tolerances, or `Some(message)`
/// describing every tolerance-failing field otherwise.
///
/// Tolerances applied while walking both trees in lock-step:
/// - Fields named (or nested under a key named) `postRate` are never
///   diffed: servers are free to coerce this field to a supported rate.
/// - Array-valued fields are never diffed: list ordering/echoing is
///   server-defined and out of scope for equivalence.
/// - String fields are tolerated if one's upper-cased form ends with the
///   other's, which covers both case differences and hex-binary zero-padding
///   (e.g. an lFDI submitted lower-case, or zero-padded, and refetched
///   upper-case and unpadded) without requiring either side to parse as hex.
/// - Integer fields whose key contains `"time"` (case-insensitively) are
///   tolerated within [`MAX_TIME_DRIFT_SECONDS`].
#[must_use]
pub fn property_diff(submitted: &Value, refetched: &Value) -> Option<String> {
    let mut diffs = Vec::new();
    walk("", submitted, refetched, &mut diffs);
    if diffs.is_empty() {
        return None;
    }
    let lines: Vec<String> = diffs
        .iter()
        .map(|d| format!("{}: submitted {} != refetched {}", d.path, d.submitted, d.refetched))
        .collect();
    Some(lines.join("; "))
}

fn walk(path: &str, submitted: &Value, refetched: &Value, out: &mut Vec<FieldDiff>) {
    if path_is_tolerated(path) {
        return;
    }
    match (submitted, refetched) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, a_val) in a {
                let child_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                match b.get(key) {
                    Some(b_val) => walk(&child_path, a_val, b_val, out),
                    None => out.push(FieldDiff {
                        path: child_path,
                        submitted: a_val.clone(),
                        refetched: Value::Null,
                    }),
                }
            }
        }
        (Value::Array(_), Value::Array(_)) => {
            // lists are never diffed
        }
        (Value::String(a), Value::String(b)) => {
            if a != b && !uppercased_suffix_eq(a, b) {
                out.push(FieldDiff {
                    path: path.to_string(),
                    submitted: submitted.clone(),
                    refetched: refetched.clone(),
                });
            }
        }
        (Value::Number(a), Value::Number(b)) => {
            if path.to_ascii_lowercase().contains("time") {
                if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                    if (a - b).abs() > MAX_TIME_DRIFT_SECONDS {
                        out.push(FieldDiff {
                            path: path.to_string(),
                            submitted: submitted.clone(),
                            refetched: refetched.clone(),
                        });
                    }
                    return;
                }
            }
            if a != b {
                out.push(FieldDiff {
                    path: path.to_string(),
                    submitted: submitted.clone(),
                    refetched: refetched.clone(),
                });
            }
        }
        _ => {
            if submitted != refetched {
                out.push(FieldDiff {
                    path: path.to_string(),
                    submitted: submitted.clone(),
                    refetched: refetched.clone(),
                });
            }
        }
    }
}

/// `true` iff one of `a`/`b`, upper-cased, ends with the other upper-cased.
fn uppercased_suffix_eq(a: &str, b: &str) -> bool {
    let a = a.to_ascii_uppercase();
    let b = b.to_ascii_uppercase();
    a.ends_with(&b) || b.ends_with(&a)
}

fn path_is_tolerated(path: &str) -> bool {
    path.rsplit('.')
        .next()
        .is_some_and(|last| last.chars().filter(|c| *c != '_').collect::<String>().eq_ignore_ascii_case("postrate"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_payloads_have_no_diff() {
        let a = json!({"a": 1, "b": "x"});
        assert_eq!(property_diff(&a, &a), None);
    }

    #[test]
    fn post_rate_is_tolerated() {
        let a = json!({"postRate": 60});
        let b = json!({"postRate": 300});
        assert_eq!(property_diff(&a, &b), None);
    }

    #[test]
    fn lists_are_never_diffed() {
        let a = json!({"readings": [1, 2, 3]});
        let b = json!({"readings": [4]});
        assert_eq!(property_diff(&a, &b), None);
    }

    #[test]
    fn hex_binary_strings_tolerate_case_and_padding() {
        let a = json!({"lFDI": "ff"});
        let b = json!({"lFDI": "00FF"});
        assert_eq!(property_diff(&a, &b), None);
    }

    #[test]
    fn non_hex_strings_differing_only_by_case_are_tolerated() {
        let a = json!({"status": "Foo"});
        let b = json!({"status": "foo"});
        assert_eq!(property_diff(&a, &b), None);
    }

    #[test]
    fn non_matching_strings_still_report_a_diff() {
        let a = json!({"status": "Foo"});
        let b = json!({"status": "Bar"});
        assert!(property_diff(&a, &b).is_some());
    }

    #[test]
    fn time_fields_tolerate_small_drift() {
        let a = json!({"readingTime": 1000});
        let b = json!({"readingTime": 1005});
        assert_eq!(property_diff(&a, &b), None);

        let c = json!({"readingTime": 1000});
        let d = json!({"readingTime": 1050});
        assert!(property_diff(&c, &d).is_some());
    }

    #[test]
    fn unrelated_fields_report_a_diff() {
        let a = json!({"setMaxWPercent": 9000});
        let b = json!({"setMaxWPercent": 8000});
        assert!(property_diff(&a, &b).is_some());
    }
}
