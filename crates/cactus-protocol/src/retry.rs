// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rate-limit retry: on HTTP 429 the client sleeps a fixed,
//! increasing schedule and re-issues the request. After the schedule is
//! exhausted the last 429 response is returned as-is — this is a contract
//! detail callers rely on, not an incidental implementation choice, so the
//! schedule itself is not configurable.

use std::time::Duration;

/// The fixed rate-limit backoff schedule, in order of attempt.
pub const RATE_LIMIT_SCHEDULE: &[Duration] = &[
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
    Duration::from_secs(8),
    Duration::from_secs(16),
];

/// The delay to sleep before rate-limit retry attempt `attempt` (zero
/// indexed, counting the *retry*, not the original attempt). Returns
/// `None` once the schedule is exhausted, signalling the caller should
/// give up and return the last 429 response.
#[must_use]
pub fn delay_for_attempt(attempt: usize) -> Option<Duration> {
    RATE_LIMIT_SCHEDULE.get(attempt).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_fixed_and_increasing() {
        let delays: Vec<_> = (0..).map_while(delay_for_attempt).collect();
        assert_eq!(delays.len(), 5);
        for pair in delays.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn schedule_exhausts() {
        assert!(delay_for_attempt(5).is_none());
    }
}
