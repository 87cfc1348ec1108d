// SPDX-License-Identifier: MIT OR Apache-2.0
//! Results evaluation: a run passes iff it completed, every step in
//! the procedure has a passing final result, there are zero warnings, and
//! zero XSD errors were logged across every response and notification.

use crate::progress::ProgressTracker;
use crate::response::ResponseTracker;
use crate::warning::WarningTracker;

/// Outcome of evaluating a finished (or aborted) test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOutcome {
    /// `true` iff every evaluation criterion held.
    pub passed: bool,
    /// Why the run failed, one line per violated criterion. Empty iff
    /// `passed`.
    pub reasons: Vec<String>,
}

/// Evaluate a finished run's trackers against every step the procedure
/// declared.
///
/// `run_completed` is `false` when the execution loop terminated early on
/// an uncaught action/check failure rather than running
/// every step to a final result.
#[must_use]
pub fn evaluate(run_completed: bool, procedure_step_ids: &[String], progress: &ProgressTracker, warnings: &WarningTracker, responses: &ResponseTracker) -> EvaluationOutcome {
    let mut reasons = Vec::new();

    if !run_completed {
        reasons.push("run did not complete: an action or check raised an uncaught failure".to_string());
    }

    for step_id in procedure_step_ids {
        match progress.entry(step_id).and_then(|e| e.result.as_ref()) {
            Some(result) if result.is_passed() => {}
            Some(_) => reasons.push(format!("step {step_id}: final result did not pass")),
            None => reasons.push(format!("step {step_id}: no final result recorded")),
        }
    }

    if !warnings.is_empty() {
        reasons.push(format!("{} warning(s) recorded", warnings.len()));
    }

    let xsd_errors = responses.total_xsd_errors();
    if xsd_errors > 0 {
        reasons.push(format!("{xsd_errors} XSD validation error(s) across logged responses/notifications"));
    }

    EvaluationOutcome { passed: reasons.is_empty(), reasons }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::StepResult;

    #[test]
    fn passes_when_every_criterion_holds() {
        let mut progress = ProgressTracker::new();
        progress.record_result("s1", StepResult { passed: true, description: None });
        let warnings = WarningTracker::new();
        let responses = ResponseTracker::new();

        let outcome = evaluate(true, &["s1".to_string()], &progress, &warnings, &responses);
        assert!(outcome.passed);
        assert!(outcome.reasons.is_empty());
    }

    #[test]
    fn fails_on_missing_step_result() {
        let progress = ProgressTracker::new();
        let warnings = WarningTracker::new();
        let responses = ResponseTracker::new();

        let outcome = evaluate(true, &["s1".to_string()], &progress, &warnings, &responses);
        assert!(!outcome.passed);
        assert_eq!(outcome.reasons.len(), 1);
    }

    #[test]
    fn fails_when_warnings_present() {
        let mut progress = ProgressTracker::new();
        progress.record_result("s1", StepResult { passed: true, description: None });
        let mut warnings = WarningTracker::new();
        warnings.record(crate::warning::WarningSource::StoredResource { href: "/edev/1".into() }, "stale");
        let responses = ResponseTracker::new();

        let outcome = evaluate(true, &["s1".to_string()], &progress, &warnings, &responses);
        assert!(!outcome.passed);
    }
}
