// SPDX-License-Identifier: MIT OR Apache-2.0
//! `report.html`: a minimal static summary, not an interactive renderer.

use cactus_track::EvaluationOutcome;

/// Render a run's outcome as a small standalone HTML page.
#[must_use]
pub fn render(procedure_id: &str, run_id: u64, outcome: &EvaluationOutcome) -> String {
    let verdict = if outcome.passed { "PASS" } else { "FAIL" };
    let reasons = if outcome.reasons.is_empty() {
        String::new()
    } else {
        let items: String = outcome.reasons.iter().map(|r| format!("<li>{}</li>", html_escape(r))).collect();
        format!("<ul>{items}</ul>")
    };
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>cactus run {run_id}</title></head>\
<body><h1>{verdict}</h1><p>procedure: {}</p><p>run: {run_id}</p>{reasons}</body></html>",
        html_escape(procedure_id)
    )
}

fn html_escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_report_has_no_reason_list() {
        let html = render("p1", 1, &EvaluationOutcome { passed: true, reasons: vec![] });
        assert!(html.contains("PASS"));
        assert!(!html.contains("<ul>"));
    }

    #[test]
    fn failing_report_lists_reasons() {
        let html = render("p1", 1, &EvaluationOutcome { passed: false, reasons: vec!["step s1 failed".to_string()] });
        assert!(html.contains("FAIL"));
        assert!(html.contains("step s1 failed"));
    }
}
