// module-tests/tests/suites/reporting.rs
// ============================================================================
// Module: Summary Reporting Tests
// Description: Checks the on-disk summaries written by the test reporter.
// Purpose: Keep summary.json canonical JSON that tooling can parse back.
// Dependencies: module-tests helpers, serde_json, tempfile
// ============================================================================

//! Summary artifact checks for the module suites.

#![allow(
    clippy::panic_in_result_fn,
    reason = "Test-only assertions inside fallible tests are permitted."
)]

use std::error::Error;
use std::fs;

use helpers::artifacts::CaseRecord;
use helpers::artifacts::TestReporter;
use helpers::artifacts::TestSummary;
use tempfile::TempDir;

use crate::helpers;

#[test]
fn summary_json_parses_back() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let root = temp.path().join("summary_json_parses_back");
    let mut reporter = TestReporter::at("summary_json_parses_back", root.clone())?;
    reporter.record_case(CaseRecord::passed("overview", "overview.plan.json".to_string()));
    reporter.record_case(CaseRecord::failed(
        "firehose",
        "missing resource \"module.app_stack.module.log_processor_firehose[0]\"".to_string(),
        None,
    ));
    reporter.finish("fail", vec!["one variant failed".to_string()])?;

    let summary: TestSummary = serde_json::from_slice(&fs::read(root.join("summary.json"))?)?;
    assert_eq!(summary.test_name, "summary_json_parses_back");
    assert_eq!(summary.status, "fail");
    assert!(summary.started_at_ms > 0);
    assert_eq!(summary.duration_ms, summary.ended_at_ms - summary.started_at_ms);
    assert_eq!(summary.cases.len(), 2);
    assert!(summary.cases[0].is_pass());
    assert_eq!(summary.cases[0].plan_artifact.as_deref(), Some("overview.plan.json"));
    assert!(!summary.cases[1].is_pass());
    assert_eq!(summary.cases[1].plan_artifact, None);
    assert_eq!(summary.notes, vec!["one variant failed".to_string()]);

    let markdown = fs::read_to_string(root.join("summary.md"))?;
    assert!(markdown.contains("- overview: pass (plan: overview.plan.json)"));
    assert!(markdown.contains("- firehose: fail"));
    Ok(())
}

#[test]
fn dropped_reporter_writes_unknown_summary() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let root = temp.path().join("dropped");
    drop(TestReporter::at("dropped", root.clone())?);

    let summary: TestSummary = serde_json::from_slice(&fs::read(root.join("summary.json"))?)?;
    assert_eq!(summary.status, "unknown");
    assert!(summary.cases.is_empty());
    Ok(())
}
