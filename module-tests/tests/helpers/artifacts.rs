// module-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for module suites.
// Purpose: Keep per-test plan JSON and a canonical summary of each case.
// Dependencies: module-tests, serde, serde_jcs
// ============================================================================

//! ## Overview
//! Each test owns a run directory holding the plan JSON of every case it
//! planned plus `summary.json` (JCS) and `summary.md`. Timestamps are stored
//! as `u64` milliseconds so the canonical encoder can represent them.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use module_tests::config::ModuleTestConfig;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Summary Types
// ============================================================================

/// Outcome of one planned case (an app-stack variant or the cluster plan).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Case name, e.g. the variant name.
    pub name: String,
    /// `pass` or `fail`.
    pub status: String,
    /// Plan JSON artifact, relative to the run directory, when planning succeeded.
    pub plan_artifact: Option<String>,
    /// Failure message.
    pub detail: Option<String>,
}

impl CaseRecord {
    /// Records a passing case.
    pub fn passed(name: &str, plan_artifact: String) -> Self {
        Self {
            name: name.to_string(),
            status: "pass".to_string(),
            plan_artifact: Some(plan_artifact),
            detail: None,
        }
    }

    /// Records a failing case; the plan artifact is kept when one was written.
    pub fn failed(name: &str, detail: String, plan_artifact: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status: "fail".to_string(),
            plan_artifact,
            detail: Some(detail),
        }
    }

    /// Whether the case passed.
    pub fn is_pass(&self) -> bool {
        self.status == "pass"
    }
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSummary {
    /// Test function name.
    pub test_name: String,
    /// `pass`, `fail`, `skip`, `panic`, or `unknown`.
    pub status: String,
    /// Start time in milliseconds since the epoch.
    pub started_at_ms: u64,
    /// End time in milliseconds since the epoch.
    pub ended_at_ms: u64,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Per-case outcomes in run order.
    pub cases: Vec<CaseRecord>,
    /// Free-form notes such as skip reasons.
    pub notes: Vec<String>,
}

/// Milliseconds since the epoch, saturating at `u64::MAX`.
fn now_millis() -> u64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Default run directory under the workspace `target/module-tests`.
fn default_run_root(test_name: &str) -> PathBuf {
    let stamp = now_millis();
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("target")
        .join("module-tests")
        .join(format!("run_{stamp}"))
        .join(test_name)
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Artifact directory of a single module test.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    /// Run directory for this test.
    root: PathBuf,
}

impl TestArtifacts {
    /// Creates the artifact directory under the configured or default run root.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = ModuleTestConfig::load().map_err(io::Error::other)?;
        let root = config
            .run_root
            .map_or_else(|| default_run_root(test_name), |root| root.join(test_name));
        Self::at(root)
    }

    /// Creates the artifact directory at an explicit path.
    pub fn at(root: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the run directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a text artifact with UTF-8 encoding.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Collects case outcomes and writes the summary, even when a test panics.
pub struct TestReporter {
    /// Artifact directory.
    artifacts: TestArtifacts,
    /// Test function name.
    test_name: String,
    /// Start time in milliseconds since the epoch.
    started_at_ms: u64,
    /// Cases recorded so far.
    cases: Vec<CaseRecord>,
    /// Set once a summary has been written.
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        Ok(Self::from_artifacts(test_name, TestArtifacts::new(test_name)?))
    }

    /// Creates a reporter writing into `root`.
    pub fn at(test_name: &str, root: PathBuf) -> io::Result<Self> {
        Ok(Self::from_artifacts(test_name, TestArtifacts::at(root)?))
    }

    /// Wraps an artifact directory.
    fn from_artifacts(test_name: &str, artifacts: TestArtifacts) -> Self {
        Self {
            artifacts,
            test_name: test_name.to_string(),
            started_at_ms: now_millis(),
            cases: Vec::new(),
            finalized: false,
        }
    }

    /// Returns the artifact directory.
    pub fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Appends a case outcome.
    pub fn record_case(&mut self, case: CaseRecord) {
        self.cases.push(case);
    }

    /// Returns the cases recorded so far.
    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    /// Writes `summary.json` and `summary.md`.
    pub fn finish(&mut self, status: &str, notes: Vec<String>) -> io::Result<()> {
        let ended_at_ms = now_millis();
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            cases: self.cases.clone(),
            notes,
        };
        self.artifacts.write_json("summary.json", &summary)?;
        self.artifacts.write_text("summary.md", &summary_markdown(&summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let _ = self.finish(status, vec!["test terminated without explicit summary".to_string()]);
    }
}

/// Renders the human-readable summary.
fn summary_markdown(summary: &TestSummary) -> String {
    let mut out = String::new();
    out.push_str("# Module Test Summary\n\n");
    let _ = writeln!(out, "- Test: {}", summary.test_name);
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    out.push_str("\n## Cases\n\n");
    if summary.cases.is_empty() {
        out.push_str("- None\n");
    }
    for case in &summary.cases {
        let _ = write!(out, "- {}: {}", case.name, case.status);
        if let Some(artifact) = &case.plan_artifact {
            let _ = write!(out, " (plan: {artifact})");
        }
        if let Some(detail) = &case.detail {
            let _ = write!(out, "\n  - {}", detail.replace('\n', " "));
        }
        out.push('\n');
    }
    out.push_str("\n## Notes\n\n");
    if summary.notes.is_empty() {
        out.push_str("- None\n");
    }
    for note in &summary.notes {
        let _ = writeln!(out, "- {note}");
    }
    out
}
