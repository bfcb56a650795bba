// crates/plan-harness/src/logger.rs
// ============================================================================
// Module: Plan Event Logging
// Description: Structured events for Terraform command execution.
// Purpose: Emit JSON-line logs without hard dependencies on a log pipeline.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every command attempt emits a [`PlanEvent`] through a [`PlanLogger`].
//! Sinks write one JSON object per line to stderr or a file, or discard the
//! event entirely. Command output is never included in events; failures
//! carry their output in the returned error instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Command execution event payload.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEvent {
    /// Event identifier (`command_start`, `command_finish`, `command_retry`).
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Binary that was invoked.
    pub binary: String,
    /// Terraform subcommand (`init`, `plan`, `show`).
    pub subcommand: String,
    /// Working directory of the child process.
    pub working_dir: String,
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Outcome label for finish events.
    pub outcome: Option<&'static str>,
    /// Exit code when the process exited normally.
    pub exit_code: Option<i32>,
    /// Attempt duration in milliseconds.
    pub duration_ms: Option<u128>,
    /// Retry reason or other detail.
    pub message: Option<String>,
}

/// Inputs required to construct a plan event.
pub struct PlanEventParams<'a> {
    /// Binary that was invoked.
    pub binary: &'a str,
    /// Terraform subcommand.
    pub subcommand: &'a str,
    /// Working directory of the child process.
    pub working_dir: &'a Path,
    /// Attempt number, starting at 1.
    pub attempt: u32,
}

impl PlanEvent {
    /// Creates a `command_start` event.
    #[must_use]
    pub fn start(params: &PlanEventParams<'_>) -> Self {
        Self::base("command_start", params)
    }

    /// Creates a `command_finish` event.
    #[must_use]
    pub fn finish(
        params: &PlanEventParams<'_>,
        success: bool,
        exit_code: Option<i32>,
        elapsed: Duration,
    ) -> Self {
        let mut event = Self::base("command_finish", params);
        event.outcome = Some(if success { "ok" } else { "error" });
        event.exit_code = exit_code;
        event.duration_ms = Some(elapsed.as_millis());
        event
    }

    /// Creates a `command_retry` event naming the matched transient signature.
    #[must_use]
    pub fn retry(params: &PlanEventParams<'_>, reason: &str) -> Self {
        let mut event = Self::base("command_retry", params);
        event.message = Some(reason.to_string());
        event
    }

    /// Builds an event with the shared fields filled in.
    fn base(event: &'static str, params: &PlanEventParams<'_>) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            binary: params.binary.to_string(),
            subcommand: params.subcommand.to_string(),
            working_dir: params.working_dir.display().to_string(),
            attempt: params.attempt,
            outcome: None,
            exit_code: None,
            duration_ms: None,
            message: None,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for command execution events.
pub trait PlanLogger: Send + Sync {
    /// Record an event.
    fn record(&self, event: &PlanEvent);
}

/// Logger that drops every event.
pub struct DiscardLogger;

impl PlanLogger for DiscardLogger {
    fn record(&self, _event: &PlanEvent) {}
}

/// Logger that writes JSON lines to stderr.
pub struct StderrPlanLogger;

impl PlanLogger for StderrPlanLogger {
    fn record(&self, event: &PlanEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Logger that appends JSON lines to a file.
pub struct FilePlanLogger {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FilePlanLogger {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl PlanLogger for FilePlanLogger {
    fn record(&self, event: &PlanEvent) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut guard) = self.file.lock() {
            let _ = writeln!(guard, "{payload}");
        }
    }
}
