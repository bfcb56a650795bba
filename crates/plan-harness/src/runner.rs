// crates/plan-harness/src/runner.rs
// ============================================================================
// Module: Plan Runner
// Description: Blocking execution of terraform init, plan, and show.
// Purpose: Produce a parsed plan for a fixture directory.
// Dependencies: std::process, thiserror
// ============================================================================

//! ## Overview
//! Each step is a blocking child process. The child environment is taken
//! from [`PlanOptions::env_vars`] on top of the inherited environment; the
//! current process environment is never modified.
//!
//! A failed step is retried only when its combined output matches the
//! options' [`RetryPolicy`](crate::retry::RetryPolicy). Everything else is
//! returned as [`PlanError::CommandFailed`] with the captured output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::thread;
use std::time::Instant;

use thiserror::Error;

use crate::logger::PlanEvent;
use crate::logger::PlanEventParams;
use crate::logger::PlanLogger;
use crate::options::PlanOptions;
use crate::plan::PlanParseError;
use crate::plan::PlanStruct;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Plan execution errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The child process could not be started.
    #[error("failed to run {command}: {source}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Spawn error.
        #[source]
        source: io::Error,
    },
    /// The child process exited unsuccessfully.
    #[error("{command} failed ({status}) after {attempts} attempt(s):\n{output}")]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Exit code when the process exited normally.
        exit_code: Option<i32>,
        /// Attempts made, including retries.
        attempts: u32,
        /// Combined stdout and stderr of the last attempt.
        output: String,
    },
    /// The plan artifact directory could not be prepared.
    #[error("failed to prepare {path}: {source}")]
    Io {
        /// Path being prepared.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: io::Error,
    },
    /// `terraform show -json` output could not be parsed.
    #[error(transparent)]
    Parse(#[from] PlanParseError),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Runs `terraform init` in the fixture directory.
///
/// # Errors
///
/// Returns [`PlanError`] when the command cannot be spawned or fails.
pub fn init(options: &PlanOptions, logger: &dyn PlanLogger) -> Result<String, PlanError> {
    run_command(options, &options.init_args(), logger)
}

/// Runs `terraform plan`, writing the plan artifact to `options.plan_file`.
///
/// # Errors
///
/// Returns [`PlanError`] when the artifact directory cannot be created or the
/// command fails.
pub fn plan(options: &PlanOptions, logger: &dyn PlanLogger) -> Result<String, PlanError> {
    if let Some(parent) = options.plan_file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PlanError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    run_command(options, &options.plan_args(), logger)
}

/// Runs `terraform show -json` on the plan artifact and parses the result.
///
/// # Errors
///
/// Returns [`PlanError`] when the command fails or its output is not a plan.
pub fn show(options: &PlanOptions, logger: &dyn PlanLogger) -> Result<PlanStruct, PlanError> {
    let stdout = run_command(options, &options.show_args(), logger)?;
    Ok(PlanStruct::parse(&stdout)?)
}

/// Runs init then plan, returning the plan command's stdout.
///
/// # Errors
///
/// Returns the first [`PlanError`] raised by either step.
pub fn init_and_plan(options: &PlanOptions, logger: &dyn PlanLogger) -> Result<String, PlanError> {
    init(options, logger)?;
    plan(options, logger)
}

/// Runs init, plan, and show, returning the parsed plan.
///
/// # Errors
///
/// Returns the first [`PlanError`] raised by any step.
pub fn init_and_plan_and_show(
    options: &PlanOptions,
    logger: &dyn PlanLogger,
) -> Result<PlanStruct, PlanError> {
    init_and_plan(options, logger)?;
    show(options, logger)
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs one command with retries, returning stdout on success.
fn run_command(
    options: &PlanOptions,
    args: &[String],
    logger: &dyn PlanLogger,
) -> Result<String, PlanError> {
    let subcommand = args.first().map_or("", String::as_str);
    let command = render_command(&options.binary, args);
    let mut attempt: u32 = 1;
    loop {
        let params = PlanEventParams {
            binary: &options.binary,
            subcommand,
            working_dir: &options.working_dir,
            attempt,
        };
        logger.record(&PlanEvent::start(&params));
        let started = Instant::now();
        let output = Command::new(&options.binary)
            .args(args)
            .current_dir(&options.working_dir)
            .envs(&options.env_vars)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| PlanError::Spawn {
                command: command.clone(),
                source,
            })?;
        let success = output.status.success();
        logger.record(&PlanEvent::finish(&params, success, output.status.code(), started.elapsed()));

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if success {
            return Ok(stdout);
        }
        let combined = format!("{stdout}{}", String::from_utf8_lossy(&output.stderr));
        let retryable =
            options.retry.classify(&combined).filter(|_| attempt <= options.retry.max_retries);
        if let Some(matched) = retryable {
            logger.record(&PlanEvent::retry(&params, &matched.description));
            thread::sleep(options.retry.time_between_retries);
            attempt += 1;
            continue;
        }
        return Err(PlanError::CommandFailed {
            command,
            status: output.status.to_string(),
            exit_code: output.status.code(),
            attempts: attempt,
            output: combined,
        });
    }
}

/// Renders a command line for error messages.
fn render_command(binary: &str, args: &[String]) -> String {
    let mut rendered = binary.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}
