// crates/plan-harness/src/options.rs
// ============================================================================
// Module: Plan Options
// Description: Inputs for a Terraform init/plan/show run.
// Purpose: Hold fixture location, variables, env, and render command lines.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`PlanOptions`] names the fixture directory, the plan artifact path, the
//! binary, the child-process environment, and the input variables of a run.
//! Options are built once per test case and only borrowed by the runner.
//!
//! Variables are passed as `-var key=value`. Nested values use HCL syntax so
//! Terraform can parse maps, lists, and objects on the command line.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::retry::RetryPolicy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default Terraform binary name resolved on `PATH`.
pub const DEFAULT_BINARY: &str = "terraform";

// ============================================================================
// SECTION: Options
// ============================================================================

/// Inputs for a single init/plan/show run against one fixture directory.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Directory holding the root Terraform configuration.
    pub working_dir: PathBuf,
    /// Output path for the binary plan artifact (`-out`).
    pub plan_file: PathBuf,
    /// Binary name or path.
    pub binary: String,
    /// Environment variables passed to every child process.
    pub env_vars: BTreeMap<String, String>,
    /// Input variables rendered as `-var` flags, in key order.
    pub vars: BTreeMap<String, Value>,
    /// Variable files rendered as `-var-file` flags, in insertion order.
    pub var_files: Vec<PathBuf>,
    /// Suppress colored output.
    pub no_color: bool,
    /// Whether plan takes the state lock.
    pub lock: bool,
    /// Whether init upgrades providers and modules.
    pub upgrade: bool,
    /// Retry policy applied to each command.
    pub retry: RetryPolicy,
}

impl PlanOptions {
    /// Creates options for a fixture directory and plan artifact path.
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>, plan_file: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            plan_file: plan_file.into(),
            binary: DEFAULT_BINARY.to_string(),
            env_vars: BTreeMap::new(),
            vars: BTreeMap::new(),
            var_files: Vec::new(),
            no_color: false,
            lock: false,
            upgrade: false,
            retry: RetryPolicy::none(),
        }
    }

    /// Sets the binary name or path.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Adds one child-process environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Adds several child-process environment variables.
    #[must_use]
    pub fn with_envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars.extend(vars.into_iter().map(|(key, value)| (key.into(), value.into())));
        self
    }

    /// Sets one input variable.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: Value) -> Self {
        self.vars.insert(key.into(), value);
        self
    }

    /// Sets several input variables; later keys replace earlier ones.
    #[must_use]
    pub fn with_vars<I, K>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.vars.extend(vars.into_iter().map(|(key, value)| (key.into(), value)));
        self
    }

    /// Appends a variable file.
    #[must_use]
    pub fn with_var_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.var_files.push(path.into());
        self
    }

    /// Enables or disables colored output.
    #[must_use]
    pub const fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Arguments for `terraform init`.
    #[must_use]
    pub fn init_args(&self) -> Vec<String> {
        let mut args = vec![
            "init".to_string(),
            format!("-upgrade={}", self.upgrade),
            "-input=false".to_string(),
        ];
        self.push_no_color(&mut args);
        args
    }

    /// Arguments for `terraform plan`.
    #[must_use]
    pub fn plan_args(&self) -> Vec<String> {
        let mut args = vec![
            "plan".to_string(),
            format!("-out={}", self.plan_file.display()),
            "-input=false".to_string(),
            format!("-lock={}", self.lock),
        ];
        for file in &self.var_files {
            args.push(format!("-var-file={}", file.display()));
        }
        for (key, value) in &self.vars {
            args.push("-var".to_string());
            args.push(format!("{key}={}", render_var_value(value)));
        }
        self.push_no_color(&mut args);
        args
    }

    /// Arguments for `terraform show -json` of the plan artifact.
    #[must_use]
    pub fn show_args(&self) -> Vec<String> {
        let mut args = vec!["show".to_string(), "-json".to_string()];
        self.push_no_color(&mut args);
        args.push(self.plan_file.display().to_string());
        args
    }

    /// Appends `-no-color` when enabled.
    fn push_no_color(&self, args: &mut Vec<String>) {
        if self.no_color {
            args.push("-no-color".to_string());
        }
    }
}

// ============================================================================
// SECTION: Variable Rendering
// ============================================================================

/// Renders a variable value for a `-var key=value` flag.
///
/// Top-level strings are passed raw. Lists, maps, and nested strings use
/// HCL literal syntax; map keys come out in sorted order.
#[must_use]
pub fn render_var_value(value: &Value) -> String {
    render_hcl(value, false)
}

/// Renders a JSON value as an HCL literal.
fn render_hcl(value: &Value, nested: bool) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) if nested => quote_hcl(text),
        Value::String(text) => text.clone(),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(|item| render_hcl(item, true)).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Object(map) => {
            let rendered: Vec<String> = map
                .iter()
                .map(|(key, item)| format!("{} = {}", quote_hcl(key), render_hcl(item, true)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}

/// Quotes a string as an HCL string literal with template sequences escaped.
fn quote_hcl(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(ch);
                out.push(ch);
            }
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
