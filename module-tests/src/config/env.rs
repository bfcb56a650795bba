// module-tests/src/config/env.rs
// ============================================================================
// Module: Module Test Environment
// Description: Environment-backed configuration for module suites.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: plan-harness
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use plan_harness::RetryPolicy;
use plan_harness::options::DEFAULT_BINARY;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for module test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleTestEnv {
    /// Optional Terraform binary name or path.
    TerraformBinary,
    /// Optional override for the Terraform fixtures root.
    FixturesRoot,
    /// Optional artifact run root override.
    RunRoot,
    /// Optional retry budget override (non-negative integer).
    MaxRetries,
    /// Optional delay between retries in seconds (non-negative integer).
    RetryDelaySeconds,
    /// Emit command events to stderr (`true`/`false` or `1`/`0`).
    Verbose,
    /// Optional path of a JSON-lines command event log.
    LogFile,
}

impl ModuleTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TerraformBinary => "MODULE_TESTS_TERRAFORM_BINARY",
            Self::FixturesRoot => "MODULE_TESTS_FIXTURES_ROOT",
            Self::RunRoot => "MODULE_TESTS_RUN_ROOT",
            Self::MaxRetries => "MODULE_TESTS_MAX_RETRIES",
            Self::RetryDelaySeconds => "MODULE_TESTS_RETRY_DELAY_SEC",
            Self::Verbose => "MODULE_TESTS_VERBOSE",
            Self::LogFile => "MODULE_TESTS_LOG_FILE",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed module test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleTestConfig {
    /// Optional Terraform binary override.
    pub terraform_binary: Option<String>,
    /// Optional fixtures root override.
    pub fixtures_root: Option<PathBuf>,
    /// Optional artifact run root override.
    pub run_root: Option<PathBuf>,
    /// Optional retry budget override.
    pub max_retries: Option<u32>,
    /// Optional delay between retries.
    pub retry_delay: Option<Duration>,
    /// Emit command events to stderr.
    pub verbose: bool,
    /// Optional JSON-lines command event log.
    pub log_file: Option<PathBuf>,
}

impl ModuleTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, a non-numeric retry count).
    pub fn load() -> Result<Self, String> {
        let terraform_binary = read_env_nonempty(ModuleTestEnv::TerraformBinary.as_str())?;
        let fixtures_root =
            read_env_nonempty(ModuleTestEnv::FixturesRoot.as_str())?.map(PathBuf::from);
        let run_root = read_env_nonempty(ModuleTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let max_retries = read_env_nonempty(ModuleTestEnv::MaxRetries.as_str())?
            .map(|value| parse_count(ModuleTestEnv::MaxRetries.as_str(), &value))
            .transpose()?;
        let retry_delay = read_env_nonempty(ModuleTestEnv::RetryDelaySeconds.as_str())?
            .map(|value| {
                parse_count(ModuleTestEnv::RetryDelaySeconds.as_str(), &value)
                    .map(|secs| Duration::from_secs(u64::from(secs)))
            })
            .transpose()?;
        let verbose = parse_bool_env(
            ModuleTestEnv::Verbose.as_str(),
            read_env_nonempty(ModuleTestEnv::Verbose.as_str())?,
        )?;
        let log_file = read_env_nonempty(ModuleTestEnv::LogFile.as_str())?.map(PathBuf::from);
        Ok(Self {
            terraform_binary,
            fixtures_root,
            run_root,
            max_retries,
            retry_delay,
            verbose,
            log_file,
        })
    }

    /// Returns the Terraform binary name, defaulting to `terraform`.
    #[must_use]
    pub fn terraform_binary(&self) -> &str {
        self.terraform_binary.as_deref().unwrap_or(DEFAULT_BINARY)
    }

    /// Returns the fixtures root, defaulting to the workspace `terraform/fixtures`.
    #[must_use]
    pub fn fixtures_root(&self) -> PathBuf {
        self.fixtures_root.clone().unwrap_or_else(default_fixtures_root)
    }

    /// Builds the transient-error retry policy with any overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error when the default retry patterns fail to compile.
    pub fn retry_policy(&self) -> Result<RetryPolicy, String> {
        let mut policy =
            RetryPolicy::with_default_retryable_errors().map_err(|err| err.to_string())?;
        if let Some(max_retries) = self.max_retries {
            policy = policy.with_max_retries(max_retries);
        }
        if let Some(delay) = self.retry_delay {
            policy = policy.with_time_between_retries(delay);
        }
        Ok(policy)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the fixtures directory shipped with the workspace.
#[must_use]
pub fn default_fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("terraform").join("fixtures")
}

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a non-negative integer from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is not a non-negative integer.
fn parse_count(name: &str, raw: &str) -> Result<u32, String> {
    raw.trim().parse().map_err(|_| format!("{name} must be a non-negative integer"))
}

/// Parses a boolean environment variable with permissive defaults.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
