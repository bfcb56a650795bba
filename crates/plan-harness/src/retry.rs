// crates/plan-harness/src/retry.rs
// ============================================================================
// Module: Retry Policy
// Description: Transient-failure classification for Terraform commands.
// Purpose: Re-run commands whose output matches known flaky signatures.
// Dependencies: regex, thiserror
// ============================================================================

//! ## Overview
//! A [`RetryPolicy`] pairs output patterns with a retry budget. Only command
//! execution is retried; plan assertions never are.
//!
//! The default pattern set covers provider installation and registry
//! reachability failures seen during `terraform init` on flaky networks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use regex::Regex;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay between attempts.
pub const DEFAULT_TIME_BETWEEN_RETRIES: Duration = Duration::from_secs(5);

/// Known transient Terraform failure signatures and their descriptions.
pub const DEFAULT_RETRYABLE_ERRORS: &[(&str, &str)] = &[
    (r".*read: connection reset by peer.*", "Connection reset while reaching a remote endpoint."),
    (r".*transport is closing.*", "Remote transport closed unexpectedly."),
    (r".*unable to verify signature.*", "Failed to verify provider signature due to transient network error."),
    (r".*unable to verify checksum.*", "Failed to verify provider checksum due to transient network error."),
    (r".*no provider exists with the given name.*", "Provider registry lookup failed transiently."),
    (r".*registry service is unreachable.*", "Failed to reach the provider registry."),
    (r".*Error installing provider.*", "Failed to install provider due to transient network error."),
    (r".*Failed to query available provider packages.*", "Failed to query provider packages."),
    (r".*timeout while waiting for plugin to start.*", "Provider plugin start timed out."),
    (r".*timed out waiting for server handshake.*", "Provider plugin handshake timed out."),
    (r"could not query provider registry for", "Failed to query the provider registry."),
    (r".*TLS handshake timeout.*", "TLS handshake timed out."),
    (r".*i/o timeout.*", "Network I/O timed out."),
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Retry policy construction errors.
#[derive(Debug, Error)]
pub enum RetryPolicyError {
    /// A retryable-error pattern failed to compile.
    #[error("invalid retryable error pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// Pattern text.
        pattern: String,
        /// Regex compilation error.
        #[source]
        source: regex::Error,
    },
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// One retryable output signature.
#[derive(Debug, Clone)]
pub struct RetryableError {
    /// Compiled output pattern.
    pub pattern: Regex,
    /// Human-readable description used in retry events.
    pub description: String,
}

/// Retry budget and transient-error patterns for command execution.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay between attempts.
    pub time_between_retries: Duration,
    /// Output signatures that make a failure retryable.
    pub retryable_errors: Vec<RetryableError>,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            time_between_retries: Duration::ZERO,
            retryable_errors: Vec::new(),
        }
    }

    /// Builds a policy from explicit `(pattern, description)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`RetryPolicyError::InvalidPattern`] when a pattern fails to compile.
    pub fn from_patterns(
        patterns: &[(&str, &str)],
        max_retries: u32,
        time_between_retries: Duration,
    ) -> Result<Self, RetryPolicyError> {
        let retryable_errors = patterns
            .iter()
            .map(|(pattern, description)| {
                Regex::new(pattern)
                    .map(|pattern| RetryableError {
                        pattern,
                        description: (*description).to_string(),
                    })
                    .map_err(|source| RetryPolicyError::InvalidPattern {
                        pattern: (*pattern).to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            max_retries,
            time_between_retries,
            retryable_errors,
        })
    }

    /// Builds the default policy for transient Terraform failures.
    ///
    /// # Errors
    ///
    /// Returns [`RetryPolicyError::InvalidPattern`] when a default pattern fails to compile.
    pub fn with_default_retryable_errors() -> Result<Self, RetryPolicyError> {
        Self::from_patterns(
            DEFAULT_RETRYABLE_ERRORS,
            DEFAULT_MAX_RETRIES,
            DEFAULT_TIME_BETWEEN_RETRIES,
        )
    }

    /// Overrides the retry budget.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Overrides the delay between attempts.
    #[must_use]
    pub const fn with_time_between_retries(mut self, delay: Duration) -> Self {
        self.time_between_retries = delay;
        self
    }

    /// Returns the first signature matching the command output, if any.
    #[must_use]
    pub fn classify(&self, output: &str) -> Option<&RetryableError> {
        self.retryable_errors.iter().find(|candidate| candidate.pattern.is_match(output))
    }

    /// Returns true when a failed attempt (1-based) should be retried.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, output: &str) -> bool {
        attempt <= self.max_retries && self.classify(output).is_some()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
