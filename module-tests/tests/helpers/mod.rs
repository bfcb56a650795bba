// module-tests/tests/helpers/mod.rs
// ============================================================================
// Module: Module Test Helpers
// Description: Shared helpers for the Terraform module suites.
// Purpose: Provide Terraform option builders and artifact utilities.
// Dependencies: module-tests, plan-harness
// ============================================================================

//! ## Overview
//! Shared helpers for the Terraform module suites.
//! Invariants:
//! - A missing Terraform binary skips a suite; it never fails one.
//! - Every Terraform process receives mock AWS credentials.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
