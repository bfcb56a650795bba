// module-tests/src/lib.rs
// ============================================================================
// Module: Module Tests Library
// Description: Shared configuration and scenario tables for module suites.
// Purpose: Provide common inputs for the Terraform module test binaries.
// Dependencies: plan-harness, serde_json
// ============================================================================

//! ## Overview
//! This crate hosts the configuration and scenario tables used by the
//! Terraform module plan suites in `module-tests/tests`. The suites themselves
//! live in `tests/suites` and share helpers from `tests/helpers`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod scenarios;

// ============================================================================
// SECTION: Tests
// ============================================================================
