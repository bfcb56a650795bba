// module-tests/src/config/mod.rs
// ============================================================================
// Module: Module Test Configuration
// Description: Centralized configuration for Terraform module suites.
// Purpose: Provide typed access to test environment settings and defaults.
// Dependencies: plan-harness
// ============================================================================

//! ## Overview
//! Suite configuration is read from environment variables and mapped into a
//! small typed structure for reuse across test helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ModuleTestConfig;
pub use env::ModuleTestEnv;
pub use env::default_fixtures_root;
pub use env::read_env_strict;
