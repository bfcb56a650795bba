// crates/plan-harness/src/lib.rs
// ============================================================================
// Module: Plan Harness Library
// Description: Terraform plan execution and plan assertions for module tests.
// Purpose: Run init/plan/show against a module fixture and inspect the result.
// Dependencies: regex, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate wraps the `terraform` binary for plan-only module tests. It
//! builds the command lines from [`PlanOptions`], runs them with a transient
//! error [`RetryPolicy`], parses `terraform show -json` output into a
//! [`PlanStruct`], and exposes assertion helpers over the parsed plan.
//!
//! Terraform itself is a black box: no resource graph, state, or provider
//! behavior is modeled here.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertions;
pub mod binary;
pub mod logger;
pub mod options;
pub mod plan;
pub mod policy;
pub mod retry;
pub mod runner;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use assertions::AssertionError;
pub use assertions::PolicyGrants;
pub use binary::binary_available;
pub use binary::find_binary;
pub use logger::DiscardLogger;
pub use logger::FilePlanLogger;
pub use logger::PlanEvent;
pub use logger::PlanLogger;
pub use logger::StderrPlanLogger;
pub use options::PlanOptions;
pub use plan::ChangeAction;
pub use plan::PlanParseError;
pub use plan::PlanStruct;
pub use plan::ResourceChange;
pub use policy::OneOrMany;
pub use policy::PolicyDocument;
pub use policy::PolicyError;
pub use retry::RetryPolicy;
pub use retry::RetryPolicyError;
pub use runner::PlanError;
pub use runner::init_and_plan;
pub use runner::init_and_plan_and_show;
