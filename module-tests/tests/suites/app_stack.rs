// module-tests/tests/suites/app_stack.rs
// ============================================================================
// Module: App Stack Plan Tests
// Description: Plans the app-stack module once per variant and checks the result.
// Purpose: Verify resource addresses, IAM grants, and dashboard rendering.
// Dependencies: module-tests helpers, plan-harness
// ============================================================================

//! App-stack variant plans for the module suites.

use std::error::Error;
use std::path::Path;

use helpers::artifacts::CaseRecord;
use helpers::artifacts::TestReporter;
use helpers::terraform::Resolution;
use helpers::terraform::TerraformHarness;
use module_tests::scenarios::AppStackVariant;
use module_tests::scenarios::DASHBOARD;
use module_tests::scenarios::DASHBOARD_BODY_ATTRIBUTE;
use module_tests::scenarios::ECS_SERVICE;
use module_tests::scenarios::SUBSCRIPTION_ROLE;
use module_tests::scenarios::SUBSCRIPTION_ROLE_POLICY;
use module_tests::scenarios::app_stack_dir;
use module_tests::scenarios::app_stack_variants;
use plan_harness::ChangeAction;
use plan_harness::PlanStruct;
use plan_harness::assertions::require_actions;
use plan_harness::assertions::require_attribute_contains;
use plan_harness::assertions::require_policy_grants;
use plan_harness::assertions::require_resources;
use plan_harness::init_and_plan_and_show;

use crate::helpers;

#[test]
fn app_stack_plan_variants() -> Result<(), Box<dyn Error>> {
    let mut reporter = TestReporter::new("app_stack_plan_variants")?;
    let harness = match TerraformHarness::resolve()? {
        Resolution::Ready(harness) => harness,
        Resolution::Missing(note) => {
            reporter.finish("skip", vec![note])?;
            return Ok(());
        }
    };

    let fixtures_root = harness.config.fixtures_root();
    let working_dir = app_stack_dir(&fixtures_root);

    // Variants run in order; one failing variant does not stop the rest.
    for variant in app_stack_variants(&fixtures_root) {
        let case = match plan_variant(&harness, &working_dir, &variant) {
            Ok(plan) => {
                let artifact = format!("{}.plan.json", variant.name);
                reporter.artifacts().write_json(&artifact, &plan.raw)?;
                match check_variant(&plan, &variant) {
                    Ok(()) => CaseRecord::passed(variant.name, artifact),
                    Err(err) => CaseRecord::failed(variant.name, err.to_string(), Some(artifact)),
                }
            }
            Err(err) => CaseRecord::failed(variant.name, err.to_string(), None),
        };
        reporter.record_case(case);
    }

    let failures: Vec<String> = reporter
        .cases()
        .iter()
        .filter(|case| !case.is_pass())
        .map(|case| format!("{}: {}", case.name, case.detail.as_deref().unwrap_or_default()))
        .collect();
    let status = if failures.is_empty() { "pass" } else { "fail" };
    reporter.finish(status, Vec::new())?;
    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("app-stack variants failed:\n{}", failures.join("\n")).into())
    }
}

/// Plans one variant with its input overrides.
fn plan_variant(
    harness: &TerraformHarness,
    working_dir: &Path,
    variant: &AppStackVariant,
) -> Result<PlanStruct, Box<dyn Error>> {
    let (options, _plan_dir) = harness.options(working_dir)?;
    let options = options.with_vars(variant.vars.clone());
    Ok(init_and_plan_and_show(&options, harness.logger())?)
}

/// Checks a variant's plan against its expectations.
fn check_variant(plan: &PlanStruct, variant: &AppStackVariant) -> Result<(), Box<dyn Error>> {
    require_resources(plan, &variant.expected_resources())?;
    require_actions(plan, ECS_SERVICE, &[ChangeAction::Create])?;
    require_actions(plan, SUBSCRIPTION_ROLE, &[ChangeAction::Create])?;

    let grants = require_policy_grants(
        plan,
        SUBSCRIPTION_ROLE_POLICY,
        variant.expect_policy_actions,
        variant.expect_policy_resource_hint,
    )?;
    if variant.expect_firehose
        && let Some(action) = grants.actions.iter().find(|action| action.starts_with("lambda:"))
    {
        return Err(format!("firehose policy still grants {action}").into());
    }

    require_attribute_contains(
        plan,
        DASHBOARD,
        DASHBOARD_BODY_ATTRIBUTE,
        variant.expect_dashboard_snippet,
    )?;
    Ok(())
}
