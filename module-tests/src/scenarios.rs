// module-tests/src/scenarios.rs
// ============================================================================
// Module: Module Scenarios
// Description: Fixture locations, resource addresses, and variant tables.
// Purpose: Keep the plan contract of each module suite in one literal table.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Each app-stack variant overrides a few module inputs and states what the
//! resulting plan must contain: a dashboard snippet, a subset of policy
//! actions, a policy resource hint, and whether a Firehose stream appears.
//!
//! Addresses must match Terraform's addressing exactly, including module
//! nesting and `[0]` suffixes on counted resources.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Mock AWS credentials and region passed to every Terraform process.
pub const MOCK_AWS_ENV: &[(&str, &str)] = &[
    ("AWS_ACCESS_KEY_ID", "mock"),
    ("AWS_SECRET_ACCESS_KEY", "mock"),
    ("AWS_DEFAULT_REGION", "us-east-1"),
];

// ============================================================================
// SECTION: Addresses
// ============================================================================

/// ECS service of the app stack.
pub const ECS_SERVICE: &str = "module.app_stack.module.ecs_service.aws_ecs_service.this";
/// Application log group of the app stack.
pub const LOG_GROUP: &str =
    "module.app_stack.module.application_log_group.aws_cloudwatch_log_group.this";
/// Service dashboard of the app stack.
pub const DASHBOARD: &str =
    "module.app_stack.module.service_dashboard[0].aws_cloudwatch_dashboard.this";
/// IAM role assumed by CloudWatch Logs for the subscription.
pub const SUBSCRIPTION_ROLE: &str =
    "module.app_stack.module.application_log_group.aws_iam_role.subscription[0]";
/// Inline policy attached to the subscription role.
pub const SUBSCRIPTION_ROLE_POLICY: &str =
    "module.app_stack.module.application_log_group.aws_iam_role_policy.subscription[0]";
/// Firehose delivery stream created for Firehose log destinations.
pub const FIREHOSE_STREAM: &str = "module.app_stack.module.log_processor_firehose[0].aws_kinesis_firehose_delivery_stream.this";
/// ECS cluster of the cluster module fixture.
pub const ECS_CLUSTER: &str = "module.ecs_cluster.aws_ecs_cluster.this";

/// Addresses every app-stack variant must plan.
pub const APP_STACK_RESOURCES: &[&str] =
    &[ECS_SERVICE, LOG_GROUP, DASHBOARD, SUBSCRIPTION_ROLE, SUBSCRIPTION_ROLE_POLICY];

/// Attribute holding the rendered dashboard JSON.
pub const DASHBOARD_BODY_ATTRIBUTE: &str = "dashboard_body";

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Root configuration for the app-stack module.
#[must_use]
pub fn app_stack_dir(fixtures_root: &Path) -> PathBuf {
    fixtures_root.join("app_stack")
}

/// Root configuration for the ECS cluster module.
#[must_use]
pub fn ecs_cluster_dir(fixtures_root: &Path) -> PathBuf {
    fixtures_root.join("ecs_cluster")
}

// ============================================================================
// SECTION: Variants
// ============================================================================

/// Actions granted to the subscription role for Lambda destinations.
const LAMBDA_ACTIONS: &[&str] = &["lambda:InvokeFunction", "lambda:InvokeAsync"];
/// Actions granted to the subscription role for Firehose destinations.
const FIREHOSE_ACTIONS: &[&str] = &["firehose:PutRecord", "firehose:PutRecordBatch"];

/// One app-stack input combination and its expected plan content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppStackVariant {
    /// Variant label used in reports.
    pub name: &'static str,
    /// Input variables overriding module defaults.
    pub vars: BTreeMap<String, Value>,
    /// Substring the dashboard body must contain.
    pub expect_dashboard_snippet: &'static str,
    /// Actions the subscription policy must grant.
    pub expect_policy_actions: &'static [&'static str],
    /// Substring at least one policy resource must contain.
    pub expect_policy_resource_hint: &'static str,
    /// Whether the Firehose delivery stream must be planned.
    pub expect_firehose: bool,
}

impl AppStackVariant {
    /// Addresses this variant must plan.
    #[must_use]
    pub fn expected_resources(&self) -> Vec<&'static str> {
        let mut addresses = APP_STACK_RESOURCES.to_vec();
        if self.expect_firehose {
            addresses.push(FIREHOSE_STREAM);
        }
        addresses
    }
}

/// The four app-stack variants, in run order.
#[must_use]
pub fn app_stack_variants(fixtures_root: &Path) -> Vec<AppStackVariant> {
    let custom_template = app_stack_dir(fixtures_root).join("custom_dashboard.json");
    vec![
        AppStackVariant {
            name: "overview",
            vars: vars([("dashboard_template_variant", json!("overview"))]),
            expect_dashboard_snippet: "CPUUtilization",
            expect_policy_actions: LAMBDA_ACTIONS,
            expect_policy_resource_hint: "log-processor",
            expect_firehose: false,
        },
        AppStackVariant {
            name: "health",
            vars: vars([
                ("dashboard_template_variant", json!("health")),
                ("dashboard_template_context", json!({ "load_balancer_name": "app/test-alb" })),
            ]),
            expect_dashboard_snippet: "TargetResponseTime",
            expect_policy_actions: LAMBDA_ACTIONS,
            expect_policy_resource_hint: "log-processor",
            expect_firehose: false,
        },
        AppStackVariant {
            name: "custom_path",
            vars: vars([(
                "dashboard_template_path",
                json!(custom_template.display().to_string()),
            )]),
            expect_dashboard_snippet: "CustomWidgetMetric",
            expect_policy_actions: LAMBDA_ACTIONS,
            expect_policy_resource_hint: "log-processor",
            expect_firehose: false,
        },
        AppStackVariant {
            name: "firehose",
            vars: vars([
                ("dashboard_template_variant", json!("overview")),
                ("log_subscription_destination_arn", json!("")),
                ("log_subscription_role_policy_statements", json!([])),
                ("create_log_processor_lambda", json!(false)),
                ("create_log_processor_firehose", json!(true)),
                (
                    "log_processor_firehose_config",
                    json!({
                        "stream_name": "test-firehose-logs",
                        "s3_bucket_arn": "arn:aws:s3:::test-firehose-bucket"
                    }),
                ),
            ]),
            expect_dashboard_snippet: "CPUUtilization",
            expect_policy_actions: FIREHOSE_ACTIONS,
            expect_policy_resource_hint: "test-firehose-logs",
            expect_firehose: true,
        },
    ]
}

/// Builds a variable map from literal entries.
fn vars<const N: usize>(entries: [(&str, Value); N]) -> BTreeMap<String, Value> {
    entries.into_iter().map(|(key, value)| (key.to_string(), value)).collect()
}
