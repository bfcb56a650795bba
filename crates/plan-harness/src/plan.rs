// crates/plan-harness/src/plan.rs
// ============================================================================
// Module: Plan Model
// Description: Typed view of `terraform show -json` plan output.
// Purpose: Index resource changes and planned values by resource address.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`PlanStruct::parse`] decodes the machine-readable plan into maps keyed by
//! resource address, for example
//! `module.app_stack.module.service_dashboard[0].aws_cloudwatch_dashboard.this`.
//!
//! Attribute snapshots (`before`, `after`) stay untyped: their shape belongs to
//! each provider schema, so callers read them as JSON.
//!
//! Invariants:
//! - Terraform emits unique addresses per plan. The index does not re-check
//!   this; a repeated address replaces the earlier entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Plan JSON decoding errors.
#[derive(Debug, Error)]
pub enum PlanParseError {
    /// The document is not valid JSON or does not match the plan shape.
    #[error("plan json error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// SECTION: Change Records
// ============================================================================

/// Planned action verb for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeAction {
    /// No change.
    NoOp,
    /// Resource will be created.
    Create,
    /// Data source will be read.
    Read,
    /// Resource will be updated in place.
    Update,
    /// Resource will be destroyed.
    Delete,
    /// Resource will be removed from state without being destroyed.
    Forget,
    /// Verb not known to this harness.
    #[serde(other)]
    Unknown,
}

impl ChangeAction {
    /// Returns the verb as Terraform spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Forget => "forget",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change record for a resource or output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Ordered action verbs.
    pub actions: Vec<ChangeAction>,
    /// Attribute snapshot before the change.
    #[serde(default)]
    pub before: Option<Value>,
    /// Attribute snapshot after the change; unknown values are omitted.
    #[serde(default)]
    pub after: Option<Value>,
    /// Attributes whose values are only known after apply.
    #[serde(default)]
    pub after_unknown: Option<Value>,
    /// Sensitivity markers for `before`.
    #[serde(default)]
    pub before_sensitive: Option<Value>,
    /// Sensitivity markers for `after`.
    #[serde(default)]
    pub after_sensitive: Option<Value>,
}

/// One entry of the plan's `resource_changes` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Fully qualified resource address.
    pub address: String,
    /// Enclosing module address, absent for root resources.
    #[serde(default)]
    pub module_address: Option<String>,
    /// `managed` or `data`.
    #[serde(default)]
    pub mode: Option<String>,
    /// Resource type, e.g. `aws_ecs_service`.
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    /// Resource name within its module.
    #[serde(default)]
    pub name: Option<String>,
    /// `count` or `for_each` key.
    #[serde(default)]
    pub index: Option<Value>,
    /// Provider source address.
    #[serde(default)]
    pub provider_name: Option<String>,
    /// Planned change.
    pub change: Change,
}

impl ResourceChange {
    /// Returns the planned action verbs.
    #[must_use]
    pub fn actions(&self) -> &[ChangeAction] {
        &self.change.actions
    }

    /// Returns the `after` snapshot when it is a JSON object.
    #[must_use]
    pub fn after_attributes(&self) -> Option<&Map<String, Value>> {
        self.change.after.as_ref().and_then(Value::as_object)
    }

    /// Returns a string attribute from the `after` snapshot.
    #[must_use]
    pub fn after_string(&self, attribute: &str) -> Option<&str> {
        self.after_attributes()?.get(attribute)?.as_str()
    }
}

// ============================================================================
// SECTION: Planned Values
// ============================================================================

/// Planned resource from the `planned_values` tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedResource {
    /// Fully qualified resource address.
    pub address: String,
    /// `managed` or `data`.
    #[serde(default)]
    pub mode: Option<String>,
    /// Resource type.
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    /// Resource name within its module.
    #[serde(default)]
    pub name: Option<String>,
    /// `count` or `for_each` key.
    #[serde(default)]
    pub index: Option<Value>,
    /// Provider source address.
    #[serde(default)]
    pub provider_name: Option<String>,
    /// Planned attribute values known at plan time.
    #[serde(default)]
    pub values: Option<Value>,
}

/// One module level of the `planned_values` tree.
#[derive(Debug, Default, Deserialize)]
struct PlannedModule {
    /// Resources declared directly in this module.
    #[serde(default)]
    resources: Vec<PlannedResource>,
    /// Nested module calls.
    #[serde(default)]
    child_modules: Vec<PlannedModule>,
}

/// Wrapper around the root module of `planned_values`.
#[derive(Debug, Default, Deserialize)]
struct PlannedValues {
    /// Root module of the configuration.
    #[serde(default)]
    root_module: PlannedModule,
}

/// Wire shape of `terraform show -json` for a plan file.
#[derive(Debug, Deserialize)]
struct RawPlan {
    /// Plan JSON format version.
    #[serde(default)]
    format_version: Option<String>,
    /// Terraform version that produced the plan.
    #[serde(default)]
    terraform_version: Option<String>,
    /// Planned values tree.
    #[serde(default)]
    planned_values: PlannedValues,
    /// Resource changes in Terraform's order.
    #[serde(default)]
    resource_changes: Vec<ResourceChange>,
    /// Output changes keyed by output name.
    #[serde(default)]
    output_changes: BTreeMap<String, Change>,
}

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Parsed plan indexed by resource address.
#[derive(Debug, Clone)]
pub struct PlanStruct {
    /// Plan JSON format version.
    pub format_version: Option<String>,
    /// Terraform version that produced the plan.
    pub terraform_version: Option<String>,
    /// Resource changes keyed by address.
    pub resource_changes: BTreeMap<String, ResourceChange>,
    /// Planned resources keyed by address, flattened across modules.
    pub planned_resources: BTreeMap<String, PlannedResource>,
    /// Root output changes keyed by output name.
    pub output_changes: BTreeMap<String, Change>,
    /// The unmodified plan document.
    pub raw: Value,
}

impl PlanStruct {
    /// Parses `terraform show -json` output.
    ///
    /// # Errors
    ///
    /// Returns [`PlanParseError::Json`] when the input is not a plan document.
    pub fn parse(json: &str) -> Result<Self, PlanParseError> {
        let raw: Value = serde_json::from_str(json)?;
        Self::from_value(raw)
    }

    /// Builds the indexed plan from an already decoded document.
    ///
    /// # Errors
    ///
    /// Returns [`PlanParseError::Json`] when the document does not match the plan shape.
    pub fn from_value(raw: Value) -> Result<Self, PlanParseError> {
        let decoded = RawPlan::deserialize(&raw)?;
        let resource_changes = decoded
            .resource_changes
            .into_iter()
            .map(|change| (change.address.clone(), change))
            .collect();
        let mut planned_resources = BTreeMap::new();
        collect_planned(decoded.planned_values.root_module, &mut planned_resources);
        Ok(Self {
            format_version: decoded.format_version,
            terraform_version: decoded.terraform_version,
            resource_changes,
            planned_resources,
            output_changes: decoded.output_changes,
            raw,
        })
    }

    /// Returns the change record for an address.
    #[must_use]
    pub fn resource_change(&self, address: &str) -> Option<&ResourceChange> {
        self.resource_changes.get(address)
    }

    /// Returns true when the plan has a change record for the address.
    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.resource_changes.contains_key(address)
    }

    /// Iterates resource-change addresses in sorted order.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.resource_changes.keys().map(String::as_str)
    }

    /// Returns the planned resource for an address.
    #[must_use]
    pub fn planned_resource(&self, address: &str) -> Option<&PlannedResource> {
        self.planned_resources.get(address)
    }
}

/// Flattens a module tree into `out`, keyed by address.
fn collect_planned(module: PlannedModule, out: &mut BTreeMap<String, PlannedResource>) {
    for resource in module.resources {
        out.insert(resource.address.clone(), resource);
    }
    for child in module.child_modules {
        collect_planned(child, out);
    }
}
