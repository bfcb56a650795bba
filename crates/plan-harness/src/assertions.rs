// crates/plan-harness/src/assertions.rs
// ============================================================================
// Module: Plan Assertions
// Description: Contract checks over a parsed Terraform plan.
// Purpose: Fail with messages that name the expected value.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Assertions return `Result` so a caller can stop one scenario at its first
//! failure while sibling scenarios keep running. Nothing here retries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::plan::ChangeAction;
use crate::plan::PlanStruct;
use crate::plan::ResourceChange;
use crate::policy::PolicyDocument;
use crate::policy::PolicyError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Plan assertion failures.
#[derive(Debug, Error)]
pub enum AssertionError {
    /// An expected address is absent from the plan.
    #[error("plan has no resource change for {address}")]
    MissingResource {
        /// Expected address.
        address: String,
    },
    /// The planned actions differ from the expected list.
    #[error("{address}: expected actions {expected:?}, got {actual:?}")]
    ActionMismatch {
        /// Resource address.
        address: String,
        /// Expected verbs.
        expected: Vec<String>,
        /// Planned verbs.
        actual: Vec<String>,
    },
    /// The `after` snapshot is missing or not an object.
    #[error("{address}: change.after is not an object")]
    AfterNotObject {
        /// Resource address.
        address: String,
    },
    /// The attribute is missing or not a string.
    #[error("{address}: attribute {attribute} is not a known string")]
    AttributeNotString {
        /// Resource address.
        address: String,
        /// Attribute key.
        attribute: String,
    },
    /// The embedded policy failed to decode.
    #[error("{address}: {source}")]
    Policy {
        /// Resource address.
        address: String,
        /// Decoding error.
        #[source]
        source: PolicyError,
    },
    /// The policy has no statements.
    #[error("{address}: policy must contain statements")]
    EmptyPolicy {
        /// Resource address.
        address: String,
    },
    /// Expected actions are not granted.
    #[error("{address}: policy actions {actual:?} are missing {missing:?}")]
    MissingActions {
        /// Resource address.
        address: String,
        /// Expected actions that were not found.
        missing: Vec<String>,
        /// Flattened actions of the policy.
        actual: Vec<String>,
    },
    /// No policy resource contains the hint.
    #[error("{address}: expected policy resource to contain {hint}, got {resources:?}")]
    NoResourceMatch {
        /// Resource address.
        address: String,
        /// Expected substring.
        hint: String,
        /// Flattened resources of the policy.
        resources: Vec<String>,
    },
    /// The attribute text lacks the expected snippet.
    #[error("{address}: attribute {attribute} does not contain {snippet}")]
    SnippetMissing {
        /// Resource address.
        address: String,
        /// Attribute key.
        attribute: String,
        /// Expected substring.
        snippet: String,
    },
}

// ============================================================================
// SECTION: Resource Presence
// ============================================================================

/// Returns the change for an address or fails naming it.
///
/// # Errors
///
/// Returns [`AssertionError::MissingResource`] when the address is absent.
pub fn require_resource<'a>(
    plan: &'a PlanStruct,
    address: &str,
) -> Result<&'a ResourceChange, AssertionError> {
    plan.resource_change(address).ok_or_else(|| AssertionError::MissingResource {
        address: address.to_string(),
    })
}

/// Requires every address to be present, failing on the first missing one.
///
/// # Errors
///
/// Returns [`AssertionError::MissingResource`] for the first absent address.
pub fn require_resources(plan: &PlanStruct, addresses: &[&str]) -> Result<(), AssertionError> {
    for address in addresses {
        require_resource(plan, address)?;
    }
    Ok(())
}

/// Requires the planned actions to equal `expected` exactly, in order.
///
/// # Errors
///
/// Returns [`AssertionError::MissingResource`] or [`AssertionError::ActionMismatch`].
pub fn require_actions(
    plan: &PlanStruct,
    address: &str,
    expected: &[ChangeAction],
) -> Result<(), AssertionError> {
    let change = require_resource(plan, address)?;
    if change.actions() == expected {
        return Ok(());
    }
    Err(AssertionError::ActionMismatch {
        address: address.to_string(),
        expected: expected.iter().map(ToString::to_string).collect(),
        actual: change.actions().iter().map(ToString::to_string).collect(),
    })
}

// ============================================================================
// SECTION: Attributes
// ============================================================================

/// Reads a string attribute from a change's `after` snapshot.
///
/// # Errors
///
/// Returns [`AssertionError::AfterNotObject`] or [`AssertionError::AttributeNotString`].
pub fn after_string_attribute<'a>(
    change: &'a ResourceChange,
    attribute: &str,
) -> Result<&'a str, AssertionError> {
    let after = change.after_attributes().ok_or_else(|| AssertionError::AfterNotObject {
        address: change.address.clone(),
    })?;
    after.get(attribute).and_then(serde_json::Value::as_str).ok_or_else(|| {
        AssertionError::AttributeNotString {
            address: change.address.clone(),
            attribute: attribute.to_string(),
        }
    })
}

/// Requires a string attribute of `after` to contain `snippet`.
///
/// # Errors
///
/// Returns an [`AssertionError`] when the resource or attribute is missing or
/// the snippet is absent.
pub fn require_attribute_contains(
    plan: &PlanStruct,
    address: &str,
    attribute: &str,
    snippet: &str,
) -> Result<(), AssertionError> {
    let change = require_resource(plan, address)?;
    let text = after_string_attribute(change, attribute)?;
    if text.contains(snippet) {
        return Ok(());
    }
    Err(AssertionError::SnippetMissing {
        address: address.to_string(),
        attribute: attribute.to_string(),
        snippet: snippet.to_string(),
    })
}

// ============================================================================
// SECTION: Policies
// ============================================================================

/// Flattened view of a policy found in a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyGrants {
    /// Actions across all statements, in order.
    pub actions: Vec<String>,
    /// Resources across all statements, in order.
    pub resources: Vec<String>,
}

/// Decodes the `policy` attribute of a resource and flattens its statements.
///
/// # Errors
///
/// Returns an [`AssertionError`] when the attribute is missing, fails to decode,
/// or holds no statements.
pub fn policy_grants(plan: &PlanStruct, address: &str) -> Result<PolicyGrants, AssertionError> {
    let change = require_resource(plan, address)?;
    let text = after_string_attribute(change, "policy")?;
    let document = PolicyDocument::parse(text).map_err(|source| AssertionError::Policy {
        address: address.to_string(),
        source,
    })?;
    if document.statements.is_empty() {
        return Err(AssertionError::EmptyPolicy {
            address: address.to_string(),
        });
    }
    Ok(PolicyGrants {
        actions: document.actions().into_iter().map(str::to_string).collect(),
        resources: document.resources().into_iter().map(str::to_string).collect(),
    })
}

/// Requires a policy to grant every expected action and name a resource
/// containing `resource_hint`.
///
/// # Errors
///
/// Returns an [`AssertionError`] describing the first unmet expectation.
pub fn require_policy_grants(
    plan: &PlanStruct,
    address: &str,
    expected_actions: &[&str],
    resource_hint: &str,
) -> Result<PolicyGrants, AssertionError> {
    let grants = policy_grants(plan, address)?;
    let missing: Vec<String> = expected_actions
        .iter()
        .filter(|expected| !grants.actions.iter().any(|action| action.as_str() == **expected))
        .map(|expected| (*expected).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AssertionError::MissingActions {
            address: address.to_string(),
            missing,
            actual: grants.actions,
        });
    }
    if !grants.resources.iter().any(|resource| resource.contains(resource_hint)) {
        return Err(AssertionError::NoResourceMatch {
            address: address.to_string(),
            hint: resource_hint.to_string(),
            resources: grants.resources,
        });
    }
    Ok(grants)
}
