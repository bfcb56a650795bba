// crates/plan-harness/src/policy.rs
// ============================================================================
// Module: IAM Policy Documents
// Description: Decoding of IAM policy JSON embedded in plan attributes.
// Purpose: Normalize string-or-list Action/Resource fields for assertions.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! IAM allows `Action` and `Resource` to be either one string or a list of
//! strings. [`OneOrMany`] decodes both encodings and flattens them to one
//! ordered sequence. Any other JSON type fails decoding.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use thiserror::Error;

/// Policy decoding errors.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy text is not valid JSON or a field has the wrong type.
    #[error("policy json error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A field holding one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// Single string encoding.
    Single(String),
    /// List encoding.
    Many(Vec<String>),
}

impl OneOrMany {
    /// Iterates the values in order regardless of encoding.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        };
        slice.iter().map(String::as_str)
    }
}

/// One policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    /// Optional statement identifier.
    #[serde(rename = "Sid", default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// `Allow` or `Deny`.
    #[serde(rename = "Effect", default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    /// Granted actions.
    #[serde(
        rename = "Action",
        default,
        deserialize_with = "present_one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<OneOrMany>,
    /// Target resources.
    #[serde(
        rename = "Resource",
        default,
        deserialize_with = "present_one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource: Option<OneOrMany>,
}

/// IAM policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Policy language version.
    #[serde(rename = "Version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Statements in document order.
    #[serde(rename = "Statement", default)]
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Parses a policy JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Parse`] for invalid JSON or when an `Action` or
    /// `Resource` field is neither a string nor a list of strings.
    pub fn parse(json: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// All actions across statements, in statement order.
    #[must_use]
    pub fn actions(&self) -> Vec<&str> {
        flatten(self.statements.iter().map(|statement| statement.action.as_ref()))
    }

    /// All resources across statements, in statement order.
    #[must_use]
    pub fn resources(&self) -> Vec<&str> {
        flatten(self.statements.iter().map(|statement| statement.resource.as_ref()))
    }
}

/// Decodes a present field; only an absent field maps to `None`, so `null` fails.
fn present_one_or_many<'de, D>(deserializer: D) -> Result<Option<OneOrMany>, D::Error>
where
    D: Deserializer<'de>,
{
    OneOrMany::deserialize(deserializer).map(Some)
}

/// Concatenates the values of every present field.
fn flatten<'a>(fields: impl Iterator<Item = Option<&'a OneOrMany>>) -> Vec<&'a str> {
    fields.flatten().flat_map(OneOrMany::iter).collect()
}
