//! Stack data model.
//!
//! All values are owned: adapters copy out of SDK buffers before handing
//! data to the aggregation layer.

use std::collections::{BTreeMap, HashMap};

/// A stack input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Value as supplied at deploy time (may be masked).
    pub actual_value: String,
    /// Value the control plane resolved through an indirection, if any.
    pub resolved_value: Option<String>,
}

/// A stack output value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Output key.
    pub name: String,
    /// Human description from the template.
    pub description: Option<String>,
    /// Output value.
    pub value: String,
    /// Export name when the output is shared with other stacks.
    pub export_name: Option<String>,
}

/// A deployed resource attributed to a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInstance {
    /// Logical id, unique within the template.
    pub logical_id: String,
    /// Resource type, e.g. `AWS::S3::Bucket`.
    pub resource_type: String,
    /// Physical id; absent while the resource is pending.
    pub physical_id: Option<String>,
}

/// Outcome of evaluating a template condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    /// The condition evaluated to a boolean.
    Resolved(bool),
    /// The condition could not be decided; the raw expression is kept.
    Expression(serde_json::Value),
}

/// The parts of a stack template stacklens reports on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDocument {
    /// Template `Description`.
    pub description: Option<String>,
    /// Template `AWSTemplateFormatVersion`.
    pub format_version: Option<String>,
    /// Template `Rules`, values kept as-is.
    pub rules: BTreeMap<String, serde_json::Value>,
    /// Template `Conditions`, evaluated where possible.
    pub conditions: BTreeMap<String, ConditionValue>,
}

/// Stack metadata returned by a describe call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackDescriptor {
    /// Stack name.
    pub name: String,
    /// Region the stack lives in.
    pub region: String,
    /// Account alias, or account id when no alias is set.
    pub account_alias: String,
    /// Parameters in control plane order.
    pub parameters: Vec<Parameter>,
    /// Outputs in control plane order.
    pub outputs: Vec<Output>,
}

/// Everything known about a stack at one (best-effort) point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackSnapshot {
    /// Stack name.
    pub name: String,
    /// Region the stack lives in.
    pub region: String,
    /// Account alias, or account id when no alias is set.
    pub account_alias: String,
    /// Parameters in control plane order.
    pub parameters: Vec<Parameter>,
    /// Outputs in control plane order.
    pub outputs: Vec<Output>,
    /// Parsed template.
    pub template: TemplateDocument,
    /// Deployed resources in control plane order.
    pub resources: Vec<ResourceInstance>,
}

impl Parameter {
    /// The value the stack actually uses: resolved when available.
    #[must_use]
    pub fn effective_value(&self) -> &str {
        self.resolved_value.as_deref().unwrap_or(&self.actual_value)
    }
}

impl StackDescriptor {
    /// Builds the parameter map consulted while parsing the template.
    #[must_use]
    pub fn parameter_overrides(&self) -> HashMap<String, String> {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.effective_value().to_string()))
            .collect()
    }

    /// Joins the descriptor with its template and resources.
    #[must_use]
    pub fn into_snapshot(
        self,
        template: TemplateDocument,
        resources: Vec<ResourceInstance>,
    ) -> StackSnapshot {
        StackSnapshot {
            name: self.name,
            region: self.region,
            account_alias: self.account_alias,
            parameters: self.parameters,
            outputs: self.outputs,
            template,
            resources,
        }
    }
}

impl std::fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(active) => write!(f, "{active}"),
            Self::Expression(expr) => write!(f, "{expr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_prefer_resolved_value() {
        let descriptor = StackDescriptor {
            name: String::from("param-stack"),
            parameters: vec![
                Parameter {
                    name: String::from("k"),
                    actual_value: String::from("v"),
                    resolved_value: None,
                },
                Parameter {
                    name: String::from("secret"),
                    actual_value: String::from("*****"),
                    resolved_value: Some(String::from("actual-secret")),
                },
            ],
            ..StackDescriptor::default()
        };

        let overrides = descriptor.parameter_overrides();
        assert_eq!(overrides.get("k").map(String::as_str), Some("v"));
        assert_eq!(overrides.get("secret").map(String::as_str), Some("actual-secret"));
    }

    #[test]
    fn test_condition_display() {
        assert_eq!(ConditionValue::Resolved(true).to_string(), "true");
        let expr = ConditionValue::Expression(serde_json::json!({"Ref": "Env"}));
        assert_eq!(expr.to_string(), r#"{"Ref":"Env"}"#);
    }
}
