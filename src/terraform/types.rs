//! Plan document types.
//!
//! These map the subset of `terraform show -json` output that the plan
//! summary reads.

use serde::{Deserialize, Deserializer};

/// A decoded plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlanDocument {
    /// Per-resource changes, in planner order.
    #[serde(default)]
    pub resource_changes: Vec<ChangeEntry>,
}

/// The planned change for one resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeEntry {
    /// Resource type, e.g. `aws_s3_bucket`.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Full address in the plan, e.g. `module.app.aws_s3_bucket.logs[0]`.
    #[serde(rename = "address")]
    pub name_in_plan: String,
    /// Resource name from the configuration block.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Provider the resource belongs to.
    #[serde(default)]
    pub provider_name: String,
    /// `managed` or `data`.
    #[serde(default)]
    pub mode: String,
    /// Actions the planner intends to take, in order.
    #[serde(rename = "change", deserialize_with = "actions_of_change")]
    pub actions: Vec<Action>,
}

/// A planned action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Create the resource.
    Create,
    /// Update in place.
    Update,
    /// Delete the resource.
    Delete,
    /// Read a data source.
    Read,
    /// Nothing to do.
    NoOp,
    /// Replace the resource.
    Replace,
}

impl ChangeEntry {
    /// True when the entry plans anything besides `no-op`.
    #[must_use]
    pub fn is_interesting(&self) -> bool {
        self.actions.iter().any(|action| *action != Action::NoOp)
    }

    /// True when any planned action destroys the resource.
    #[must_use]
    pub fn deletes(&self) -> bool {
        self.actions.contains(&Action::Delete)
    }
}

impl PlanDocument {
    /// Decodes a plan from `show --json` output.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the bytes are not a plan document.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Changes that plan anything besides `no-op`.
    pub fn interesting(&self) -> impl Iterator<Item = &ChangeEntry> {
        self.resource_changes.iter().filter(|c| c.is_interesting())
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Read => "read",
            Self::NoOp => "no-op",
            Self::Replace => "replace",
        };
        f.write_str(tag)
    }
}

fn actions_of_change<'de, D>(deserializer: D) -> Result<Vec<Action>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Change {
        #[serde(default)]
        actions: Vec<Action>,
    }

    Change::deserialize(deserializer).map(|change| change.actions)
}
