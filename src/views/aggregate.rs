//! Joins stack and plan data into views.
//!
//! Both builders are pure: they read owned snapshots and never touch the
//! network, the filesystem or the terminal.

use serde_json::Value;

use crate::stack::StackSnapshot;
use crate::terraform::{ChangeEntry, PlanDocument};

use super::view::{Cell, View};

/// View titles, in emission order.
pub mod titles {
    /// Stack summary.
    pub const SUMMARY: &str = "Stack";
    /// Stack parameters.
    pub const PARAMETERS: &str = "Parameters";
    /// Template rules.
    pub const RULES: &str = "Rules";
    /// Template conditions.
    pub const CONDITIONS: &str = "Conditions";
    /// Deployed resources.
    pub const RESOURCES: &str = "Resources";
    /// Stack outputs.
    pub const OUTPUTS: &str = "Outputs";
    /// Terraform change summary.
    pub const PLAN: &str = "Terraform plan";
}

const NAME: &str = "Name";
const TYPE: &str = "Type";

/// Builds the stack views, in display order.
///
/// Summary, Parameters and Resources are always present; Rules, Conditions
/// and Outputs only when the stack has any.
#[must_use]
pub fn build_stack_views(snapshot: &StackSnapshot) -> Vec<View> {
    let mut views = vec![summary_view(snapshot), parameters_view(snapshot)];

    if !snapshot.template.rules.is_empty() {
        let mut rules = View::new(titles::RULES, &[NAME, "Value"]).separated();
        for (name, value) in &snapshot.template.rules {
            rules.push_row([Cell::new(name.as_str()), Cell::new(value_text(value))]);
        }
        views.push(rules);
    }

    if !snapshot.template.conditions.is_empty() {
        let mut conditions = View::new(titles::CONDITIONS, &[NAME, "Active"])
            .sorted_by(NAME)
            .separated();
        for (name, value) in &snapshot.template.conditions {
            conditions.push_row([Cell::new(name.as_str()), Cell::new(value.to_string())]);
        }
        views.push(conditions);
    }

    let mut resources = View::new(titles::RESOURCES, &[NAME, TYPE, "PhysicalId"])
        .sorted_by(TYPE)
        .separated();
    for resource in &snapshot.resources {
        resources.push_row([
            Cell::new(resource.logical_id.as_str()),
            Cell::new(resource.resource_type.as_str()),
            Cell::optional(resource.physical_id.as_deref()),
        ]);
    }
    views.push(resources);

    if !snapshot.outputs.is_empty() {
        let mut outputs = View::new(titles::OUTPUTS, &[NAME, "Description", "Value", "Export"])
            .sorted_by(NAME)
            .separated();
        for output in &snapshot.outputs {
            outputs.push_row([
                Cell::new(output.name.as_str()),
                Cell::optional(output.description.as_deref()),
                Cell::new(output.value.as_str()),
                Cell::optional(output.export_name.as_deref()),
            ]);
        }
        views.push(outputs);
    }

    views
}

fn summary_view(snapshot: &StackSnapshot) -> View {
    let template = &snapshot.template;
    let mut summary = View::new(titles::SUMMARY, &[NAME, "Value"]).separated();
    let rows = [
        ("StackName", Some(snapshot.name.as_str())),
        ("Account", Some(snapshot.account_alias.as_str())),
        ("Region", Some(snapshot.region.as_str())),
        ("Description", template.description.as_deref()),
        ("AWSTemplateFormatVersion", template.format_version.as_deref()),
    ];
    for (name, value) in rows {
        summary.push_row([Cell::new(name), Cell::optional(value)]);
    }
    summary
}

fn parameters_view(snapshot: &StackSnapshot) -> View {
    let mut parameters =
        View::new(titles::PARAMETERS, &[NAME, "Actual value", "Resolved value"]).separated();
    for parameter in &snapshot.parameters {
        parameters.push_row([
            Cell::new(parameter.name.as_str()),
            Cell::new(parameter.actual_value.as_str()),
            Cell::optional(parameter.resolved_value.as_deref()),
        ]);
    }
    parameters
}

/// Strings print bare, anything else as compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds the changed-resource summary for a plan.
///
/// Entries that plan only `no-op` are left out. With `verbose`, provider
/// and mode columns are appended.
#[must_use]
pub fn build_plan_view(plan: &PlanDocument, verbose: bool) -> View {
    let mut columns = vec!["Action", "Name in Terraform", TYPE, "Resource Name"];
    if verbose {
        columns.extend(["ProviderName", "Mode"]);
    }

    let mut view = View::new(titles::PLAN, &columns).sorted_by(TYPE).separated();
    for entry in plan.interesting() {
        let mut row = vec![
            action_cell(entry),
            Cell::new(entry.name_in_plan.as_str()),
            Cell::new(entry.resource_type.as_str()),
            Cell::new(entry.display_name.as_str()),
        ];
        if verbose {
            row.push(Cell::new(entry.provider_name.as_str()));
            row.push(Cell::new(entry.mode.as_str()));
        }
        view.push_row(row);
    }
    view
}

fn action_cell(entry: &ChangeEntry) -> Cell {
    let text = entry
        .actions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let cell = Cell::new(text);
    if entry.deletes() { cell.bold() } else { cell }
}
