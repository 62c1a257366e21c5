//! Canned views for `demo tables`.

use crate::stack::{Parameter, ResourceInstance, StackSnapshot};
use crate::terraform::{Action, ChangeEntry, PlanDocument};
use crate::views::{build_plan_view, build_stack_views, titles, View};

/// A small stack parameter table and a plan summary.
#[must_use]
pub fn demo_views(verbose: bool) -> Vec<View> {
    let mut views: Vec<View> = build_stack_views(&demo_snapshot())
        .into_iter()
        .filter(|view| view.title == titles::PARAMETERS || view.title == titles::RESOURCES)
        .collect();
    views.push(build_plan_view(&demo_plan(), verbose));
    views
}

fn demo_snapshot() -> StackSnapshot {
    let parameter = |name: &str, actual: &str, resolved: Option<&str>| Parameter {
        name: name.to_string(),
        actual_value: actual.to_string(),
        resolved_value: resolved.map(str::to_string),
    };
    let resource = |id: &str, kind: &str, physical: &str| ResourceInstance {
        logical_id: id.to_string(),
        resource_type: kind.to_string(),
        physical_id: Some(physical.to_string()),
    };

    StackSnapshot {
        name: String::from("demo-stack"),
        region: String::from("eu-west-1"),
        account_alias: String::from("demo"),
        parameters: vec![
            parameter("Environment", "staging", None),
            parameter("InstanceType", "t3.small", None),
            parameter(
                "DatabasePassword",
                "****",
                Some("/demo/staging/db-password"),
            ),
        ],
        resources: vec![
            resource("WebServer", "AWS::EC2::Instance", "i-0a1b2c3d4e5f67890"),
            resource("AssetsBucket", "AWS::S3::Bucket", "demo-stack-assets-1x2y3z"),
            resource("AppRole", "AWS::IAM::Role", "demo-stack-AppRole-ABC123"),
        ],
        ..StackSnapshot::default()
    }
}

fn demo_plan() -> PlanDocument {
    let change = |address: &str, kind: &str, name: &str, actions: &[Action]| ChangeEntry {
        resource_type: kind.to_string(),
        name_in_plan: address.to_string(),
        display_name: name.to_string(),
        provider_name: String::from("registry.terraform.io/hashicorp/aws"),
        mode: String::from("managed"),
        actions: actions.to_vec(),
    };

    PlanDocument {
        resource_changes: vec![
            change("aws_s3_bucket.assets", "aws_s3_bucket", "assets", &[Action::Create]),
            change("aws_instance.web", "aws_instance", "web", &[Action::Update]),
            change(
                "aws_iam_role.app",
                "aws_iam_role",
                "app",
                &[Action::Delete, Action::Create],
            ),
            change("aws_vpc.main", "aws_vpc", "main", &[Action::NoOp]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_views() {
        let views = demo_views(false);

        let titles: Vec<&str> = views.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec![titles::PARAMETERS, titles::RESOURCES, titles::PLAN]);
        assert_eq!(views[2].len(), 3);
        assert!(views[2].rows.iter().any(|row| row[0].is_bold()));
    }

    #[test]
    fn test_verbose_demo_has_provider_columns() {
        let views = demo_views(true);
        assert_eq!(views[2].columns.len(), 6);
    }
}
