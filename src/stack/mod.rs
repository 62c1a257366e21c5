//! Deployed stack inspection.
//!
//! This module provides the stack data model, the control plane client
//! trait with its `CloudFormation` implementation, the template parser, and
//! the inspector that assembles a snapshot.

mod client;
mod cloudformation;
mod inspector;
mod template;
mod types;

pub use client::StackClient;
pub use cloudformation::CloudFormationStackClient;
pub use inspector::StackInspector;
pub use template::parse_template;
pub use types::{
    ConditionValue, Output, Parameter, ResourceInstance, StackDescriptor, StackSnapshot,
    TemplateDocument,
};

#[cfg(test)]
pub(crate) use inspector::tests::MockClient;
