//! Stack client trait definition.
//!
//! This module defines the read-only interface to a stack control plane.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;

use super::types::{ResourceInstance, StackDescriptor, TemplateDocument};

/// Trait for stack control plane backends.
///
/// Every operation is read-only and idempotent, and returns owned data.
#[async_trait]
pub trait StackClient: Send + Sync {
    /// Describes a stack: parameters, outputs, account and region.
    ///
    /// Fails with `NotFound` for unknown names.
    async fn get_stack(&self, name: &str) -> Result<StackDescriptor>;

    /// Fetches and parses the stack template.
    ///
    /// `parameters` maps parameter names to their effective values and is
    /// consulted when evaluating template conditions.
    async fn get_template(
        &self,
        name: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<TemplateDocument>;

    /// Lists every resource the control plane attributes to the stack, in
    /// control plane order, across all result pages.
    async fn get_resources(&self, name: &str) -> Result<Vec<ResourceInstance>>;

    /// Gets the backend type name.
    fn backend_type(&self) -> &'static str;
}
