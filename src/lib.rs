// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Stacklens
//!
//! Read-only views over deployed infrastructure stacks and Terraform plans.
//!
//! ## Overview
//!
//! Stacklens renders what is actually running as a handful of titled tables:
//!
//! - `describe stack` joins a `CloudFormation` stack's parameters, template
//!   rules and conditions, deployed resources and outputs
//! - `terraform` plans a working directory into a private temporary
//!   artifact and lists every resource the plan would touch
//! - `demo tables` shows the configured table style with canned data
//!
//! ## Architecture
//!
//! Each command is a short pipeline:
//!
//! 1. **Read**: a [`stack::StackClient`] or [`terraform::PlanRunner`] fetches
//!    owned data, retrying transient control plane failures
//! 2. **Aggregate**: [`views`] turns that data into [`views::View`]s
//! 3. **Render**: a [`render::ViewRenderer`] writes the views as tables or JSON
//!
//! Nothing is written until every read has succeeded.
//!
//! ## Modules
//!
//! - [`config`]: Settings, layered loading and the plan artifact name template
//! - [`stack`]: Stack model, control plane client and template parser
//! - [`terraform`]: Plan model, planner runner and scoped plan session
//! - [`views`]: View model and aggregation
//! - [`render`]: Table and JSON renderers
//! - [`pipeline`]: The command flows
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! # ~/.config/stacklens/config.yaml
//! output: table
//! table:
//!   style: markdown
//!   max-column-width: 60
//! changeset:
//!   name-format: "plan-{timestamp}-{uuid}.tfplan"
//! terraform:
//!   binary: tofu
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod retry;
pub mod stack;
pub mod terraform;
pub mod views;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands};
pub use config::{ConfigLoader, NameFormat, Settings};
pub use error::{Result, StacklensError};
pub use render::{JsonRenderer, TableOptions, TableRenderer, ViewRenderer};
pub use retry::RetryPolicy;
pub use stack::{CloudFormationStackClient, StackClient, StackInspector, StackSnapshot};
pub use terraform::{PlanDocument, PlanRunner, PlanSession, TerraformRunner};
pub use views::{build_plan_view, build_stack_views, Cell, View};
