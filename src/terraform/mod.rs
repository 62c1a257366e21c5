//! Terraform plan integration.
//!
//! This module drives an external planner to produce a machine-readable
//! plan inside a scoped temporary workspace.

mod runner;
mod session;
mod types;

pub use runner::{PlanRunner, TerraformRunner};
pub use session::PlanSession;
pub use types::{Action, ChangeEntry, PlanDocument};

#[cfg(test)]
pub(crate) use session::tests::MockRunner;
