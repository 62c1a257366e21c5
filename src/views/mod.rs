//! Relational views over stack and plan data.

mod aggregate;
mod view;

pub use aggregate::{build_plan_view, build_stack_views, titles};
pub use view::{Cell, CellStyle, View};
