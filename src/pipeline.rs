//! Top-level command flows.
//!
//! Each flow gathers everything it needs before the first view is handed to
//! the renderer, so a failure leaves the output untouched.

use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::render::ViewRenderer;
use crate::stack::{StackClient, StackInspector};
use crate::terraform::{PlanRunner, PlanSession};
use crate::views::{build_plan_view, build_stack_views};

/// Reads a stack and renders its views.
///
/// # Errors
///
/// Returns the first control plane, template or rendering error.
pub async fn describe_stack<C, R>(
    inspector: &StackInspector<C>,
    name: &str,
    mut renderer: R,
) -> Result<R::Output>
where
    C: StackClient,
    R: ViewRenderer,
{
    let snapshot = inspector.snapshot(name).await?;
    let views = build_stack_views(&snapshot);
    info!("Rendering {} view(s) for stack {name}", views.len());

    for view in views {
        renderer.append(view);
    }
    renderer.flush()
}

/// Plans `workdir` inside `session` and renders the change summary.
///
/// # Errors
///
/// Returns the first planner, decode or rendering error.
pub async fn summarize_plan<P, R>(
    runner: &P,
    session: &PlanSession,
    workdir: &Path,
    verbose: bool,
    mut renderer: R,
) -> Result<R::Output>
where
    P: PlanRunner + ?Sized,
    R: ViewRenderer,
{
    let plan = session.run(runner, workdir).await?;
    let view = build_plan_view(&plan, verbose);
    info!(
        "{} of {} resource change(s) need attention",
        view.len(),
        plan.resource_changes.len()
    );

    renderer.append(view);
    renderer.flush()
}
