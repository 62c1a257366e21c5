//! Planner process runner.
//!
//! The planner is an external binary honoring `plan --out=<PATH>` and
//! `show --json <PATH>`. Its standard error is captured and surfaced
//! verbatim when it exits non-zero.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, trace};

use crate::error::{PlanError, Result};

use super::types::PlanDocument;

/// Trait for planner backends.
#[async_trait]
pub trait PlanRunner: Send + Sync {
    /// Plans the configuration in `workdir`, writing the binary artifact
    /// to `out`.
    async fn plan(&self, workdir: &Path, out: &Path) -> Result<()>;

    /// Renders the artifact at `plan` as a decoded plan document.
    ///
    /// The planner runs in `workdir` so it can resolve provider schemas.
    async fn show(&self, workdir: &Path, plan: &Path) -> Result<PlanDocument>;
}

/// Runs a Terraform-compatible binary.
#[derive(Debug, Clone)]
pub struct TerraformRunner {
    /// Binary path or name looked up on `PATH`.
    binary: String,
}

impl TerraformRunner {
    /// Creates a runner for the given binary.
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Runs one planner verb and returns its standard output.
    async fn run(&self, verb: &str, workdir: &Path, args: Vec<OsString>) -> Result<Vec<u8>> {
        info!("Running {} {verb} in {}", self.binary, workdir.display());
        trace!("Planner arguments: {args:?}");

        let output = Command::new(&self.binary)
            .args(&args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| PlanError::Launch {
                binary: self.binary.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(PlanError::PlannerFailed {
                verb: verb.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }

        if !output.stderr.is_empty() {
            debug!("{verb} stderr: {}", String::from_utf8_lossy(&output.stderr));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl PlanRunner for TerraformRunner {
    async fn plan(&self, workdir: &Path, out: &Path) -> Result<()> {
        let mut out_arg = OsString::from("--out=");
        out_arg.push(out);

        let stdout = self
            .run("plan", workdir, vec![OsString::from("plan"), out_arg])
            .await?;
        debug!("plan stdout: {} byte(s)", stdout.len());
        Ok(())
    }

    async fn show(&self, workdir: &Path, plan: &Path) -> Result<PlanDocument> {
        let stdout = self
            .run(
                "show",
                workdir,
                vec![
                    OsString::from("show"),
                    OsString::from("--json"),
                    plan.as_os_str().to_os_string(),
                ],
            )
            .await?;

        let document =
            PlanDocument::from_json(&stdout).map_err(|e| PlanError::decode(e.to_string()))?;
        debug!("Decoded {} resource change(s)", document.resource_changes.len());
        Ok(document)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::StacklensError;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// A planner that records its artifact path and prints a fixed plan.
    const FAKE_PLANNER: &str = r#"#!/bin/sh
case "$1" in
  plan)
    out="${2#--out=}"
    printf 'binary plan' > "$out"
    echo "Plan: 1 to add, 0 to change, 0 to destroy."
    ;;
  show)
    [ "$2" = "--json" ] || exit 2
    [ -f "$3" ] || { echo "no such plan: $3" >&2; exit 1; }
    printf '%s' '{"resource_changes":[{"address":"aws_s3_bucket.a","mode":"managed","type":"aws_s3_bucket","name":"a","provider_name":"aws","change":{"actions":["create"]}}]}'
    ;;
esac
"#;

    /// A planner whose `plan` always fails.
    const FAILING_PLANNER: &str = r#"#!/bin/sh
echo "Error: No configuration files" >&2
exit 1
"#;

    /// A planner whose `show` prints something that is not a plan.
    const GARBLED_PLANNER: &str = r#"#!/bin/sh
echo "not json"
"#;

    fn install(dir: &Path, name: &str, script: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, script).expect("write fake planner");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("make fake planner executable");
        path.display().to_string()
    }

    // All scripts are installed before any of them is spawned, so no child
    // inherits a write handle to an executable.
    #[tokio::test]
    async fn test_fake_planner_contract() {
        let bin = TempDir::new().expect("temp dir");
        let work = TempDir::new().expect("temp dir");
        let good = install(bin.path(), "good", FAKE_PLANNER);
        let failing = install(bin.path(), "failing", FAILING_PLANNER);
        let garbled = install(bin.path(), "garbled", GARBLED_PLANNER);
        let artifact = work.path().join("test.tfplan");

        let runner = TerraformRunner::new(good);
        runner.plan(work.path(), &artifact).await.expect("plan succeeds");
        assert!(artifact.exists());
        let plan = runner.show(work.path(), &artifact).await.expect("show succeeds");
        assert_eq!(plan.resource_changes.len(), 1);
        assert_eq!(plan.resource_changes[0].name_in_plan, "aws_s3_bucket.a");

        let result = TerraformRunner::new(failing).plan(work.path(), &artifact).await;
        match result {
            Err(StacklensError::Plan(PlanError::PlannerFailed { verb, stderr, .. })) => {
                assert_eq!(verb, "plan");
                assert_eq!(stderr, "Error: No configuration files\n");
            }
            other => panic!("expected PlannerFailed, got {other:?}"),
        }

        let result = TerraformRunner::new(garbled).show(work.path(), &artifact).await;
        assert!(matches!(result, Err(StacklensError::Plan(PlanError::Decode { .. }))));
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let work = TempDir::new().expect("temp dir");
        let runner = TerraformRunner::new("/nonexistent/stacklens-planner");
        let result = runner.plan(work.path(), &work.path().join("x.tfplan")).await;
        assert!(matches!(result, Err(StacklensError::Plan(PlanError::Launch { .. }))));
    }
}
