//! Scoped plan artifact workspace.
//!
//! Each session owns a private temporary directory holding the plan
//! artifact. The directory is removed when the session is closed or
//! dropped, including on error and interrupt paths.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::error::{PlanError, Result};

use super::runner::PlanRunner;
use super::types::PlanDocument;

/// Prefix of session directories.
const DIR_PREFIX: &str = "stacklens-";

/// A private directory and the plan artifact path inside it.
#[derive(Debug)]
pub struct PlanSession {
    /// Owned temporary directory; deleted on drop.
    dir: TempDir,
    /// Artifact path inside `dir`.
    artifact: PathBuf,
}

impl PlanSession {
    /// Creates a session in the system temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(artifact_name: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir()
            .map_err(workspace_error)?;
        Ok(Self::with_dir(dir, artifact_name))
    }

    /// Creates a session under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create_in(root: &Path, artifact_name: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(root)
            .map_err(workspace_error)?;
        Ok(Self::with_dir(dir, artifact_name))
    }

    fn with_dir(dir: TempDir, artifact_name: &str) -> Self {
        let artifact = dir.path().join(artifact_name);
        debug!("Plan artifact: {}", artifact.display());
        Self { dir, artifact }
    }

    /// Path the planner writes the artifact to.
    #[must_use]
    pub fn artifact_path(&self) -> &Path {
        &self.artifact
    }

    /// Plans `workdir` into the session artifact and decodes it.
    ///
    /// # Errors
    ///
    /// Returns the first planner or decode error.
    pub async fn run<R: PlanRunner + ?Sized>(
        &self,
        runner: &R,
        workdir: &Path,
    ) -> Result<PlanDocument> {
        runner.plan(workdir, &self.artifact).await?;
        runner.show(workdir, &self.artifact).await
    }

    /// Deletes the session directory, reporting failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(workspace_error)?;
        debug!("Removed plan workspace {}", path.display());
        Ok(())
    }
}

fn workspace_error(e: std::io::Error) -> crate::error::StacklensError {
    PlanError::Workspace {
        message: e.to_string(),
    }
    .into()
}
