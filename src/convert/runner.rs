use crate::subst::ResolvedSlave;
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// The seam between the orchestrator and the external image transformer.
///
/// One call produces one slave from one master. A returned error means the
/// slave failed; the adapter never retries — a failed master stays stale and
/// is retried by the next `convert` run.
pub trait SlaveRunner {
    /// Produces `slave` from the first frame of `master`.
    ///
    /// # Errors
    /// Returns an error when the transformation could not be completed,
    /// including a non-zero exit from the external process.
    fn run(&self, master: &Path, slave: &ResolvedSlave) -> Result<()>;
}

/// Runs ImageMagick's `convert` as the external transformer.
#[derive(Debug, Default)]
pub struct ImageMagickRunner;

impl SlaveRunner for ImageMagickRunner {
    fn run(&self, master: &Path, slave: &ResolvedSlave) -> Result<()> {
        debug!(master = %master.display(), slave = %slave, "running convert");

        // [0] selects the first frame of multi-frame masters (gif, ico)
        let status = Command::new("convert")
            .arg("-resize")
            .arg(format!("{}x{}", slave.width, slave.height))
            .arg(format!("{}[0]", master.display()))
            .arg(&slave.path)
            .stdin(Stdio::null())
            .status()
            .context("Failed to run convert. Is ImageMagick installed?")?;

        if !status.success() {
            bail!("convert exited with {status}");
        }
        Ok(())
    }
}
