use crate::RamContext;
use crate::utils::relative_to;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Registers files for tracking at timestamp 0 (stale until their first
/// successful conversion).
///
/// Paths are stored relative to the working directory. Files outside of it
/// get a warning and are skipped without aborting the rest of the batch.
///
/// # Errors
/// Returns an error when a file argument cannot be opened; the underlying
/// OS error code becomes the process exit code.
pub fn execute(ctx: &RamContext, files: &[String]) -> Result<()> {
    let mut rows = Vec::new();

    for name in files {
        let path = Path::new(name);
        File::open(path).with_context(|| format!("cannot open {name}"))?;

        match relative_to(path, &ctx.working_dir)? {
            Some(relative) => rows.push((relative.to_string_lossy().into_owned(), 0)),
            None => {
                super::print_warning(&format!("{name} is outside of ram managed folder"));
            }
        }
    }

    ctx.index().add(&rows)?;
    Ok(())
}
