use crate::RamContext;
use anyhow::Result;

/// Creates the tracked-file store for the working directory.
///
/// # Errors
/// Returns [`crate::errors::RamError::AlreadyInitialized`] (exit code 3 at
/// the CLI boundary) when the store already exists.
pub fn execute(ctx: &RamContext) -> Result<()> {
    ctx.index().init()?;
    super::print_success(&format!(
        "created ram index: {}",
        ctx.index_path.display()
    ));
    Ok(())
}
