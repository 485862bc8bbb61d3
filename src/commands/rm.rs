use crate::RamContext;
use anyhow::Result;

/// Deregisters files from tracking. Untracked paths are silently ignored,
/// matching the store's delete semantics.
///
/// # Errors
/// Returns an error when the store does not exist.
pub fn execute(ctx: &RamContext, files: &[String]) -> Result<()> {
    let index = ctx.index();
    for name in files {
        index.remove(name)?;
    }
    Ok(())
}
