use crate::RamContext;
use anyhow::Result;

/// Prints every tracked file with its recorded conversion timestamp.
///
/// # Errors
/// Returns an error when the store does not exist.
pub fn execute(ctx: &RamContext) -> Result<()> {
    for (path, modified) in ctx.index().all()? {
        println!("{path}\t{modified}");
    }
    Ok(())
}
