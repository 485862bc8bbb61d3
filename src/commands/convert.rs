use crate::RamContext;
use crate::convert::runner::ImageMagickRunner;
use anyhow::Result;

/// Runs one conversion pass against the external ImageMagick transformer.
///
/// # Errors
/// Returns an error when the store is missing or the ramfile is invalid;
/// per-master failures are reported and leave those masters stale.
pub fn execute(ctx: &RamContext, verbose: bool) -> Result<()> {
    let runner = ImageMagickRunner;
    crate::convert::execute(ctx, &runner, verbose)?;
    Ok(())
}
