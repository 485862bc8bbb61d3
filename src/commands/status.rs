use crate::RamContext;
use crate::utils::mtime_secs;
use anyhow::Result;
use colored::Colorize;

/// Classifies tracked files against their recorded timestamps and prints a
/// git-style status report.
///
/// Changed means the on-disk modification time differs from the recorded
/// one; missing means the file is gone from disk. Up-to-date files are only
/// listed with `show_all`.
///
/// # Errors
/// Returns an error when the store does not exist.
pub fn execute(ctx: &RamContext, show_all: bool) -> Result<()> {
    let mut current = Vec::new();
    let mut changed = Vec::new();
    let mut missing = Vec::new();

    for (path, recorded) in ctx.index().all()? {
        let on_disk = ctx.working_dir.join(&path);
        if !on_disk.exists() {
            missing.push(path);
        } else if mtime_secs(&on_disk)? == recorded {
            current.push(path);
        } else {
            changed.push(path);
        }
    }

    if current.is_empty() && changed.is_empty() && missing.is_empty() {
        println!("No files have been added.");
        println!("Maybe you need to add files with \"ram add <file> ...\"?");
        return Ok(());
    }

    if changed.is_empty() && missing.is_empty() && !show_all {
        println!("All files up to date");
        return Ok(());
    }

    if show_all && !current.is_empty() {
        println!("# Up to date files:");
        for path in &current {
            println!("#       {}", path.green());
        }
    }
    if !changed.is_empty() {
        println!("# Changed files:");
        println!("#    (use \"ram convert\" to update files)");
        for path in &changed {
            println!("#       {}", path.yellow());
        }
    }
    if !missing.is_empty() {
        println!("# Deleted files:");
        println!("#    (use \"ram rm <file> ...\" to remove files)");
        for path in &missing {
            println!("#       {}", path.red());
        }
    }

    Ok(())
}
