/// External transformer invocation.
pub mod runner;

use crate::commands::{print_error, print_warning};
use crate::errors::RamError;
use crate::ramfile::{Conversion, Ramfile};
use crate::subst::{self, ResolvedSlave};
use crate::utils::mtime_secs;
use crate::RamContext;
use anyhow::Result;
use runner::SlaveRunner;
use tracing::debug;

/// Outcome of one `convert` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertReport {
    /// Stale masters found at the start of the run.
    pub stale: usize,
    /// Masters whose every slave was produced, and whose timestamp was
    /// committed.
    pub converted: usize,
}

/// Runs one conversion pass: find stale masters, convert each one, commit
/// timestamps for the ones that fully succeed.
///
/// Configuration and storage errors abort the run; substitution and
/// execution failures only fail the master at hand, which stays stale for
/// the next run.
///
/// # Errors
/// Returns an error when the store is missing, a store operation fails, or
/// the ramfile cannot be parsed.
pub fn execute(ctx: &RamContext, runner: &dyn SlaveRunner, verbose: bool) -> Result<ConvertReport> {
    let index = ctx.index();

    // Stale = exists on disk and is newer than its recorded timestamp.
    // The observed mtime is what gets committed on success, so a master
    // modified mid-run is still caught by the next pass.
    let mut stale = Vec::new();
    for (path, recorded) in index.all()? {
        let on_disk = ctx.working_dir.join(&path);
        if !on_disk.exists() {
            continue;
        }
        let observed = mtime_secs(&on_disk)?;
        if observed > recorded {
            stale.push((path, observed));
        }
    }
    debug!(stale = stale.len(), "staleness scan done");

    if stale.is_empty() {
        println!("Nothing to convert.");
        println!("Maybe you need to add files with \"ram add <file> ...\"?");
        return Ok(ConvertReport::default());
    }

    let ramfile = Ramfile::load(&ctx.ramfile_path)?;

    let mut report = ConvertReport {
        stale: stale.len(),
        converted: 0,
    };
    for (path, observed) in stale {
        let Some(conversion) = ramfile.conversions.get(&path) else {
            print_warning(&format!("no conversion strategy found for {path}"));
            continue;
        };
        if convert_master(ctx, &ramfile, conversion, runner, verbose) {
            index.update(&path, observed)?;
            report.converted += 1;
        }
    }

    println!("successfully converted {} master files", report.converted);
    Ok(report)
}

/// Converts every slave of one master. Returns whether all of them
/// succeeded; failures have already been reported.
fn convert_master(
    ctx: &RamContext,
    ramfile: &Ramfile,
    conversion: &Conversion,
    runner: &dyn SlaveRunner,
    verbose: bool,
) -> bool {
    if verbose {
        println!("converting {}", conversion.master);
    }

    let slaves = match build_slaves(ramfile, conversion) {
        Ok(slaves) => slaves,
        Err(err) => {
            print_error(&format!("{}: {err}", conversion.master));
            return false;
        }
    };

    let master_path = ctx.working_dir.join(&conversion.master);
    for slave in &slaves {
        if verbose {
            println!("\t {slave}");
        }
        if let Err(err) = runner.run(&master_path, slave) {
            if verbose {
                println!("\t failed");
            } else {
                print_error(&format!(
                    "failed: {} --> {}",
                    conversion.master, slave.path
                ));
            }
            debug!(master = %conversion.master, error = %err, "slave failed");
            return false;
        }
    }
    true
}

/// Builds the full slave list for a conversion: explicit slaves first, then
/// the instantiated template.
fn build_slaves(ramfile: &Ramfile, conversion: &Conversion) -> Result<Vec<ResolvedSlave>, RamError> {
    let mut slaves = Vec::new();
    if let Some(explicit) = &conversion.slaves {
        for spec in explicit {
            slaves.push(subst::resolve_slave(spec, &conversion.params)?);
        }
    }
    if let Some(template) = ramfile.template_for(conversion) {
        slaves.extend(subst::instantiate(template, &conversion.params)?);
    }
    Ok(slaves)
}
