#![warn(missing_docs)]

//! # Ram - Incremental Image Asset Converter
//!
//! Ram tracks a set of master image files and, whenever a master changes,
//! regenerates its derived variants by driving an external image transformer.
//! It behaves like a tiny build system specialized for asset pipelines:
//! masters are registered once, their last successful conversion time is
//! persisted, and `ram convert` only touches masters that are newer than
//! their recorded timestamp.
//!
//! ## Architecture
//!
//! - [`index`]: durable tracked-file store (SQLite table in `.ramindex`)
//! - [`ramfile`]: declarative conversion configuration (`ramfile.json`)
//! - [`subst`]: `{token}` substitution and dimension expression evaluation
//! - [`convert`]: staleness detection and conversion orchestration
//! - [`commands`]: CLI command implementations (init, add, rm, ls, status, convert)
//! - [`errors`]: the closed error taxonomy shared by all layers

/// CLI command implementations.
pub mod commands;

/// Conversion orchestration and the external-transformer adapter.
pub mod convert;

/// The closed error taxonomy for configuration, substitution, and storage.
pub mod errors;

/// Tracked-file store backed by SQLite.
pub mod index;

/// Configuration model and parser for `ramfile.json`.
pub mod ramfile;

/// Parameter substitution and restricted expression evaluation.
pub mod subst;

/// Path and timestamp helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the ram binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the tracked-file store, relative to the working directory.
pub const INDEX_FILE: &str = ".ramindex";

/// Name of the conversion configuration file, relative to the working directory.
pub const RAMFILE: &str = "ramfile.json";

/// Central context for all ram operations.
///
/// Holds the working directory and the well-known paths derived from it.
/// Commands receive the context explicitly instead of consulting process-wide
/// state, which keeps them testable against temporary directories.
#[derive(Debug, Clone)]
pub struct RamContext {
    /// The directory whose assets are managed. Tracked paths are stored
    /// relative to it.
    pub working_dir: PathBuf,

    /// Path to the tracked-file store.
    pub index_path: PathBuf,

    /// Path to the conversion configuration file.
    pub ramfile_path: PathBuf,
}

impl RamContext {
    /// Creates a context rooted at the current working directory.
    ///
    /// # Errors
    /// Returns an error if the current directory cannot be determined.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("Could not determine working directory")?;
        Ok(Self::at(cwd))
    }

    /// Creates a context rooted at an explicit directory (used by tests).
    #[must_use]
    pub fn at(working_dir: PathBuf) -> Self {
        let index_path = working_dir.join(INDEX_FILE);
        let ramfile_path = working_dir.join(RAMFILE);
        Self {
            working_dir,
            index_path,
            ramfile_path,
        }
    }

    /// Returns a handle to the tracked-file store for this context.
    #[must_use]
    pub fn index(&self) -> index::FileIndex {
        index::FileIndex::new(self.index_path.clone())
    }
}
