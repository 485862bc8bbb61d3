use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Modification time of `path` as whole seconds since the Unix epoch, the
/// same granularity the tracked-file store records.
///
/// # Errors
/// Returns an error if the file cannot be stat'ed or its mtime predates the
/// epoch.
pub fn mtime_secs(path: &Path) -> Result<i64> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;
    let modified = metadata
        .modified()
        .context("Failed to get file modification time")?
        .duration_since(std::time::UNIX_EPOCH)
        .context("Invalid file modification time")?;
    i64::try_from(modified.as_secs()).context("File modification time too large")
}

/// Expresses `path` relative to `working_dir`, or `None` when it lies
/// outside of it. Both sides are canonicalized so symlinked working
/// directories and `..` components compare correctly.
///
/// # Errors
/// Returns an error if either path cannot be canonicalized (e.g. the file
/// does not exist).
pub fn relative_to(path: &Path, working_dir: &Path) -> Result<Option<PathBuf>> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };
    let canonical = absolute
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let base = working_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", working_dir.display()))?;

    Ok(canonical
        .strip_prefix(&base)
        .map(Path::to_path_buf)
        .ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_relative_to_inside() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a.png"), b"x").unwrap();

        let rel = relative_to(&dir.path().join("sub/a.png"), dir.path()).unwrap();
        assert_eq!(rel, Some(PathBuf::from("sub/a.png")));
    }

    #[test]
    fn test_relative_to_outside() {
        let outer = TempDir::new().unwrap();
        let inner = outer.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(outer.path().join("escape.png"), b"x").unwrap();

        let rel = relative_to(&inner.join("../escape.png"), &inner).unwrap();
        assert_eq!(rel, None);
    }

    #[test]
    fn test_relative_to_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(relative_to(&dir.path().join("nope.png"), dir.path()).is_err());
    }

    #[test]
    fn test_mtime_secs_reads_set_mtime() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.png");
        fs::write(&file, b"x").unwrap();
        filetime::set_file_mtime(&file, filetime::FileTime::from_unix_time(1234, 0)).unwrap();

        assert_eq!(mtime_secs(&file).unwrap(), 1234);
    }
}
