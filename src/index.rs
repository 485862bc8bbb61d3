use crate::errors::RamError;
use rusqlite::{Connection, params};
use std::path::PathBuf;
use tracing::debug;

/// Durable mapping from tracked file path to its last successful conversion
/// timestamp, stored as a single SQLite table.
///
/// Every operation opens its own connection and commits on its own, so each
/// call is independently durable. There is no cross-operation transaction and
/// no locking; the tool assumes a single invocation per store at a time.
pub struct FileIndex {
    db_path: PathBuf,
}

impl FileIndex {
    /// Creates a handle for the store at `db_path`. Nothing is opened until
    /// an operation runs.
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    fn connect(&self) -> Result<Connection, RamError> {
        if self.db_path.is_file() {
            Ok(Connection::open(&self.db_path)?)
        } else {
            Err(RamError::NotInitialized)
        }
    }

    /// Creates a new, empty store.
    ///
    /// # Errors
    /// Fails with [`RamError::AlreadyInitialized`] if a store already exists
    /// at this path.
    pub fn init(&self) -> Result<(), RamError> {
        if self.db_path.exists() {
            return Err(RamError::AlreadyInitialized);
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "CREATE TABLE files (path TEXT PRIMARY KEY, modified INTEGER)",
            [],
        )?;
        debug!(path = %self.db_path.display(), "created index");
        Ok(())
    }

    /// Inserts `(path, timestamp)` rows, keeping any existing row untouched
    /// when its path is already tracked.
    ///
    /// # Errors
    /// Fails with [`RamError::NotInitialized`] if the store does not exist.
    pub fn add(&self, entries: &[(String, i64)]) -> Result<(), RamError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO files (path, modified) VALUES (?1, ?2)")?;
            for (path, modified) in entries {
                stmt.execute(params![path, modified])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Deletes the row for `path`. Absent paths are not an error.
    ///
    /// # Errors
    /// Fails with [`RamError::NotInitialized`] if the store does not exist.
    pub fn remove(&self, path: &str) -> Result<(), RamError> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM files WHERE path = ?1", params![path])?;
        Ok(())
    }

    /// Returns every tracked `(path, timestamp)` row. Order is not
    /// significant.
    ///
    /// # Errors
    /// Fails with [`RamError::NotInitialized`] if the store does not exist.
    pub fn all(&self) -> Result<Vec<(String, i64)>, RamError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT path, modified FROM files")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(tracked = rows.len(), "loaded index");
        Ok(rows)
    }

    /// Overwrites the stored timestamp for an existing path.
    ///
    /// # Errors
    /// Fails with [`RamError::NotInitialized`] if the store does not exist.
    pub fn update(&self, path: &str, modified: i64) -> Result<(), RamError> {
        let conn = self.connect()?;
        conn.execute(
            "UPDATE files SET modified = ?1 WHERE path = ?2",
            params![modified, path],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_index() -> (TempDir, FileIndex) {
        let dir = TempDir::new().unwrap();
        let index = FileIndex::new(dir.path().join(".ramindex"));
        (dir, index)
    }

    #[test]
    fn test_init_creates_store() {
        let (_dir, index) = temp_index();
        index.init().unwrap();
        assert!(index.all().unwrap().is_empty());
    }

    #[test]
    fn test_init_twice_fails() {
        let (_dir, index) = temp_index();
        index.init().unwrap();
        assert!(matches!(index.init(), Err(RamError::AlreadyInitialized)));
    }

    #[test]
    fn test_operations_without_init_fail() {
        let (_dir, index) = temp_index();
        assert!(matches!(index.all(), Err(RamError::NotInitialized)));
        assert!(matches!(
            index.add(&[("a.png".to_string(), 0)]),
            Err(RamError::NotInitialized)
        ));
        assert!(matches!(index.remove("a.png"), Err(RamError::NotInitialized)));
        assert!(matches!(
            index.update("a.png", 1),
            Err(RamError::NotInitialized)
        ));
    }

    #[test]
    fn test_add_ignores_existing_paths() {
        let (_dir, index) = temp_index();
        index.init().unwrap();
        index.add(&[("a.png".to_string(), 0)]).unwrap();
        index.update("a.png", 42).unwrap();

        // Re-adding must not reset the recorded timestamp
        index.add(&[("a.png".to_string(), 0)]).unwrap();
        assert_eq!(index.all().unwrap(), vec![("a.png".to_string(), 42)]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, index) = temp_index();
        index.init().unwrap();
        index.add(&[("a.png".to_string(), 0)]).unwrap();
        index.remove("a.png").unwrap();
        index.remove("a.png").unwrap();
        assert!(index.all().unwrap().is_empty());
    }

    #[test]
    fn test_update_overwrites_timestamp() {
        let (_dir, index) = temp_index();
        index.init().unwrap();
        index
            .add(&[("a.png".to_string(), 0), ("b.png".to_string(), 7)])
            .unwrap();
        index.update("a.png", 100).unwrap();

        let mut rows = index.all().unwrap();
        rows.sort();
        assert_eq!(
            rows,
            vec![("a.png".to_string(), 100), ("b.png".to_string(), 7)]
        );
    }
}
