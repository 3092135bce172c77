//! Handle to the shared SQLite store.
//!
//! The ingestor writes through [`Store::open_writer`]; the query service reads
//! through [`Store::open_reader`], which never creates or modifies the file.

use crate::error::StoreError;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Store {
    pub fn new<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open read-write, creating the file if needed.
    pub fn open_writer(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            "#,
        )?;
        Ok(conn)
    }

    /// Open read-only. A missing file is an error, never an implicit create.
    pub fn open_reader(&self) -> Result<Connection, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Missing {
                path: self.path.clone(),
            });
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

/// Column names of `table` in declaration order, or `None` if it does not exist.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Option<Vec<String>>, StoreError> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Ok(None);
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(columns))
}

pub fn row_count(conn: &Connection, table: &str) -> Result<u64, StoreError> {
    let n: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
        [],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

/// Quote an identifier for interpolation into SQL text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("zip"), "\"zip\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_reader_does_not_create_file() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("missing.db"), Duration::from_millis(100));
        assert!(matches!(store.open_reader(), Err(StoreError::Missing { .. })));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_writer_reports_unusable_parent() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = Store::new(blocker.join("s.db"), Duration::from_millis(100));
        match store.open_writer() {
            Err(StoreError::Io { path, source }) => {
                assert_eq!(path, blocker);
                assert!(!source.to_string().is_empty());
            }
            other => panic!("expected Io error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_table_columns_in_declaration_order() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("s.db"), Duration::from_millis(100));
        let conn = store.open_writer().unwrap();
        assert_eq!(table_columns(&conn, "t").unwrap(), None);

        conn.execute_batch("CREATE TABLE t (b TEXT, a TEXT, c TEXT)")
            .unwrap();
        assert_eq!(
            table_columns(&conn, "t").unwrap(),
            Some(vec!["b".to_string(), "a".to_string(), "c".to_string()])
        );
        assert_eq!(row_count(&conn, "t").unwrap(), 0);
    }

    #[test]
    fn test_reader_rejects_writes() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("s.db"), Duration::from_millis(100));
        store
            .open_writer()
            .unwrap()
            .execute_batch("CREATE TABLE t (a TEXT)")
            .unwrap();

        let reader = store.open_reader().unwrap();
        assert!(reader.execute("INSERT INTO t (a) VALUES ('x')", []).is_err());
    }
}
