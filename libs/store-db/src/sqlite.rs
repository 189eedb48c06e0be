//! SQLite connection option building.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};

use crate::{ConnectOpts, Result};

const DEFAULT_SQLITE_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// True for `sqlite::memory:` style DSNs and URI DSNs with `mode=memory`.
pub(crate) fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.to_ascii_lowercase().contains("mode=memory")
}

/// Build typed sqlx options from a DSN.
///
/// File databases are created when missing and run in WAL mode; in-memory
/// databases keep the default rollback journal in memory.
pub(crate) fn connect_options(dsn: &str, opts: &ConnectOpts) -> Result<SqliteConnectOptions> {
    let busy_timeout = opts
        .sqlite_busy_timeout
        .unwrap_or(DEFAULT_SQLITE_BUSY_TIMEOUT);

    let o = SqliteConnectOptions::from_str(dsn.trim())?
        .busy_timeout(busy_timeout)
        .foreign_keys(true);

    if is_memory_dsn(dsn) {
        return Ok(o.journal_mode(SqliteJournalMode::Memory));
    }

    if opts.create_sqlite_dirs {
        if let Some(parent) = o.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                // One-time blocking call during startup.
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    Ok(o.create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_dsn_detection() {
        assert!(is_memory_dsn("sqlite::memory:"));
        assert!(is_memory_dsn("sqlite://:memory:"));
        assert!(is_memory_dsn("sqlite:file:memdb?mode=memory&cache=shared"));
        assert!(is_memory_dsn("sqlite:file:memdb?MODE=MEMORY"));
        assert!(!is_memory_dsn("sqlite:///var/lib/app/users.db"));
    }

    #[test]
    fn file_dsn_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested/dir/users.db");
        let dsn = format!("sqlite://{}", db_path.display());

        let o = connect_options(&dsn, &ConnectOpts::default()).unwrap();
        assert_eq!(o.get_filename(), db_path.as_path());
        assert!(db_path.parent().unwrap().exists());
    }

    #[test]
    fn file_dsn_without_dir_creation_leaves_fs_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("missing/users.db");
        let dsn = format!("sqlite://{}", db_path.display());
        let opts = ConnectOpts {
            create_sqlite_dirs: false,
            ..Default::default()
        };

        connect_options(&dsn, &opts).unwrap();
        assert!(!db_path.parent().unwrap().exists());
    }
}
