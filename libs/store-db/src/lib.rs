#![cfg_attr(
    not(any(feature = "pg", feature = "sqlite")),
    allow(unused_imports, unused_variables, dead_code, unreachable_code)
)]

//! Store database abstraction crate.
//!
//! Provides the session layer the repositories sit on: a [`DbHandle`] that
//! owns a sqlx pool (SQLite or PostgreSQL) together with the SeaORM
//! [`DatabaseConnection`] built over it, and the [`with_tx`] unit-of-work
//! helper that every repository operation runs through.
//!
//! # Features
//! - `sqlite` (default), `pg`: enable the matching sqlx/SeaORM backends
//!
//! # Example
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> store_db::Result<()> {
//!     use store_db::{ConnectOpts, DbHandle};
//!
//!     let db = DbHandle::connect("sqlite://./data/users.db", ConnectOpts::default()).await?;
//!     let conn = db.sea();
//!     // hand `conn` to a repository
//!     # drop(conn);
//!     db.close().await;
//!     Ok(())
//! }
//! ```

pub mod tx;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use tx::{with_tx, TxFuture};

use std::time::Duration;

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr};
#[cfg(feature = "pg")]
use sea_orm::SqlxPostgresConnector;
#[cfg(feature = "sqlite")]
use sea_orm::SqlxSqliteConnector;
use sqlx::pool::PoolOptions;
#[cfg(feature = "pg")]
use sqlx::{PgPool, Postgres};
#[cfg(feature = "sqlite")]
use sqlx::{Sqlite, SqlitePool};
use thiserror::Error;

/// Result of handle construction and DSN handling.
pub type Result<T> = std::result::Result<T, DbError>;

/// Failures while detecting, configuring or opening a store.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Store backend chosen from the DSN scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Pool knobs handed to sqlx unchanged; `None` keeps the sqlx default.
///
/// `sqlite_busy_timeout` falls back to 5s. `create_sqlite_dirs` creates the
/// parent directory of a file database before opening it.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    pub sqlite_busy_timeout: Option<Duration>,
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            sqlite_busy_timeout: None,
            create_sqlite_dirs: true,
        }
    }
}

/// The sqlx pool behind the SeaORM connection, kept so it can be closed explicitly.
#[derive(Clone, Debug)]
pub enum DbPool {
    #[cfg(feature = "pg")]
    Postgres(PgPool),
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

/// Open store: engine, DSN, pool and the SeaORM connection repositories run on.
#[derive(Debug)]
pub struct DbHandle {
    engine: DbEngine,
    pool: DbPool,
    dsn: String,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Pick the engine from the DSN scheme. Unknown schemes are reported with
    /// the password masked.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        // DSNs from env files often carry stray leading whitespace.
        let s = dsn.trim_start();

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(Some(dsn))))
        }
    }

    /// Open a pool for `dsn` and wrap it in a SeaORM connection.
    ///
    /// A disabled backend feature yields [`DbError::FeatureDisabled`].
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        let handle = match engine {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => {
                let pool = pool_options::<Postgres>(&opts)
                    .connect(dsn.trim())
                    .await?;
                let sea = SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone());
                Self {
                    engine,
                    pool: DbPool::Postgres(pool),
                    dsn: dsn.trim().to_string(),
                    sea,
                }
            }
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => {
                let connect_opts = sqlite::connect_options(dsn, &opts)?;
                let mut o = pool_options::<Sqlite>(&opts);
                if sqlite::is_memory_dsn(dsn) {
                    // Each connection to an in-memory DSN opens its own empty database,
                    // so the pool is pinned to one connection that never expires.
                    o = o
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None::<Duration>)
                        .max_lifetime(None::<Duration>);
                }
                let pool = o.connect_with(connect_opts).await?;
                let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
                Self {
                    engine,
                    pool: DbPool::Sqlite(pool),
                    dsn: dsn.trim().to_string(),
                    sea,
                }
            }
            #[cfg(not(feature = "pg"))]
            DbEngine::Postgres => {
                return Err(DbError::FeatureDisabled("PostgreSQL feature not enabled"))
            }
            #[cfg(not(feature = "sqlite"))]
            DbEngine::Sqlite => return Err(DbError::FeatureDisabled("SQLite feature not enabled")),
        };

        tracing::debug!(
            engine = ?handle.engine,
            dsn = %redact_credentials_in_dsn(Some(&handle.dsn)),
            "database pool ready"
        );
        Ok(handle)
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(self) {
        match self.pool {
            #[cfg(feature = "pg")]
            DbPool::Postgres(p) => p.close().await,
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(p) => p.close().await,
        }
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// DSN as given, trimmed. Not redacted.
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Owned SeaORM connection sharing this handle's pool.
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }

    pub fn seaorm(&self) -> &DatabaseConnection {
        &self.sea
    }

    /// Run one unit of work on this handle's connection. See [`with_tx`].
    pub async fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T, E>,
        E: From<DbErr> + std::fmt::Display,
    {
        with_tx(&self.sea, f).await
    }
}

fn pool_options<DB: sqlx::Database>(opts: &ConnectOpts) -> PoolOptions<DB> {
    let mut o = PoolOptions::<DB>::new();
    if let Some(n) = opts.max_conns {
        o = o.max_connections(n);
    }
    if let Some(n) = opts.min_conns {
        o = o.min_connections(n);
    }
    if let Some(t) = opts.acquire_timeout {
        o = o.acquire_timeout(t);
    }
    if let Some(t) = opts.idle_timeout {
        o = o.idle_timeout(t);
    }
    if let Some(t) = opts.max_lifetime {
        o = o.max_lifetime(t);
    }
    o
}

/// Replace the password part of a DSN with `***` so it can be logged.
pub fn redact_credentials_in_dsn(dsn: Option<&str>) -> String {
    match dsn {
        Some(dsn) if dsn.contains('@') => {
            if let Ok(mut parsed) = url::Url::parse(dsn.trim()) {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            } else {
                "***".to_string()
            }
        }
        Some(dsn) => dsn.to_string(),
        None => "none".to_string(),
    }
}

// ===================== tests =====================
