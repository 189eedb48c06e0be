//! Unit-of-work helper.
//!
//! [`with_tx`] is the explicit counterpart of declarative transaction
//! demarcation: it begins a transaction on any SeaORM [`TransactionTrait`]
//! connection, runs exactly one closure against it, then commits on `Ok` or
//! rolls back on `Err`. The transaction object never escapes the helper, so it
//! is released on every exit path. If the closure panics or the caller drops
//! the future mid-flight, the uncommitted `DatabaseTransaction` is dropped and
//! SeaORM rolls it back.
//!
//! Because `DatabaseTransaction` itself implements `TransactionTrait`, calling
//! `with_tx` on an open transaction nests as a savepoint.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseTransaction, DbErr, TransactionTrait};
use tracing::{debug, warn};

/// Boxed future returned by a unit-of-work closure. Borrows the transaction for `'c`.
pub type TxFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

/// Run `f` inside a fresh transaction on `conn`.
///
/// Failures to begin or commit are converted into `E`. When `f` fails, the
/// failure is logged at WARN and rolled back best-effort: a rollback error is
/// logged too, and the original error is returned.
pub async fn with_tx<C, F, T, E>(conn: &C, f: F) -> Result<T, E>
where
    C: TransactionTrait,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T, E>,
    E: From<DbErr> + std::fmt::Display,
{
    let txn = conn.begin().await?;
    let res = f(&txn).await;
    match res {
        Ok(v) => {
            txn.commit().await?;
            debug!("transaction committed");
            Ok(v)
        }
        Err(e) => {
            warn!(error = %e, "unit of work failed, rolling back");
            // Keep the original error; the connection goes back to the pool either way.
            if let Err(rb) = txn.rollback().await {
                warn!(error = %rb, "transaction rollback failed");
            }
            Err(e)
        }
    }
}
