use sea_orm::{DbErr, RuntimeErr};
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Failures surfaced by the users repository.
///
/// Every store failure is propagated to the caller through one of these
/// variants; nothing is swallowed or retried here.
#[derive(Error, Debug)]
pub enum RepoError {
    /// Retryable: lock contention, serialization failure, pool exhaustion.
    #[error("Transient store failure: {message}")]
    Transient { message: String },

    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    #[error("Login '{login}' matches more than one user")]
    MultipleResults { login: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl RepoError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    pub fn multiple_results(login: impl Into<String>) -> Self {
        Self::MultipleResults {
            login: login.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Whether the caller may reasonably retry the whole operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

// SQLite: BUSY, LOCKED and their extended codes. Postgres: serialization
// failure, deadlock, lock not available.
const TRANSIENT_CODES: &[&str] = &["5", "6", "261", "262", "517", "40001", "40P01", "55P03"];

enum Class {
    Transient,
    Constraint,
    Other,
}

fn classify(err: &DbErr) -> Class {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => Class::Transient,
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            classify_sqlx(e)
        }
        _ => Class::Other,
    }
}

fn classify_sqlx(err: &sqlx::Error) -> Class {
    match err {
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => Class::Constraint,
            _ if db
                .code()
                .is_some_and(|code| TRANSIENT_CODES.contains(&code.as_ref())) =>
            {
                Class::Transient
            }
            _ => Class::Other,
        },
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::WorkerCrashed => Class::Transient,
        _ => Class::Other,
    }
}

impl From<DbErr> for RepoError {
    fn from(err: DbErr) -> Self {
        let message = err.to_string();
        match classify(&err) {
            Class::Transient => Self::transient(message),
            Class::Constraint => Self::constraint_violation(message),
            Class::Other => Self::database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnAcquireErr;

    #[test]
    fn pool_exhaustion_is_transient() {
        let err = RepoError::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert!(err.is_transient());

        let err = RepoError::from(DbErr::Conn(RuntimeErr::SqlxError(
            sqlx::Error::PoolTimedOut,
        )));
        assert!(err.is_transient());
    }

    #[test]
    fn io_failure_during_statement_is_transient() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = RepoError::from(DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Io(io))));
        assert!(matches!(err, RepoError::Transient { .. }));
    }

    #[test]
    fn unrelated_failures_are_database_errors() {
        let err = RepoError::from(DbErr::Custom("boom".into()));
        assert!(matches!(err, RepoError::Database { ref message } if message.contains("boom")));
        assert!(!err.is_transient());

        let err = RepoError::from(DbErr::Query(RuntimeErr::SqlxError(
            sqlx::Error::RowNotFound,
        )));
        assert!(matches!(err, RepoError::Database { .. }));
    }

    #[test]
    fn multiple_results_names_the_login() {
        let err = RepoError::multiple_results("alice");
        assert_eq!(err.to_string(), "Login 'alice' matches more than one user");
    }
}
