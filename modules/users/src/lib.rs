//! Users persistence module.
//!
//! `contract` holds the plain data types callers exchange with the store,
//! `domain` the repository port and its error taxonomy, and `infra` the
//! SeaORM implementation plus schema bootstrap.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{NewUser, User};

// === DOMAIN ===
pub mod domain;
pub use domain::error::RepoError;
pub use domain::repo::UsersRepository;

// === INFRASTRUCTURE ===
pub mod infra;
pub use infra::storage::{ensure_schema, SeaOrmUsersRepository};
