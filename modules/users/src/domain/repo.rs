use async_trait::async_trait;

use crate::contract::{NewUser, User};
use crate::domain::error::RepoError;

/// Persistence port for users.
///
/// Each call runs as one unit of work against the store: it commits when the
/// call returns `Ok` and rolls back otherwise.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert a user and return it with its assigned id.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    /// Overwrite login and password of the row with `user.id`.
    /// `Ok(false)` when no such row exists.
    async fn update(&self, user: &User) -> Result<bool, RepoError>;

    /// `Ok(false)` when no row had this id.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;

    async fn find_all_order_by_id(&self) -> Result<Vec<User>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;

    /// Exact match. Fails with [`RepoError::MultipleResults`] if more than one row matches.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepoError>;

    /// Users whose login contains `key` literally, ordered by id.
    async fn find_by_like_login(&self, key: &str) -> Result<Vec<User>, RepoError>;
}
