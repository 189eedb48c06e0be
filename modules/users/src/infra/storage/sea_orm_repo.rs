//! SeaORM-backed implementation of [`UsersRepository`].
//!
//! Generic over `C: TransactionTrait`, so it runs on a pooled
//! `DatabaseConnection` or inside an outer `DatabaseTransaction` (where each
//! call becomes a savepoint). Every operation is one unit of work via
//! [`store_db::with_tx`].

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use store_db::{with_tx, TxFuture};
use tracing::{debug, instrument};

use crate::contract::{NewUser, User};
use crate::domain::error::RepoError;
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};
use crate::infra::storage::like::{contains_pattern, LIKE_ESCAPE};

/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    /// Give the connection back, e.g. to commit or roll back an outer transaction.
    pub fn into_inner(self) -> C {
        self.conn
    }

    async fn in_tx<T, F>(&self, f: F) -> Result<T, RepoError>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T, RepoError> + Send,
        T: Send,
    {
        with_tx(&self.conn, f).await
    }
}

#[async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: TransactionTrait + Send + Sync + 'static,
{
    #[instrument(name = "users.repo.create", skip_all, fields(login = %user.login))]
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let created = self
            .in_tx(move |txn| {
                Box::pin(async move {
                    let m = UserAM {
                        login: Set(user.login),
                        password: Set(user.password),
                        ..Default::default()
                    };
                    let model = m.insert(txn).await?;
                    Ok(User::from(model))
                })
            })
            .await?;

        debug!(user_id = created.id, "user created");
        Ok(created)
    }

    #[instrument(name = "users.repo.update", skip_all, fields(user_id = user.id))]
    async fn update(&self, user: &User) -> Result<bool, RepoError> {
        let id = user.id;
        let login = user.login.clone();
        let password = user.password.clone();

        let rows = self
            .in_tx(move |txn| {
                Box::pin(async move {
                    let res = UserEntity::update_many()
                        .col_expr(Column::Login, Expr::value(login))
                        .col_expr(Column::Password, Expr::value(password))
                        .filter(Column::Id.eq(id))
                        .exec(txn)
                        .await?;
                    Ok(res.rows_affected)
                })
            })
            .await?;

        debug!(rows, "user update applied");
        Ok(rows > 0)
    }

    #[instrument(name = "users.repo.delete", skip(self))]
    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let rows = self
            .in_tx(move |txn| {
                Box::pin(async move {
                    let res = UserEntity::delete_by_id(id).exec(txn).await?;
                    Ok(res.rows_affected)
                })
            })
            .await?;

        debug!(rows, "user delete applied");
        Ok(rows > 0)
    }

    #[instrument(name = "users.repo.find_all_order_by_id", skip(self))]
    async fn find_all_order_by_id(&self) -> Result<Vec<User>, RepoError> {
        let users: Vec<User> = self
            .in_tx(|txn| {
                Box::pin(async move {
                    let rows = UserEntity::find()
                        .order_by_asc(Column::Id)
                        .all(txn)
                        .await?;
                    Ok(rows.into_iter().map(Into::into).collect())
                })
            })
            .await?;

        debug!(count = users.len(), "users listed");
        Ok(users)
    }

    #[instrument(name = "users.repo.find_by_id", skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        self.in_tx(move |txn| {
            Box::pin(async move {
                let found = UserEntity::find_by_id(id).one(txn).await?;
                Ok(found.map(Into::into))
            })
        })
        .await
    }

    #[instrument(name = "users.repo.find_by_login", skip(self))]
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepoError> {
        let login = login.to_owned();
        self.in_tx(move |txn| {
            Box::pin(async move {
                // Two rows are enough to tell "one" from "more than one".
                let mut rows = UserEntity::find()
                    .filter(Column::Login.eq(login.as_str()))
                    .order_by_asc(Column::Id)
                    .limit(2u64)
                    .all(txn)
                    .await?;
                if rows.len() > 1 {
                    return Err(RepoError::multiple_results(login));
                }
                Ok(rows.pop().map(Into::into))
            })
        })
        .await
    }

    #[instrument(name = "users.repo.find_by_like_login", skip(self))]
    async fn find_by_like_login(&self, key: &str) -> Result<Vec<User>, RepoError> {
        let pattern = contains_pattern(key);
        let users: Vec<User> = self
            .in_tx(move |txn| {
                Box::pin(async move {
                    let rows = UserEntity::find()
                        .filter(Column::Login.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)))
                        .order_by_asc(Column::Id)
                        .all(txn)
                        .await?;
                    Ok(rows.into_iter().map(Into::into).collect())
                })
            })
            .await?;

        debug!(count = users.len(), "users matched");
        Ok(users)
    }
}
