use sea_orm::{ConnectionTrait, DbErr, Schema};
use tracing::debug;

use super::entity::Entity as UserEntity;

/// Create the `users` table from the entity definition if it is missing.
///
/// Idempotent. This is a bootstrap for fresh stores, not a migration runner.
pub async fn ensure_schema<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(UserEntity);
    stmt.if_not_exists();

    conn.execute(backend.build(&stmt)).await?;
    debug!(?backend, "users schema ensured");
    Ok(())
}
