//! Postgres implementation of the token store gateway.
//!
//! Token rows are created by the external sync process with the enrichment
//! columns null; this module only reads pages of work and writes resolved
//! metadata back.

use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection,
};
use mintscope_common::storage::StorageError;

pub mod orm;
mod token_store;

pub use token_store::PostgresTokenStore;

pub type ConnectionPool = Pool<AsyncPgConnection>;

/// Creates a connection pool for the given database URL and verifies that a
/// connection can actually be established.
pub async fn connect(database_url: &str) -> Result<ConnectionPool, StorageError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder(manager)
        .build()
        .map_err(|e| StorageError::Unexpected(format!("Failed to create connection pool: {e}")))?;

    pool.get()
        .await
        .map_err(|e| StorageError::Unexpected(format!("Failed to connect to database: {e}")))?;

    Ok(pool)
}

/// Maps diesel errors onto the gateway error type.
pub(crate) fn storage_error_from_diesel(
    err: diesel::result::Error,
    entity: &str,
    id: &str,
) -> StorageError {
    match err {
        diesel::result::Error::NotFound => {
            StorageError::NotFound(entity.to_string(), id.to_string())
        }
        e => StorageError::Unexpected(format!("DatabaseError: {e}")),
    }
}
