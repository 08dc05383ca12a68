use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mintscope_common::{
    models::{TokenMetadata, TokenPageEntry},
    storage::{StorageError, TokenStoreGateway},
};
use tracing::{debug, instrument};

use crate::postgres::{
    connect,
    orm::{tokens, TokenMetadataUpdate, TokenRow},
    storage_error_from_diesel, ConnectionPool,
};

/// Token store gateway backed by the shared Postgres database.
#[derive(Clone)]
pub struct PostgresTokenStore {
    pool: ConnectionPool,
}

impl PostgresTokenStore {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self { pool: connect(database_url).await? })
    }

    pub fn with_pool(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<diesel_async::pooled_connection::deadpool::Object<diesel_async::AsyncPgConnection>, StorageError>
    {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::Unexpected(format!("Failed to get connection: {e}")))
    }
}

#[async_trait]
impl TokenStoreGateway for PostgresTokenStore {
    #[instrument(level = "debug", skip(self))]
    async fn get_tokens_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TokenPageEntry>, StorageError> {
        let mut conn = self.connection().await?;

        let rows: Vec<TokenRow> = tokens::table
            .select(TokenRow::as_select())
            .order(tokens::launch_date.asc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(|e| storage_error_from_diesel(e, "Token", "page"))?;

        debug!(count = rows.len(), limit, offset, "Loaded token page");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(level = "debug", skip(self, metadata))]
    async fn update_token_metadata(
        &self,
        address: &str,
        metadata: &TokenMetadata,
        updated_at: NaiveDateTime,
    ) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;

        let changes = TokenMetadataUpdate::new(metadata, updated_at);
        let updated = diesel::update(tokens::table.filter(tokens::address.eq(address)))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|e| storage_error_from_diesel(e, "Token", address))?;

        if updated == 0 {
            return Err(StorageError::NotFound("Token".to_string(), address.to_string()));
        }

        debug!(address, name = %metadata.name, "Updated token metadata");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn test_store() -> PostgresTokenStore {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        PostgresTokenStore::new(&database_url)
            .await
            .expect("Failed to connect to database")
    }

    #[tokio::test]
    #[ignore = "require database connection"]
    async fn test_get_tokens_page_is_ordered_by_launch_date() {
        let store = test_store().await;

        let page = store
            .get_tokens_page(10, 0)
            .await
            .expect("page read failed");

        let mut sorted = page.clone();
        sorted.sort_by_key(|entry| entry.launch_date);
        assert_eq!(page, sorted, "page must be ordered oldest-first");
    }

    #[tokio::test]
    #[ignore = "require database connection"]
    async fn test_update_unknown_address_reports_not_found() {
        let store = test_store().await;

        let metadata = TokenMetadata::onchain_only("Pepe", "PEPE");
        let updated_at = chrono::Utc::now().naive_utc();
        let result = store
            .update_token_metadata("missing-address", &metadata, updated_at)
            .await;

        assert_eq!(
            result,
            Err(StorageError::NotFound("Token".to_string(), "missing-address".to_string()))
        );
    }
}
