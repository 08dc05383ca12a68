use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{TokenMetadata, TokenPageEntry};

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum StorageError {
    #[error("Could not find {0} with id `{1}`!")]
    NotFound(String, String),
    #[error("Unexpected storage error: {0}")]
    Unexpected(String),
}

/// Narrow interface onto the persisted token store.
///
/// The store itself is owned by an external sync process which creates rows
/// with the enrichment columns null; this trait is everything the enrichment
/// pipeline needs from it.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait TokenStoreGateway: Send + Sync {
    /// Reads one page of tokens ordered by launch date ascending.
    async fn get_tokens_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TokenPageEntry>, StorageError>;

    /// Overwrites the enrichment columns of the row keyed by `address` with
    /// the given metadata and bumps the row's updated timestamp.
    async fn update_token_metadata(
        &self,
        address: &str,
        metadata: &TokenMetadata,
        updated_at: NaiveDateTime,
    ) -> Result<(), StorageError>;
}
