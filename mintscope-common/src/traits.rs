use async_trait::async_trait;
use thiserror::Error;

use crate::models::TokenMetadata;

/// Why a single resolution strategy failed.
///
/// These are strategy-local failures: the orchestrator absorbs them and
/// advances to the next strategy, so they never surface to the batch driver
/// as anything other than an eventual `None`.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("RPC request failed: {0}")]
    Rpc(String),
    #[error("Account decode failed: {0}")]
    Decode(String),
    #[error("Off-chain fetch failed: {0}")]
    Offchain(String),
}

/// One strategy for resolving a mint address to token metadata.
///
/// Implementations return `Ok(None)` when the strategy does not apply to the
/// address (no account, wrong account type, no metadata present) and `Err`
/// when something went wrong attempting it. Callers treat both the same way:
/// try the next strategy.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<Option<TokenMetadata>, ResolveError>;

    /// Short strategy name, used in logs only.
    fn strategy(&self) -> &'static str;
}
