use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey};
use tracing::instrument;

use crate::errors::RpcClientError;

pub mod config;
mod retry;

use crate::rpc::{config::RetryConfig, retry::RetryPolicy};

/// Resolves one account's raw bytes given its address.
///
/// This is the only chain access the metadata resolvers need; keeping it
/// behind a trait lets tests drive the resolvers with canned account data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// Returns `None` when no account exists at the address.
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, RpcClientError>;
}

/// Wraps the Solana RPC client with retry logic at confirmed commitment.
///
/// Cheap to clone, the inner client is shared behind an Arc. One instance is
/// constructed per process and threaded through every resolver.
#[derive(Clone)]
pub struct SolanaRpcClient {
    inner: Arc<RpcClient>,
    commitment: CommitmentConfig,
    retry_policy: RetryPolicy,
    url: String,
}

impl SolanaRpcClient {
    /// Creates a new client for the given RPC URL.
    ///
    /// Retry: enabled with defaults (max retries 3, base delay 100ms).
    pub fn new(rpc_url: &str) -> Result<Self, RpcClientError> {
        rpc_url
            .parse::<reqwest::Url>()
            .map_err(|e| RpcClientError::Setup(format!("Invalid RPC URL: {e}")))?;

        let commitment = CommitmentConfig::confirmed();
        let inner = RpcClient::new_with_commitment(rpc_url.to_string(), commitment);

        Ok(Self {
            inner: Arc::new(inner),
            commitment,
            retry_policy: RetryPolicy::default(),
            url: rpc_url.to_string(),
        })
    }

    pub fn get_url(&self) -> &str {
        &self.url
    }

    pub fn get_retry_config(&self) -> RetryConfig {
        (&self.retry_policy).into()
    }

    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_policy = retry_config.into();
        self
    }
}

#[async_trait]
impl AccountFetcher for SolanaRpcClient {
    #[instrument(level = "debug", skip(self))]
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, RpcClientError> {
        let response = self
            .retry_policy
            .retry_request(|| async {
                self.inner
                    .get_account_with_commitment(pubkey, self.commitment)
                    .await
            })
            .await?;

        Ok(response.value)
    }
}
