//! Token-2022 metadata extension resolution.
//!
//! Launchpad mints embed their metadata directly in the mint account as a
//! Token-2022 extension, making this the cheapest strategy (one RPC call, no
//! PDA derivation). Tried first by the orchestrator.

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use mintscope_common::{
    models::TokenMetadata,
    traits::{MetadataResolver, ResolveError},
};
use solana_sdk::pubkey::Pubkey;
use spl_token_2022::{
    extension::{BaseStateWithExtensions, StateWithExtensions},
    state::Mint,
};
use spl_token_metadata_interface::state::TokenMetadata as TokenMetadataExtension;
use tracing::{debug, instrument, warn};

use crate::{
    metadata::{
        non_empty_or,
        offchain::OffchainMetadataFetcher,
        UNKNOWN_NAME, UNKNOWN_SYMBOL,
    },
    rpc::AccountFetcher,
};

/// Resolves metadata from a Token-2022 mint's embedded metadata extension.
pub struct ExtensionMetadataResolver {
    fetcher: Arc<dyn AccountFetcher>,
    offchain: Arc<OffchainMetadataFetcher>,
}

impl ExtensionMetadataResolver {
    pub fn new(fetcher: Arc<dyn AccountFetcher>, offchain: Arc<OffchainMetadataFetcher>) -> Self {
        Self { fetcher, offchain }
    }

    /// Builds the final record from the extension fields plus whatever the
    /// off-chain document adds. Name and symbol always come from the chain;
    /// a failed fetch still counts as success with on-chain fields only.
    async fn merge(&self, name: String, symbol: String, uri: &str) -> TokenMetadata {
        if !uri.is_empty() {
            match self.offchain.fetch_document(uri).await {
                Ok(document) => {
                    return TokenMetadata {
                        name,
                        symbol,
                        description: document.description,
                        image: document.image,
                        twitter: document.twitter,
                        website: document.website,
                        telegram: document.telegram,
                        show_name: document.show_name,
                        created_on: document.created_on,
                    };
                }
                Err(error) => {
                    warn!(uri, %error, "Off-chain fetch failed, keeping on-chain fields");
                }
            }
        }

        TokenMetadata::onchain_only(name, symbol)
    }
}

#[async_trait]
impl MetadataResolver for ExtensionMetadataResolver {
    #[instrument(level = "debug", skip(self))]
    async fn resolve(&self, address: &str) -> Result<Option<TokenMetadata>, ResolveError> {
        let mint = Pubkey::from_str(address)
            .map_err(|e| ResolveError::Decode(format!("Invalid mint address {address}: {e}")))?;

        let account = self
            .fetcher
            .get_account(&mint)
            .await
            .map_err(|e| ResolveError::Rpc(e.to_string()))?;
        let Some(account) = account else {
            debug!(%mint, "No mint account");
            return Ok(None);
        };

        if account.owner != spl_token_2022::id() {
            debug!(%mint, owner = %account.owner, "Mint is not owned by the Token-2022 program");
            return Ok(None);
        }

        let state = match StateWithExtensions::<Mint>::unpack(&account.data) {
            Ok(state) => state,
            Err(error) => {
                debug!(%mint, %error, "Account does not unpack as a Token-2022 mint");
                return Ok(None);
            }
        };
        let extension = match state.get_variable_len_extension::<TokenMetadataExtension>() {
            Ok(extension) => extension,
            Err(error) => {
                debug!(%mint, %error, "No token metadata extension");
                return Ok(None);
            }
        };

        let name = non_empty_or(extension.name, UNKNOWN_NAME);
        let symbol = non_empty_or(extension.symbol, UNKNOWN_SYMBOL);
        debug!(%mint, %name, %symbol, uri = %extension.uri, "Found Token-2022 metadata");

        Ok(Some(self.merge(name, symbol, &extension.uri).await))
    }

    fn strategy(&self) -> &'static str {
        "token-2022"
    }
}
