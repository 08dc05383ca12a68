//! Metaplex metadata resolution through the program's client library.
//!
//! Reads the metadata PDA with the library's deserializer instead of manual
//! byte walking. When the account carries no usable URI, or the off-chain
//! fetch fails, it falls back to the manual decode path so that a borked
//! document never costs us the on-chain fields.

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use mintscope_common::{
    models::TokenMetadata,
    traits::{MetadataResolver, ResolveError},
};
use mpl_token_metadata::accounts::Metadata;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, instrument, warn};

use crate::{
    metadata::{
        legacy::LegacyMetadataResolver,
        non_empty_or,
        offchain::OffchainMetadataFetcher,
        UNKNOWN_NAME, UNKNOWN_SYMBOL,
    },
    rpc::AccountFetcher,
};

/// Resolves metadata via the Metaplex client library.
pub struct SdkMetadataResolver {
    fetcher: Arc<dyn AccountFetcher>,
    offchain: Arc<OffchainMetadataFetcher>,
    legacy: LegacyMetadataResolver,
}

impl SdkMetadataResolver {
    pub fn new(fetcher: Arc<dyn AccountFetcher>, offchain: Arc<OffchainMetadataFetcher>) -> Self {
        let legacy = LegacyMetadataResolver::new(fetcher.clone(), offchain.clone());
        Self { fetcher, offchain, legacy }
    }
}

/// Library-decoded strings keep their on-chain NUL padding.
fn trim_padded(value: &str) -> String {
    value.replace('\0', "").trim().to_string()
}

#[async_trait]
impl MetadataResolver for SdkMetadataResolver {
    #[instrument(level = "debug", skip(self))]
    async fn resolve(&self, address: &str) -> Result<Option<TokenMetadata>, ResolveError> {
        let mint = Pubkey::from_str(address)
            .map_err(|e| ResolveError::Decode(format!("Invalid mint address {address}: {e}")))?;
        let (pda, _) = Metadata::find_pda(&mint);

        let account = self
            .fetcher
            .get_account(&pda)
            .await
            .map_err(|e| ResolveError::Rpc(e.to_string()))?;
        let Some(account) = account else {
            debug!(%pda, "No metadata account");
            return Ok(None);
        };

        let metadata = match Metadata::safe_deserialize(&account.data) {
            Ok(metadata) => metadata,
            Err(error) => {
                debug!(%pda, %error, "Client library could not deserialize metadata account");
                return Ok(None);
            }
        };

        let name = trim_padded(&metadata.name);
        let symbol = trim_padded(&metadata.symbol);
        let uri = trim_padded(&metadata.uri);

        if uri.is_empty() {
            debug!(%mint, "No URI in metadata account, falling back to manual parse");
            return self.legacy.resolve(address).await;
        }

        match self.offchain.fetch_document(&uri).await {
            Ok(document) => {
                // Off-chain fields take precedence on this path.
                let name = document
                    .name
                    .unwrap_or_else(|| non_empty_or(name, UNKNOWN_NAME));
                let symbol = document
                    .symbol
                    .unwrap_or_else(|| non_empty_or(symbol, UNKNOWN_SYMBOL));
                Ok(Some(TokenMetadata {
                    name,
                    symbol,
                    description: document.description,
                    image: document.image,
                    twitter: document.twitter,
                    website: document.website,
                    telegram: document.telegram,
                    show_name: document.show_name,
                    created_on: document.created_on,
                }))
            }
            Err(error) => {
                warn!(%uri, %error, "Off-chain fetch failed, falling back to manual parse");
                self.legacy.resolve(address).await
            }
        }
    }

    fn strategy(&self) -> &'static str {
        "metaplex-sdk"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use solana_sdk::account::Account;

    use super::*;
    use crate::{metadata::legacy::tests::metadata_account_bytes, rpc::MockAccountFetcher};

    /// A full metadata account as the on-chain program serializes it: the
    /// string section shared with the manual decode tests plus the borsh
    /// encoding of the remaining fields (creators and every optional tail
    /// field absent).
    fn full_metadata_account_bytes(name: &str, symbol: &str, uri: &str) -> Vec<u8> {
        let mut data = metadata_account_bytes(name, symbol, uri);
        data.extend_from_slice(&0u16.to_le_bytes()); // seller fee basis points
        data.push(0); // creators: None
        data.push(0); // primary sale happened
        data.push(1); // is mutable
        data.extend_from_slice(&[0u8; 6]); // edition nonce .. programmable config, all None
        data
    }

    fn metadata_account(data: Vec<u8>) -> Account {
        Account {
            lamports: 1,
            data,
            owner: mpl_token_metadata::ID,
            executable: false,
            rent_epoch: 0,
        }
    }

    fn resolver(fetcher: MockAccountFetcher) -> SdkMetadataResolver {
        SdkMetadataResolver::new(
            Arc::new(fetcher),
            Arc::new(OffchainMetadataFetcher::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_resolve_missing_account_returns_none() {
        let mint = Pubkey::new_unique();
        let (pda, _) = Metadata::find_pda(&mint);

        let mut fetcher = MockAccountFetcher::new();
        fetcher
            .expect_get_account()
            .with(mockall::predicate::eq(pda))
            .once()
            .returning(|_| Ok(None));

        let result = resolver(fetcher)
            .resolve(&mint.to_string())
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_resolve_undeserializable_account_returns_none() {
        let mut fetcher = MockAccountFetcher::new();
        fetcher
            .expect_get_account()
            .once()
            .returning(|_| Ok(Some(metadata_account(vec![0u8; 8]))));

        let result = resolver(fetcher)
            .resolve(&Pubkey::new_unique().to_string())
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_resolve_without_uri_falls_back_to_manual_parse() {
        let data = full_metadata_account_bytes("Pepe\0\0", "PEPE\0", "");
        // Both the library path and the manual fallback read the same PDA,
        // so the fetcher sees two fetches for one resolution.
        let mut fetcher = MockAccountFetcher::new();
        fetcher
            .expect_get_account()
            .times(2)
            .returning(move |_| Ok(Some(metadata_account(data.clone()))));

        let result = resolver(fetcher)
            .resolve(&Pubkey::new_unique().to_string())
            .await
            .unwrap();
        assert_eq!(result, Some(TokenMetadata::onchain_only("Pepe", "PEPE")));
    }

    #[tokio::test]
    async fn test_resolve_merges_offchain_document() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/meta.json")
            .with_status(200)
            .with_body(
                r#"{
                    "name": "Pepe the Frog",
                    "description": "the frog",
                    "image": "https://img/x.png",
                    "showName": true,
                    "createdOn": "https://pump.fun"
                }"#,
            )
            .create_async()
            .await;

        let uri = format!("{}/meta.json", server.url());
        let data = full_metadata_account_bytes("Pepe", "PEPE", &uri);
        let mut fetcher = MockAccountFetcher::new();
        fetcher
            .expect_get_account()
            .once()
            .returning(move |_| Ok(Some(metadata_account(data.clone()))));

        let result = resolver(fetcher)
            .resolve(&Pubkey::new_unique().to_string())
            .await
            .unwrap()
            .expect("expected metadata");

        // The document's name wins over the on-chain one on this path.
        assert_eq!(result.name, "Pepe the Frog");
        assert_eq!(result.symbol, "PEPE");
        assert_eq!(result.description.as_deref(), Some("the frog"));
        assert_eq!(result.image.as_deref(), Some("https://img/x.png"));
        assert_eq!(result.show_name, Some(true));
        assert_eq!(result.created_on.as_deref(), Some("https://pump.fun"));
    }

    #[tokio::test]
    async fn test_resolve_offchain_failure_falls_back_to_manual_parse() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/meta.json")
            .with_status(404)
            .expect(2) // library path, then the manual fallback retries it
            .create_async()
            .await;

        let uri = format!("{}/meta.json", server.url());
        let data = full_metadata_account_bytes("Pepe", "PEPE", &uri);
        let mut fetcher = MockAccountFetcher::new();
        fetcher
            .expect_get_account()
            .times(2)
            .returning(move |_| Ok(Some(metadata_account(data.clone()))));

        let result = resolver(fetcher)
            .resolve(&Pubkey::new_unique().to_string())
            .await
            .unwrap();
        // The manual path also fails the fetch and degrades to on-chain fields.
        assert_eq!(result, Some(TokenMetadata::onchain_only("Pepe", "PEPE")));
    }
}
