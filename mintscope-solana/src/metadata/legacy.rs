//! Manual decoding of Metaplex metadata accounts.
//!
//! Last-resort strategy: derives the metadata PDA, fetches the raw account
//! bytes and walks the fixed binary layout by hand. Used when the client
//! library cannot make sense of the account.

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use mintscope_common::{
    models::TokenMetadata,
    traits::{MetadataResolver, ResolveError},
};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, instrument, warn};

use crate::{
    metadata::{
        non_empty_or,
        offchain::OffchainMetadataFetcher,
        UNKNOWN_NAME, UNKNOWN_SYMBOL,
    },
    rpc::AccountFetcher,
};

/// 1-byte key, 32-byte update authority, 32-byte mint.
const HEADER_LEN: usize = 1 + 32 + 32;

/// Derives the metadata account address for a mint.
///
/// Seeds are the `"metadata"` literal, the metadata program id and the mint,
/// against the metadata program itself.
pub(crate) fn find_metadata_pda(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[b"metadata", mpl_token_metadata::ID.as_ref(), mint.as_ref()],
        &mpl_token_metadata::ID,
    )
    .0
}

/// String fields recovered from the fixed metadata account layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawMetadataAccount {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// Decodes the metadata account's header and the three length-prefixed
/// string fields that follow it.
///
/// Every length read is bounds-checked; a corrupt length prefix fails the
/// whole decode rather than producing a partial record.
pub(crate) fn decode_metadata_account(data: &[u8]) -> Result<RawMetadataAccount, ResolveError> {
    if data.len() < HEADER_LEN {
        return Err(ResolveError::Decode(format!(
            "Metadata account too short: {} bytes",
            data.len()
        )));
    }

    let mut cursor = HEADER_LEN;
    let name = read_length_prefixed(data, &mut cursor, "name")?;
    let symbol = read_length_prefixed(data, &mut cursor, "symbol")?;
    let uri = read_length_prefixed(data, &mut cursor, "uri")?;

    Ok(RawMetadataAccount { name, symbol, uri })
}

/// Reads a u32-LE length prefix and the UTF-8 bytes it covers, advancing
/// `cursor` past the field. Embedded NUL padding and surrounding whitespace
/// are stripped.
fn read_length_prefixed(
    data: &[u8],
    cursor: &mut usize,
    field: &str,
) -> Result<String, ResolveError> {
    let len_end = cursor
        .checked_add(4)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| ResolveError::Decode(format!("{field} length prefix out of bounds")))?;
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&data[*cursor..len_end]);
    let len = u32::from_le_bytes(len_bytes) as usize;

    let end = len_end
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| ResolveError::Decode(format!("{field} field out of bounds")))?;
    let value = String::from_utf8_lossy(&data[len_end..end]);
    *cursor = end;

    Ok(value.replace('\0', "").trim().to_string())
}

/// Resolves metadata by manually parsing the Metaplex metadata account.
pub struct LegacyMetadataResolver {
    fetcher: Arc<dyn AccountFetcher>,
    offchain: Arc<OffchainMetadataFetcher>,
}

impl LegacyMetadataResolver {
    pub fn new(fetcher: Arc<dyn AccountFetcher>, offchain: Arc<OffchainMetadataFetcher>) -> Self {
        Self { fetcher, offchain }
    }

    /// Merges the off-chain document into the on-chain fields. On-chain name
    /// and symbol take precedence; a failed fetch degrades to on-chain
    /// fields only.
    async fn merge(&self, raw: RawMetadataAccount) -> TokenMetadata {
        if !raw.uri.is_empty() {
            match self.offchain.fetch_document(&raw.uri).await {
                Ok(document) => {
                    let name = non_empty_or(
                        raw.name,
                        document.name.as_deref().unwrap_or(UNKNOWN_NAME),
                    );
                    let symbol = non_empty_or(
                        raw.symbol,
                        document.symbol.as_deref().unwrap_or(UNKNOWN_SYMBOL),
                    );
                    return TokenMetadata {
                        name,
                        symbol,
                        description: None,
                        image: document.image,
                        twitter: document.twitter,
                        website: document.website,
                        telegram: document.telegram,
                        show_name: None,
                        created_on: None,
                    };
                }
                Err(error) => {
                    warn!(uri = %raw.uri, %error, "Off-chain fetch failed, keeping on-chain fields");
                }
            }
        }

        TokenMetadata::onchain_only(
            non_empty_or(raw.name, UNKNOWN_NAME),
            non_empty_or(raw.symbol, UNKNOWN_SYMBOL),
        )
    }
}

#[async_trait]
impl MetadataResolver for LegacyMetadataResolver {
    #[instrument(level = "debug", skip(self))]
    async fn resolve(&self, address: &str) -> Result<Option<TokenMetadata>, ResolveError> {
        let mint = Pubkey::from_str(address)
            .map_err(|e| ResolveError::Decode(format!("Invalid mint address {address}: {e}")))?;
        let pda = find_metadata_pda(&mint);

        let account = self
            .fetcher
            .get_account(&pda)
            .await
            .map_err(|e| ResolveError::Rpc(e.to_string()))?;
        let Some(account) = account else {
            debug!(%pda, "No metadata account");
            return Ok(None);
        };

        let raw = decode_metadata_account(&account.data)?;
        debug!(name = %raw.name, symbol = %raw.symbol, uri = %raw.uri, "Decoded metadata account");

        Ok(Some(self.merge(raw).await))
    }

    fn strategy(&self) -> &'static str {
        "legacy"
    }
}
