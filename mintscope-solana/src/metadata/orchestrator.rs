use std::sync::Arc;

use mintscope_common::{models::TokenMetadata, traits::MetadataResolver};
use tracing::{debug, info, instrument, warn};

use crate::{
    metadata::{
        offchain::OffchainMetadataFetcher, ExtensionMetadataResolver, LegacyMetadataResolver,
        SdkMetadataResolver,
    },
    rpc::AccountFetcher,
};

/// Walks the resolution strategies in priority order, returning the first
/// hit. A strategy error is logged and treated the same as a miss; only when
/// every strategy comes up empty does the token count as unresolvable.
pub struct MetadataOrchestrator {
    resolvers: Vec<Arc<dyn MetadataResolver>>,
}

impl MetadataOrchestrator {
    /// Builds the default strategy chain: Token-2022 extension, then the
    /// Metaplex client library, then the manual account parse.
    pub fn new(fetcher: Arc<dyn AccountFetcher>, offchain: Arc<OffchainMetadataFetcher>) -> Self {
        let resolvers: Vec<Arc<dyn MetadataResolver>> = vec![
            Arc::new(ExtensionMetadataResolver::new(fetcher.clone(), offchain.clone())),
            Arc::new(SdkMetadataResolver::new(fetcher.clone(), offchain.clone())),
            Arc::new(LegacyMetadataResolver::new(fetcher, offchain)),
        ];
        Self { resolvers }
    }

    /// Builds an orchestrator over an explicit strategy chain.
    pub fn with_resolvers(resolvers: Vec<Arc<dyn MetadataResolver>>) -> Self {
        Self { resolvers }
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn resolve_token_metadata(&self, address: &str) -> Option<TokenMetadata> {
        for resolver in &self.resolvers {
            match resolver.resolve(address).await {
                Ok(Some(metadata)) => {
                    info!(
                        strategy = resolver.strategy(),
                        name = %metadata.name,
                        symbol = %metadata.symbol,
                        "Resolved token metadata"
                    );
                    return Some(metadata);
                }
                Ok(None) => {
                    debug!(strategy = resolver.strategy(), "Strategy yielded no metadata")
                }
                Err(error) => {
                    warn!(strategy = resolver.strategy(), %error, "Strategy failed")
                }
            }
        }

        debug!("No metadata found");
        None
    }
}
