//! Batch enrichment driver.
//!
//! Pulls one page of tokens from the store, resolves each through the
//! orchestrator strictly in order and writes successes back. One token's
//! failure never aborts the pass.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use mintscope_common::{
    models::EnrichmentSummary,
    storage::{StorageError, TokenStoreGateway},
};
use mintscope_solana::metadata::MetadataOrchestrator;
use tracing::{debug, info, instrument, warn};

/// Pause between tokens, bounding the outbound request rate.
const INTER_TOKEN_DELAY: Duration = Duration::from_millis(4);

pub struct BatchEnricher {
    store: Arc<dyn TokenStoreGateway>,
    orchestrator: MetadataOrchestrator,
    inter_token_delay: Duration,
}

impl BatchEnricher {
    pub fn new(store: Arc<dyn TokenStoreGateway>, orchestrator: MetadataOrchestrator) -> Self {
        Self { store, orchestrator, inter_token_delay: INTER_TOKEN_DELAY }
    }

    #[cfg(test)]
    fn with_inter_token_delay(mut self, delay: Duration) -> Self {
        self.inter_token_delay = delay;
        self
    }

    /// Enriches one page of tokens, ordered oldest launch first.
    ///
    /// A failed page read is fatal for the pass. Everything after that is
    /// counted: unresolvable tokens and failed store writes both increment
    /// `failed` and the pass moves on to the next token.
    #[instrument(skip(self))]
    pub async fn enrich_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<EnrichmentSummary, StorageError> {
        let tokens = self
            .store
            .get_tokens_page(limit, offset)
            .await?;
        info!(count = tokens.len(), limit, offset, "Starting enrichment pass");

        let mut succeeded: u64 = 0;
        let mut failed: u64 = 0;
        for (index, token) in tokens.iter().enumerate() {
            match self
                .orchestrator
                .resolve_token_metadata(&token.address)
                .await
            {
                Some(metadata) => {
                    let updated_at = Utc::now().naive_utc();
                    match self
                        .store
                        .update_token_metadata(&token.address, &metadata, updated_at)
                        .await
                    {
                        Ok(()) => succeeded += 1,
                        Err(error) => {
                            warn!(address = %token.address, %error, "Failed to persist metadata");
                            failed += 1;
                        }
                    }
                }
                None => {
                    debug!(address = %token.address, "Token left unenriched");
                    failed += 1;
                }
            }

            if index + 1 < tokens.len() {
                tokio::time::sleep(self.inter_token_delay).await;
            }
        }

        let summary = EnrichmentSummary {
            processed: succeeded + failed,
            succeeded,
            failed,
            offset,
            next_offset: offset + tokens.len() as i64,
        };
        info!(
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Enrichment pass complete"
        );
        Ok(summary)
    }
}
