use std::sync::Arc;

use clap::Parser;
use mintscope_solana::{
    metadata::{MetadataOrchestrator, OffchainMetadataFetcher},
    rpc::SolanaRpcClient,
};
use mintscope_storage::PostgresTokenStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Cli, Command},
    enrichment::BatchEnricher,
    services::ServicesBuilder,
};

mod cli;
mod enrichment;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let args = cli.args();

    let default_directive = if args.quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let rpc_config = args.rpc_config();
    let rpc_client = SolanaRpcClient::new(rpc_config.endpoint())?
        .with_retry(rpc_config.retry.clone());
    info!(endpoint = rpc_client.get_url(), "Using RPC endpoint");
    let offchain = OffchainMetadataFetcher::new()?;
    let orchestrator = MetadataOrchestrator::new(Arc::new(rpc_client), Arc::new(offchain));
    let store = PostgresTokenStore::new(&args.database_url).await?;
    let enricher = Arc::new(BatchEnricher::new(Arc::new(store), orchestrator));

    match cli.command() {
        Command::Serve => {
            let (_handle, task) = ServicesBuilder::new(enricher)
                .prefix(&args.server_version_prefix)
                .bind(&args.server_ip)
                .port(args.server_port)
                .run()?;
            task.await??;
        }
        Command::Enrich(enrich_args) => {
            let summary = enricher
                .enrich_page(enrich_args.limit, enrich_args.offset)
                .await?;
            info!(
                processed = summary.processed,
                succeeded = summary.succeeded,
                failed = summary.failed,
                next_offset = summary.next_offset,
                "Enrichment run complete"
            );
        }
    }

    Ok(())
}
