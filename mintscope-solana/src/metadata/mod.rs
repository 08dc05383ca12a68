//! Token metadata resolution strategies.
//!
//! Three strategies cover the account layouts seen in the wild: Token-2022
//! metadata extensions embedded in the mint account, the Metaplex metadata
//! program read through its client library, and a manual decode of the same
//! account's binary layout as a last resort. The orchestrator walks them in
//! that order and returns the first hit.

pub mod extension;
pub mod legacy;
pub mod offchain;
pub mod orchestrator;
pub mod sdk;

pub use extension::ExtensionMetadataResolver;
pub use legacy::LegacyMetadataResolver;
pub use offchain::OffchainMetadataFetcher;
pub use orchestrator::MetadataOrchestrator;
pub use sdk::SdkMetadataResolver;

/// On-chain string fields are padded and occasionally empty; substitute the
/// placeholder when nothing usable remains.
pub(crate) fn non_empty_or(value: String, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value
    }
}

/// Placeholder name for tokens whose chain state carries none.
pub(crate) const UNKNOWN_NAME: &str = "Unknown";
pub(crate) const UNKNOWN_SYMBOL: &str = "UNKNOWN";
