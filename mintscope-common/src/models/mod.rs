pub mod token;

pub use token::{EnrichmentSummary, TokenMetadata, TokenPageEntry};

/// Base58-encoded mint account address. Used as the merge/lookup key
/// everywhere: one metadata record per address in the persisted store.
pub type TokenAddress = String;
