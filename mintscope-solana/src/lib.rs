//! Solana chain access for the MintScope enrichment pipeline.
//!
//! Provides the RPC client wrapper (with retry support), the three token
//! metadata resolution strategies and the orchestrator that walks them in
//! priority order.

pub mod errors;
pub mod metadata;
pub mod rpc;

pub use errors::RpcClientError;
