use solana_client::client_error::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcClientError {
    #[error("Setup error: {0}")]
    Setup(String),
    #[error("RPC request failed: {0}")]
    Request(#[from] ClientError),
}
