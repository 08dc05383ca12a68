use std::{convert::Infallible, str::FromStr};

/// Public fallback endpoint used when no RPC URL is configured.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Configuration for RPC retry behavior.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts for failed requests (default: 3)
    pub max_retries: usize,
    /// Base delay in milliseconds between attempts (default: 100ms)
    pub base_delay_ms: u64,
}

impl RetryConfig {
    pub fn new(max_retries: usize, base_delay_ms: u64) -> Self {
        Self { max_retries, base_delay_ms }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 3, base_delay_ms: 100 }
    }
}

/// Identifies which of the configured RPC endpoints a worker process uses.
///
/// Two worker processes can run against the same store concurrently, each
/// pointed at its own endpoint to spread request load. Worker `"2"` is the
/// secondary, anything else the primary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkerId {
    #[default]
    Primary,
    Secondary,
}

impl FromStr for WorkerId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2" => Ok(Self::Secondary),
            _ => Ok(Self::Primary),
        }
    }
}

/// Resolved RPC endpoint configuration for one worker process.
#[derive(Clone, Debug)]
pub struct RpcConfig {
    pub primary_url: String,
    pub secondary_url: Option<String>,
    pub worker_id: WorkerId,
    pub retry: RetryConfig,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            primary_url: DEFAULT_RPC_URL.to_string(),
            secondary_url: None,
            worker_id: WorkerId::Primary,
            retry: RetryConfig::default(),
        }
    }
}

impl RpcConfig {
    /// The endpoint this worker should connect to. The secondary endpoint is
    /// only used when it is both configured and selected via the worker id.
    pub fn endpoint(&self) -> &str {
        match (self.worker_id, &self.secondary_url) {
            (WorkerId::Secondary, Some(url)) => url,
            _ => &self.primary_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::unset("", WorkerId::Primary)]
    #[case::primary("1", WorkerId::Primary)]
    #[case::secondary("2", WorkerId::Secondary)]
    #[case::unrecognized("worker-3", WorkerId::Primary)]
    fn test_worker_id_from_str(#[case] input: &str, #[case] expected: WorkerId) {
        assert_eq!(input.parse::<WorkerId>().unwrap(), expected);
    }

    #[rstest]
    #[case::primary_worker(WorkerId::Primary, Some("https://rpc2.example.com"), "https://rpc1.example.com")]
    #[case::secondary_worker(WorkerId::Secondary, Some("https://rpc2.example.com"), "https://rpc2.example.com")]
    #[case::secondary_worker_without_secondary_url(WorkerId::Secondary, None, "https://rpc1.example.com")]
    fn test_endpoint_selection(
        #[case] worker_id: WorkerId,
        #[case] secondary_url: Option<&str>,
        #[case] expected: &str,
    ) {
        let config = RpcConfig {
            primary_url: "https://rpc1.example.com".to_string(),
            secondary_url: secondary_url.map(str::to_string),
            worker_id,
            retry: RetryConfig::default(),
        };
        assert_eq!(config.endpoint(), expected);
    }

    #[test]
    fn test_default_config_uses_public_endpoint() {
        let config = RpcConfig::default();
        assert_eq!(config.endpoint(), DEFAULT_RPC_URL);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.base_delay_ms, 100);
    }
}
