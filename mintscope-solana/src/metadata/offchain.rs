//! Off-chain metadata document fetching.
//!
//! The URI stored on-chain points at a JSON document (IPFS, Arweave or plain
//! HTTP). Token launchpads scatter social links across several JSON shapes,
//! so extraction probes a fixed list of candidate paths per field.

use std::time::Duration;

use mintscope_common::traits::ResolveError;
use serde_json::Value;
use tracing::{debug, instrument};

const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Rewrites `ipfs://X` to the public gateway URL. Everything else passes
/// through unchanged.
pub fn normalize_ipfs_uri(uri: &str) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(cid) => format!("{IPFS_GATEWAY}{cid}"),
        None => uri.to_string(),
    }
}

/// Fields extracted from an off-chain metadata document.
///
/// All fields are optional. `image` stays a plain `Option` here as well, the
/// explicit-null distinction only matters once merged into the final record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffchainDocument {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
    pub telegram: Option<String>,
    pub show_name: Option<bool>,
    pub created_on: Option<String>,
}

impl OffchainDocument {
    fn from_json(json: &Value) -> Self {
        Self {
            name: non_empty_string(&json["name"]),
            symbol: non_empty_string(&json["symbol"]),
            description: non_empty_string(&json["description"]),
            image: non_empty_string(&json["image"]),
            twitter: social_link(json, "twitter", true),
            website: social_link(json, "website", false)
                .or_else(|| non_empty_string(&json["external_url"])),
            telegram: social_link(json, "telegram", true),
            show_name: json["showName"].as_bool().filter(|&b| b),
            created_on: non_empty_string(&json["createdOn"]),
        }
    }
}

fn non_empty_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Takes the first present value among the known nesting spots: the top-level
/// key, then `extensions`, `socials`, `links` and (for twitter/telegram
/// only) `social`.
fn social_link(json: &Value, field: &str, check_social: bool) -> Option<String> {
    let mut sections: Vec<&str> = vec!["extensions", "socials", "links"];
    if check_social {
        sections.push("social");
    }
    non_empty_string(&json[field]).or_else(|| {
        sections
            .iter()
            .find_map(|section| non_empty_string(&json[section][field]))
    })
}

/// Fetches and parses off-chain metadata documents over HTTP.
#[derive(Debug, Clone)]
pub struct OffchainMetadataFetcher {
    http: reqwest::Client,
}

impl OffchainMetadataFetcher {
    pub fn new() -> Result<Self, ResolveError> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ResolveError::Offchain(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Fetches the document behind `uri` and extracts the known fields.
    ///
    /// Non-2xx responses, timeouts and unparseable bodies are all reported as
    /// `Offchain` errors; callers treat that as "off-chain data unavailable"
    /// and keep whatever on-chain fields they already have.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_document(&self, uri: &str) -> Result<OffchainDocument, ResolveError> {
        let url = normalize_ipfs_uri(uri);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ResolveError::Offchain(format!("Failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(ResolveError::Offchain(format!(
                "Unexpected status {} fetching {url}",
                response.status()
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ResolveError::Offchain(format!("Invalid JSON from {url}: {e}")))?;

        let document = OffchainDocument::from_json(&json);
        debug!(?document, "Fetched off-chain metadata document");
        Ok(document)
    }
}
