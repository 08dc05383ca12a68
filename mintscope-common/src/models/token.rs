use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::TokenAddress;

/// Fully resolved token metadata.
///
/// Produced fresh per resolution attempt and never mutated in place; each
/// resolver returns a new instance or nothing at all. `name` and `symbol`
/// always carry a value (resolvers substitute `"Unknown"`/`"UNKNOWN"` when
/// the chain has none), everything else is optional. `image` serializes as
/// an explicit `null` when absent so that a consumer can distinguish
/// "checked, absent" from "not checked".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(rename = "showName", skip_serializing_if = "Option::is_none")]
    pub show_name: Option<bool>,
    #[serde(rename = "createdOn", skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
}

impl TokenMetadata {
    /// Metadata built from on-chain fields alone, with no off-chain document
    /// merged in. This still counts as a successful resolution.
    pub fn onchain_only(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            description: None,
            image: None,
            twitter: None,
            website: None,
            telegram: None,
            show_name: None,
            created_on: None,
        }
    }

    /// The social-links/extras portion persisted into the store's
    /// `metadata_json` column.
    pub fn socials_json(&self) -> serde_json::Value {
        serde_json::json!({
            "twitter": self.twitter,
            "website": self.website,
            "telegram": self.telegram,
            "showName": self.show_name,
            "createdOn": self.created_on,
        })
    }
}

/// One row of the enrichment work queue: the page read from the token store,
/// ordered by launch date ascending (oldest first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPageEntry {
    pub address: TokenAddress,
    pub launch_date: NaiveDateTime,
    pub symbol: Option<String>,
}

/// Aggregate outcome of one batch enrichment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentSummary {
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub offset: i64,
    /// Cursor for the caller to continue paging.
    pub next_offset: i64,
}
