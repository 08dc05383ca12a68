//! Wire types for the enrichment HTTP endpoint.

use serde::{Deserialize, Serialize};

use crate::models::EnrichmentSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResponse {
    pub success: bool,
    pub message: String,
    pub tokens_processed: u64,
    pub success_count: u64,
    pub fail_count: u64,
    pub offset: i64,
    pub next_offset: i64,
}

impl EnrichmentResponse {
    pub fn from_summary(summary: &EnrichmentSummary) -> Self {
        let message = if summary.processed == 0 {
            "No tokens need metadata enrichment".to_string()
        } else {
            "Metadata enrichment completed".to_string()
        };
        Self {
            success: true,
            message,
            tokens_processed: summary.processed,
            success_count: summary.succeeded,
            fail_count: summary.failed,
            offset: summary.offset,
            next_offset: summary.next_offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_response_uses_camel_case_keys() {
        let summary = EnrichmentSummary {
            processed: 2,
            succeeded: 1,
            failed: 1,
            offset: 0,
            next_offset: 2,
        };
        let json = serde_json::to_value(EnrichmentResponse::from_summary(&summary)).unwrap();

        assert_eq!(json["tokensProcessed"], 2);
        assert_eq!(json["successCount"], 1);
        assert_eq!(json["failCount"], 1);
        assert_eq!(json["nextOffset"], 2);
        assert_eq!(json["message"], "Metadata enrichment completed");
    }

    #[test]
    fn test_empty_page_message() {
        let summary =
            EnrichmentSummary { processed: 0, succeeded: 0, failed: 0, offset: 40, next_offset: 40 };
        let resp = EnrichmentResponse::from_summary(&summary);
        assert_eq!(resp.message, "No tokens need metadata enrichment");
    }
}
