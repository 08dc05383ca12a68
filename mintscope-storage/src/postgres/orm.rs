use chrono::NaiveDateTime;
use diesel::prelude::*;
use mintscope_common::models::{TokenMetadata, TokenPageEntry};
use serde_json::Value;

diesel::table! {
    tokens (address) {
        address -> Text,
        symbol -> Nullable<Text>,
        name -> Nullable<Text>,
        description -> Nullable<Text>,
        image_uri -> Nullable<Text>,
        metadata_json -> Nullable<Jsonb>,
        launch_date -> Timestamp,
        updated_at -> Nullable<Timestamp>,
    }
}

/// The slice of a token row the enrichment pipeline reads.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TokenRow {
    pub address: String,
    pub launch_date: NaiveDateTime,
    pub symbol: Option<String>,
}

impl From<TokenRow> for TokenPageEntry {
    fn from(row: TokenRow) -> Self {
        Self { address: row.address, launch_date: row.launch_date, symbol: row.symbol }
    }
}

/// Changeset writing resolved metadata back onto a token row.
///
/// `description` stays untouched when the resolution carries none; the
/// social links and extras all land in the `metadata_json` column.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = tokens)]
pub struct TokenMetadataUpdate {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub image_uri: Option<String>,
    pub metadata_json: Option<Value>,
    pub updated_at: Option<NaiveDateTime>,
}

impl TokenMetadataUpdate {
    pub fn new(metadata: &TokenMetadata, updated_at: NaiveDateTime) -> Self {
        Self {
            name: Some(metadata.name.clone()),
            symbol: Some(metadata.symbol.clone()),
            description: metadata.description.clone(),
            image_uri: metadata.image.clone(),
            metadata_json: Some(metadata.socials_json()),
            updated_at: Some(updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_update_from_metadata() {
        let metadata = TokenMetadata {
            image: Some("https://img/x.png".to_string()),
            twitter: Some("https://x.com/pepe".to_string()),
            ..TokenMetadata::onchain_only("Pepe", "PEPE")
        };
        let updated_at = chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .naive_utc();

        let update = TokenMetadataUpdate::new(&metadata, updated_at);

        assert_eq!(update.name.as_deref(), Some("Pepe"));
        assert_eq!(update.symbol.as_deref(), Some("PEPE"));
        assert_eq!(update.description, None);
        assert_eq!(update.image_uri.as_deref(), Some("https://img/x.png"));
        assert_eq!(update.updated_at, Some(updated_at));

        let socials = update.metadata_json.unwrap();
        assert_eq!(socials["twitter"], "https://x.com/pepe");
        assert_eq!(socials["telegram"], Value::Null);
    }
}
