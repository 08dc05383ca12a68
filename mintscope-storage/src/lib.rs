//! Postgres persistence for the MintScope token store.

pub mod postgres;

pub use postgres::PostgresTokenStore;
