//! Postgres-backed implementations of the storage ports, plus the schema
//! bootstrap. Everything here goes through the sqlx runtime API so the
//! crate compiles without a live database.

pub mod directory;
pub mod errors;
pub mod feed;
pub mod network;
pub mod schema;

pub use directory::PostgresDirectory;
pub use feed::PostgresFeed;
pub use network::PostgresNetwork;
pub use schema::migrate;
