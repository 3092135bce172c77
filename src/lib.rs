pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod query;
pub mod server;
pub mod store;
