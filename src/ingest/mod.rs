//! Delimited file ingestion into text-only tables.

pub mod loader;
pub mod naming;
pub mod reader;

pub use loader::{IngestReport, Ingestor};
pub use naming::{column_name, table_name};
