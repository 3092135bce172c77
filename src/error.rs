use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single ingestion run. Every variant is fatal to the run.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("source file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    #[error("source file is empty (no header row): {}", .path.display())]
    EmptySource { path: PathBuf },

    #[error(
        "malformed source {}: data row {row} has {found} fields, header has {expected}",
        .path.display()
    )]
    MalformedSource {
        path: PathBuf,
        row: u64,
        expected: usize,
        found: usize,
    },

    #[error(
        "table '{table}' exists with columns [{}], source has [{}]",
        .expected.join(", "),
        .found.join(", ")
    )]
    SchemaMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("header column '{column}' appears more than once after normalization")]
    DuplicateColumn { column: String },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("storage failure on table '{table}' ({rows_committed} rows committed): {source}")]
    Storage {
        table: String,
        rows_committed: u64,
        #[source]
        source: StoreError,
    },
}

impl IngestError {
    /// Stable error kind name reported by the ingest CLI.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::SourceNotFound { .. } => "SourceNotFoundError",
            IngestError::EmptySource { .. } => "EmptySourceError",
            IngestError::MalformedSource { .. } => "MalformedSourceError",
            IngestError::SchemaMismatch { .. } => "SchemaMismatchError",
            IngestError::DuplicateColumn { .. } => "DuplicateColumnError",
            IngestError::Read { .. } => "SourceReadError",
            IngestError::Storage { .. } => "StorageError",
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store file not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to prepare store location {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for {name}: '{value}'")]
    Env { name: &'static str, value: String },

    #[error("invalid delimiter '{0}': must be a single ASCII character")]
    Delimiter(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_match_cli_contract() {
        let err = IngestError::EmptySource {
            path: PathBuf::from("x.csv"),
        };
        assert_eq!(err.kind(), "EmptySourceError");

        let err = IngestError::MalformedSource {
            path: PathBuf::from("x.csv"),
            row: 3,
            expected: 2,
            found: 1,
        };
        assert_eq!(err.kind(), "MalformedSourceError");
        assert!(err.to_string().contains("data row 3"));
    }
}
