use super::naming::table_name;
use super::reader::SourceReader;
use crate::error::{IngestError, Result, StoreError};
use crate::store::{quote_ident, table_columns, Store};
use csv::StringRecord;
use rusqlite::{params_from_iter, Transaction};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Summary of a successful ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub table: String,
    pub columns: Vec<String>,
    pub rows_inserted: u64,
    /// `false` when rows were appended to an existing table.
    pub created: bool,
}

/// Loads delimited files into text-only tables of a [`Store`].
pub struct Ingestor {
    store: Store,
    batch_size: usize,
    delimiter: u8,
}

impl Ingestor {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            batch_size: 1000,
            delimiter: b',',
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Ingest `path`, naming the table after the file itself.
    pub fn ingest_file(&self, path: &Path) -> Result<IngestReport> {
        let identifier = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        self.ingest(&identifier, path)
    }

    /// Create the table for `source_identifier` if absent and append every
    /// row of `path` to it.
    ///
    /// Runs in a single transaction: on error nothing is committed and
    /// readers never observe a partial load.
    pub fn ingest(&self, source_identifier: &str, path: &Path) -> Result<IngestReport> {
        let table = table_name(source_identifier);
        let mut reader = SourceReader::open(path, self.delimiter)?;
        let columns = reader.columns().to_vec();

        let storage_err = |source: StoreError| IngestError::Storage {
            table: table.clone(),
            rows_committed: 0,
            source,
        };

        let mut conn = self.store.open_writer().map_err(&storage_err)?;
        let tx = conn
            .transaction()
            .map_err(|e| storage_err(StoreError::from(e)))?;

        let created = ensure_table(&tx, &table, &columns).map_err(|e| match e {
            SchemaCheck::Mismatch(existing) => IngestError::SchemaMismatch {
                table: table.clone(),
                expected: existing,
                found: columns.clone(),
            },
            SchemaCheck::Store(e) => storage_err(e),
        })?;

        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&table),
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
            (1..=columns.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut batch: Vec<StringRecord> = Vec::with_capacity(self.batch_size);
        let mut rows_inserted = 0u64;
        {
            let mut stmt = tx
                .prepare_cached(&insert_sql)
                .map_err(|e| storage_err(StoreError::from(e)))?;
            let mut record = StringRecord::new();
            loop {
                let more = reader.read_row(&mut record)?;
                if more {
                    batch.push(record.clone());
                }
                if batch.len() >= self.batch_size || (!more && !batch.is_empty()) {
                    for row in batch.drain(..) {
                        stmt.execute(params_from_iter(row.iter()))
                            .map_err(|e| storage_err(StoreError::from(e)))?;
                        rows_inserted += 1;
                    }
                    debug!(table = %table, rows = rows_inserted, "batch staged");
                }
                if !more {
                    break;
                }
            }
        }

        tx.commit().map_err(|e| storage_err(StoreError::from(e)))?;
        info!(
            table = %table,
            rows = rows_inserted,
            columns = columns.len(),
            created,
            source = %path.display(),
            "ingestion committed"
        );

        Ok(IngestReport {
            table,
            columns,
            rows_inserted,
            created,
        })
    }
}

enum SchemaCheck {
    Mismatch(Vec<String>),
    Store(StoreError),
}

impl From<StoreError> for SchemaCheck {
    fn from(e: StoreError) -> Self {
        SchemaCheck::Store(e)
    }
}

/// Returns `true` if the table was created. An existing table must have the
/// same column set, in any order, compared case-insensitively.
fn ensure_table(
    tx: &Transaction<'_>,
    table: &str,
    columns: &[String],
) -> std::result::Result<bool, SchemaCheck> {
    if let Some(existing) = table_columns(tx, table)? {
        let known: HashSet<String> = existing.iter().map(|c| c.to_ascii_lowercase()).collect();
        let same = existing.len() == columns.len()
            && columns
                .iter()
                .all(|c| known.contains(&c.to_ascii_lowercase()));
        return if same {
            Ok(false)
        } else {
            Err(SchemaCheck::Mismatch(existing))
        };
    }

    let column_defs = columns
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    tx.execute_batch(&format!(
        "CREATE TABLE {} ({column_defs});",
        quote_ident(table)
    ))
    .map_err(StoreError::from)?;
    Ok(true)
}
