//! Delimited source reading with header and field-count validation.

use super::naming::column_name;
use crate::error::{IngestError, Result};
use csv::StringRecord;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct SourceReader {
    path: PathBuf,
    reader: csv::Reader<File>,
    columns: Vec<String>,
    rows_read: u64,
}

impl SourceReader {
    /// Open `path` and read its header row.
    pub fn open(path: &Path, delimiter: u8) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|_| IngestError::SourceNotFound {
            path: path.to_path_buf(),
        })?;
        if !metadata.is_file() {
            return Err(IngestError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        if metadata.len() == 0 {
            return Err(IngestError::EmptySource {
                path: path.to_path_buf(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            // field counts are checked here so the offending row can be reported
            .flexible(true)
            .from_path(path)
            .map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let header = reader
            .headers()
            .map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .clone();
        if header.is_empty() {
            return Err(IngestError::EmptySource {
                path: path.to_path_buf(),
            });
        }

        let columns = header_columns(&header)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader,
            columns,
            rows_read: 0,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Read the next data row into `record`. Returns `false` at end of input.
    pub fn read_row(&mut self, record: &mut StringRecord) -> Result<bool> {
        let more = self
            .reader
            .read_record(record)
            .map_err(|source| IngestError::Read {
                path: self.path.clone(),
                source,
            })?;
        if !more {
            return Ok(false);
        }
        self.rows_read += 1;
        if record.len() != self.columns.len() {
            return Err(IngestError::MalformedSource {
                path: self.path.clone(),
                row: self.rows_read,
                expected: self.columns.len(),
                found: record.len(),
            });
        }
        Ok(true)
    }
}

fn header_columns(header: &StringRecord) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(header.len());
    for field in header.iter() {
        let column = column_name(field);
        // SQLite column names are case-insensitive
        if !seen.insert(column.to_ascii_lowercase()) {
            return Err(IngestError::DuplicateColumn { column });
        }
        columns.push(column);
    }
    Ok(columns)
}
