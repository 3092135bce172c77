use super::request::{screen, LookupRequest, Screened};
use super::response::{HealthRecord, LookupOutcome};
use crate::config::QueryConfig;
use crate::error::StoreError;
use crate::store::{quote_ident, Store};
use rusqlite::types::ValueRef;
use rusqlite::params;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Read-only lookup of health records by ZIP code and measure name.
///
/// Holds no connection; every lookup opens its own read-only one, so a
/// service can be shared across threads freely.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: Store,
    query: QueryConfig,
}

impl QueryService {
    pub fn new(store: Store, query: QueryConfig) -> Self {
        Self { store, query }
    }

    /// Screen a raw request body and run the lookup.
    pub fn lookup(&self, body: &[u8]) -> LookupOutcome {
        let request = match screen(body) {
            Ok(Screened::Teapot) => return LookupOutcome::Teapot,
            Ok(Screened::Lookup(request)) => request,
            Err(e) => {
                debug!(error = %e, "rejected lookup request");
                return LookupOutcome::BadRequest(e);
            }
        };
        self.lookup_request(request)
    }

    pub fn lookup_request(&self, request: LookupRequest) -> LookupOutcome {
        match self.find_records(&request) {
            Ok(records) if !records.is_empty() => {
                debug!(zip = %request.zip, measure = %request.measure, rows = records.len(), "lookup matched");
                LookupOutcome::Found(records)
            }
            Ok(_) => LookupOutcome::NotFound {
                zip: request.zip,
                measure: request.measure,
            },
            Err(e) => {
                // missing store or table reads as "no data"
                warn!(zip = %request.zip, measure = %request.measure, error = %e, "lookup failed, reporting not found");
                LookupOutcome::NotFound {
                    zip: request.zip,
                    measure: request.measure,
                }
            }
        }
    }

    /// Health records of every county the ZIP maps to, ordered by release
    /// year then insertion order.
    pub fn find_records(&self, request: &LookupRequest) -> Result<Vec<HealthRecord>, StoreError> {
        let conn = self.store.open_reader()?;
        let mut stmt = conn.prepare(&self.join_sql())?;
        let keys: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|c| c.to_lowercase())
            .collect();

        let mut rows = stmt.query(params![request.zip.as_str(), request.measure.as_str()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut fields = Map::with_capacity(keys.len());
            for (i, key) in keys.iter().enumerate() {
                fields.insert(key.clone(), text_value(row.get_ref(i)?));
            }
            records.push(HealthRecord::new(fields));
        }
        Ok(records)
    }

    fn join_sql(&self) -> String {
        let q = &self.query;
        format!(
            "SELECT m.* FROM {mt} AS m \
             WHERE m.{mname} = ?2 \
               AND EXISTS (SELECT 1 FROM {zt} AS z \
                           WHERE z.{zip} = ?1 \
                             AND z.{zcounty} = m.{mcounty} \
                             AND z.{zstate} = m.{mstate}) \
             ORDER BY m.{year}, m.rowid",
            mt = quote_ident(&q.measure_table),
            mname = quote_ident(&q.measure_name_column),
            zt = quote_ident(&q.zip_table),
            zip = quote_ident(&q.zip_column),
            zcounty = quote_ident(&q.zip_county_column),
            mcounty = quote_ident(&q.measure_county_column),
            zstate = quote_ident(&q.zip_state_column),
            mstate = quote_ident(&q.measure_state_column),
            year = quote_ident(&q.release_year_column),
        )
    }
}

/// Stored values are text; anything else is rendered as text too.
fn text_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::String(i.to_string()),
        ValueRef::Real(f) => Value::String(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
