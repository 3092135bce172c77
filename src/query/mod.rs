//! ZIP + measure lookups against the ingested tables.

pub mod measure;
pub mod request;
pub mod response;
pub mod service;

pub use measure::MeasureName;
pub use request::{LookupRequest, RequestError, Zip};
pub use response::{HealthRecord, LookupOutcome};
pub use service::QueryService;
