//! Request screening: JSON parsing, the teapot override, field validation.
//!
//! Steps run in a fixed order and the first failing step decides the
//! outcome, so `{"coffee": "teapot"}` is a teapot even without any other field.

use super::measure::MeasureName;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

pub const ZIP_FIELD: &str = "zip";
pub const MEASURE_FIELD: &str = "measure_name";
pub const COFFEE_FIELD: &str = "coffee";

/// A 5-digit ASCII ZIP code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zip(String);

impl Zip {
    pub fn parse(raw: &str) -> Option<Self> {
        (raw.len() == 5 && raw.bytes().all(|b| b.is_ascii_digit())).then(|| Zip(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub zip: Zip,
    pub measure: MeasureName,
}

/// One failing request field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("'{0}' is required")]
    Missing(&'static str),

    #[error("'{0}' must not be empty")]
    Empty(&'static str),

    #[error("'{0}' must be a string")]
    NotAString(&'static str),

    #[error("'{0}' must be a 5-digit string")]
    NotFiveDigits(&'static str),

    #[error("'{0}' must be one of: {}", MeasureName::valid_names())]
    UnknownMeasure(&'static str),
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Missing(field)
            | FieldError::Empty(field)
            | FieldError::NotAString(field)
            | FieldError::NotFiveDigits(field)
            | FieldError::UnknownMeasure(field) => *field,
        }
    }
}

/// Why a request body was rejected with 400.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid JSON: {0}")]
    MalformedJson(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Invalid request: {}", join_errors(.0))]
    Invalid(Vec<FieldError>),
}

impl RequestError {
    /// Names of the offending fields; empty for body-level failures.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            RequestError::Invalid(errors) => errors.iter().map(FieldError::field).collect(),
            _ => Vec::new(),
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screened {
    Teapot,
    Lookup(LookupRequest),
}

pub fn screen(body: &[u8]) -> Result<Screened, RequestError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| RequestError::MalformedJson(e.to_string()))?;

    if is_teapot(&value) {
        return Ok(Screened::Teapot);
    }

    let object = value.as_object().ok_or(RequestError::NotAnObject)?;
    validate(object).map(Screened::Lookup)
}

fn is_teapot(value: &Value) -> bool {
    value.get(COFFEE_FIELD).and_then(Value::as_str) == Some("teapot")
}

fn validate(object: &Map<String, Value>) -> Result<LookupRequest, RequestError> {
    let mut errors = Vec::new();

    let zip = match required_str(object, ZIP_FIELD) {
        Ok(raw) => match Zip::parse(raw) {
            Some(zip) => Some(zip),
            None => {
                errors.push(FieldError::NotFiveDigits(ZIP_FIELD));
                None
            }
        },
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let measure = match required_str(object, MEASURE_FIELD) {
        Ok(raw) => match raw.parse::<MeasureName>() {
            Ok(m) => Some(m),
            Err(_) => {
                errors.push(FieldError::UnknownMeasure(MEASURE_FIELD));
                None
            }
        },
        Err(e) => {
            errors.push(e);
            None
        }
    };

    match (zip, measure) {
        (Some(zip), Some(measure)) => Ok(LookupRequest { zip, measure }),
        _ => Err(RequestError::Invalid(errors)),
    }
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, FieldError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(FieldError::Missing(field)),
        Some(Value::String(s)) if s.is_empty() => Err(FieldError::Empty(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(FieldError::NotAString(field)),
    }
}
