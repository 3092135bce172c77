use super::measure::MeasureName;
use super::request::{RequestError, Zip};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// One health-measure row: lower-cased column name to stored text, in
/// schema order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HealthRecord(Map<String, Value>);

impl HealthRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(Value::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Teapot,
    BadRequest(RequestError),
    NotFound { zip: Zip, measure: MeasureName },
    Found(Vec<HealthRecord>),
}

impl LookupOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            LookupOutcome::Teapot => StatusCode::IM_A_TEAPOT,
            LookupOutcome::BadRequest(_) => StatusCode::BAD_REQUEST,
            LookupOutcome::NotFound { .. } => StatusCode::NOT_FOUND,
            LookupOutcome::Found(_) => StatusCode::OK,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            LookupOutcome::Teapot => json!({ "detail": "I'm a teapot" }),
            LookupOutcome::BadRequest(e) => json!({
                "detail": e.to_string(),
                "fields": e.fields(),
            }),
            LookupOutcome::NotFound { zip, measure } => json!({
                "detail": format!("No data found for ZIP {zip} and measure '{measure}'"),
            }),
            LookupOutcome::Found(records) => json!(records),
        }
    }

    pub fn into_parts(self) -> (StatusCode, Value) {
        (self.status(), self.payload())
    }
}

impl IntoResponse for LookupOutcome {
    fn into_response(self) -> Response {
        let (status, payload) = self.into_parts();
        (status, Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(LookupOutcome::Teapot.status().as_u16(), 418);
        assert_eq!(
            LookupOutcome::BadRequest(RequestError::NotAnObject)
                .status()
                .as_u16(),
            400
        );
        let not_found = LookupOutcome::NotFound {
            zip: Zip::parse("99999").unwrap(),
            measure: MeasureName::AdultObesity,
        };
        assert_eq!(not_found.status().as_u16(), 404);
        assert_eq!(
            not_found.payload()["detail"],
            "No data found for ZIP 99999 and measure 'Adult obesity'"
        );
    }

    #[test]
    fn test_found_payload_keeps_column_order() {
        let mut fields = Map::new();
        fields.insert("state".into(), json!("MA"));
        fields.insert("county".into(), json!("Middlesex County"));
        fields.insert("raw_value".into(), json!("0.230"));
        let outcome = LookupOutcome::Found(vec![HealthRecord::new(fields)]);

        let body = serde_json::to_string(&outcome.payload()).unwrap();
        assert_eq!(
            body,
            r#"[{"state":"MA","county":"Middlesex County","raw_value":"0.230"}]"#
        );
    }
}
