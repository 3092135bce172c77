use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static NON_ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());
static VALID_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Table name for a source identifier: final extension and any directory
/// stripped, non-alphanumeric runs collapsed to `_`.
///
/// `"data/zip-county.v2.csv"` → `"zip_county_v2"`.
pub fn table_name(source_identifier: &str) -> String {
    let path = Path::new(source_identifier.trim());
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source_identifier);
    normalize_identifier(stem)
}

/// Header field as a column name. Already-valid identifiers are kept verbatim.
pub fn column_name(header_field: &str) -> String {
    let field = header_field.trim_start_matches('\u{feff}').trim();
    if VALID_IDENT.is_match(field) {
        field.to_string()
    } else {
        normalize_identifier(field)
    }
}

fn normalize_identifier(raw: &str) -> String {
    let name = NON_ALNUM_RUN.replace_all(raw.trim(), "_").into_owned();
    if name.is_empty() {
        return "table".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}
