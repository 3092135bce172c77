use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up next to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "county_health.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub ingest: IngestConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            request_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data.db"),
            busy_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub batch_size: usize,
    /// Field delimiter; inferred from the file extension when unset.
    pub delimiter: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            delimiter: None,
        }
    }
}

impl IngestConfig {
    /// Resolve the delimiter byte for `path`.
    pub fn delimiter_for(&self, path: &Path) -> Result<u8, ConfigError> {
        if let Some(d) = &self.delimiter {
            return parse_delimiter(d);
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        Ok(match ext.as_deref() {
            Some("tsv") | Some("tab") => b'\t',
            Some("psv") => b'|',
            _ => b',',
        })
    }
}

/// Accepts a single ASCII character, or the escape `\t`.
pub fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    if raw == "\\t" {
        return Ok(b'\t');
    }
    match raw.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(ConfigError::Delimiter(raw.to_string())),
    }
}

/// Table and column names the lookup join runs against.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub zip_table: String,
    pub zip_column: String,
    pub zip_county_column: String,
    pub zip_state_column: String,
    pub measure_table: String,
    pub measure_county_column: String,
    pub measure_state_column: String,
    pub measure_name_column: String,
    pub release_year_column: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            zip_table: "zip_county".to_string(),
            zip_column: "zip".to_string(),
            zip_county_column: "county".to_string(),
            zip_state_column: "state_abbreviation".to_string(),
            measure_table: "county_health_rankings".to_string(),
            measure_county_column: "County".to_string(),
            measure_state_column: "State".to_string(),
            measure_name_column: "Measure_name".to_string(),
            release_year_column: "Data_Release_Year".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rolling JSON log file; console only when unset.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "county_health.log".to_string(),
        }
    }
}

impl Config {
    /// Load from `path` (or the default file), falling back to defaults when
    /// the file does not exist, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };
        dotenv::dotenv().ok();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PORT`, `HOST`, `COUNTY_HEALTH_DB` and `COUNTY_HEALTH_LOG_DIR`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::Env {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(db) = lookup("COUNTY_HEALTH_DB") {
            self.store.path = PathBuf::from(db);
        }
        if let Some(dir) = lookup("COUNTY_HEALTH_LOG_DIR") {
            self.logging.directory = Some(PathBuf::from(dir));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.store.path, PathBuf::from("data.db"));
        assert_eq!(config.query.zip_table, "zip_county");
        assert_eq!(config.query.measure_table, "county_health_rankings");
        assert_eq!(config.ingest.batch_size, 1000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [ingest]
            delimiter = ";"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.busy_timeout_ms, 5000);
        assert_eq!(
            config.ingest.delimiter_for(Path::new("a.csv")).unwrap(),
            b';'
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([("PORT", "9000"), ("COUNTY_HEALTH_DB", "/tmp/x.db")]);
        let mut config = Config::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.store.path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(|k| (k == "PORT").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: "PORT", .. }));
    }

    #[test]
    fn test_delimiter_inferred_from_extension() {
        let ingest = IngestConfig::default();
        assert_eq!(ingest.delimiter_for(Path::new("a.tsv")).unwrap(), b'\t');
        assert_eq!(ingest.delimiter_for(Path::new("a.PSV")).unwrap(), b'|');
        assert_eq!(ingest.delimiter_for(Path::new("a.csv")).unwrap(), b',');
        assert_eq!(ingest.delimiter_for(Path::new("noext")).unwrap(), b',');
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert_eq!(parse_delimiter("|").unwrap(), b'|');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
