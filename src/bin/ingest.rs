use clap::Parser;
use county_health::config::{parse_delimiter, Config};
use county_health::error::IngestError;
use county_health::ingest::Ingestor;
use county_health::logging;
use county_health::store::Store;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Load a delimited file into the SQLite store as a text-only table")]
#[command(version = "0.1.0")]
struct Cli {
    /// SQLite store file (created if it does not exist)
    store_path: PathBuf,

    /// Delimited file with a header row; the table is named after the file
    delimited_path: PathBuf,

    /// Field delimiter (single character, or \t); inferred from the extension by default
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Rows staged per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error [ConfigError]: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _guard = logging::init_logging(&config.logging);

    let delimiter = match cli.delimiter.as_deref() {
        Some(raw) => parse_delimiter(raw),
        None => config.ingest.delimiter_for(&cli.delimited_path),
    };
    let delimiter = match delimiter {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error [ConfigError]: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = Store::new(
        &cli.store_path,
        Duration::from_millis(config.store.busy_timeout_ms),
    );
    let ingestor = Ingestor::new(store)
        .with_batch_size(cli.batch_size.unwrap_or(config.ingest.batch_size))
        .with_delimiter(delimiter);

    match ingestor.ingest_file(&cli.delimited_path) {
        Ok(report) => {
            println!(
                "Imported '{}' into '{}' as table '{}' ({} rows).",
                cli.delimited_path.display(),
                cli.store_path.display(),
                report.table,
                report.rows_inserted
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn report_error(e: &IngestError) {
    eprintln!("Error [{}]: {e}", e.kind());
    if let IngestError::Storage { rows_committed, .. } = e {
        eprintln!("Rows committed: {rows_committed}");
    }
}
