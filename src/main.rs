use anyhow::Context;
use clap::Parser;
use county_health::config::Config;
use county_health::logging;
use county_health::query::QueryService;
use county_health::server;
use county_health::store::Store;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "county_health")]
#[command(about = "County health data lookup API")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config file (defaults to ./county_health.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to run the server on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// SQLite store produced by `ingest`
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(db) = cli.db {
        config.store.path = db;
    }

    let _guard = logging::init_logging(&config.logging);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let store = Store::new(
        &config.store.path,
        Duration::from_millis(config.store.busy_timeout_ms),
    );
    if !store.path().exists() {
        tracing::warn!(path = %store.path().display(), "store not found; every lookup will report no data");
    }
    info!(path = %store.path().display(), "serving lookups from store");

    let service = QueryService::new(store, config.query.clone());
    server::start_server(service, addr, config.server.request_timeout()).await
}
