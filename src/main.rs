use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use vnpay_gateway::application::callback::CallbackVerifier;
use vnpay_gateway::application::initiator::PaymentInitiator;
use vnpay_gateway::config::{GatewayConfig, StorageConfig};
use vnpay_gateway::domain::ports::OrderStoreBox;
use vnpay_gateway::infrastructure::in_memory::InMemoryOrderStore;
use vnpay_gateway::infrastructure::rest::RestOrderStore;
use vnpay_gateway::interfaces::http::{self, AppState};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreKind {
    /// Process-local orders, lost on restart.
    Memory,
    /// The hosted `orders` table (SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY).
    Rest,
    /// Local RocksDB database at --db-path.
    Rocksdb,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Order storage backend
    #[arg(long, value_enum, default_value_t = StoreKind::Memory)]
    store: StoreKind,

    /// Path to persistent database, used with --store rocksdb
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = GatewayConfig::from_env().into_diagnostic()?;
    let store = open_store(cli.store, cli.db_path)?;

    let state = AppState::new(
        PaymentInitiator::new(config.clone()),
        CallbackVerifier::new(config, store),
    );

    info!("Starting payment gateway...");
    http::serve(state, cli.port).await.into_diagnostic()?;

    Ok(())
}

fn open_store(kind: StoreKind, db_path: Option<PathBuf>) -> Result<OrderStoreBox> {
    match kind {
        StoreKind::Memory => {
            warn!("Using in-memory order storage; orders are lost on restart");
            Ok(Box::new(InMemoryOrderStore::new()))
        }
        StoreKind::Rest => {
            let storage = StorageConfig::from_env().into_diagnostic()?;
            info!(base_url = %storage.base_url, "Using hosted order storage");
            Ok(Box::new(RestOrderStore::new(&storage).into_diagnostic()?))
        }
        StoreKind::Rocksdb => open_rocksdb(db_path),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_rocksdb(db_path: Option<PathBuf>) -> Result<OrderStoreBox> {
    use vnpay_gateway::infrastructure::rocksdb::RocksDbOrderStore;

    let path = db_path.ok_or_else(|| miette::miette!("--db-path is required with --store rocksdb"))?;
    info!(path = %path.display(), "Using RocksDB order storage");
    Ok(Box::new(RocksDbOrderStore::open(path).into_diagnostic()?))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_rocksdb(_db_path: Option<PathBuf>) -> Result<OrderStoreBox> {
    warn!(
        "RocksDB storage requested, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
    );
    Ok(Box::new(InMemoryOrderStore::new()))
}
