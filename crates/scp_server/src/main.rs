use anyhow::Result;
use clap::Parser;
use scp_server::{ServerSettings, StoreKind, init_logging, run};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "SCP Archive REST API", long_about = None)]
struct Args {
    /// Configuration file (default: ./scp_archive.toml when present)
    #[arg(short, long, env = "SCP_ARCHIVE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration
    #[arg(short, long)]
    bind: Option<String>,

    /// Document store backend, overriding the configuration
    #[arg(short, long, value_enum)]
    store: Option<StoreKind>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut settings = ServerSettings::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        settings = settings.with_bind_address(bind);
    }
    if let Some(store) = args.store {
        settings = settings.with_store(store);
    }
    settings.validate()?;

    init_logging(settings.log_level(), *settings.json_logs())?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        store = %settings.store(),
        "Starting SCP archive"
    );

    run(&settings).await?;
    Ok(())
}
