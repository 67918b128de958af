use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use shelf_core::{Catalog, HttpProbe, MemoryPreferenceStore, PreferenceStore};
use storage::Storage;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod runtime;
mod views;

use config::load_settings;
use views::{Output, OutputFormat};

/// Headless tool directory page. Reads JSON page events from stdin and
/// writes page updates to stdout.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "shelf.toml")]
    config: PathBuf,
    /// Tool catalog; overrides `catalog_path` from the config.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Keep the theme preference in memory only.
    #[arg(long)]
    ephemeral: bool,
    /// Initial state of the simulated OS dark-mode signal.
    #[arg(long)]
    os_dark: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let settings = load_settings(&args.config);
    let behavior = settings.behavior()?;

    let catalog_path = args
        .catalog
        .or(settings.catalog_path.clone())
        .context("no catalog given; pass --catalog or set catalog_path")?;
    let catalog = Catalog::load(&catalog_path)?;

    let store: Arc<dyn PreferenceStore> = if args.ephemeral {
        Arc::new(MemoryPreferenceStore::new())
    } else {
        let database_url = settings.database_url.as_str();
        let storage = Storage::new(database_url).await.map_err(|error| {
            error!(database_url, %error, "failed to open SQLite database");
            error
        })?;
        Arc::new(storage)
    };

    let output = Output::stdout(args.format);
    let probe = Arc::new(HttpProbe::new(behavior.probe_timeout));
    let page = runtime::mount_page(&catalog, &output, store, probe, args.os_dark, behavior).await;

    let summary = runtime::drive(&page, BufReader::new(tokio::io::stdin())).await;
    page.unmount();
    let summary = summary?;

    info!(
        catalog = %catalog_path.display(),
        tools = catalog.len(),
        events = summary.events,
        "shelf finished"
    );
    Ok(())
}
