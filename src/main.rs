//! Cluster Console - Command Line Entry Point
//!
//! Loads a JSON array of rows, shows the first page and exports the listing to CSV.
//!
//! Usage: `cluster-console <rows.json> [filters-json]`

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cluster_console::constants::LOG_FILE_PREFIX;
use cluster_console::domain::Filter;
use cluster_console::domain::config::{LogConfig, load_config};
use cluster_console::listing::{Column, ListingController, VecDataProvider};

/// Initialize tracing; the guard must live as long as file logging is needed
fn init_tracing(log: &LogConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log.level.as_str()));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    match &log.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// One column per top-level field of the first row
fn columns_for(rows: &[Value]) -> Vec<Column<Value>> {
    rows.first()
        .and_then(Value::as_object)
        .map(|object| {
            object
                .keys()
                .map(|key| Column::property(key.as_str(), key.as_str()))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load console config")?;
    let _guard = init_tracing(&config.log);

    info!("Starting Cluster Console...");

    let mut args = std::env::args().skip(1);
    let Some(rows_path) = args.next().map(PathBuf::from) else {
        bail!("usage: cluster-console <rows.json> [filters-json]");
    };

    let content = std::fs::read_to_string(&rows_path)
        .with_context(|| format!("Failed to read {}", rows_path.display()))?;
    let rows: Vec<Value> = serde_json::from_str(&content).context("Rows must be a JSON array")?;
    let filters: Vec<Filter> = match args.next() {
        Some(arg) => serde_json::from_str(&arg).context("Filters must be a JSON array")?,
        None => Vec::new(),
    };

    let columns = columns_for(&rows);
    let provider = VecDataProvider::new(rows, config.listing.paging_mode);
    let mut controller = ListingController::from_config(provider, &config);

    if filters.is_empty() {
        controller.fetch_records().await?;
    } else {
        controller.on_filter(filters).await?;
    }

    for row in controller.listing() {
        let cells: Vec<String> = columns.iter().map(|c| c.display_value(row)).collect();
        println!("{}", cells.join("\t"));
    }
    info!("{}", controller.pagination().items_label("rows"));

    if let Some(path) = controller.export_csv(&columns).await {
        println!("Exported to {}", path.display());
    }

    Ok(())
}
