//! zimport - import an archive of spreadsheet + media from the command line
//!
//! Extracts the archive, imports every spreadsheet row into a local catalog
//! with its matching media, and publishes the spreadsheet with `Media` and
//! `Internal ID` columns added.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use zimport_common::config::{load_config, CliOverrides, ImportSettings};
use zimport_common::logging::init_tracing;
use zimport_engine::models::{JobReport, JobStatus};
use zimport_engine::services::{
    ArchiveUpload, DelimitedSourceProbe, ImportOrchestrator, LocalCatalog, LocalFileStore,
    MediaValidator, TempFileIngester,
};

/// Directory below the temp root where ingested media are staged
const HOLDING_DIR: &str = "holding";

/// Command-line arguments for zimport
#[derive(Parser, Debug)]
#[command(name = "zimport")]
#[command(about = "Import a ZIP of one spreadsheet plus media, linking media to rows")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "ZIMPORT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import an archive
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
struct ImportArgs {
    /// ZIP archive to import
    archive: PathBuf,

    /// Header of the column holding row identifiers
    #[arg(short, long)]
    identifier_column: String,

    /// Temp root for extracted archives
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Directory stored files are written to
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Public URL the storage directory is served from
    #[arg(long)]
    base_url: Option<String>,

    /// Separator between several media URLs in one cell
    #[arg(long, default_value = ",")]
    separator: String,

    /// Job comment; the result link is appended to it
    #[arg(long)]
    comment: Option<String>,

    /// Do not delete the archive once extracted
    #[arg(long)]
    keep_archive: bool,

    /// Print the job report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&loaded.config.logging).context("Failed to initialize logging")?;
    loaded.log_source();
    let toml_config = loaded.config;

    let Command::Import(import) = cli.command;

    let overrides = CliOverrides {
        temp_dir: import.temp_dir.clone(),
        storage_dir: import.storage_dir.clone(),
        base_url: import.base_url.clone(),
    };
    let settings = ImportSettings::resolve(&overrides, &toml_config);

    info!("Temp root: {}", settings.temp_dir.display());
    info!("Storage: {} ({})", settings.storage_dir.display(), settings.base_url);

    let store = Arc::new(LocalFileStore::new(
        settings.storage_dir.clone(),
        settings.base_url.clone(),
    ));
    let orchestrator = Arc::new(ImportOrchestrator::from_settings(&settings, store.clone()));

    let probe = DelimitedSourceProbe;
    let prepared = ArchiveUpload::new(orchestrator.sandbox(), &probe)
        .keep_archive(import.keep_archive)
        .receive(&import.archive)?;

    info!(
        "Spreadsheet {} with columns: {}",
        prepared.source.file_name(),
        prepared.headers().join(", ")
    );

    let args = match prepared.job_args(
        &import.identifier_column,
        &import.separator,
        import.comment.clone(),
        settings.rows_per_batch,
    ) {
        Ok(args) => args,
        Err(e) => {
            orchestrator
                .sandbox()
                .delete_recursive(&prepared.temp_path)
                .context("Failed to remove temp directory")?;
            return Err(e.into());
        }
    };

    let ingester = TempFileIngester::new(
        settings.temp_dir.clone(),
        settings.temp_dir.join(HOLDING_DIR),
        MediaValidator::from_settings(&settings),
    );
    let catalog = LocalCatalog::new(store, ingester);

    let report = orchestrator
        .dispatch(args, catalog)
        .await
        .context("Import job did not complete")?
        .context("Import job failed")?;

    print_report(&report, import.json)?;

    if report.status == JobStatus::CompletedWithErrors {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &JobReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Job {}: {:?}", report.job_id, report.status);
    println!("Rows linked: {}", report.rows_linked);
    if let Some(url) = &report.spreadsheet_url {
        println!("Updated spreadsheet: {}", url);
    }
    for message in &report.messages {
        println!("[{:?}] {}", message.severity, message.message);
    }
    Ok(())
}
