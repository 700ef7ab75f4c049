//! Listing Price Pipeline - Main Entry Point

use clap::{Parser, Subcommand};
use pipeline::{init_logging, Pipeline, PipelineConfig, PipelineError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "zap-pipeline", version, about = "Listing price data pipeline")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log to stdout only
    #[arg(long, global = true)]
    no_log_file: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert the scraper log into the raw CSV
    Ingest,
    /// Clean, engineer features and write the train/test split
    Transform,
    /// Select predictors and write the processed train/test files
    Select,
    /// Run every stage in order
    Run,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<(), PipelineError> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    if cli.no_log_file {
        config.logging.to_file = false;
    }
    if let Some(path) = init_logging(&config.logging)? {
        info!("Logging to {}", path.display());
    }
    info!("=== Listing Price Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let pipeline = Pipeline::new(&config);
    match cli.command {
        Commands::Ingest => {
            let summary = pipeline.ingest()?;
            info!("Ingested {} records with {} fields", summary.records, summary.columns);
        }
        Commands::Transform => {
            let summary = pipeline.transform()?;
            info!("Split into {} train / {} test rows", summary.train_rows, summary.test_rows);
        }
        Commands::Select => {
            let report = pipeline.select()?;
            info!("Selected {} predictors: {:?}", report.n_selected, report.selected);
        }
        Commands::Run => {
            pipeline.run()?;
        }
    }
    Ok(())
}
