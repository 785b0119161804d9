//! loanseg: customer segmentation with automatic cluster-count selection
//!
//! Entrypoint that wires logging, data ingestion, the segmentation pipeline
//! and the console report together.

use anyhow::{Context, Result};
use clap::Parser;
use loanseg::cli::OutputFormat;
use loanseg::{data, report, Args, Dataset};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Records generated when neither an input file nor a count is given
const DEFAULT_GENERATED_RECORDS: usize = 100;

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_directive().into()),
        )
        .init();

    let start_time = Instant::now();
    let dataset = load_dataset(&args)?;
    info!(n_records = dataset.len(), "dataset ready");

    let segmentation = args
        .segmentation_params()
        .check()
        .context("invalid segmentation parameters")?;
    let result = segmentation.run(&dataset).context("segmentation failed")?;

    match args.format {
        OutputFormat::Table => print!("{}", report::render_table(&result)),
        OutputFormat::Json => println!("{}", report::render_json(&result)?),
    }

    info!(
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "pipeline complete"
    );
    Ok(())
}

/// Read the input CSV, or generate demo records when no file is given
fn load_dataset(args: &Args) -> Result<Dataset> {
    match &args.input {
        Some(path) => Dataset::from_path(path)
            .with_context(|| format!("failed to load customer records from {}", path)),
        None => {
            let n_records = args.generate.unwrap_or(DEFAULT_GENERATED_RECORDS);
            info!(n_records, seed = args.seed, "generating synthetic records");
            Ok(data::generate(n_records, args.seed))
        }
    }
}
