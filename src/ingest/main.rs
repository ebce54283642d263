//! Gazetteer ingest pipeline.
//!
//! Builds the place tree, reconciles and links it, and writes N-Triples.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wilayah::emit::NTriplesWriter;
use wilayah::{Config, Pipeline, RunSummary};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Link the Indonesian administrative gazetteer and emit N-Triples")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Government gazetteer CSV (overrides config)
    #[arg(long)]
    primary: Option<PathBuf>,

    /// Statistics-agency CSV (overrides config)
    #[arg(long)]
    secondary: Option<PathBuf>,

    /// GeoNames dump, plain or .gz (overrides config)
    #[arg(long)]
    gazetteer: Option<PathBuf>,

    /// N-Triples output file (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Facts buffered per write
    #[arg(long, default_value = "10000")]
    batch_size: usize,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(path) = &args.primary {
        config.sources.primary = path.clone();
    }
    if let Some(path) = &args.secondary {
        config.sources.secondary = Some(path.clone());
    }
    if let Some(path) = &args.gazetteer {
        config.sources.gazetteer = Some(path.clone());
    }
    if let Some(path) = &args.output {
        config.output.path = path.clone();
    }
    Ok(config)
}

/// Run the pipeline into a scratch file and move it into place only once
/// every fact is written.
fn write_output(pipeline: &Pipeline, output: &Path, batch_size: usize) -> Result<RunSummary> {
    let scratch = output.with_extension("nt.partial");
    let file = File::create(&scratch)
        .with_context(|| format!("Failed to create {}", scratch.display()))?;

    let mut writer = NTriplesWriter::new(BufWriter::new(file), batch_size);
    let result = pipeline.run(&mut writer);
    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            drop(writer);
            let _ = fs::remove_file(&scratch);
            return Err(e).context("Pipeline failed, no output written");
        }
    };

    let (_, written) = writer.finish().context("Failed to finish output")?;
    fs::rename(&scratch, output)
        .with_context(|| format!("Failed to move output to {}", output.display()))?;
    info!("Wrote {} triples to {}", written, output.display());
    Ok(summary)
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = load_config(&args)?;

    info!("Wilayah Ingest Pipeline");
    info!("Primary: {}", config.sources.primary.display());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} gazetteer records ({per_sec})")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(200));

    let output = config.output.path.clone();
    let pipeline = Pipeline::new(config).with_progress(spinner.clone());
    let summary = write_output(&pipeline, &output, args.batch_size);
    spinner.finish_and_clear();
    let summary = summary?;

    info!(
        "Done: {} provinces, {} regencies, {} districts, {} facts",
        summary.build.provinces,
        summary.build.regencies,
        summary.build.districts,
        summary.emit.facts
    );
    if let Some(reconcile) = &summary.reconcile {
        info!(
            "Reconciliation: {} matched, {} rebound, {} located",
            reconcile.matched, reconcile.rebound, reconcile.coordinates_propagated
        );
    }
    if let Some(matching) = &summary.matching {
        info!(
            "GeoNames: {} links accepted, {} rejected",
            matching.accepted, matching.rejected
        );
    }

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }

    Ok(())
}
