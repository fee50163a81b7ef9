//! Geometry store ingest.
//!
//! Reads an `id,wkt` dataset (CSV, optionally gzipped) and builds the sled
//! store the query binary fetches geometry from. Rows with malformed WKT are
//! counted and skipped; the ids are expected to match the division catalog.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use gazetteer::SledGeometrySource;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Build the geometry store from an id,wkt dataset")]
struct Args {
    /// Input CSV with `id,wkt` columns (optionally gzipped)
    #[arg(short, long)]
    input: PathBuf,

    /// Output sled store directory
    #[arg(short, long)]
    store: PathBuf,
}

#[derive(Debug, Deserialize)]
struct GeometryRow {
    id: String,
    wkt: String,
}

fn open_input(path: &PathBuf) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Gazetteer geometry ingest");
    info!("Input: {}", args.input.display());

    // First pass: count rows so the progress bar has a length.
    let mut counter = csv::Reader::from_reader(open_input(&args.input)?);
    let total = counter.records().filter(|row| row.is_ok()).count() as u64;
    info!("Total geometry rows: {}", total);

    let store = SledGeometrySource::open(&args.store)
        .with_context(|| format!("opening geometry store {}", args.store.display()))?;

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let mut reader = csv::Reader::from_reader(open_input(&args.input)?);
    let mut stored = 0u64;
    let mut skipped = 0u64;

    for row in reader.deserialize() {
        let row: GeometryRow = row.context("reading geometry row")?;
        match store.insert(&row.id, &row.wkt) {
            Ok(()) => stored += 1,
            Err(e) => {
                warn!("Skipping id '{}': {}", row.id, e);
                skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    store.flush().context("flushing geometry store")?;

    info!(
        "Stored {} geometries ({} skipped) in {}",
        stored,
        skipped,
        args.store.display()
    );
    if stored == 0 {
        bail!("no geometries were stored from {}", args.input.display());
    }
    Ok(())
}
