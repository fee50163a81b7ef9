//! Command-line lookup against a division catalog.
//!
//! Resolves a place path (`query --catalog divisions.csv us ca sanfrancisco`),
//! runs the listing operations, and prints geometry for resolved paths when
//! a geometry store is available.

use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gazetteer::{
    Catalog, DivisionRecord, EncodedGeometry, GeometryEncoding, GeometrySource,
    MemoryGeometrySource, PlacePath, Resolver, SledGeometrySource,
};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Resolve well-known location paths against a division catalog")]
struct Args {
    /// Division catalog dataset (CSV, optionally gzipped)
    #[arg(long)]
    catalog: PathBuf,

    /// Sled geometry store produced by the ingest binary
    #[arg(long)]
    store: Option<PathBuf>,

    /// Print geometry in this encoding: wkt, wkb, hexwkb, geojson, svg
    #[arg(long, value_parser = GeometryEncoding::from_str)]
    encoding: Option<GeometryEncoding>,

    /// Run a listing instead of resolving: countries, regions, counties,
    /// cities, subtypes
    #[arg(long)]
    list: Option<String>,

    /// Path segments, e.g. `us ca sanfrancisco`
    segments: Vec<String>,

    /// Log verbosity
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let catalog = Arc::new(Catalog::open(&args.catalog)?);
    info!("Catalog ready with {} records", catalog.len());

    let geometry: Box<dyn GeometrySource> = match &args.store {
        Some(path) => Box::new(
            SledGeometrySource::open(path)
                .with_context(|| format!("opening geometry store {}", path.display()))?,
        ),
        None => Box::new(MemoryGeometrySource::new()),
    };
    let resolver = Resolver::new(catalog, geometry);

    let path = PlacePath::new(&args.segments)?;

    if let Some(listing) = &args.list {
        return run_listing(&resolver, listing, &path);
    }

    if let Some(encoding) = args.encoding {
        if args.store.is_none() {
            bail!("--encoding requires --store to point at a geometry store");
        }
        let encoded = resolver.geometry(&path, encoding)?;
        return print_encoded(&encoded);
    }

    let resolution = resolver.resolve(&path)?;
    let records = resolution.into_records();
    if records.is_empty() {
        bail!("no match for path '{path}'");
    }
    print_records(&records);
    Ok(())
}

fn run_listing(
    resolver: &Resolver<Box<dyn GeometrySource>>,
    listing: &str,
    path: &PlacePath,
) -> Result<()> {
    match listing {
        "countries" => print_records(&resolver.countries(path)?),
        "regions" => print_records(&resolver.regions(path)?),
        "counties" => print_records(&resolver.counties(path)?),
        "cities" => print_records(&resolver.cities(path)?),
        "subtypes" => {
            for subtype in resolver.subtypes(path)? {
                println!("{subtype}");
            }
        }
        other => bail!("unknown listing '{other}' (expected countries, regions, counties, cities or subtypes)"),
    }
    Ok(())
}

fn print_records(records: &[DivisionRecord]) {
    for record in records {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            record.id,
            record.country,
            record.region.as_deref().unwrap_or("-"),
            record.subtype,
            record.name,
            record.division_id
        );
    }
}

fn print_encoded(encoded: &EncodedGeometry) -> Result<()> {
    match encoded {
        EncodedGeometry::Text(text) => println!("{text}"),
        EncodedGeometry::Binary(bytes) => {
            // Raw WKB goes straight to stdout; redirect it to a file.
            std::io::stdout()
                .write_all(bytes)
                .context("writing binary geometry to stdout")?;
        }
    }
    Ok(())
}
