//! The static division catalog.
//!
//! Loaded once from a packaged CSV dataset and immutable afterwards; share
//! it via `Arc` for concurrent readers. All queries are structured filters -
//! the catalog never interpolates user input into a query string.

mod pattern;

pub use pattern::NamePattern;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use hashbrown::HashMap;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{DivisionRecord, Subtype};

/// A structured filter over catalog rows. All present predicates are ANDed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DivisionFilter<'a> {
    /// Equality on the uppercase country code.
    pub country: Option<&'a str>,
    /// Equality on the composite uppercase region code.
    pub region: Option<&'a str>,
    /// Membership in a subtype set.
    pub subtypes: Option<&'a [Subtype]>,
    /// Normalized name pattern, see [`NamePattern`].
    pub name: Option<&'a NamePattern>,
}

impl DivisionFilter<'_> {
    fn matches(&self, record: &DivisionRecord) -> bool {
        if let Some(country) = self.country {
            if record.country != country {
                return false;
            }
        }
        if let Some(region) = self.region {
            if record.region.as_deref() != Some(region) {
                return false;
            }
        }
        if let Some(subtypes) = self.subtypes {
            if !subtypes.contains(&record.subtype) {
                return false;
            }
        }
        if let Some(name) = self.name {
            if !name.matches(&record.name) {
                return false;
            }
        }
        true
    }
}

/// The read-only division catalog.
///
/// Records are held sorted by ascending `id`, and every query preserves that
/// order. "First match" is therefore stable across runs, which is what makes
/// the geometry operations deterministic under ambiguity.
pub struct Catalog {
    records: Vec<DivisionRecord>,
    by_country: HashMap<String, Vec<usize>>,
}

impl Catalog {
    /// Load the catalog from a CSV dataset with columns
    /// `id,country,region,subtype,name,division_id`. A `.gz` extension is
    /// transparently decompressed.
    ///
    /// Any I/O or parse failure is fatal: no partial catalog is tolerated.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let init_err = |message: String| Error::Initialization {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| init_err(e.to_string()))?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();
        for row in csv_reader.deserialize() {
            let record: DivisionRecord = row.map_err(|e| init_err(e.to_string()))?;
            records.push(record);
        }
        if records.is_empty() {
            return Err(init_err("dataset contains no rows".to_string()));
        }

        info!(
            "Loaded {} division records from {}",
            records.len(),
            path.display()
        );
        Ok(Self::from_records(records))
    }

    /// Build a catalog from already-materialized records (embedding, tests).
    pub fn from_records(mut records: Vec<DivisionRecord>) -> Self {
        records.sort_by(|a, b| a.id.cmp(&b.id));
        let mut by_country: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_country
                .entry(record.country.clone())
                .or_default()
                .push(idx);
        }
        Self { records, by_country }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run a structured filter. Results come back in ascending-`id` order.
    pub fn select(&self, filter: &DivisionFilter<'_>) -> Vec<&DivisionRecord> {
        // The country index keeps single-country filters from scanning the
        // whole table; indices are stored sorted, so order is preserved.
        match filter.country {
            Some(country) => self
                .by_country
                .get(country)
                .into_iter()
                .flatten()
                .map(|&idx| &self.records[idx])
                .filter(|record| filter.matches(record))
                .collect(),
            None => self
                .records
                .iter()
                .filter(|record| filter.matches(record))
                .collect(),
        }
    }

    /// Country rows for an uppercase ISO code.
    pub fn find_country(&self, country: &str) -> Vec<&DivisionRecord> {
        self.select(&DivisionFilter {
            country: Some(country),
            subtypes: Some(std::slice::from_ref(&Subtype::Country)),
            ..Default::default()
        })
    }

    /// Region rows for an uppercase composite code like `US-CA`.
    pub fn find_region(&self, country: &str, region: &str) -> Vec<&DivisionRecord> {
        self.select(&DivisionFilter {
            country: Some(country),
            region: Some(region),
            subtypes: Some(std::slice::from_ref(&Subtype::Region)),
            ..Default::default()
        })
    }

    /// Rows below region level, optionally narrowed by a name pattern.
    pub fn find_within_region(
        &self,
        country: &str,
        region: &str,
        subtypes: &[Subtype],
        name: Option<&NamePattern>,
    ) -> Vec<&DivisionRecord> {
        self.select(&DivisionFilter {
            country: Some(country),
            region: Some(region),
            subtypes: Some(subtypes),
            name,
        })
    }

    /// All rows of one subtype, deduplicated by `id`.
    pub fn list_distinct(&self, subtype: &Subtype) -> Vec<&DivisionRecord> {
        let mut rows = self.select(&DivisionFilter {
            subtypes: Some(std::slice::from_ref(subtype)),
            ..Default::default()
        });
        // Rows are id-sorted, so adjacent dedup is enough.
        rows.dedup_by(|a, b| a.id == b.id);
        rows
    }

    /// Every distinct subtype value present in the dataset, sorted.
    pub fn list_subtypes(&self) -> Vec<String> {
        let mut subtypes: Vec<String> = self
            .records
            .iter()
            .map(|record| record.subtype.as_str().to_string())
            .collect();
        subtypes.sort();
        subtypes.dedup();
        subtypes
    }
}
