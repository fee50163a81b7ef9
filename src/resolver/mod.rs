//! The hierarchical resolver.
//!
//! Maps a [`PlacePath`] to a [`Resolution`] with level-aware matching rules
//! (country code, composite region code, fuzzy locality name), exposes the
//! listing operations with their level constraints, and materializes
//! geometry for resolved paths through a [`GeometrySource`].

mod path;

pub use path::PlacePath;

use std::sync::Arc;

use geo_types::Geometry;
use tracing::debug;

use crate::catalog::{Catalog, DivisionFilter, NamePattern};
use crate::error::{Error, Result};
use crate::geometry::{encode, EncodedGeometry, GeometryEncoding, GeometrySource};
use crate::models::{DivisionRecord, Subtype};

/// Outcome of resolving a path against the catalog.
///
/// Ambiguity is a valid outcome, not an error: several localities can share
/// a name within a region. `Ambiguous` records are in ascending-`id` order,
/// so "first" is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    Unique(DivisionRecord),
    Ambiguous(Vec<DivisionRecord>),
}

impl Resolution {
    fn from_records(mut records: Vec<DivisionRecord>) -> Self {
        match records.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Unique(records.remove(0)),
            _ => Resolution::Ambiguous(records),
        }
    }

    pub fn records(&self) -> &[DivisionRecord] {
        match self {
            Resolution::NotFound => &[],
            Resolution::Unique(record) => std::slice::from_ref(record),
            Resolution::Ambiguous(records) => records,
        }
    }

    /// First record in catalog order, if any matched.
    pub fn first(&self) -> Option<&DivisionRecord> {
        self.records().first()
    }

    pub fn is_unique(&self) -> bool {
        matches!(self, Resolution::Unique(_))
    }

    pub fn into_records(self) -> Vec<DivisionRecord> {
        match self {
            Resolution::NotFound => Vec::new(),
            Resolution::Unique(record) => vec![record],
            Resolution::Ambiguous(records) => records,
        }
    }
}

/// Resolves hierarchical place paths against the catalog and fetches
/// geometry from a [`GeometrySource`].
///
/// Carries no mutable state; concurrent resolutions on independent paths
/// need no locking beyond the `Arc` on the catalog.
pub struct Resolver<G> {
    catalog: Arc<Catalog>,
    geometry: G,
}

impl<G: GeometrySource> Resolver<G> {
    pub fn new(catalog: Arc<Catalog>, geometry: G) -> Self {
        Self { catalog, geometry }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolve a path per its depth: country code at depth 1, synthesized
    /// region code at depth 2, locality name pattern at depth 3.
    pub fn resolve(&self, path: &PlacePath) -> Result<Resolution> {
        let records = match path.segments() {
            [] => return Err(Error::EmptyPath),
            [_] => {
                let country = path.country_code().unwrap_or_default();
                self.catalog.find_country(&country)
            }
            [_, _] => {
                let country = path.country_code().unwrap_or_default();
                let region = path.region_code().unwrap_or_default();
                self.catalog.find_region(&country, &region)
            }
            [_, _, name] => {
                let country = path.country_code().unwrap_or_default();
                let region = path.region_code().unwrap_or_default();
                let pattern = NamePattern::new(name);
                self.catalog.find_within_region(
                    &country,
                    &region,
                    Subtype::locality_levels(),
                    Some(&pattern),
                )
            }
            segments => {
                // Unreachable through extend, which caps the depth.
                return Err(Error::PathTooDeep {
                    path: path.to_string(),
                    depth: segments.len(),
                });
            }
        };
        debug!("Resolved '{}' to {} record(s)", path, records.len());
        Ok(Resolution::from_records(
            records.into_iter().cloned().collect(),
        ))
    }

    /// All country rows, deduplicated by id. Root path only.
    pub fn countries(&self, path: &PlacePath) -> Result<Vec<DivisionRecord>> {
        self.require_root("countries", path)?;
        Ok(self
            .catalog
            .list_distinct(&Subtype::Country)
            .into_iter()
            .cloned()
            .collect())
    }

    /// All regions under a single-segment country path.
    pub fn regions(&self, path: &PlacePath) -> Result<Vec<DivisionRecord>> {
        if path.depth() != 1 {
            return Err(Error::InvalidPathForOperation {
                operation: "regions",
                path: path.to_string(),
                reason: "regions require a country path, e.g. us".to_string(),
            });
        }
        let country = path.country_code().unwrap_or_default();
        Ok(self
            .catalog
            .select(&DivisionFilter {
                country: Some(country.as_str()),
                subtypes: Some(std::slice::from_ref(&Subtype::Region)),
                ..Default::default()
            })
            .into_iter()
            .cloned()
            .collect())
    }

    /// County rows under a two-segment country.region path.
    ///
    /// A country-only path gets the stricter region-required message; other
    /// depths get the generic one.
    pub fn counties(&self, path: &PlacePath) -> Result<Vec<DivisionRecord>> {
        match path.depth() {
            2 => self.list_within_region(path, std::slice::from_ref(&Subtype::County)),
            1 => Err(Error::InvalidPathForOperation {
                operation: "counties",
                path: path.to_string(),
                reason: "counties require a region, e.g. us.ca".to_string(),
            }),
            _ => Err(Error::InvalidPathForOperation {
                operation: "counties",
                path: path.to_string(),
                reason: "expected a country.region path".to_string(),
            }),
        }
    }

    /// Locality and localadmin rows under a two-segment country.region path.
    pub fn cities(&self, path: &PlacePath) -> Result<Vec<DivisionRecord>> {
        if path.depth() != 2 {
            return Err(Error::InvalidPathForOperation {
                operation: "cities",
                path: path.to_string(),
                reason: "expected a country.region path".to_string(),
            });
        }
        self.list_within_region(path, Subtype::city_levels())
    }

    /// Every distinct subtype value in the catalog. Root path only.
    pub fn subtypes(&self, path: &PlacePath) -> Result<Vec<String>> {
        self.require_root("subtypes", path)?;
        Ok(self.catalog.list_subtypes())
    }

    /// Fetch and encode geometry for a resolved path.
    ///
    /// An ambiguous resolution collapses to its first record in catalog
    /// order; callers wanting the full set inspect [`resolve`] instead.
    ///
    /// [`resolve`]: Resolver::resolve
    pub fn geometry(
        &self,
        path: &PlacePath,
        encoding: GeometryEncoding,
    ) -> Result<EncodedGeometry> {
        encode(&self.fetch_resolved(path)?, encoding)
    }

    pub fn wkt(&self, path: &PlacePath) -> Result<String> {
        Ok(crate::geometry::wkt_string(
            &self.fetch_resolved(path)?,
        ))
    }

    pub fn wkb(&self, path: &PlacePath) -> Result<Vec<u8>> {
        crate::geometry::wkb_bytes(&self.fetch_resolved(path)?)
    }

    pub fn hexwkb(&self, path: &PlacePath) -> Result<String> {
        crate::geometry::hexwkb_string(&self.fetch_resolved(path)?)
    }

    pub fn geojson(&self, path: &PlacePath) -> Result<String> {
        crate::geometry::geojson_string(&self.fetch_resolved(path)?)
    }

    pub fn svg(&self, path: &PlacePath) -> Result<String> {
        Ok(crate::geometry::svg_string(
            &self.fetch_resolved(path)?,
        ))
    }

    fn fetch_resolved(&self, path: &PlacePath) -> Result<Geometry<f64>> {
        let resolution = self.resolve(path)?;
        let Some(record) = resolution.first() else {
            return Err(Error::NoResultForPath {
                path: path.to_string(),
            });
        };
        debug!("Fetching geometry for id '{}'", record.id);
        self.geometry
            .fetch(&record.id)?
            .ok_or_else(|| Error::GeometryNotFound {
                id: record.id.clone(),
            })
    }

    fn require_root(&self, operation: &'static str, path: &PlacePath) -> Result<()> {
        if path.is_empty() {
            return Ok(());
        }
        Err(Error::InvalidPathForOperation {
            operation,
            path: path.to_string(),
            reason: format!("{operation} starts from the root, not a path"),
        })
    }

    fn list_within_region(
        &self,
        path: &PlacePath,
        subtypes: &[Subtype],
    ) -> Result<Vec<DivisionRecord>> {
        let country = path.country_code().unwrap_or_default();
        let region = path.region_code().unwrap_or_default();
        Ok(self
            .catalog
            .find_within_region(&country, &region, subtypes, None)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MemoryGeometrySource;
    use geo_types::{polygon, MultiPolygon};

    fn record(
        id: &str,
        country: &str,
        region: Option<&str>,
        subtype: &str,
        name: &str,
    ) -> DivisionRecord {
        DivisionRecord {
            id: id.to_string(),
            country: country.to_string(),
            region: region.map(str::to_string),
            subtype: Subtype::from(subtype.to_string()),
            name: name.to_string(),
            division_id: format!("div_{id}"),
        }
    }

    /// Synthetic catalog exercising every level: US/CA with an ambiguous
    /// San Francisco pair, and IN/MH with 36 counties plus city rows.
    fn fixture() -> Resolver<MemoryGeometrySource> {
        let mut records = vec![
            record("us", "US", None, "country", "United States"),
            record("in", "IN", None, "country", "India"),
            record("us-ca", "US", Some("US-CA"), "region", "California"),
            record("us-ny", "US", Some("US-NY"), "region", "New York"),
            record("in-mh", "IN", Some("IN-MH"), "region", "Maharashtra"),
            record("sf-1", "US", Some("US-CA"), "locality", "San Francisco"),
            record("sf-2", "US", Some("US-CA"), "localadmin", "San Francisco"),
            record("oak", "US", Some("US-CA"), "locality", "Oakland"),
            record("ala", "US", Some("US-CA"), "county", "Alameda County"),
            record("mum-1", "IN", Some("IN-MH"), "locality", "Mumbai"),
            record("pun", "IN", Some("IN-MH"), "localadmin", "Pune"),
        ];
        for n in 0..36 {
            records.push(record(
                &format!("mh-county-{n:02}"),
                "IN",
                Some("IN-MH"),
                "county",
                &format!("District {n:02}"),
            ));
        }
        // "Mumbai City" sorts after "mum-1" by id on purpose.
        records.push(record(
            "mum-2",
            "IN",
            Some("IN-MH"),
            "localadmin",
            "Mumbai City",
        ));

        let mut geometries = MemoryGeometrySource::new();
        geometries.insert(
            "sf-1",
            Geometry::MultiPolygon(MultiPolygon::new(vec![polygon![
                (x: -122.99, y: 37.76),
                (x: -122.38, y: 37.76),
                (x: -122.38, y: 37.83),
                (x: -122.99, y: 37.76),
            ]])),
        );
        Resolver::new(Arc::new(Catalog::from_records(records)), geometries)
    }

    #[test]
    fn test_country_resolution_is_unique() {
        let resolver = fixture();
        let outcome = resolver
            .resolve(&PlacePath::new(["us"]).unwrap())
            .unwrap();
        match outcome {
            Resolution::Unique(record) => {
                assert_eq!(record.country, "US");
                assert_eq!(record.subtype, Subtype::Country);
            }
            other => panic!("expected unique country match, got {other:?}"),
        }

        let missing = resolver
            .resolve(&PlacePath::new(["zz"]).unwrap())
            .unwrap();
        assert_eq!(missing, Resolution::NotFound);
    }

    #[test]
    fn test_region_code_synthesis() {
        let resolver = fixture();
        let outcome = resolver
            .resolve(&PlacePath::new(["us", "ca"]).unwrap())
            .unwrap();
        let record = outcome.first().expect("region match");
        assert_eq!(record.region.as_deref(), Some("US-CA"));
        assert!(outcome.is_unique());
    }

    #[test]
    fn test_locality_match_is_space_and_case_insensitive() {
        let resolver = fixture();
        let spaced = resolver
            .resolve(&PlacePath::new(["us", "ca", "san francisco"]).unwrap())
            .unwrap();
        let jammed = resolver
            .resolve(&PlacePath::new(["US", "CA", "SanFrancisco"]).unwrap())
            .unwrap();
        assert_eq!(spaced, jammed);
    }

    #[test]
    fn test_ambiguity_is_an_outcome_with_stable_order() {
        let resolver = fixture();
        let outcome = resolver
            .resolve(&PlacePath::new(["us", "ca", "san francisco"]).unwrap())
            .unwrap();
        match &outcome {
            Resolution::Ambiguous(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[0].id, "sf-1");
                assert_eq!(records[1].id, "sf-2");
            }
            other => panic!("expected ambiguous match, got {other:?}"),
        }
        assert_eq!(outcome.first().map(|r| r.id.as_str()), Some("sf-1"));
    }

    #[test]
    fn test_wildcard_vs_exact() {
        let resolver = fixture();
        let wildcard = resolver
            .resolve(&PlacePath::new(["us", "ca", "san%"]).unwrap())
            .unwrap();
        assert_eq!(wildcard.records().len(), 2);

        let exact_miss = resolver
            .resolve(&PlacePath::new(["us", "ca", "san"]).unwrap())
            .unwrap();
        assert_eq!(exact_miss, Resolution::NotFound);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = fixture();
        let path = PlacePath::new(["in", "mh", "%a%"]).unwrap();
        let first = resolver.resolve(&path).unwrap();
        let second = resolver.resolve(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_path_is_an_error() {
        let resolver = fixture();
        assert!(matches!(
            resolver.resolve(&PlacePath::root()),
            Err(Error::EmptyPath)
        ));
    }

    #[test]
    fn test_countries_requires_root() {
        let resolver = fixture();
        let countries = resolver.countries(&PlacePath::root()).unwrap();
        assert_eq!(countries.len(), 2);

        let err = resolver
            .countries(&PlacePath::new(["us"]).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPathForOperation { .. }));
    }

    #[test]
    fn test_regions_requires_country_path() {
        let resolver = fixture();
        let regions = resolver
            .regions(&PlacePath::new(["us"]).unwrap())
            .unwrap();
        assert_eq!(regions.len(), 2);
        assert!(regions.iter().all(|r| r.subtype == Subtype::Region));

        assert!(resolver.regions(&PlacePath::root()).is_err());
        assert!(resolver
            .regions(&PlacePath::new(["us", "ca"]).unwrap())
            .is_err());
    }

    #[test]
    fn test_counties_listing_and_refined_message() {
        let resolver = fixture();
        let counties = resolver
            .counties(&PlacePath::new(["in", "mh"]).unwrap())
            .unwrap();
        assert_eq!(counties.len(), 36);
        assert!(counties.iter().all(|r| r.subtype == Subtype::County));

        let region_required = resolver
            .counties(&PlacePath::new(["in"]).unwrap())
            .unwrap_err();
        let too_deep = resolver
            .counties(&PlacePath::new(["in", "mh", "pune"]).unwrap())
            .unwrap_err();
        assert!(region_required.to_string().contains("require a region"));
        assert_ne!(region_required.to_string(), too_deep.to_string());
    }

    #[test]
    fn test_cities_excludes_counties_and_rejects_depth_3() {
        let resolver = fixture();
        let cities = resolver
            .cities(&PlacePath::new(["in", "mh"]).unwrap())
            .unwrap();
        assert_eq!(cities.len(), 3);
        assert!(cities
            .iter()
            .all(|r| Subtype::city_levels().contains(&r.subtype)));

        // Depth-3 filtering belongs to resolve, not the listings.
        assert!(resolver
            .cities(&PlacePath::new(["in", "mh", "mumbai"]).unwrap())
            .is_err());
    }

    #[test]
    fn test_cities_narrowed_by_pattern() {
        let resolver = fixture();
        let cities = resolver
            .cities(&PlacePath::new(["in", "mh"]).unwrap())
            .unwrap();
        let pattern = NamePattern::new("%Mumbai City%");
        let matches: Vec<&DivisionRecord> =
            cities.iter().filter(|r| pattern.matches(&r.name)).collect();
        assert!(!matches.is_empty());
        assert!(matches.iter().all(|r| r.name.contains("Mumbai City")));
    }

    #[test]
    fn test_name_pattern_narrowing_within_region() {
        let resolver = fixture();
        let outcome = resolver
            .resolve(&PlacePath::new(["in", "mh", "%mumbai city%"]).unwrap())
            .unwrap();
        let names: Vec<&str> = outcome.records().iter().map(|r| r.name.as_str()).collect();
        assert!(!names.is_empty());
        assert!(names.iter().all(|name| name.contains("Mumbai City")));
    }

    #[test]
    fn test_subtypes_listing() {
        let resolver = fixture();
        let subtypes = resolver.subtypes(&PlacePath::root()).unwrap();
        for expected in ["country", "region", "county", "locality", "localadmin"] {
            assert!(subtypes.iter().any(|s| s == expected), "missing {expected}");
        }
        assert!(resolver
            .subtypes(&PlacePath::new(["us"]).unwrap())
            .is_err());
    }

    #[test]
    fn test_geometry_for_resolved_locality() {
        let resolver = fixture();
        let path = PlacePath::new(["us", "ca", "sanfrancisco"]).unwrap();

        let wkt = resolver.wkt(&path).unwrap();
        assert!(wkt.starts_with("MULTIPOLYGON"));

        let wkb = resolver.wkb(&path).unwrap();
        assert_eq!(wkb[0], 1);

        let hexwkb = resolver.hexwkb(&path).unwrap();
        assert_eq!(hexwkb, hex::encode_upper(&wkb));

        let geojson: serde_json::Value =
            serde_json::from_str(&resolver.geojson(&path).unwrap()).unwrap();
        assert_eq!(geojson["type"], "MultiPolygon");

        let svg = resolver.svg(&path).unwrap();
        assert!(svg.starts_with("M "));
    }

    #[test]
    fn test_geometry_error_taxonomy() {
        let resolver = fixture();

        // Unmatched path: NoResultForPath, not GeometryNotFound.
        let err = resolver
            .wkt(&PlacePath::new(["us", "ca", "atlantis"]).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::NoResultForPath { .. }));

        // Catalog match without a geometry row: GeometryNotFound.
        let err = resolver
            .wkt(&PlacePath::new(["us", "ca", "oakland"]).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::GeometryNotFound { ref id } if id == "oak"));
    }

    #[test]
    fn test_ambiguous_geometry_collapses_to_first() {
        let resolver = fixture();
        // Two San Francisco rows; only sf-1 (the first by id) has geometry.
        let wkt = resolver
            .wkt(&PlacePath::new(["us", "ca", "san francisco"]).unwrap())
            .unwrap();
        assert!(wkt.starts_with("MULTIPOLYGON"));
    }
}
