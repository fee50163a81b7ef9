//! Geometry store implementations, keyed by division id.

use std::path::Path;

use geo_types::Geometry;
use hashbrown::HashMap;
use tracing::debug;
use wkt::TryFromWkt;

use crate::error::{Error, Result};

/// Access to the geometry dataset backing the catalog.
///
/// The store is much larger than the catalog and shares its `id` space; a
/// catalog match is not guaranteed to have a geometry row. Fetches are lazy
/// and never cached here - callers needing repeated access cache the encoded
/// result themselves.
pub trait GeometrySource {
    fn fetch(&self, id: &str) -> Result<Option<Geometry<f64>>>;
}

impl<G: GeometrySource + ?Sized> GeometrySource for Box<G> {
    fn fetch(&self, id: &str) -> Result<Option<Geometry<f64>>> {
        (**self).fetch(id)
    }
}

impl<G: GeometrySource + ?Sized> GeometrySource for &G {
    fn fetch(&self, id: &str) -> Result<Option<Geometry<f64>>> {
        (**self).fetch(id)
    }
}

/// Sled-backed store of `id -> WKT bytes`, produced by the ingest binary.
pub struct SledGeometrySource {
    db: sled::Db,
}

impl SledGeometrySource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| Error::Geometry {
            message: format!("failed to open geometry store at {}: {e}", path.display()),
        })?;
        debug!("Opened geometry store at {}", path.display());
        Ok(Self { db })
    }

    /// Store one geometry. The WKT is validated now so `fetch` never sees a
    /// malformed row.
    pub fn insert(&self, id: &str, wkt_text: &str) -> Result<()> {
        parse_wkt(id, wkt_text)?;
        self.db
            .insert(id.as_bytes(), wkt_text.as_bytes())
            .map_err(store_error)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush().map_err(store_error)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl GeometrySource for SledGeometrySource {
    fn fetch(&self, id: &str) -> Result<Option<Geometry<f64>>> {
        let Some(bytes) = self.db.get(id.as_bytes()).map_err(store_error)? else {
            return Ok(None);
        };
        let text = std::str::from_utf8(&bytes).map_err(|e| Error::Geometry {
            message: format!("stored geometry for id '{id}' is not utf-8: {e}"),
        })?;
        parse_wkt(id, text).map(Some)
    }
}

fn store_error(e: sled::Error) -> Error {
    Error::Geometry {
        message: format!("geometry store error: {e}"),
    }
}

fn parse_wkt(id: &str, text: &str) -> Result<Geometry<f64>> {
    Geometry::try_from_wkt_str(text).map_err(|e| Error::Geometry {
        message: format!("invalid wkt for id '{id}': {e}"),
    })
}

/// In-memory store for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryGeometrySource {
    geometries: HashMap<String, Geometry<f64>>,
}

impl MemoryGeometrySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, geometry: Geometry<f64>) {
        self.geometries.insert(id.into(), geometry);
    }
}

impl GeometrySource for MemoryGeometrySource {
    fn fetch(&self, id: &str) -> Result<Option<Geometry<f64>>> {
        Ok(self.geometries.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;

    #[test]
    fn test_memory_source_fetch() {
        let mut source = MemoryGeometrySource::new();
        source.insert("d1", Geometry::Point(Point::new(1.0, 2.0)));

        assert!(source.fetch("d1").unwrap().is_some());
        assert!(source.fetch("d2").unwrap().is_none());
    }

    #[test]
    fn test_sled_source_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = SledGeometrySource::open(dir.path().join("geoms")).unwrap();

        source
            .insert("d1", "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)))")
            .unwrap();
        source.flush().unwrap();
        assert_eq!(source.len(), 1);

        let geometry = source.fetch("d1").unwrap().unwrap();
        assert!(matches!(geometry, Geometry::MultiPolygon(_)));
        assert!(source.fetch("missing").unwrap().is_none());
    }

    #[test]
    fn test_sled_insert_rejects_bad_wkt() {
        let dir = tempfile::tempdir().unwrap();
        let source = SledGeometrySource::open(dir.path().join("geoms")).unwrap();

        assert!(source.insert("d1", "NOT A GEOMETRY").is_err());
        assert!(source.is_empty());
    }
}
