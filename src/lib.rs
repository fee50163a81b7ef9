//! Gazetteer - hierarchical well-known location resolution
//!
//! Resolves place paths like `us.ca.sanfrancisco` against a static
//! administrative-division catalog and materializes the matching division's
//! geometry in standard encodings (WKT, WKB, hex-WKB, GeoJSON, SVG).
//!
//! This library provides shared types and modules for the ingest and query
//! binaries.

pub mod catalog;
pub mod error;
pub mod geometry;
pub mod models;
pub mod resolver;

pub use catalog::{Catalog, DivisionFilter, NamePattern};
pub use error::{Error, Result};
pub use geometry::{
    EncodedGeometry, GeometryEncoding, GeometrySource, MemoryGeometrySource, SledGeometrySource,
};
pub use models::{DivisionRecord, Subtype};
pub use resolver::{PlacePath, Resolution, Resolver};
