//! Geometry materialization: the store seam and the output encoders.

mod encode;
mod source;

pub use encode::{
    encode, geojson_string, hexwkb_string, svg_string, wkb_bytes, wkt_string, EncodedGeometry,
    GeometryEncoding,
};
pub use source::{GeometrySource, MemoryGeometrySource, SledGeometrySource};
