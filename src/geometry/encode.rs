//! Output encoders over `geo_types` geometries.

use std::fmt;
use std::str::FromStr;

use geo_types::{Geometry, LineString, Point, Polygon};
use wkt::ToWkt;

use crate::error::{Error, Result};

/// The supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryEncoding {
    Wkt,
    Wkb,
    HexWkb,
    GeoJson,
    Svg,
}

impl GeometryEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryEncoding::Wkt => "wkt",
            GeometryEncoding::Wkb => "wkb",
            GeometryEncoding::HexWkb => "hexwkb",
            GeometryEncoding::GeoJson => "geojson",
            GeometryEncoding::Svg => "svg",
        }
    }
}

impl fmt::Display for GeometryEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wkt" => Ok(GeometryEncoding::Wkt),
            "wkb" => Ok(GeometryEncoding::Wkb),
            "hexwkb" => Ok(GeometryEncoding::HexWkb),
            "geojson" => Ok(GeometryEncoding::GeoJson),
            "svg" => Ok(GeometryEncoding::Svg),
            other => Err(format!(
                "unknown encoding '{other}' (expected wkt, wkb, hexwkb, geojson or svg)"
            )),
        }
    }
}

/// An encoded geometry payload. WKB is binary; everything else is text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedGeometry {
    Text(String),
    Binary(Vec<u8>),
}

impl EncodedGeometry {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EncodedGeometry::Text(text) => Some(text),
            EncodedGeometry::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EncodedGeometry::Text(text) => text.as_bytes(),
            EncodedGeometry::Binary(bytes) => bytes,
        }
    }
}

/// Encode a geometry in the requested representation.
pub fn encode(geometry: &Geometry<f64>, encoding: GeometryEncoding) -> Result<EncodedGeometry> {
    match encoding {
        GeometryEncoding::Wkt => Ok(EncodedGeometry::Text(wkt_string(geometry))),
        GeometryEncoding::Wkb => wkb_bytes(geometry).map(EncodedGeometry::Binary),
        GeometryEncoding::HexWkb => hexwkb_string(geometry).map(EncodedGeometry::Text),
        GeometryEncoding::GeoJson => geojson_string(geometry).map(EncodedGeometry::Text),
        GeometryEncoding::Svg => Ok(EncodedGeometry::Text(svg_string(geometry))),
    }
}

pub fn wkt_string(geometry: &Geometry<f64>) -> String {
    geometry.wkt_string()
}

/// Little-endian ISO WKB.
pub fn wkb_bytes(geometry: &Geometry<f64>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    wkb::writer::write_geometry(&mut buf, geometry, &wkb::writer::WriteOptions::default())
        .map_err(|e| Error::Geometry {
            message: format!("wkb encoding failed: {e}"),
        })?;
    Ok(buf)
}

pub fn hexwkb_string(geometry: &Geometry<f64>) -> Result<String> {
    Ok(hex::encode_upper(wkb_bytes(geometry)?))
}

/// A bare GeoJSON geometry object: `{"type": ..., "coordinates": ...}`.
pub fn geojson_string(geometry: &Geometry<f64>) -> Result<String> {
    let value = geojson::Value::from(geometry);
    serde_json::to_string(&geojson::Geometry::new(value)).map_err(|e| Error::Geometry {
        message: format!("geojson encoding failed: {e}"),
    })
}

/// A path-only SVG fragment: absolute coordinates, y negated (SVG's y axis
/// points down), no viewbox or styling.
pub fn svg_string(geometry: &Geometry<f64>) -> String {
    let mut out = String::new();
    write_svg(&mut out, geometry);
    out
}

fn write_svg(out: &mut String, geometry: &Geometry<f64>) {
    match geometry {
        Geometry::Point(point) => write_svg_point(out, point),
        Geometry::MultiPoint(points) => {
            for (i, point) in points.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_svg_point(out, point);
            }
        }
        Geometry::Line(line) => {
            write_svg_path(out, &[line.start, line.end], false);
        }
        Geometry::LineString(line) => write_svg_path(out, &line.0, false),
        Geometry::MultiLineString(lines) => {
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_svg_path(out, &line.0, false);
            }
        }
        Geometry::Polygon(polygon) => write_svg_polygon(out, polygon),
        Geometry::MultiPolygon(polygons) => {
            for (i, polygon) in polygons.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_svg_polygon(out, polygon);
            }
        }
        Geometry::Rect(rect) => write_svg_polygon(out, &rect.to_polygon()),
        Geometry::Triangle(triangle) => write_svg_polygon(out, &triangle.to_polygon()),
        Geometry::GeometryCollection(collection) => {
            for (i, member) in collection.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                write_svg(out, member);
            }
        }
    }
}

fn write_svg_point(out: &mut String, point: &Point<f64>) {
    out.push_str(&format!(
        "cx=\"{}\" cy=\"{}\"",
        fmt_coord(point.x()),
        fmt_coord(-point.y())
    ));
}

fn write_svg_polygon(out: &mut String, polygon: &Polygon<f64>) {
    write_svg_ring(out, polygon.exterior());
    for interior in polygon.interiors() {
        out.push(' ');
        write_svg_ring(out, interior);
    }
}

fn write_svg_ring(out: &mut String, ring: &LineString<f64>) {
    // Rings repeat their first coordinate at the end; Z closes instead.
    let coords = match ring.0.split_last() {
        Some((last, rest)) if ring.0.len() > 1 && last == &ring.0[0] => rest,
        _ => &ring.0[..],
    };
    write_svg_path(out, coords, true);
}

fn write_svg_path(out: &mut String, coords: &[geo_types::Coord<f64>], close: bool) {
    for (i, coord) in coords.iter().enumerate() {
        match i {
            0 => out.push_str("M "),
            1 => out.push_str(" L "),
            _ => out.push(' '),
        }
        out.push_str(&format!("{} {}", fmt_coord(coord.x), fmt_coord(-coord.y)));
    }
    if close {
        out.push_str(" Z");
    }
}

fn fmt_coord(value: f64) -> String {
    // Avoids "-0" for coordinates sitting exactly on an axis.
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, polygon, MultiPolygon};

    fn square() -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ])
    }

    #[test]
    fn test_wkt_output() {
        let text = wkt_string(&square());
        assert!(text.starts_with("POLYGON"));

        let multi = Geometry::MultiPolygon(MultiPolygon::new(vec![polygon![
            (x: -122.0, y: 37.0),
            (x: -122.0, y: 38.0),
            (x: -121.0, y: 38.0),
            (x: -122.0, y: 37.0),
        ]]));
        assert!(wkt_string(&multi).starts_with("MULTIPOLYGON"));
    }

    #[test]
    fn test_wkb_is_little_endian_polygon() {
        let bytes = wkb_bytes(&square()).unwrap();
        // byte order marker, then geometry type 3 (polygon) as LE u32
        assert_eq!(bytes[0], 1);
        assert_eq!(u32::from_le_bytes(bytes[1..5].try_into().unwrap()), 3);
    }

    #[test]
    fn test_hexwkb_is_uppercase_hex_of_wkb() {
        let bytes = wkb_bytes(&square()).unwrap();
        let hex_text = hexwkb_string(&square()).unwrap();
        assert_eq!(hex_text.len(), bytes.len() * 2);
        assert!(hex_text.starts_with("01"));
        assert!(hex_text.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hex_text, hex_text.to_uppercase());
    }

    #[test]
    fn test_geojson_is_a_geometry_object() {
        let text = geojson_string(&square()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "Polygon");
        assert!(value["coordinates"].is_array());
    }

    #[test]
    fn test_svg_path_fragment() {
        let text = svg_string(&square());
        assert_eq!(text, "M 0 0 L 1 0 1 -1 0 -1 Z");
        assert!(!text.contains("svg"));
    }

    #[test]
    fn test_svg_point_and_linestring() {
        let point = Geometry::Point(Point::new(2.5, 3.5));
        assert_eq!(svg_string(&point), "cx=\"2.5\" cy=\"-3.5\"");

        let line = Geometry::LineString(geo_types::line_string![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 2.0),
        ]);
        assert_eq!(svg_string(&line), "M 0 0 L 4 -2");
    }

    #[test]
    fn test_encode_dispatch() {
        let geometry = square();
        assert!(matches!(
            encode(&geometry, GeometryEncoding::Wkb).unwrap(),
            EncodedGeometry::Binary(_)
        ));
        for encoding in [
            GeometryEncoding::Wkt,
            GeometryEncoding::HexWkb,
            GeometryEncoding::GeoJson,
            GeometryEncoding::Svg,
        ] {
            assert!(matches!(
                encode(&geometry, encoding).unwrap(),
                EncodedGeometry::Text(_)
            ));
        }
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!(
            "hexwkb".parse::<GeometryEncoding>().unwrap(),
            GeometryEncoding::HexWkb
        );
        assert_eq!(
            "GeoJSON".parse::<GeometryEncoding>().unwrap(),
            GeometryEncoding::GeoJson
        );
        assert!("shapefile".parse::<GeometryEncoding>().is_err());
    }
}
