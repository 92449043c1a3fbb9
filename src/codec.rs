use std::str::FromStr;

use geo::{Coord, Geometry, LineString, Polygon};
use geojson::{GeoJson, Geometry as GeoJsonGeometry, Value as GeoJsonValue};
use wkt::{ToWkt, Wkt};

use crate::error::{EncodeError, ParseError};
use crate::shape::ShapeRecord;
use crate::AreaType;

/// Parses one WKT string into a shape record.
pub fn decode(text: &str) -> Result<ShapeRecord, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    check_parentheses(trimmed)?;

    let wkt: Wkt<f64> = Wkt::from_str(trimmed).map_err(|e| ParseError::Syntax(e.to_string()))?;
    Geometry::try_from(wkt).map_err(|e| ParseError::Conversion(e.to_string()))
}

// The WKT reader stops after the first complete geometry, so a stray closing
// parenthesis would otherwise go unnoticed.
fn check_parentheses(text: &str) -> Result<(), ParseError> {
    let mut open = Vec::new();
    for (position, c) in text.char_indices() {
        match c {
            '(' => open.push(position),
            ')' => {
                if open.pop().is_none() {
                    return Err(ParseError::UnbalancedParentheses { position });
                }
            }
            _ => {}
        }
    }
    match open.first() {
        Some(&position) => Err(ParseError::UnbalancedParentheses { position }),
        None => Ok(()),
    }
}

/// Parses a GeoJSON Geometry, Feature or FeatureCollection into shape records.
///
/// Features without a geometry are skipped.
pub fn decode_geojson(text: &str) -> Result<Vec<ShapeRecord>, ParseError> {
    let geojson = GeoJson::from_str(text).map_err(|e| ParseError::GeoJson(e.to_string()))?;

    let geometries: Vec<GeoJsonGeometry> = match geojson {
        GeoJson::Geometry(geometry) => vec![geometry],
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::FeatureCollection(fc) => {
            let total_features = fc.features.len();
            let geometries: Vec<_> = fc
                .features
                .into_iter()
                .filter_map(|feature| feature.geometry)
                .collect();
            if geometries.len() < total_features {
                log::warn!(
                    "Skipped {} features without geometry",
                    total_features - geometries.len()
                );
            }
            geometries
        }
    };

    geometries
        .into_iter()
        .map(|geometry| {
            Geometry::try_from(geometry).map_err(|e| ParseError::GeoJson(e.to_string()))
        })
        .collect()
}

/// Writes a shape record as WKT.
pub fn encode_wkt(shape: &ShapeRecord) -> String {
    shape.wkt_string()
}

/// Writes a shape record as a GeoJSON geometry object.
pub fn encode_geojson(shape: &ShapeRecord) -> Result<String, EncodeError> {
    let geometry = GeoJsonGeometry::new(to_geojson_value(shape));
    Ok(serde_json::to_string(&geometry)?)
}

pub fn encode(shape: &ShapeRecord, format: AreaType) -> Result<String, EncodeError> {
    match format {
        AreaType::Wkt => Ok(encode_wkt(shape)),
        AreaType::GeoJson => encode_geojson(shape),
    }
}

fn to_geojson_value(shape: &ShapeRecord) -> GeoJsonValue {
    match shape {
        Geometry::Point(point) => GeoJsonValue::Point(position(point.0)),
        Geometry::Line(line) => {
            GeoJsonValue::LineString(vec![position(line.start), position(line.end)])
        }
        Geometry::LineString(line) => GeoJsonValue::LineString(line_positions(line)),
        Geometry::Polygon(polygon) => GeoJsonValue::Polygon(polygon_rings(polygon)),
        Geometry::MultiPoint(points) => {
            GeoJsonValue::MultiPoint(points.iter().map(|p| position(p.0)).collect())
        }
        Geometry::MultiLineString(lines) => {
            GeoJsonValue::MultiLineString(lines.iter().map(line_positions).collect())
        }
        Geometry::MultiPolygon(polygons) => {
            GeoJsonValue::MultiPolygon(polygons.iter().map(polygon_rings).collect())
        }
        Geometry::GeometryCollection(collection) => GeoJsonValue::GeometryCollection(
            collection
                .iter()
                .map(|member| GeoJsonGeometry::new(to_geojson_value(member)))
                .collect(),
        ),
        Geometry::Rect(rect) => GeoJsonValue::Polygon(polygon_rings(&rect.to_polygon())),
        Geometry::Triangle(triangle) => {
            GeoJsonValue::Polygon(polygon_rings(&triangle.to_polygon()))
        }
    }
}

fn position(coord: Coord<f64>) -> Vec<f64> {
    vec![coord.x, coord.y]
}

fn line_positions(line: &LineString<f64>) -> Vec<Vec<f64>> {
    line.coords().map(|c| position(*c)).collect()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<Vec<f64>>> {
    let mut rings = vec![line_positions(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(line_positions));
    rings
}
