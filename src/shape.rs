use std::fmt;

use geo::{Geometry, MultiPolygon, Polygon};

pub type ShapeRecord = Geometry<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Point,
    Line,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    Rect,
    Triangle,
}

impl ShapeKind {
    pub fn of(shape: &ShapeRecord) -> Self {
        match shape {
            Geometry::Point(_) => ShapeKind::Point,
            Geometry::Line(_) => ShapeKind::Line,
            Geometry::LineString(_) => ShapeKind::LineString,
            Geometry::Polygon(_) => ShapeKind::Polygon,
            Geometry::MultiPoint(_) => ShapeKind::MultiPoint,
            Geometry::MultiLineString(_) => ShapeKind::MultiLineString,
            Geometry::MultiPolygon(_) => ShapeKind::MultiPolygon,
            Geometry::GeometryCollection(_) => ShapeKind::GeometryCollection,
            Geometry::Rect(_) => ShapeKind::Rect,
            Geometry::Triangle(_) => ShapeKind::Triangle,
        }
    }

    pub fn is_polygonal(self) -> bool {
        matches!(self, ShapeKind::Polygon | ShapeKind::MultiPolygon)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Point => "Point",
            ShapeKind::Line => "Line",
            ShapeKind::LineString => "LineString",
            ShapeKind::Polygon => "Polygon",
            ShapeKind::MultiPoint => "MultiPoint",
            ShapeKind::MultiLineString => "MultiLineString",
            ShapeKind::MultiPolygon => "MultiPolygon",
            ShapeKind::GeometryCollection => "GeometryCollection",
            ShapeKind::Rect => "Rect",
            ShapeKind::Triangle => "Triangle",
        };
        f.write_str(name)
    }
}

/// A shape that passed classification.
#[derive(Debug, Clone, PartialEq)]
pub enum Polygonal {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Polygonal {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Polygonal::Polygon(_) => ShapeKind::Polygon,
            Polygonal::MultiPolygon(_) => ShapeKind::MultiPolygon,
        }
    }

    /// Polygons making up this shape, in order.
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            Polygonal::Polygon(polygon) => std::slice::from_ref(polygon),
            Polygonal::MultiPolygon(multi) => &multi.0,
        }
    }

    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(self.polygons().to_vec())
    }

    pub fn into_geometry(self) -> ShapeRecord {
        match self {
            Polygonal::Polygon(polygon) => Geometry::Polygon(polygon),
            Polygonal::MultiPolygon(multi) => Geometry::MultiPolygon(multi),
        }
    }
}

/// An accepted shape and its index in the submitted batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonalShape {
    pub index: usize,
    pub shape: Polygonal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon, GeometryCollection};

    #[test]
    fn kind_tags_follow_geometry_variant() {
        let point: ShapeRecord = point!(x: 1.0, y: 2.0).into();
        let line: ShapeRecord = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into();
        let square: ShapeRecord =
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)].into();
        let collection: ShapeRecord = Geometry::GeometryCollection(GeometryCollection(vec![point.clone()]));

        assert_eq!(ShapeKind::of(&point), ShapeKind::Point);
        assert_eq!(ShapeKind::of(&line), ShapeKind::LineString);
        assert_eq!(ShapeKind::of(&square), ShapeKind::Polygon);
        assert_eq!(ShapeKind::of(&collection), ShapeKind::GeometryCollection);
        assert!(ShapeKind::of(&square).is_polygonal());
        assert!(!ShapeKind::of(&collection).is_polygonal());
    }

    #[test]
    fn polygon_views_as_single_part_multipolygon() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let shape = Polygonal::Polygon(square.clone());

        assert_eq!(shape.polygons().len(), 1);
        assert_eq!(shape.to_multi_polygon(), MultiPolygon::new(vec![square]));
        assert_eq!(shape.kind().to_string(), "Polygon");
    }
}
