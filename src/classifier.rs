use geo::Geometry;

use crate::error::InvalidKindError;
use crate::shape::{Polygonal, PolygonalShape, ShapeKind, ShapeRecord};

/// Result of splitting a batch into shapes that can be unioned and shapes that can't.
#[derive(Debug, Default)]
pub struct Filtered {
    pub accepted: Vec<PolygonalShape>,
    pub rejected: Vec<(usize, InvalidKindError)>,
}

/// Keeps Polygon and MultiPolygon shapes in their original order and reports
/// every other kind. GeometryCollections are rejected as a whole, even when
/// all of their members are polygons.
pub fn filter_polygonal<I>(shapes: I) -> Filtered
where
    I: IntoIterator<Item = (usize, ShapeRecord)>,
{
    let mut filtered = Filtered::default();

    for (index, shape) in shapes {
        match shape {
            Geometry::Polygon(polygon) => filtered.accepted.push(PolygonalShape {
                index,
                shape: Polygonal::Polygon(polygon),
            }),
            Geometry::MultiPolygon(multi) => filtered.accepted.push(PolygonalShape {
                index,
                shape: Polygonal::MultiPolygon(multi),
            }),
            Geometry::Point(_)
            | Geometry::Line(_)
            | Geometry::LineString(_)
            | Geometry::MultiPoint(_)
            | Geometry::MultiLineString(_)
            | Geometry::GeometryCollection(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => {
                let kind = ShapeKind::of(&shape);
                log::warn!("Shape {} of invalid type {} not combined", index, kind);
                filtered.rejected.push((index, InvalidKindError { kind }));
            }
        }
    }

    filtered
}
