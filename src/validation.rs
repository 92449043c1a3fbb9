// Checks that run on every ring before the overlay sees it

use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line, LineString, Polygon};
use rstar::{RTree, RTreeObject, AABB};

use crate::error::{RingDefect, TopologyError};
use crate::shape::PolygonalShape;

struct Segment {
    ring: usize,
    position: usize,
    line: Line<f64>,
}

impl RTreeObject for Segment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.line.start.x, self.line.start.y],
            [self.line.end.x, self.line.end.y],
        )
    }
}

/// Checks every shape in order and stops at the first invalid ring.
pub fn validate_all(shapes: &[PolygonalShape]) -> Result<(), TopologyError> {
    shapes.iter().try_for_each(validate_polygonal)
}

/// Checks every ring of one accepted shape, then the rings of each polygon
/// against each other. Polygons with an empty exterior are treated as empty
/// and pass. Parts of a MultiPolygon may overlap; the union dissolves them.
pub fn validate_polygonal(shape: &PolygonalShape) -> Result<(), TopologyError> {
    let mut ring = 0;
    for polygon in shape.shape.polygons() {
        let first = ring;
        ring += 1 + polygon.interiors().len();
        if polygon.exterior().0.is_empty() {
            continue;
        }
        let invalid = |(offset, defect): (usize, RingDefect)| TopologyError::InvalidRing {
            index: shape.index,
            ring: first + offset,
            defect,
        };
        for (offset, r) in rings(polygon).enumerate() {
            validate_ring(r).map_err(|defect| invalid((offset, defect)))?;
        }
        validate_holes(polygon).map_err(invalid)?;
    }
    Ok(())
}

fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(polygon.exterior()).chain(polygon.interiors())
}

// Rings of one polygon may touch at single points but must not cross or share
// an edge, and every hole has to sit inside the shell. Returns the offending
// ring's offset within the polygon.
fn validate_holes(polygon: &Polygon<f64>) -> Result<(), (usize, RingDefect)> {
    if polygon.interiors().is_empty() {
        return Ok(());
    }

    let shell = Polygon::new(polygon.exterior().clone(), Vec::new());
    for (offset, hole) in polygon.interiors().iter().enumerate() {
        if hole
            .coords()
            .any(|c| shell.coordinate_position(c) == CoordPos::Outside)
        {
            return Err((offset + 1, RingDefect::OutsideShell));
        }
    }

    let edges: Vec<Segment> = rings(polygon)
        .enumerate()
        .flat_map(|(ring, r)| segments(ring, &distinct_closed_vertices(r)))
        .collect();
    let tree = RTree::bulk_load(edges);

    for a in tree.iter() {
        for b in tree.locate_in_envelope_intersecting(&a.envelope()) {
            if b.ring <= a.ring {
                continue;
            }
            match line_intersection(a.line, b.line) {
                None | Some(LineIntersection::SinglePoint { is_proper: false, .. }) => {}
                Some(LineIntersection::Collinear { intersection })
                    if intersection.start == intersection.end => {}
                Some(_) => return Err((b.ring, RingDefect::CrossesRing)),
            }
        }
    }

    Ok(())
}

pub fn validate_ring(ring: &LineString<f64>) -> Result<(), RingDefect> {
    if ring.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(RingDefect::NonFiniteCoordinate);
    }

    let vertices = distinct_closed_vertices(ring);
    if vertices.len() < 4 {
        return Err(RingDefect::TooFewVertices);
    }

    let last = vertices.len() - 2;
    let tree = RTree::bulk_load(segments(0, &vertices));

    for a in tree.iter() {
        for b in tree.locate_in_envelope_intersecting(&a.envelope()) {
            if b.position <= a.position {
                continue;
            }
            let adjacent = b.position == a.position + 1 || (a.position == 0 && b.position == last);
            match line_intersection(a.line, b.line) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::Collinear { intersection })
                    if adjacent && intersection.start == intersection.end => {}
                Some(_) => return Err(RingDefect::SelfIntersection),
            }
        }
    }

    Ok(())
}

fn segments(ring: usize, vertices: &[Coord<f64>]) -> Vec<Segment> {
    vertices
        .windows(2)
        .enumerate()
        .map(|(position, pair)| Segment {
            ring,
            position,
            line: Line::new(pair[0], pair[1]),
        })
        .collect()
}

// Drops repeated consecutive vertices and makes sure the ring ends where it starts.
fn distinct_closed_vertices(ring: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut vertices: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len() + 1);
    for c in ring.coords() {
        if vertices.last() != Some(c) {
            vertices.push(*c);
        }
    }
    if let (Some(&first), Some(&end)) = (vertices.first(), vertices.last()) {
        if first != end {
            vertices.push(first);
        }
    }
    vertices
}
