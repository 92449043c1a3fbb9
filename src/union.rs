use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use geo::algorithm::bool_ops::BooleanOps;
use geo::{Geometry, MultiPolygon, Polygon};
use thiserror::Error;

use crate::error::TopologyError;
use crate::shape::{PolygonalShape, ShapeKind, ShapeRecord};

/// Sub-batches smaller than this are merged on the current thread.
pub const PARALLEL_THRESHOLD: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum UnionResult {
    /// There was nothing with area to combine.
    Empty,
    Shape(ShapeRecord),
}

impl UnionResult {
    pub fn kind(&self) -> Option<ShapeKind> {
        match self {
            UnionResult::Empty => None,
            UnionResult::Shape(shape) => Some(ShapeKind::of(shape)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnionError {
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("union exceeded its deadline after {elapsed:?}")]
    DeadlineExceeded { elapsed: Duration },
}

/// Runs the cascade with an optional time bound and optional parallel halves.
#[derive(Debug, Clone, Copy)]
pub struct UnionEngine {
    pub parallel: bool,
    pub deadline: Option<Duration>,
}

impl Default for UnionEngine {
    fn default() -> Self {
        Self {
            parallel: true,
            deadline: None,
        }
    }
}

// One polygon of an accepted shape. Parts of a MultiPolygon become separate
// leaves so overlapping parts get dissolved instead of cancelling out.
struct Leaf {
    index: usize,
    polygon: Polygon<f64>,
}

struct Cascade {
    parallel: bool,
    started: Instant,
    deadline: Option<Instant>,
}

impl UnionEngine {
    /// Unions every accepted shape into one.
    ///
    /// A lone polygon is returned untouched. Otherwise the result is a Polygon
    /// when everything merged into one connected region and a MultiPolygon
    /// with one part per region when it didn't.
    pub fn union(&self, mut shapes: Vec<PolygonalShape>) -> Result<UnionResult, UnionError> {
        let leaves = leaves(&shapes);
        match leaves.len() {
            0 => return Ok(UnionResult::Empty),
            1 if shapes.len() == 1 => {
                return Ok(UnionResult::Shape(shapes.remove(0).shape.into_geometry()));
            }
            _ => {}
        }

        let started = Instant::now();
        let cascade = Cascade {
            parallel: self.parallel,
            started,
            deadline: self.deadline.map(|d| started + d),
        };

        let merged = cascade.merge(&leaves)?;
        log::debug!(
            "Merged {} polygons from {} shapes into {} parts in {:?}",
            leaves.len(),
            shapes.len(),
            merged.0.len(),
            started.elapsed()
        );
        Ok(into_result(merged))
    }
}

pub fn union(shapes: Vec<PolygonalShape>) -> Result<UnionResult, UnionError> {
    UnionEngine::default().union(shapes)
}

impl Cascade {
    fn merge(&self, leaves: &[Leaf]) -> Result<MultiPolygon<f64>, UnionError> {
        match leaves {
            [] => Ok(MultiPolygon::new(Vec::new())),
            [single] => Ok(MultiPolygon::new(vec![single.polygon.clone()])),
            _ => {
                let (left, right) = leaves.split_at(leaves.len() / 2);
                let (a, b) = if self.parallel && leaves.len() >= PARALLEL_THRESHOLD {
                    rayon::join(|| self.merge(left), || self.merge(right))
                } else {
                    (self.merge(left), self.merge(right))
                };
                let (a, b) = (a?, b?);

                self.check_deadline()?;
                overlay_with(|a, b| a.union(b), &a, &b, leaves)
            }
        }
    }

    fn check_deadline(&self) -> Result<(), UnionError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(UnionError::DeadlineExceeded {
                elapsed: self.started.elapsed(),
            }),
            _ => Ok(()),
        }
    }
}

// The sweep asserts on inputs it cannot order consistently, so a panic in
// `op` is reported as a topology failure of the shapes under `span`.
fn overlay_with<F>(
    op: F,
    a: &MultiPolygon<f64>,
    b: &MultiPolygon<f64>,
    span: &[Leaf],
) -> Result<MultiPolygon<f64>, UnionError>
where
    F: FnOnce(&MultiPolygon<f64>, &MultiPolygon<f64>) -> MultiPolygon<f64>,
{
    if a.0.is_empty() {
        return Ok(b.clone());
    }
    if b.0.is_empty() {
        return Ok(a.clone());
    }

    panic::catch_unwind(AssertUnwindSafe(|| op(a, b))).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        let first = span.iter().map(|leaf| leaf.index).min().unwrap_or(0);
        let last = span.iter().map(|leaf| leaf.index).max().unwrap_or(first);
        log::error!("Overlay of shapes {}..={} failed: {}", first, last, message);
        UnionError::Topology(TopologyError::OverlayFailed {
            first,
            last,
            message,
        })
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "overlay panicked".to_string()
    }
}

fn leaves(shapes: &[PolygonalShape]) -> Vec<Leaf> {
    shapes
        .iter()
        .flat_map(|shape| {
            shape
                .shape
                .polygons()
                .iter()
                .filter(|p| !p.exterior().0.is_empty())
                .map(move |polygon| Leaf {
                    index: shape.index,
                    polygon: polygon.clone(),
                })
        })
        .collect()
}

fn into_result(mut merged: MultiPolygon<f64>) -> UnionResult {
    merged.0.retain(|p| !p.exterior().0.is_empty());
    match merged.0.len() {
        0 => UnionResult::Empty,
        1 => match merged.0.pop() {
            Some(polygon) => UnionResult::Shape(Geometry::Polygon(polygon)),
            None => UnionResult::Empty,
        },
        _ => UnionResult::Shape(Geometry::MultiPolygon(merged)),
    }
}
