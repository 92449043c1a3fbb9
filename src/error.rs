use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::shape::ShapeKind;
use crate::union::UnionError;

/// Failure to read a single WKT (or GeoJSON) text into a shape record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty geometry text")]
    Empty,
    #[error("null in place of geometry text")]
    Null,
    #[error("unbalanced parentheses at byte {position}")]
    UnbalancedParentheses { position: usize },
    #[error("malformed WKT: {0}")]
    Syntax(String),
    #[error("unsupported WKT geometry: {0}")]
    Conversion(String),
    #[error("malformed GeoJSON: {0}")]
    GeoJson(String),
}

/// A well-formed shape whose kind cannot take part in a polygon union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("polygon of invalid type {kind} not combined")]
pub struct InvalidKindError {
    pub kind: ShapeKind,
}

/// What is wrong with a single ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingDefect {
    NonFiniteCoordinate,
    TooFewVertices,
    SelfIntersection,
    /// The ring crosses or runs along another ring of the same polygon.
    CrossesRing,
    /// A hole with a vertex outside its shell.
    OutsideShell,
}

impl std::fmt::Display for RingDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RingDefect::NonFiniteCoordinate => write!(f, "non-finite coordinate"),
            RingDefect::TooFewVertices => write!(f, "ring has fewer than 3 distinct vertices"),
            RingDefect::SelfIntersection => write!(f, "ring self-intersects"),
            RingDefect::CrossesRing => write!(f, "ring crosses another ring of its polygon"),
            RingDefect::OutsideShell => write!(f, "hole lies outside its shell"),
        }
    }
}

/// The overlay could not reconcile the geometry it was given.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("union failed: invalid input geometry at index {index}: {defect} (ring {ring})")]
    InvalidRing {
        index: usize,
        /// Position of the ring in the shape, counting exteriors and holes in WKT order.
        ring: usize,
        defect: RingDefect,
    },
    #[error("union failed: invalid input geometry at index {first}..={last}: {message}")]
    OverlayFailed {
        first: usize,
        last: usize,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that abort a whole combine request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("shape {index} could not be parsed: {source}")]
    Parse {
        index: usize,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("union exceeded its deadline after {elapsed:?}")]
    DeadlineExceeded { elapsed: Duration },
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Errors raised while loading a batch of shapes from disk or stdin.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("input is not a JSON array of strings: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<UnionError> for PipelineError {
    fn from(e: UnionError) -> Self {
        match e {
            UnionError::Topology(topology) => PipelineError::Topology(topology),
            UnionError::DeadlineExceeded { elapsed } => PipelineError::DeadlineExceeded { elapsed },
        }
    }
}
