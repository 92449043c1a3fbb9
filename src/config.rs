use std::time::Duration;

use crate::union::UnionEngine;

/// Knobs for a combine request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombineOptions {
    /// Abort the request on the first shape that fails to parse instead of
    /// reporting it and carrying on with the rest.
    pub strict: bool,
    /// Check rings for self-intersections and other defects before the overlay.
    pub validate: bool,
    /// Merge independent halves of large batches on the rayon pool.
    pub parallel: bool,
    /// Upper bound on time spent in the union phase.
    pub deadline: Option<Duration>,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            strict: false,
            validate: true,
            parallel: true,
            deadline: None,
        }
    }
}

impl CombineOptions {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn union_engine(&self) -> UnionEngine {
        UnionEngine {
            parallel: self.parallel,
            deadline: self.deadline,
        }
    }
}
