//! Integer-coordinate simple polygons.
//!
//! A [`Region`] is an ordered sequence of lattice points forming a simple
//! closed polygon (the closing edge last→first is implicit). The bounding
//! rectangle is maintained incrementally on every append so spatial
//! indexing never has to rescan the points.

mod boolean;

pub use boolean::intersect_regions;

use crate::coord::{PointI, RectI};

/// A simple closed polygon on the integer lattice.
///
/// Orientation is whatever the input provided; consumers of region
/// geometry must tolerate either winding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    points: Vec<PointI>,
    rect: Option<RectI>,
}

impl Region {
    /// Create an empty region.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            rect: None,
        }
    }

    /// Create a region from a sequence of lattice points.
    pub fn from_points<I: IntoIterator<Item = PointI>>(points: I) -> Self {
        let mut region = Self::new();
        for p in points {
            region.add_point(p);
        }
        region
    }

    /// Append a vertex and grow the bounding rectangle.
    pub fn add_point(&mut self, p: PointI) {
        match &mut self.rect {
            Some(rect) => rect.expand_to(p),
            None => self.rect = Some(RectI::from_point(p)),
        }
        self.points.push(p);
    }

    /// The cached bounding rectangle.
    ///
    /// Empty regions have no bounding rectangle; asking for one is a
    /// logic error.
    pub fn rect(&self) -> RectI {
        self.rect.expect("empty region has no bounding rect")
    }

    /// Vertices in insertion order.
    pub fn points(&self) -> &[PointI] {
        &self.points
    }

    /// Number of vertices.
    pub fn points_count(&self) -> usize {
        self.points.len()
    }

    /// True if no vertex has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}
