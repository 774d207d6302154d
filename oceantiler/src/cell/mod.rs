//! Quad-tree cell identifiers over mercator space.
//!
//! A [`CellId`] names one rectangular tile of the recursive quad
//! subdivision of the mercator square: level 0 is the whole square,
//! level `L` contains `4^L` cells. The path from the root is bit-packed
//! two bits per level; within each pair, bit 0 selects the east half and
//! bit 1 the north half.

use std::fmt;

use thiserror::Error;

use crate::coord::{MAX_X, MAX_Y, MIN_X, MIN_Y};

/// Deepest level a cell id can address (two path bits per level).
pub const MAX_LEVEL: u8 = 30;

/// Errors from constructing or decoding cell identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellIdError {
    /// Requested level is deeper than the id can encode
    #[error("level {0} exceeds maximum {MAX_LEVEL}")]
    LevelOutOfRange(u8),

    /// Path bits name a cell outside the requested level
    #[error("path bits {bits} do not fit level {level}")]
    BitsOutOfRange { bits: u64, level: u8 },

    /// Serialized id does not name a cell shallower than the depth
    #[error("cell id {id} is not valid at depth {depth}")]
    IdOutOfRange { id: i64, depth: u8 },
}

/// Identifier of one cell in the quad subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId {
    bits: u64,
    level: u8,
}

impl CellId {
    /// The level-0 cell covering the whole mercator square.
    pub fn root() -> Self {
        Self { bits: 0, level: 0 }
    }

    /// Build a cell from its bit-packed path and level.
    pub fn from_bits_and_level(bits: u64, level: u8) -> Result<Self, CellIdError> {
        if level > MAX_LEVEL {
            return Err(CellIdError::LevelOutOfRange(level));
        }
        if bits >= Self::total_on_level(level) {
            return Err(CellIdError::BitsOutOfRange { bits, level });
        }
        Ok(Self { bits, level })
    }

    /// Number of cells on a level (`4^level`).
    pub fn total_on_level(level: u8) -> u64 {
        debug_assert!(level <= MAX_LEVEL);
        1u64 << (2 * level)
    }

    /// Iterate every cell on a level in path-bit order.
    pub fn cells_on_level(level: u8) -> CellsOnLevel {
        debug_assert!(level <= MAX_LEVEL);
        CellsOnLevel {
            level,
            current: 0,
            total: Self::total_on_level(level),
        }
    }

    /// Depth of this cell in the quad tree.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Bit-packed path from the root, two bits per level.
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// The four children, in child-index order (SW, SE, NW, NE).
    pub fn children(&self) -> [CellId; 4] {
        debug_assert!(self.level < MAX_LEVEL, "cannot subdivide level {}", self.level);
        let mut out = [*self; 4];
        for (child, slot) in out.iter_mut().enumerate() {
            slot.bits = self.bits << 2 | child as u64;
            slot.level = self.level + 1;
        }
        out
    }

    /// Serialize to a 64-bit integer keyed to a reference depth.
    ///
    /// Ids are a breadth-first numbering, 1-based: every cell of every
    /// level below `depth` gets a distinct id, and shallower cells get
    /// smaller ids. The level is recoverable from the id alone via
    /// [`CellId::from_int64`].
    pub fn to_int64(&self, depth: u8) -> i64 {
        assert!(
            self.level < depth,
            "cell level {} not below depth {}",
            self.level,
            depth
        );
        let offset = (Self::total_on_level(self.level) - 1) / 3;
        (offset + self.bits) as i64 + 1
    }

    /// Recover a cell from its serialized id at the given depth.
    pub fn from_int64(id: i64, depth: u8) -> Result<Self, CellIdError> {
        if depth == 0 || depth > MAX_LEVEL + 1 || id < 1 {
            return Err(CellIdError::IdOutOfRange { id, depth });
        }
        let mut rest = (id - 1) as u64;
        let mut level = 0u8;
        loop {
            let on_level = Self::total_on_level(level);
            if rest < on_level {
                return Ok(Self { bits: rest, level });
            }
            rest -= on_level;
            level += 1;
            if level >= depth {
                return Err(CellIdError::IdOutOfRange { id, depth });
            }
        }
    }
}

impl fmt::Display for CellId {
    /// Format as a quadkey-style string of child digits (empty for the root).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.level).rev() {
            let digit = (self.bits >> (2 * i)) & 3;
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}

/// Iterator over all cells on one level.
#[derive(Debug, Clone)]
pub struct CellsOnLevel {
    level: u8,
    current: u64,
    total: u64,
}

impl Iterator for CellsOnLevel {
    type Item = CellId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.total {
            return None;
        }
        let cell = CellId {
            bits: self.current,
            level: self.level,
        };
        self.current += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.current) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellsOnLevel {
    fn len(&self) -> usize {
        (self.total - self.current) as usize
    }
}

/// Mercator rectangle `(min_x, min_y, max_x, max_y)` covered by a cell.
///
/// Walks the packed path from the root, halving the mercator square at
/// every level.
pub fn cell_bounds(cell: CellId) -> (f64, f64, f64, f64) {
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (MIN_X, MIN_Y, MAX_X, MAX_Y);
    for i in (0..cell.level()).rev() {
        let child = (cell.bits() >> (2 * i)) & 3;
        let mid_x = (min_x + max_x) / 2.0;
        let mid_y = (min_y + max_y) / 2.0;
        if child & 1 == 1 {
            min_x = mid_x;
        } else {
            max_x = mid_x;
        }
        if child & 2 == 2 {
            min_y = mid_y;
        } else {
            max_y = mid_y;
        }
    }
    (min_x, min_y, max_x, max_y)
}
