//! Per-cell difference against indexed land.

use crate::coord::{self, RectI};
use crate::feature::FeatureBuilder;
use crate::region::{intersect_regions, Region};

/// Accumulates `cell_envelope − union(land)` for one quad cell.
///
/// The envelope stays at index 0. Land regions whose bounding rectangle
/// lies fully inside the cell are appended verbatim; the rest are
/// clipped against the envelope and the pieces appended. Under even-odd
/// fill the accumulated list is exactly the ocean of the cell: the
/// envelope minus land, with fully-inside land as holes.
pub struct CellDifference {
    cell_rect: RectI,
    regions: Vec<Region>,
}

impl CellDifference {
    /// Start from the four-corner cell envelope.
    pub fn new(envelope: Region) -> Self {
        let cell_rect = envelope.rect();
        Self {
            cell_rect,
            regions: vec![envelope],
        }
    }

    /// Bounding rectangle of the cell envelope.
    pub fn cell_rect(&self) -> RectI {
        self.cell_rect
    }

    /// Fold one indexed land region into the difference.
    pub fn fold(&mut self, land: &Region) {
        if self.cell_rect.contains_rect(&land.rect()) {
            // fully inside: becomes a hole contributor, no clipping needed
            self.regions.push(land.clone());
        } else {
            let mut pieces = Vec::new();
            intersect_regions(&self.regions[0], land, &mut pieces);
            self.regions.extend(pieces);
        }
    }

    /// Total vertex count across the accumulated regions.
    pub fn points_count(&self) -> usize {
        self.regions.iter().map(|region| region.points_count()).sum()
    }

    /// The accumulated regions, envelope first.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Emit one polygon per region into the feature builder, decoded
    /// back to mercator coordinates.
    pub fn assign_geometry(&self, fb: &mut FeatureBuilder) {
        for region in &self.regions {
            let points = region.points().iter().map(|&p| coord::decode(p)).collect();
            fb.add_polygon(points);
        }
    }
}
