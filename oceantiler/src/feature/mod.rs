//! Feature builder container.
//!
//! [`FeatureBuilder`] is the unit of exchange with the surrounding
//! program: the OSM reader produces one per coastline way, and the
//! generator emits one per accepted ocean cell. The tiling core only
//! touches the operations defined here; polygon storage is a plain list
//! of mercator point sequences with the geometry treated as closed when
//! the outer sequence repeats its first point at the end.

use crate::coord::PointD;

/// Geometry and tagging for a single map feature under construction.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    polygons: Vec<Vec<PointD>>,
    osm_ids: Vec<u64>,
    types: Vec<u32>,
    coast_cell: Option<i64>,
    area: bool,
}

impl FeatureBuilder {
    /// Create an empty feature builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an OSM way id that contributed geometry to this feature.
    pub fn add_osm_id(&mut self, id: u64) {
        self.osm_ids.push(id);
    }

    /// Append one point sequence.
    ///
    /// Both closed rings and open polylines travel through this method;
    /// closedness is a property of the sequence, not of the call.
    pub fn add_polygon(&mut self, points: Vec<PointD>) {
        assert!(points.len() >= 2, "polygon must have at least 2 points");
        self.polygons.push(points);
    }

    /// True if the outer point sequence forms a closed ring.
    pub fn is_geometry_closed(&self) -> bool {
        match self.polygons.first() {
            Some(outer) => outer.len() >= 3 && outer.first() == outer.last(),
            None => false,
        }
    }

    /// Visit every point sequence in insertion order.
    pub fn for_each_polygon<F: FnMut(&[PointD])>(&self, mut visitor: F) {
        for polygon in &self.polygons {
            visitor(polygon);
        }
    }

    /// Total number of points across all sequences.
    pub fn points_count(&self) -> usize {
        self.polygons.iter().map(|polygon| polygon.len()).sum()
    }

    /// Number of point sequences.
    pub fn polygons_count(&self) -> usize {
        self.polygons.len()
    }

    /// First contributing OSM way id.
    pub fn first_osm_id(&self) -> Option<u64> {
        self.osm_ids.first().copied()
    }

    /// Last contributing OSM way id.
    pub fn last_osm_id(&self) -> Option<u64> {
        self.osm_ids.last().copied()
    }

    /// Tag the feature with a classifier type id.
    pub fn add_type(&mut self, type_id: u32) {
        self.types.push(type_id);
    }

    /// Type ids assigned so far.
    pub fn types(&self) -> &[u32] {
        &self.types
    }

    /// Mark the geometry as an area (filled) feature.
    pub fn set_area(&mut self) {
        self.area = true;
    }

    /// True if the feature was marked as an area.
    pub fn is_area(&self) -> bool {
        self.area
    }

    /// Tag the feature with the serialized id of the quad cell it tiles.
    pub fn set_coast_cell(&mut self, cell: i64) {
        self.coast_cell = Some(cell);
    }

    /// Serialized quad-cell id, if one was assigned.
    pub fn coast_cell(&self) -> Option<i64> {
        self.coast_cell
    }
}
