//! Polygon intersection over lattice regions.
//!
//! The boolean primitive itself comes from the `geo` crate. Lattice
//! coordinates are carried into `f64` verbatim (every i32 is exact in
//! f64) and intersection vertices are rounded back onto the lattice.

use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};

use super::Region;
use crate::coord::PointI;

/// Append `a ∩ b` to `out` as simple lattice polygons.
///
/// Interior rings of the intersection are appended as separate regions;
/// downstream consumers fill with the even-odd rule, so a hole ring and
/// a nested polygon are the same thing. Degenerate output (fewer than
/// three distinct lattice points after rounding) is discarded.
pub fn intersect_regions(a: &Region, b: &Region, out: &mut Vec<Region>) {
    if a.points_count() < 3 || b.points_count() < 3 {
        return;
    }
    // Quick rejection on bounding rects before the expensive clip.
    if !a.rect().intersects(&b.rect()) {
        return;
    }

    let clipped: MultiPolygon<f64> = to_polygon(a).intersection(&to_polygon(b));
    for polygon in clipped {
        let (exterior, interiors) = polygon.into_inner();
        push_ring(&exterior, out);
        for ring in &interiors {
            push_ring(ring, out);
        }
    }
}

fn to_polygon(region: &Region) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = region
        .points()
        .iter()
        .map(|p| Coord {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect();
    // Polygon::new closes the ring; the closing edge is implicit in Region.
    Polygon::new(LineString::new(coords), Vec::new())
}

fn push_ring(ring: &LineString<f64>, out: &mut Vec<Region>) {
    let mut points: Vec<PointI> = Vec::with_capacity(ring.0.len());
    for c in &ring.0 {
        let p = PointI::new(c.x.round() as i32, c.y.round() as i32);
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    // Rounding can collapse the seam onto the first vertex.
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() >= 3 {
        out.push(Region::from_points(points));
    }
}
