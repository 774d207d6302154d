//! Bounding-rectangle R-tree over closed regions.

use rstar::{RTree, RTreeObject, AABB};

use crate::coord::RectI;
use crate::region::Region;

/// One indexed region with its insertion sequence number.
///
/// The sequence number makes query visit order a function of insertion
/// order alone, which keeps per-cell geometry reproducible across runs
/// and thread counts.
struct RegionEntry {
    seq: u32,
    rect: RectI,
    region: Region,
}

impl RTreeObject for RegionEntry {
    type Envelope = AABB<[i32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.rect.min_x, self.rect.min_y],
            [self.rect.max_x, self.rect.max_y],
        )
    }
}

/// Mutable phase of the spatial index.
#[derive(Default)]
pub struct RegionIndexBuilder {
    entries: Vec<RegionEntry>,
}

impl RegionIndexBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a closed region, keyed by its bounding rectangle.
    pub fn add(&mut self, region: Region) {
        assert!(
            region.points_count() >= 3,
            "indexed region must have at least 3 points"
        );
        let rect = region.rect();
        self.entries.push(RegionEntry {
            seq: self.entries.len() as u32,
            rect,
            region,
        });
    }

    /// Number of regions inserted so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seal the index for the read-only query phase.
    pub fn finalize(self) -> RegionIndex {
        RegionIndex {
            tree: RTree::bulk_load(self.entries),
        }
    }
}

/// Sealed, read-only spatial index.
pub struct RegionIndex {
    tree: RTree<RegionEntry>,
}

impl RegionIndex {
    /// Visit every region whose bounding rectangle intersects `query`.
    ///
    /// Regions are visited in insertion order.
    pub fn for_each_in_rect<F: FnMut(&Region)>(&self, query: RectI, mut visitor: F) {
        let envelope = AABB::from_corners(
            [query.min_x, query.min_y],
            [query.max_x, query.max_y],
        );
        let mut hits: Vec<&RegionEntry> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .collect();
        hits.sort_by_key(|entry| entry.seq);
        for entry in hits {
            visitor(&entry.region);
        }
    }

    /// Number of indexed regions.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// True if the index holds no regions.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::PointI;

    fn square(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Region {
        Region::from_points([
            PointI::new(min_x, min_y),
            PointI::new(min_x, max_y),
            PointI::new(max_x, max_y),
            PointI::new(max_x, min_y),
        ])
    }

    fn collect_rects(index: &RegionIndex, query: RectI) -> Vec<RectI> {
        let mut rects = Vec::new();
        index.for_each_in_rect(query, |region| rects.push(region.rect()));
        rects
    }

    #[test]
    fn test_empty_index() {
        let index = RegionIndexBuilder::new().finalize();
        assert!(index.is_empty());
        assert!(collect_rects(&index, RectI::new(0, 0, 100, 100)).is_empty());
    }

    #[test]
    fn test_query_filters_by_rect() {
        let mut builder = RegionIndexBuilder::new();
        builder.add(square(0, 0, 10, 10));
        builder.add(square(50, 50, 60, 60));
        builder.add(square(200, 200, 210, 210));
        let index = builder.finalize();
        assert_eq!(index.len(), 3);

        let hits = collect_rects(&index, RectI::new(0, 0, 100, 100));
        assert_eq!(
            hits,
            vec![RectI::new(0, 0, 10, 10), RectI::new(50, 50, 60, 60)]
        );
    }

    #[test]
    fn test_visit_order_follows_insertion_order() {
        let mut builder = RegionIndexBuilder::new();
        // insert in an order that differs from any spatial sort
        builder.add(square(90, 90, 100, 100));
        builder.add(square(0, 0, 10, 10));
        builder.add(square(40, 40, 60, 60));
        let index = builder.finalize();

        let first = collect_rects(&index, RectI::new(0, 0, 100, 100));
        let second = collect_rects(&index, RectI::new(0, 0, 100, 100));
        assert_eq!(first, second);
        assert_eq!(first[0], RectI::new(90, 90, 100, 100));
        assert_eq!(first[1], RectI::new(0, 0, 10, 10));
        assert_eq!(first[2], RectI::new(40, 40, 60, 60));
    }

    #[test]
    fn test_touching_rect_is_visited() {
        let mut builder = RegionIndexBuilder::new();
        builder.add(square(10, 10, 20, 20));
        let index = builder.finalize();

        let hits = collect_rects(&index, RectI::new(20, 20, 30, 30));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    #[should_panic(expected = "at least 3 points")]
    fn test_add_degenerate_region_panics() {
        let mut builder = RegionIndexBuilder::new();
        builder.add(Region::from_points([PointI::new(0, 0), PointI::new(1, 1)]));
    }

    #[test]
    fn test_concurrent_readers_on_sealed_index() {
        use std::sync::Arc;
        use std::thread;

        let mut builder = RegionIndexBuilder::new();
        for i in 0..100 {
            builder.add(square(i * 10, 0, i * 10 + 5, 5));
        }
        let index = Arc::new(builder.finalize());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    let mut count = 0;
                    index.for_each_in_rect(RectI::new(0, 0, 1000, 5), |_| count += 1);
                    count
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().expect("reader thread panicked"), 100);
        }
    }
}
