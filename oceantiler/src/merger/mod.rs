//! Coastline ring merger.
//!
//! Coastline ways arrive fragmented: a ring around a landmass may be
//! split across hundreds of open polylines. The merger quantizes every
//! fragment to the lattice, splices fragments end-to-end whenever two
//! endpoints land on the same lattice point, and emits a closed ring as
//! soon as a chain's head meets its tail. Splicing preserves direction;
//! coastline ways are consistently oriented (land on the left), so a
//! fragment is never reversed.
//!
//! Unmergeable residue is not an error here: it is handed back through
//! [`MergeOutcome`] and the caller decides what to report.

use std::collections::HashMap;
use std::mem;

use tracing::debug;

use crate::coord::{self, PointI};
use crate::feature::FeatureBuilder;
use crate::region::Region;

/// An open chain left over after all input was consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmergedChain {
    /// First contributing OSM way id
    pub first_osm_id: Option<u64>,
    /// Last contributing OSM way id
    pub last_osm_id: Option<u64>,
    /// Vertex count of the open chain
    pub points_count: usize,
}

/// Everything the merger produced, drained by [`RingMerger::finish`].
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Closed rings, in closure order
    pub rings: Vec<Region>,
    /// Chains that never closed, in arrival order
    pub unmerged: Vec<UnmergedChain>,
}

impl MergeOutcome {
    /// True if every input fragment ended up in a closed ring.
    pub fn fully_merged(&self) -> bool {
        self.unmerged.is_empty()
    }
}

/// A partially assembled coastline, stored in lattice coordinates.
struct Chain {
    points: Vec<PointI>,
    first_osm_id: Option<u64>,
    last_osm_id: Option<u64>,
}

impl Chain {
    fn head(&self) -> PointI {
        self.points[0]
    }

    fn tail(&self) -> PointI {
        *self.points.last().expect("chain is never empty")
    }
}

/// Splices open coastline polylines into closed rings.
pub struct RingMerger {
    chains: HashMap<u64, Chain>,
    by_head: HashMap<PointI, Vec<u64>>,
    by_tail: HashMap<PointI, Vec<u64>>,
    rings: Vec<Region>,
    next_id: u64,
}

impl RingMerger {
    /// Create a merger with no pending chains.
    pub fn new() -> Self {
        Self {
            chains: HashMap::new(),
            by_head: HashMap::new(),
            by_tail: HashMap::new(),
            rings: Vec::new(),
            next_id: 0,
        }
    }

    /// Consume one open coastline feature builder.
    pub fn add(&mut self, fb: &FeatureBuilder) {
        let first_osm_id = fb.first_osm_id();
        let last_osm_id = fb.last_osm_id();
        fb.for_each_polygon(|polyline| {
            let mut points: Vec<PointI> = Vec::with_capacity(polyline.len());
            for &p in polyline {
                let q = coord::encode(p);
                if points.last() != Some(&q) {
                    points.push(q);
                }
            }
            if points.len() < 2 {
                debug!(
                    way = ?first_osm_id,
                    "degenerate coastline fragment ignored"
                );
                return;
            }
            self.absorb(Chain {
                points,
                first_osm_id,
                last_osm_id,
            });
        });
    }

    /// Number of open chains currently pending.
    pub fn open_chains(&self) -> usize {
        self.chains.len()
    }

    /// Drain the merger: closed rings plus whatever never closed.
    pub fn finish(&mut self) -> MergeOutcome {
        let rings = mem::take(&mut self.rings);

        let mut ids: Vec<u64> = self.chains.keys().copied().collect();
        ids.sort_unstable();
        let mut unmerged = Vec::with_capacity(ids.len());
        for id in ids {
            let chain = self.unlink(id);
            unmerged.push(UnmergedChain {
                first_osm_id: chain.first_osm_id,
                last_osm_id: chain.last_osm_id,
                points_count: chain.points.len(),
            });
        }
        MergeOutcome { rings, unmerged }
    }

    /// Merge a chain against the pending set until nothing attaches,
    /// then either emit it as a ring or park it.
    ///
    /// Invariant: parked chains are pairwise unmergeable, so draining at
    /// finish never has to retry splicing.
    fn absorb(&mut self, mut chain: Chain) {
        loop {
            let head = chain.head();
            let tail = chain.tail();

            if head == tail {
                chain.points.pop();
                if chain.points.len() >= 3 {
                    self.rings.push(Region::from_points(chain.points));
                } else {
                    debug!(
                        way = ?chain.first_osm_id,
                        "coastline ring collapsed below 3 points, dropped"
                    );
                }
                return;
            }

            // A chain ending at our head extends us on the left.
            if let Some(id) = self.pick(&self.by_tail, head, |c| c.head() == tail) {
                let left = self.unlink(id);
                chain = splice(left, chain);
                continue;
            }
            // A chain starting at our tail extends us on the right.
            if let Some(id) = self.pick(&self.by_head, tail, |c| c.tail() == head) {
                let right = self.unlink(id);
                chain = splice(chain, right);
                continue;
            }

            let id = self.next_id;
            self.next_id += 1;
            self.by_head.entry(head).or_default().push(id);
            self.by_tail.entry(tail).or_default().push(id);
            self.chains.insert(id, chain);
            return;
        }
    }

    /// Choose a merge candidate at `endpoint`: one that would close a
    /// ring wins, otherwise the oldest chain.
    fn pick<F: Fn(&Chain) -> bool>(
        &self,
        index: &HashMap<PointI, Vec<u64>>,
        endpoint: PointI,
        closes: F,
    ) -> Option<u64> {
        let candidates = index.get(&endpoint)?;
        candidates
            .iter()
            .copied()
            .find(|id| closes(&self.chains[id]))
            .or_else(|| candidates.first().copied())
    }

    fn unlink(&mut self, id: u64) -> Chain {
        let chain = self.chains.remove(&id).expect("chain index out of sync");
        remove_entry(&mut self.by_head, chain.head(), id);
        remove_entry(&mut self.by_tail, chain.tail(), id);
        chain
    }
}

impl Default for RingMerger {
    fn default() -> Self {
        Self::new()
    }
}

fn remove_entry(index: &mut HashMap<PointI, Vec<u64>>, key: PointI, id: u64) {
    if let Some(ids) = index.get_mut(&key) {
        ids.retain(|&other| other != id);
        if ids.is_empty() {
            index.remove(&key);
        }
    }
}

/// Concatenate two chains sharing a seam vertex, dropping one copy of it.
fn splice(mut left: Chain, right: Chain) -> Chain {
    debug_assert_eq!(left.tail(), right.head(), "splice endpoints must match");
    left.points.extend_from_slice(&right.points[1..]);
    Chain {
        points: left.points,
        first_osm_id: left.first_osm_id.or(right.first_osm_id),
        last_osm_id: right.last_osm_id.or(left.last_osm_id),
    }
}
