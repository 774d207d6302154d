//! Coastline generator facade.
//!
//! Orchestrates the whole pipeline: incoming closed features go straight
//! into the spatial index, open fragments go to the ring merger;
//! [`CoastlineGenerator::finish`] flushes the merger into the index and
//! reports residue; [`CoastlineGenerator::emit_features`] seals the
//! index and runs the parallel cell splitter, producing one tagged
//! feature builder per accepted ocean cell.

use std::mem;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::coord;
use crate::feature::FeatureBuilder;
use crate::geo_index::{RegionIndex, RegionIndexBuilder};
use crate::merger::RingMerger;
use crate::region::Region;
use crate::splitter::{self, SplitterConfig};

/// Index phases: mutable while features arrive, sealed for the
/// parallel emit phase.
enum IndexState {
    Building(RegionIndexBuilder),
    Sealed(RegionIndex),
}

/// Batch converter from coastline features to per-cell ocean features.
pub struct CoastlineGenerator {
    merger: RingMerger,
    index: IndexState,
    coast_type: u32,
    config: SplitterConfig,
}

impl CoastlineGenerator {
    /// Create a generator with the default splitter configuration.
    pub fn new() -> Self {
        Self::with_config(SplitterConfig::default())
    }

    /// Create a generator with a custom splitter configuration.
    pub fn with_config(config: SplitterConfig) -> Self {
        Self {
            merger: RingMerger::new(),
            index: IndexState::Building(RegionIndexBuilder::new()),
            coast_type: Classifier::new().coastline_type(),
            config,
        }
    }

    /// Absorb one coastline feature: closed geometry is indexed
    /// directly, open geometry goes to the ring merger.
    pub fn process(&mut self, fb: &FeatureBuilder) {
        if fb.is_geometry_closed() {
            self.add_closed(fb);
        } else {
            self.merger.add(fb);
        }
    }

    /// Flush the merger, index the rings it closed, and report residue.
    ///
    /// Returns `true` iff every coastline fragment ended up in a closed
    /// ring. The caller may proceed either way; the emitted tiling
    /// simply treats unmerged fragments as if they never existed.
    pub fn finish(&mut self) -> bool {
        let outcome = self.merger.finish();

        let builder = self.building_mut();
        for ring in &outcome.rings {
            builder.add(ring.clone());
        }

        if outcome.fully_merged() {
            return true;
        }
        let mut total_points = 0;
        for chain in &outcome.unmerged {
            total_points += chain.points_count;
            match (chain.first_osm_id, chain.last_osm_id) {
                (Some(first), Some(last)) if first != last => {
                    info!(
                        "Not merged coastline, ways {} to {} ({} points)",
                        first, last, chain.points_count
                    );
                }
                (Some(way), _) => {
                    info!(
                        "Not merged coastline, way {} ({} points)",
                        way, chain.points_count
                    );
                }
                (None, _) => {
                    info!("Not merged coastline ({} points)", chain.points_count);
                }
            }
        }
        info!("Total not merged coasts: {}", outcome.unmerged.len());
        info!("Total points in not merged coasts: {}", total_points);
        false
    }

    /// Seal the index and tile the planet, appending one feature per
    /// accepted ocean cell.
    ///
    /// Output order is nondeterministic (workers race on the output
    /// lock); per-cell geometry is deterministic. Sort by
    /// [`FeatureBuilder::coast_cell`] for reproducible output files.
    pub fn emit_features(&mut self, out: &mut Vec<FeatureBuilder>) {
        self.seal();
        let IndexState::Sealed(index) = &self.index else {
            unreachable!("index sealed above")
        };

        let coast_type = self.coast_type;
        let cell_depth = self.config.max_level + 1;
        let output = Mutex::new(out);

        splitter::process(&self.config, index, |cell, difference| {
            let mut fb = FeatureBuilder::new();
            fb.set_coast_cell(cell.to_int64(cell_depth));
            difference.assign_geometry(&mut fb);
            fb.set_area();
            fb.add_type(coast_type);

            // every accepted cell must carry real geometry
            assert!(fb.polygons_count() > 0, "empty cell feature");
            assert!(fb.points_count() >= 3, "cell feature below 3 points");

            output.lock().expect("output lock poisoned").push(fb);
        });
    }

    /// Number of closed regions indexed so far.
    pub fn indexed_regions(&self) -> usize {
        match &self.index {
            IndexState::Building(builder) => builder.len(),
            IndexState::Sealed(index) => index.len(),
        }
    }

    fn add_closed(&mut self, fb: &FeatureBuilder) {
        let builder = self.building_mut();
        fb.for_each_polygon(|polygon| {
            if polygon.is_empty() {
                return;
            }
            // drop the closing vertex when the input repeats it
            let stripped = if polygon.len() > 1 && polygon.first() == polygon.last() {
                &polygon[..polygon.len() - 1]
            } else {
                polygon
            };
            let mut region = Region::new();
            let mut last = None;
            for &p in stripped {
                let q = coord::encode(p);
                if last != Some(q) {
                    region.add_point(q);
                    last = Some(q);
                }
            }
            if region.points_count() >= 3 {
                builder.add(region);
            } else {
                debug!("closed polygon collapsed below 3 lattice points, dropped");
            }
        });
    }

    fn building_mut(&mut self) -> &mut RegionIndexBuilder {
        match &mut self.index {
            IndexState::Building(builder) => builder,
            IndexState::Sealed(_) => {
                panic!("process/finish called after emit_features sealed the index")
            }
        }
    }

    fn seal(&mut self) {
        if let IndexState::Building(builder) = &mut self.index {
            let builder = mem::take(builder);
            self.index = IndexState::Sealed(builder.finalize());
        }
    }
}

impl Default for CoastlineGenerator {
    fn default() -> Self {
        Self::new()
    }
}
