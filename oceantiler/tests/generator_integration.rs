//! Integration tests for the coastline generator pipeline.
//!
//! These tests drive the public facade end-to-end:
//! - Empty planet tiling (every seed cell is a full-ocean square)
//! - A closed island punching a hole into its cell
//! - Open fragments splicing into a closed ring before tiling
//! - Unmergeable residue reporting
//! - Adaptive subdivision under the point budget
//! - Parallel equivalence across thread counts

use std::collections::{HashMap, HashSet};

use oceantiler::cell::CellId;
use oceantiler::classifier::Classifier;
use oceantiler::coord::{decode, PointD, PointI};
use oceantiler::feature::FeatureBuilder;
use oceantiler::generator::CoastlineGenerator;
use oceantiler::splitter::SplitterConfig;

// =============================================================================
// Test Helpers
// =============================================================================

fn lattice_points(lattice: &[(i32, i32)]) -> Vec<PointD> {
    lattice
        .iter()
        .map(|&(x, y)| decode(PointI::new(x, y)))
        .collect()
}

/// A closed feature builder from lattice corners (closing vertex repeated).
fn closed_feature(way_id: u64, lattice: &[(i32, i32)]) -> FeatureBuilder {
    let mut fb = FeatureBuilder::new();
    fb.add_osm_id(way_id);
    let mut points = lattice_points(lattice);
    points.push(points[0]);
    fb.add_polygon(points);
    fb
}

/// An open feature builder from lattice points.
fn open_feature(way_id: u64, lattice: &[(i32, i32)]) -> FeatureBuilder {
    let mut fb = FeatureBuilder::new();
    fb.add_osm_id(way_id);
    fb.add_polygon(lattice_points(lattice));
    fb
}

/// A simple convex polygon with `n` vertices, centered on a lattice point.
fn lattice_circle(center: PointI, radius: i32, n: usize) -> Vec<(i32, i32)> {
    (0..n)
        .map(|i| {
            let angle = i as f64 / n as f64 * std::f64::consts::TAU;
            (
                center.x + (radius as f64 * angle.cos()).round() as i32,
                center.y + (radius as f64 * angle.sin()).round() as i32,
            )
        })
        .collect()
}

fn cell_of(fb: &FeatureBuilder, depth: u8) -> CellId {
    let id = fb.coast_cell().expect("emitted feature carries a cell tag");
    CellId::from_int64(id, depth).expect("cell tag decodes")
}

/// Polygon geometry as exact bit patterns, for cross-run comparison.
fn geometry_key(fb: &FeatureBuilder) -> Vec<Vec<(u64, u64)>> {
    let mut polygons = Vec::new();
    fb.for_each_polygon(|polygon| {
        polygons.push(
            polygon
                .iter()
                .map(|p| (p.x.to_bits(), p.y.to_bits()))
                .collect(),
        );
    });
    polygons
}

// =============================================================================
// Scenario 1: empty planet
// =============================================================================

#[test]
fn test_empty_planet_tiles_into_seed_cells() {
    let mut generator = CoastlineGenerator::new();
    assert!(generator.finish());

    let mut features = Vec::new();
    generator.emit_features(&mut features);

    // 4^4 seed cells, each a single four-corner ocean polygon
    assert_eq!(features.len(), 256);

    let coast_type = Classifier::new().coastline_type();
    let mut cells = HashSet::new();
    for fb in &features {
        assert_eq!(fb.polygons_count(), 1);
        assert_eq!(fb.points_count(), 4);
        assert!(fb.is_area());
        assert_eq!(fb.types(), &[coast_type]);
        let cell = cell_of(fb, 11);
        assert_eq!(cell.level(), 4);
        assert!(cells.insert(cell), "duplicate cell emitted");
    }
    assert_eq!(cells.len(), 256);
}

// =============================================================================
// Scenario 2: single closed island
// =============================================================================

#[test]
fn test_single_island_becomes_hole_in_its_cell() {
    let mut generator = CoastlineGenerator::new();
    generator.process(&closed_feature(
        42,
        &[(10, 10), (20, 10), (20, 20), (10, 20)],
    ));
    assert_eq!(generator.indexed_regions(), 1);
    assert!(generator.finish());

    let mut features = Vec::new();
    generator.emit_features(&mut features);
    assert_eq!(features.len(), 256);

    // exactly one cell carries the island as an extra even-odd polygon
    let with_hole: Vec<_> = features
        .iter()
        .filter(|fb| fb.polygons_count() == 2)
        .collect();
    assert_eq!(with_hole.len(), 1);
    assert_eq!(with_hole[0].points_count(), 8);

    // the island sits at the lattice origin corner, i.e. the cell with
    // an all-zero path
    assert_eq!(cell_of(with_hole[0], 11).bits(), 0);

    // every other cell is a plain full-ocean square
    for fb in &features {
        if fb.polygons_count() == 1 {
            assert_eq!(fb.points_count(), 4);
        }
    }
}

// =============================================================================
// Scenario 3: open coastline that closes
// =============================================================================

#[test]
fn test_open_fragments_close_and_tile() {
    let mut generator = CoastlineGenerator::new();
    generator.process(&open_feature(1, &[(0, 0), (10, 0), (10, 10)]));
    generator.process(&open_feature(2, &[(10, 10), (0, 10), (0, 0)]));
    assert_eq!(generator.indexed_regions(), 0);

    assert!(generator.finish());
    assert_eq!(generator.indexed_regions(), 1);

    let mut features = Vec::new();
    generator.emit_features(&mut features);

    let with_hole: Vec<_> = features
        .iter()
        .filter(|fb| fb.polygons_count() == 2)
        .collect();
    assert_eq!(with_hole.len(), 1);
    // envelope plus the spliced 4-point ring
    assert_eq!(with_hole[0].points_count(), 8);
}

// =============================================================================
// Scenario 4: unmergeable residue
// =============================================================================

#[test]
fn test_unmergeable_residue_is_nonfatal() {
    let mut generator = CoastlineGenerator::new();
    generator.process(&open_feature(77, &[(0, 0), (5, 5)]));

    assert!(!generator.finish());
    assert_eq!(generator.indexed_regions(), 0);

    // the pipeline still runs to completion without the residue
    let mut features = Vec::new();
    generator.emit_features(&mut features);
    assert_eq!(features.len(), 256);
    for fb in &features {
        assert_eq!(fb.polygons_count(), 1);
    }
}

// =============================================================================
// Scenario 5: over-budget subdivision
// =============================================================================

#[test]
fn test_over_budget_cell_subdivides_until_within_budget() {
    let config = SplitterConfig::default()
        .with_threads(4)
        .with_base_level(2)
        .with_max_level(4)
        .with_max_points(40);
    let max_level = config.max_level;
    let max_points = config.max_points;
    let mut generator = CoastlineGenerator::with_config(config);

    // 50-vertex landmass centered in one level-2 cell, large enough to
    // straddle that cell's children
    let center = PointI::new(1 << 27, 1 << 27);
    generator.process(&closed_feature(
        9,
        &lattice_circle(center, 1 << 26, 50),
    ));
    assert!(generator.finish());

    let mut features = Vec::new();
    generator.emit_features(&mut features);

    let mut subdivided = false;
    for fb in &features {
        let level = cell_of(fb, max_level + 1).level();
        assert!(level >= 2 && level <= max_level);
        if level > 2 {
            subdivided = true;
        }
        // the point budget binds everywhere except at the level cap
        assert!(
            level == max_level || fb.points_count() <= max_points,
            "cell at level {} has {} points",
            level,
            fb.points_count()
        );
    }
    assert!(subdivided, "over-budget cell never subdivided");
}

// =============================================================================
// Scenario 6: parallel equivalence
// =============================================================================

#[test]
fn test_thread_count_does_not_change_geometry() {
    let run = |threads: usize| {
        let config = SplitterConfig::default()
            .with_threads(threads)
            .with_base_level(2)
            .with_max_level(4)
            .with_max_points(40);
        let mut generator = CoastlineGenerator::with_config(config);

        generator.process(&closed_feature(
            1,
            &[(10, 10), (2_000_000, 10), (2_000_000, 2_000_000), (10, 2_000_000)],
        ));
        generator.process(&closed_feature(
            2,
            &lattice_circle(PointI::new(1 << 27, 1 << 27), 1 << 26, 50),
        ));
        generator.process(&open_feature(3, &[(1 << 28, 5), (1 << 28, 1 << 20)]));
        assert!(!generator.finish());

        let mut features = Vec::new();
        generator.emit_features(&mut features);

        let mut by_cell: HashMap<i64, Vec<Vec<(u64, u64)>>> = HashMap::new();
        for fb in &features {
            let cell = fb.coast_cell().expect("cell tag present");
            assert!(
                by_cell.insert(cell, geometry_key(fb)).is_none(),
                "cell emitted twice"
            );
        }
        by_cell
    };

    let sequential = run(1);
    let parallel = run(8);
    assert_eq!(sequential, parallel);
}
