//! OceanTiler - Coastline tiling core
//!
//! This library converts an unordered stream of OpenStreetMap coastline
//! ways into closed ocean polygons, one per cell of a recursive quad grid
//! over Web Mercator space.
//!
//! # High-Level API
//!
//! For most use cases, the [`generator`] module provides a simplified facade:
//!
//! ```
//! use oceantiler::generator::CoastlineGenerator;
//!
//! let mut generator = CoastlineGenerator::new();
//!
//! // feed coastline feature builders (closed rings or open fragments)
//! // generator.process(&fb);
//!
//! let all_closed = generator.finish();
//! assert!(all_closed);
//!
//! let mut features = Vec::new();
//! generator.emit_features(&mut features);
//! ```

pub mod cell;
pub mod classifier;
pub mod coord;
pub mod feature;
pub mod generator;
pub mod geo_index;
pub mod merger;
pub mod region;
pub mod splitter;

/// Version of the OceanTiler library.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
