//! Coordinate quantization module
//!
//! Provides conversions between floating-point mercator coordinates and
//! the fixed-precision integer lattice used by all geometry in the
//! pipeline. The quantization is a uniform scaling of the mercator square
//! to `[0, 2^POINT_COORD_BITS - 1]` per axis, rounded to nearest.

mod types;

pub use types::{PointD, PointI, RectI};

/// Lattice precision in bits per axis.
///
/// Shared with the feature pipeline that produced the input coordinates;
/// endpoint hashing in the ring merger relies on both sides quantizing
/// at the same precision.
pub const POINT_COORD_BITS: u32 = 30;

/// Mercator bounds covered by the lattice.
pub const MIN_X: f64 = -180.0;
pub const MAX_X: f64 = 180.0;
pub const MIN_Y: f64 = -180.0;
pub const MAX_Y: f64 = 180.0;

/// Largest lattice coordinate on either axis.
pub const MAX_COORD: u32 = (1 << POINT_COORD_BITS) - 1;

/// Quantize a mercator point to the integer lattice.
///
/// Out-of-bounds input is a programming error upstream; it is clamped to
/// the mercator square so release builds degrade to edge coordinates
/// instead of wrapping.
#[inline]
pub fn encode(p: PointD) -> PointI {
    PointI {
        x: encode_axis(p.x, MIN_X, MAX_X),
        y: encode_axis(p.y, MIN_Y, MAX_Y),
    }
}

/// Convert a lattice point back to mercator space.
///
/// Exact inverse of [`encode`] on the lattice: `encode(decode(p)) == p`
/// for every valid lattice point `p`.
#[inline]
pub fn decode(p: PointI) -> PointD {
    PointD {
        x: decode_axis(p.x, MIN_X, MAX_X),
        y: decode_axis(p.y, MIN_Y, MAX_Y),
    }
}

#[inline]
fn encode_axis(v: f64, min: f64, max: f64) -> i32 {
    debug_assert!(
        (min..=max).contains(&v),
        "mercator coordinate {} outside [{}, {}]",
        v,
        min,
        max
    );
    let clamped = v.clamp(min, max);
    let scaled = (clamped - min) / (max - min) * MAX_COORD as f64;
    scaled.round() as i32
}

#[inline]
fn decode_axis(v: i32, min: f64, max: f64) -> f64 {
    debug_assert!(
        v >= 0 && v as u32 <= MAX_COORD,
        "lattice coordinate {} outside [0, {}]",
        v,
        MAX_COORD
    );
    min + v as f64 / MAX_COORD as f64 * (max - min)
}
