//! Pure curve geometry for segment interpolation.
//!
//! Every edge between two stops is rendered and traversed as a single
//! quadratic Bézier arc: the two stop positions are the endpoints and the
//! edge's curvature offset, applied at the segment midpoint, produces the
//! one interior control point. Vehicles evaluate these functions each render
//! tick with a progress value `t` derived from elapsed travel time.

use bevy::prelude::*;

use crate::config::{LANE_COUNT, LANE_WIDTH};

/// Evaluate the quadratic Bézier `B(t) = (1-t)²p0 + 2(1-t)t·p1 + t²p2`.
///
/// Defined for all `t`; values outside `[0, 1]` extrapolate along the curve.
pub fn curve_point(t: f32, p0: Vec2, p1: Vec2, p2: Vec2) -> Vec2 {
    let u = 1.0 - t;
    u * u * p0 + 2.0 * u * t * p1 + t * t * p2
}

/// Heading along the curve at `t`, in degrees.
///
/// Uses the analytic derivative `B'(t) = 2(1-t)(p1-p0) + 2t(p2-p1)` and
/// `atan2(dy, dx)`. A degenerate curve (all points equal) yields 0.
pub fn curve_heading_degrees(t: f32, p0: Vec2, p1: Vec2, p2: Vec2) -> f32 {
    let d = 2.0 * (1.0 - t) * (p1 - p0) + 2.0 * t * (p2 - p1);
    d.y.atan2(d.x).to_degrees()
}

/// The interior control point for a segment: midpoint plus curvature offset.
pub fn control_point(start: Vec2, end: Vec2, offset: Vec2) -> Vec2 {
    (start + end) * 0.5 + offset
}

/// Perpendicular lane-separation offset for a vehicle travelling at the
/// given heading.
///
/// Lanes are centred on zero: with four lanes, indices 0..4 map to offsets
/// of -1.5, -0.5, 0.5 and 1.5 lane widths along the normal (heading + 90°).
/// Purely cosmetic; never feeds back into travel timing or state.
pub fn lane_offset(heading_degrees: f32, lane_index: u32) -> Vec2 {
    let normal = (heading_degrees + 90.0).to_radians();
    let centered = lane_index as f32 - (LANE_COUNT as f32 - 1.0) / 2.0;
    Vec2::new(normal.cos(), normal.sin()) * centered * LANE_WIDTH
}
