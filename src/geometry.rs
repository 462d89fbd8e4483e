//! Planar geometry primitives: segment intersection and polygon overlap.
//!
//! Everything here is a pure function. Degenerate inputs (parallel or
//! zero-length segments) are normal outcomes and yield `None`, never errors.

use serde::{Deserialize, Serialize};

/// A point in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An ordered pair of points. Used for road borders, polygon edges and rays.
pub type Segment = [Point; 2];

/// Where two segments cross: the crossing point plus the fractional
/// distance along the *first* segment at which it occurs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub point: Point,
    pub offset: f64,
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Intersection of segments `a0..a1` and `b0..b1`.
///
/// Both segments are treated as parametrized lines and the 2x2 system is
/// solved for `(t, u)`. A result is returned only when both parameters lie
/// in [0, 1], i.e. the segments truly overlap. The returned offset is `t`,
/// the fraction along the first segment.
pub fn intersect(a0: Point, a1: Point, b0: Point, b1: Point) -> Option<Intersection> {
    let t_top = (b1.x - b0.x) * (a0.y - b0.y) - (b1.y - b0.y) * (a0.x - b0.x);
    let u_top = (b0.y - a0.y) * (a0.x - a1.x) - (b0.x - a0.x) * (a0.y - a1.y);
    let bottom = (b1.y - b0.y) * (a1.x - a0.x) - (b1.x - b0.x) * (a1.y - a0.y);

    if bottom == 0.0 {
        // Parallel or degenerate: no crossing.
        return None;
    }

    let t = t_top / bottom;
    let u = u_top / bottom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Intersection {
            point: Point::new(lerp(a0.x, a1.x, t), lerp(a0.y, a1.y, t)),
            offset: t,
        })
    } else {
        None
    }
}

/// True iff any edge of `p` crosses any edge of `q`.
///
/// Edges are implied by consecutive points including the wrap-around pair,
/// so a two-point slice behaves as a plain segment. This containment-blind
/// test matches how vehicle footprints are compared against borders and
/// each other: footprints are small relative to the lane, so edge crossing
/// is the collision signal that matters.
pub fn polygons_intersect(p: &[Point], q: &[Point]) -> bool {
    for i in 0..p.len() {
        for j in 0..q.len() {
            let touch = intersect(p[i], p[(i + 1) % p.len()], q[j], q[(j + 1) % q.len()]);
            if touch.is_some() {
                return true;
            }
        }
    }
    false
}
