// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Hit-testing primitives shared by panel selection, click targeting and notes.

use serde::{Deserialize, Serialize};

/// Added to the ray-casting denominator so horizontal edges never divide by zero.
pub const RAY_EPSILON: f64 = 1e-9;

/// Tolerance for colinear and touching segments.
pub const INTERSECT_EPSILON: f64 = 1e-6;

/// A point in canvas (or screen) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Inclusive axis-aligned bounds check.
pub fn point_in_box(p: Point, min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> bool {
    p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y
}

/// Ray-casting parity test. The polygon is treated as implicitly closed.
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = polygon[i];
        let vj = polygon[j];

        if (vi.y > p.y) != (vj.y > p.y)
            && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y + RAY_EPSILON) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Cross product of (b - a) x (c - a); sign gives the turn direction.
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether `p` lies within the bounding box of segment `a`-`b`, with tolerance.
fn within_segment_bounds(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) - INTERSECT_EPSILON
        && p.x <= a.x.max(b.x) + INTERSECT_EPSILON
        && p.y >= a.y.min(b.y) - INTERSECT_EPSILON
        && p.y <= a.y.max(b.y) + INTERSECT_EPSILON
}

fn sign(value: f64) -> i8 {
    if value > INTERSECT_EPSILON {
        1
    } else if value < -INTERSECT_EPSILON {
        -1
    } else {
        0
    }
}

/// Segment intersection by orientation signs, including colinear and touching cases.
pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = sign(orientation(q1, q2, p1));
    let d2 = sign(orientation(q1, q2, p2));
    let d3 = sign(orientation(p1, p2, q1));
    let d4 = sign(orientation(p1, p2, q2));

    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }

    (d1 == 0 && within_segment_bounds(q1, q2, p1))
        || (d2 == 0 && within_segment_bounds(q1, q2, p2))
        || (d3 == 0 && within_segment_bounds(p1, p2, q1))
        || (d4 == 0 && within_segment_bounds(p1, p2, q2))
}

/// Arithmetic mean of the vertices.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Drop the closing vertex of a ring if it repeats the first one.
pub fn open_ring(points: &[Point], tolerance: f64) -> &[Point] {
    match (points.first(), points.last()) {
        (Some(first), Some(last))
            if points.len() > 1
                && (first.x - last.x).abs() <= tolerance
                && (first.y - last.y).abs() <= tolerance =>
        {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}
