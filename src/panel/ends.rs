// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Panel end resolution.
//!
//! A panel is an elongated polygon whose two shortest edges are the physical
//! cable ends. The resolver picks those edges, orders them left/right and
//! places an indicator anchor slightly inside the panel body for each.

use std::cmp::Ordering;

use crate::geometry::{centroid, open_ring, Point};

/// Tolerance for detecting a repeated closing vertex.
pub const CLOSING_EPSILON: f64 = 1e-9;
/// Indicator radius as a fraction of the shortest edge.
pub const END_RADIUS_FACTOR: f64 = 0.35;
pub const END_RADIUS_MIN: f64 = 0.6;
pub const END_RADIUS_MAX: f64 = 1.5;
/// Maximum inset of an anchor, in indicator radii.
pub const ANCHOR_INSET_RADII: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    length: f64,
    center: Point,
}

fn by_position(a: &Point, b: &Point) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// One resolved end of a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndAnchor {
    /// Midpoint of the end edge.
    pub edge_center: Point,
    /// Where the end indicator is drawn and hit-tested.
    pub anchor: Point,
    pub edge_length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelEnds {
    pub left: EndAnchor,
    pub right: EndAnchor,
    pub centroid: Point,
    /// Indicator radius in canvas units.
    pub radius: f64,
}

fn inset_anchor(edge_center: Point, centroid: Point, radius: f64) -> Point {
    let dx = centroid.x - edge_center.x;
    let dy = centroid.y - edge_center.y;
    let distance = dx.hypot(dy);
    if distance == 0.0 {
        return edge_center;
    }
    let step = (distance / 2.0).min(radius * ANCHOR_INSET_RADII);
    Point::new(
        edge_center.x + dx / distance * step,
        edge_center.y + dy / distance * step,
    )
}

/// Resolve the two ends of a canvas-space ring.
///
/// Returns `None` for rings with fewer than two distinct vertices.
pub fn resolve_ends(points: &[Point]) -> Option<PanelEnds> {
    let ring = open_ring(points, CLOSING_EPSILON);
    let n = ring.len();
    if n < 2 || ring.iter().any(|p| !p.is_finite()) {
        return None;
    }

    let mut edges: Vec<Edge> = (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            Edge {
                length: a.distance_to(b),
                center: a.midpoint(b),
            }
        })
        .collect();

    // Ties are broken by position so every rotation of the ring agrees.
    edges.sort_by(|a, b| {
        a.length
            .total_cmp(&b.length)
            .then_with(|| by_position(&a.center, &b.center))
    });

    let mut ends = [edges[0], edges[1]];
    let radius = (edges[0].length * END_RADIUS_FACTOR).clamp(END_RADIUS_MIN, END_RADIUS_MAX);
    ends.sort_by(|a, b| by_position(&a.center, &b.center));

    let centroid = centroid(ring)?;
    let resolve = |edge: Edge| EndAnchor {
        edge_center: edge.center,
        anchor: inset_anchor(edge.center, centroid, radius),
        edge_length: edge.length,
    };

    Some(PanelEnds {
        left: resolve(ends[0]),
        right: resolve(ends[1]),
        centroid,
        radius,
    })
}
