// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Box selection of panels.

use crate::geometry::{point_in_box, point_in_polygon, segments_intersect, Point};
use crate::panel::PanelId;

/// Drags smaller than this on both axes are clicks.
pub const MIN_DRAG_SIZE: f64 = 0.05;

/// Screen pixels of pointer travel still treated as a click.
pub const CLICK_SLOP_PX: f64 = 3.0;

/// Axis-aligned drag rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub min: Point,
    pub max: Point,
}

impl SelectionRect {
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Whether the drag was too small to count as a box selection.
    pub fn is_click(&self, min_size: f64) -> bool {
        self.width() < min_size && self.height() < min_size
    }

    pub fn contains(&self, p: Point) -> bool {
        point_in_box(p, self.min.x, self.max.x, self.min.y, self.max.y)
    }

    /// Corners in ring order.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }

    pub fn edges(&self) -> [(Point, Point); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// Three-tier overlap test, cheapest first:
    /// a polygon vertex in the box, a box corner in the polygon, or any edge crossing.
    pub fn intersects_polygon(&self, polygon: &[Point]) -> bool {
        if polygon.iter().any(|&p| self.contains(p)) {
            return true;
        }

        if self.corners().iter().any(|&c| point_in_polygon(c, polygon)) {
            return true;
        }

        let n = polygon.len();
        if n < 2 {
            return false;
        }
        let edges = self.edges();
        (0..n).any(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            edges
                .iter()
                .any(|&(r1, r2)| segments_intersect(a, b, r1, r2))
        })
    }
}

/// Ids of all polygons overlapping `rect`, in input order.
pub fn select_panels<'a, I>(rect: &SelectionRect, panels: I) -> Vec<PanelId>
where
    I: IntoIterator<Item = (PanelId, &'a [Point])>,
{
    panels
        .into_iter()
        .filter(|(_, polygon)| rect.intersects_polygon(polygon))
        .map(|(id, _)| id)
        .collect()
}
