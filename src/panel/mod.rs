// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::tessellate::{fill_polygon, Triangulation};
use crate::transform::{CanvasTransform, GeoCoord};

pub mod ends;
pub mod state;

pub use ends::{resolve_ends, EndAnchor, PanelEnds};
pub use state::{EndState, PanelEnd, PanelState, PanelStateMap, Progress, ProgressCounter, Transition};

/// Index of a panel in the loaded collection.
pub type PanelId = usize;

/// A panel as loaded from the site geometry, in geographic coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: PanelId,
    /// Outer ring; empty when the source coordinates were malformed.
    pub ring: Vec<GeoCoord>,
    pub label: Option<String>,
}

/// A panel projected into canvas space with its derived attributes.
#[derive(Debug, Clone)]
pub struct PanelShape {
    pub id: PanelId,
    pub vertices: Vec<Point>,
    pub ends: PanelEnds,
    pub label: Option<String>,
    /// Fill triangles, `None` if the ring cannot be tessellated.
    pub fill: Option<Triangulation>,
}

impl PanelShape {
    /// Project `panel` and resolve its ends. Malformed panels yield `None`.
    pub fn build(panel: &Panel, transform: &CanvasTransform) -> Option<Self> {
        let vertices: Vec<Point> = panel
            .ring
            .iter()
            .map(|c| transform.to_canvas(c.lng, c.lat))
            .collect();
        let ends = resolve_ends(&vertices)?;
        let vertices = crate::geometry::open_ring(&vertices, ends::CLOSING_EPSILON).to_vec();
        let fill = fill_polygon(&vertices);

        Some(Self {
            id: panel.id,
            vertices,
            ends,
            label: panel.label.clone(),
            fill,
        })
    }

    pub fn anchor(&self, end: PanelEnd) -> Point {
        match end {
            PanelEnd::Left => self.ends.left.anchor,
            PanelEnd::Right => self.ends.right.anchor,
        }
    }
}
