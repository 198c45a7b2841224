// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use serde::{Deserialize, Serialize};

use crate::panel::Panel;
use crate::transform::GeoCoord;

pub mod geojson;
pub mod reader;

/// Kind of a rendered geometry; only panels are interactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Panel,
    Boundary,
    Marker,
    Label,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: GeoCoord,
    pub name: Option<String>,
}

/// Free-standing text that did not fall inside any panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteLabel {
    pub position: GeoCoord,
    pub text: String,
}

/// Everything loaded for one site, in geographic coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub panels: Vec<Panel>,
    pub boundaries: Vec<Vec<GeoCoord>>,
    pub markers: Vec<Marker>,
    pub labels: Vec<SiteLabel>,
    /// BLAKE3 hex digest of the source files, used as the daily-log key.
    pub fingerprint: String,
}

impl Site {
    /// Every coordinate of every geometry, for computing bounds.
    pub fn coords(&self) -> impl Iterator<Item = GeoCoord> + '_ {
        self.panels
            .iter()
            .flat_map(|p| p.ring.iter().copied())
            .chain(self.boundaries.iter().flatten().copied())
            .chain(self.markers.iter().map(|m| m.position))
            .chain(self.labels.iter().map(|l| l.position))
    }

    pub fn count(&self, kind: GeometryKind) -> usize {
        match kind {
            GeometryKind::Panel => self.panels.len(),
            GeometryKind::Boundary => self.boundaries.len(),
            GeometryKind::Marker => self.markers.len(),
            GeometryKind::Label => self.labels.len(),
        }
    }
}

pub use geojson::{parse_site, SiteBuilder};
pub use reader::SiteReader;
