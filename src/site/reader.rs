// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::fs;
use std::path::Path;

use super::{GeometryKind, Site, SiteBuilder};
use crate::error::{Result, TrackerError};

pub struct SiteReader;

impl SiteReader {
    pub fn new() -> Self {
        Self
    }

    /// Load and merge every GeoJSON source. Panel ids follow source order.
    pub fn read<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Site> {
        let mut builder = SiteBuilder::new();
        let mut hasher = blake3::Hasher::new();

        for path in paths {
            let path_str = path.as_ref().display().to_string();
            log::info!("[LOAD] Loading site geometry: {path_str}");

            let content = fs::read_to_string(path)?;
            log::info!("[FILE] Geometry file size: {} bytes", content.len());

            hasher.update(content.as_bytes());
            if let Err(e) = builder.add_geojson(&content, &path_str) {
                log::error!("[FAIL] Failed to parse {path_str}: {e}");
                return Err(e);
            }
        }

        let site = builder.finish(hasher.finalize().to_hex().to_string());
        if site.panels.is_empty() {
            let names: Vec<String> = paths
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect();
            return Err(TrackerError::NoPanels(names.join(", ")));
        }

        log::info!("[PASS] Site geometry parsed successfully!");
        log::info!(
            "[INFO] Statistics: {} panels, {} boundaries, {} markers, {} labels",
            site.count(GeometryKind::Panel),
            site.count(GeometryKind::Boundary),
            site.count(GeometryKind::Marker),
            site.count(GeometryKind::Label),
        );

        Ok(site)
    }
}

impl Default for SiteReader {
    fn default() -> Self {
        Self::new()
    }
}
