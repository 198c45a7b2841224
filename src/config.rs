// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::notes::NOTE_HIT_RADIUS_PX;
use crate::selection::{CLICK_SLOP_PX, MIN_DRAG_SIZE};
use crate::transform::GEO_PADDING_DEG;

pub const DEFAULT_CANVAS_SIZE: f64 = 1000.0;
pub const DEFAULT_LOG_DIR: &str = "daily-logs";

/// Editor tunables. Missing fields fall back to their defaults when loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Degrees of padding around the loaded geometry.
    pub geo_padding: f64,
    /// Canvas units; smaller drags are clicks.
    pub min_drag_size: f64,
    /// Screen pixels; pointer travel below this is still a click.
    pub click_slop_px: f64,
    pub note_hit_radius_px: f64,
    /// Zoom factor per wheel step.
    pub zoom_step: f64,
    /// Maximum magnification relative to the full canvas.
    pub max_zoom: f64,
    /// Seconds between two clicks on the same end that make a double click.
    pub double_click_secs: f64,
    /// Where daily logs are stored; `None` means [`DEFAULT_LOG_DIR`].
    pub log_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_SIZE,
            canvas_height: DEFAULT_CANVAS_SIZE,
            geo_padding: GEO_PADDING_DEG,
            min_drag_size: MIN_DRAG_SIZE,
            click_slop_px: CLICK_SLOP_PX,
            note_hit_radius_px: NOTE_HIT_RADIUS_PX,
            zoom_step: 1.1,
            max_zoom: 200.0,
            double_click_secs: 0.3,
            log_dir: None,
        }
    }
}

impl EditorConfig {
    /// Narrowest allowed view box width.
    pub fn min_view_width(&self) -> f64 {
        self.canvas_width / self.max_zoom.max(1.0)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{ "max_zoom": 50.0 }"#).unwrap();
        assert_eq!(config.max_zoom, 50.0);
        assert_eq!(config.min_drag_size, MIN_DRAG_SIZE);
        assert_eq!(config.note_hit_radius_px, 5.0);
        assert_eq!(config.click_slop_px, CLICK_SLOP_PX);
        assert!((config.min_view_width() - 20.0).abs() < 1e-12);
        assert_eq!(config.log_dir(), PathBuf::from(DEFAULT_LOG_DIR));
    }
}
