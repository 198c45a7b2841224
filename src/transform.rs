// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Geographic ↔ canvas ↔ screen coordinate mapping.
//!
//! Geometry is projected once into a fixed logical canvas. The [`ViewBox`]
//! selects the visible part of that canvas and the [`ScreenTransform`] maps it
//! onto the on-screen drawing rectangle.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Degrees added on every side of the loaded geometry.
pub const GEO_PADDING_DEG: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    pub lng: f64,
    pub lat: f64,
}

impl GeoCoord {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    /// Bounds of all finite coordinates, grown by `padding` degrees.
    /// Returns `None` when no finite coordinate is given.
    pub fn from_coords<I>(coords: I, padding: f64) -> Option<Self>
    where
        I: IntoIterator<Item = GeoCoord>,
    {
        let mut bounds: Option<GeoBounds> = None;
        for c in coords {
            if !c.lng.is_finite() || !c.lat.is_finite() {
                continue;
            }
            bounds = Some(match bounds {
                None => GeoBounds {
                    min_lng: c.lng,
                    max_lng: c.lng,
                    min_lat: c.lat,
                    max_lat: c.lat,
                },
                Some(b) => GeoBounds {
                    min_lng: b.min_lng.min(c.lng),
                    max_lng: b.max_lng.max(c.lng),
                    min_lat: b.min_lat.min(c.lat),
                    max_lat: b.max_lat.max(c.lat),
                },
            });
        }

        bounds.map(|b| GeoBounds {
            min_lng: b.min_lng - padding,
            max_lng: b.max_lng + padding,
            min_lat: b.min_lat - padding,
            max_lat: b.max_lat + padding,
        })
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// `numerator / denominator`, or 0 for a degenerate denominator.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Linear mapping between geographic bounds and the logical canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    bounds: GeoBounds,
    width: f64,
    height: f64,
}

impl CanvasTransform {
    pub fn new(bounds: GeoBounds, width: f64, height: f64) -> Self {
        Self {
            bounds,
            width,
            height,
        }
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// North-up: `y` grows as latitude decreases.
    pub fn to_canvas(&self, lng: f64, lat: f64) -> Point {
        let b = &self.bounds;
        Point::new(
            ratio(lng - b.min_lng, b.lng_span()) * self.width,
            ratio(b.max_lat - lat, b.lat_span()) * self.height,
        )
    }

    pub fn to_geo(&self, p: Point) -> GeoCoord {
        let b = &self.bounds;
        GeoCoord::new(
            b.min_lng + ratio(p.x, self.width) * b.lng_span(),
            b.max_lat - ratio(p.y, self.height) * b.lat_span(),
        )
    }
}

/// Visible rectangle of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole canvas.
    pub fn full(canvas_width: f64, canvas_height: f64) -> Self {
        Self::new(0.0, 0.0, canvas_width, canvas_height)
    }

    /// Move the view by a canvas-space delta (content follows the pointer).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.x -= dx;
        self.y -= dy;
    }

    /// Zoom by `factor` (> 1 zooms in) keeping `anchor` fixed on screen.
    /// The resulting width stays within `[min_width, max_width]`.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64, min_width: f64, max_width: f64) {
        if factor <= 0.0 || self.width <= 0.0 {
            return;
        }
        let new_width = (self.width / factor).clamp(min_width, max_width);
        let scale = new_width / self.width;
        self.x = anchor.x - (anchor.x - self.x) * scale;
        self.y = anchor.y - (anchor.y - self.y) * scale;
        self.width = new_width;
        self.height *= scale;
    }
}

/// The on-screen rectangle the canvas is drawn into, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Canvas ↔ screen mapping for one view box and screen rectangle.
///
/// Uses a uniform scale (the smaller axis ratio) and centres the view box in
/// the screen rectangle, so shapes keep their aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    view: ViewBox,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl ScreenTransform {
    pub fn new(view: ViewBox, screen: ScreenRect) -> Self {
        let scale_x = ratio(screen.width, view.width);
        let scale_y = ratio(screen.height, view.height);
        let scale = scale_x.min(scale_y).max(0.0);
        let offset_x = screen.left + (screen.width - view.width * scale) * 0.5;
        let offset_y = screen.top + (screen.height - view.height * scale) * 0.5;
        Self {
            view,
            scale,
            offset_x,
            offset_y,
        }
    }

    /// Screen pixels per canvas unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(
            self.offset_x + (p.x - self.view.x) * self.scale,
            self.offset_y + (p.y - self.view.y) * self.scale,
        )
    }

    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new(
            self.view.x + ratio(p.x - self.offset_x, self.scale),
            self.view.y + ratio(p.y - self.offset_y, self.scale),
        )
    }

    /// Convert a length in screen pixels to canvas units.
    pub fn pixels_to_canvas(&self, pixels: f64) -> f64 {
        ratio(pixels, self.scale)
    }
}
