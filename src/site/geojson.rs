// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! GeoJSON feature classification.
//!
//! Coordinates are decoded leniently: a feature with missing or non-numeric
//! coordinates is kept (panels keep their index) but carries no geometry.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{Marker, Site, SiteLabel};
use crate::error::{Result, TrackerError};
use crate::geometry::{point_in_polygon, Point};
use crate::panel::Panel;
use crate::transform::GeoCoord;

const LABEL_KEYS: [&str; 3] = ["text", "label", "name"];
/// Properties that name a marker point without making it a text label.
const MARKER_KEYS: [&str; 3] = ["kind", "type", "id"];

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// First non-blank string or number among `keys`.
fn property_text(properties: Option<&Map<String, Value>>, keys: &[&str]) -> Option<String> {
    let properties = properties?;
    keys.iter()
        .filter_map(|key| properties.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn coord(value: &Value) -> Option<GeoCoord> {
    let pair = value.as_array()?;
    let lng = pair.first()?.as_f64()?;
    let lat = pair.get(1)?.as_f64()?;
    (lng.is_finite() && lat.is_finite()).then(|| GeoCoord::new(lng, lat))
}

/// All-or-nothing: one bad vertex invalidates the ring.
fn ring(value: &Value) -> Option<Vec<GeoCoord>> {
    value.as_array()?.iter().map(coord).collect()
}

/// Outer ring of a polygon's coordinate array.
fn outer_ring(value: &Value) -> Vec<GeoCoord> {
    value
        .as_array()
        .and_then(|rings| rings.first())
        .and_then(ring)
        .unwrap_or_default()
}

fn as_geo_points(ring: &[GeoCoord]) -> Vec<Point> {
    ring.iter().map(|c| Point::new(c.lng, c.lat)).collect()
}

/// Accumulates features from one or more sources into a [`Site`].
#[derive(Debug, Default)]
pub struct SiteBuilder {
    panels: Vec<Panel>,
    boundaries: Vec<Vec<GeoCoord>>,
    markers: Vec<Marker>,
    labels: Vec<SiteLabel>,
    skipped: usize,
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_panel(&mut self, ring: Vec<GeoCoord>, label: Option<String>) {
        if ring.len() < 2 {
            self.skipped += 1;
        }
        let id = self.panels.len();
        self.panels.push(Panel { id, ring, label });
    }

    /// Classify every feature of a FeatureCollection document.
    pub fn add_geojson(&mut self, content: &str, source: &str) -> Result<()> {
        let collection: FeatureCollection =
            serde_json::from_str(content).map_err(|e| TrackerError::GeoJson {
                path: source.to_string(),
                source: e,
            })?;

        for feature in collection.features {
            let Some(geometry) = feature.geometry else {
                self.skipped += 1;
                continue;
            };
            let text = property_text(feature.properties.as_ref(), &LABEL_KEYS);
            let coords = &geometry.coordinates;

            match geometry.kind.as_str() {
                "Polygon" => self.push_panel(outer_ring(coords), text),
                "MultiPolygon" => match coords.as_array() {
                    Some(polygons) => {
                        for polygon in polygons {
                            self.push_panel(outer_ring(polygon), text.clone());
                        }
                    }
                    None => self.push_panel(Vec::new(), text),
                },
                "LineString" => match ring(coords) {
                    Some(line) if line.len() >= 2 => self.boundaries.push(line),
                    _ => self.skipped += 1,
                },
                "MultiLineString" => {
                    for line in coords.as_array().into_iter().flatten() {
                        match ring(line) {
                            Some(line) if line.len() >= 2 => self.boundaries.push(line),
                            _ => self.skipped += 1,
                        }
                    }
                }
                "Point" => match (coord(coords), text) {
                    (Some(position), Some(text)) => self.labels.push(SiteLabel { position, text }),
                    (Some(position), None) => self.markers.push(Marker {
                        position,
                        name: property_text(feature.properties.as_ref(), &MARKER_KEYS),
                    }),
                    (None, _) => self.skipped += 1,
                },
                other => {
                    log::debug!("Ignoring unsupported geometry type {other} in {source}");
                    self.skipped += 1;
                }
            }
        }

        Ok(())
    }

    /// Attach labels to the panel containing them and build the site.
    pub fn finish(mut self, fingerprint: String) -> Site {
        let outlines: Vec<Vec<Point>> = self.panels.iter().map(|p| as_geo_points(&p.ring)).collect();

        let mut free_labels = Vec::new();
        for label in std::mem::take(&mut self.labels) {
            let at = Point::new(label.position.lng, label.position.lat);
            let owner = outlines
                .iter()
                .position(|outline| outline.len() >= 3 && point_in_polygon(at, outline));
            match owner {
                Some(index) if self.panels[index].label.is_none() => {
                    self.panels[index].label = Some(label.text);
                }
                _ => free_labels.push(label),
            }
        }

        if self.skipped > 0 {
            log::warn!("[WARN] Skipped {} malformed features", self.skipped);
        }

        Site {
            panels: self.panels,
            boundaries: self.boundaries,
            markers: self.markers,
            labels: free_labels,
            fingerprint,
        }
    }
}

/// Parse a single GeoJSON document into a site.
pub fn parse_site(content: &str) -> Result<Site> {
    let mut builder = SiteBuilder::new();
    builder.add_geojson(content, "<memory>")?;
    let fingerprint = blake3::hash(content.as_bytes()).to_hex().to_string();
    Ok(builder.finish(fingerprint))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": {},
              "geometry": { "type": "Polygon", "coordinates": [[[10.0, 50.0], [10.0002, 50.0], [10.0002, 50.00005], [10.0, 50.00005], [10.0, 50.0]]] } },
            { "type": "Feature", "properties": {},
              "geometry": { "type": "Polygon", "coordinates": [[["a", 50.0], [10.0002, 50.0]]] } },
            { "type": "Feature", "properties": { "text": "S-01" },
              "geometry": { "type": "Point", "coordinates": [10.0001, 50.00002] } },
            { "type": "Feature", "properties": { "text": "Inverter A" },
              "geometry": { "type": "Point", "coordinates": [10.01, 50.01] } },
            { "type": "Feature", "properties": {},
              "geometry": { "type": "Point", "coordinates": [10.005, 50.005] } },
            { "type": "Feature", "properties": {},
              "geometry": { "type": "LineString", "coordinates": [[9.99, 49.99], [10.02, 49.99]] } },
            { "type": "Feature", "properties": {}, "geometry": null }
        ]
    }"#;

    #[test]
    fn test_classifies_features() {
        let site = parse_site(SITE).unwrap();
        assert_eq!(site.panels.len(), 2);
        assert_eq!(site.boundaries.len(), 1);
        assert_eq!(site.markers.len(), 1);
        assert_eq!(site.labels.len(), 1);
        assert_eq!(site.labels[0].text, "Inverter A");
    }

    #[test]
    fn test_label_matched_to_containing_panel() {
        let site = parse_site(SITE).unwrap();
        assert_eq!(site.panels[0].label.as_deref(), Some("S-01"));
    }

    #[test]
    fn test_malformed_panel_keeps_index() {
        let site = parse_site(SITE).unwrap();
        assert_eq!(site.panels[1].id, 1);
        assert!(site.panels[1].ring.is_empty());
    }

    #[test]
    fn test_marker_names() {
        let site = parse_site(SITE).unwrap();
        assert_eq!(site.markers[0].name, None);

        let named = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "kind": "inverter", "id": 7 },
                  "geometry": { "type": "Point", "coordinates": [10.0, 50.0] } },
                { "type": "Feature", "properties": { "kind": "  ", "id": 12 },
                  "geometry": { "type": "Point", "coordinates": [10.1, 50.1] } }
            ]
        }"#;
        let site = parse_site(named).unwrap();
        assert!(site.labels.is_empty());
        let names: Vec<Option<&str>> = site.markers.iter().map(|m| m.name.as_deref()).collect();
        assert_eq!(names, [Some("inverter"), Some("12")]);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            parse_site("{ not json"),
            Err(TrackerError::GeoJson { .. })
        ));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = parse_site(SITE).unwrap();
        let b = parse_site(SITE).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.fingerprint.len(), 64);
    }
}
