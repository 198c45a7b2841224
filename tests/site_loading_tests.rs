// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use pv_string_tracker::site::GeometryKind;
use pv_string_tracker::{Editor, Overlay, SiteReader, TrackerError};
use std::fs;
use std::path::PathBuf;

const PANELS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": {},
          "geometry": { "type": "Polygon", "coordinates": [[[10.0, 50.0], [10.002, 50.0], [10.002, 50.0005], [10.0, 50.0005], [10.0, 50.0]]] } },
        { "type": "Feature", "properties": {},
          "geometry": { "type": "MultiPolygon", "coordinates": [
              [[[10.004, 50.0], [10.006, 50.0], [10.006, 50.0005], [10.004, 50.0005], [10.004, 50.0]]],
              [[[10.008, 50.0], [10.010, 50.0], [10.010, 50.0005], [10.008, 50.0005], [10.008, 50.0]]]
          ] } },
        { "type": "Feature", "properties": { "label": "A-01" },
          "geometry": { "type": "Point", "coordinates": [10.001, 50.00025] } }
    ]
}"#;

const OVERLAYS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": {},
          "geometry": { "type": "LineString", "coordinates": [[9.999, 49.999], [10.011, 49.999], [10.011, 50.002]] } },
        { "type": "Feature", "properties": { "name": "Combiner box" },
          "geometry": { "type": "Point", "coordinates": [10.003, 50.001] } },
        { "type": "Feature", "properties": { "kind": "pole" },
          "geometry": { "type": "Point", "coordinates": [10.007, 50.001] } }
    ]
}"#;

fn write_temp_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_read_single_file() {
    let path = write_temp_file("pv_tracker_single.geojson", PANELS);

    let site = SiteReader::new().read(&[&path]).unwrap();
    // The multipolygon contributes one panel per polygon
    assert_eq!(site.count(GeometryKind::Panel), 3);
    assert_eq!(site.panels[0].label.as_deref(), Some("A-01"));
    assert!(site.labels.is_empty());
    assert_eq!(site.fingerprint.len(), 64);

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_read_merges_files() {
    let panels = write_temp_file("pv_tracker_merge_panels.geojson", PANELS);
    let overlays = write_temp_file("pv_tracker_merge_overlays.geojson", OVERLAYS);

    let site = SiteReader::new().read(&[&panels, &overlays]).unwrap();
    assert_eq!(site.count(GeometryKind::Panel), 3);
    assert_eq!(site.count(GeometryKind::Boundary), 1);
    // A named point without a label key is a label, the other one a marker
    assert_eq!(site.count(GeometryKind::Label), 1);
    assert_eq!(site.labels[0].text, "Combiner box");
    assert_eq!(site.count(GeometryKind::Marker), 1);
    assert_eq!(site.markers[0].name.as_deref(), Some("pole"));

    // Panel ids follow source order
    let ids: Vec<usize> = site.panels.iter().map(|p| p.id).collect();
    assert_eq!(ids, [0, 1, 2]);

    let mut editor = Editor::default();
    assert_eq!(editor.load(&site), 3);
    assert_eq!(editor.overlays().len(), 3);
    assert!(editor.overlays().iter().any(|overlay| matches!(
        overlay,
        Overlay::Marker { name: Some(name), .. } if name == "pole"
    )));
    assert_eq!(editor.progress().mc4.total, 6);

    fs::remove_file(&panels).unwrap();
    fs::remove_file(&overlays).unwrap();
}

#[test]
fn test_fingerprint_depends_on_content() {
    let first = write_temp_file("pv_tracker_fp_a.geojson", PANELS);
    let second = write_temp_file("pv_tracker_fp_b.geojson", PANELS);
    let other = write_temp_file("pv_tracker_fp_c.geojson", OVERLAYS);

    let reader = SiteReader::new();
    let a = reader.read(&[&first]).unwrap();
    let b = reader.read(&[&second]).unwrap();
    let c = reader.read(&[&first, &other]).unwrap();
    assert_eq!(a.fingerprint, b.fingerprint);
    assert_ne!(a.fingerprint, c.fingerprint);

    for path in [first, second, other] {
        fs::remove_file(path).unwrap();
    }
}

#[test]
fn test_file_without_panels_is_rejected() {
    let path = write_temp_file("pv_tracker_no_panels.geojson", OVERLAYS);

    match SiteReader::new().read(&[&path]) {
        Err(TrackerError::NoPanels(names)) => assert!(names.contains("pv_tracker_no_panels")),
        other => panic!("expected NoPanels, got {other:?}"),
    }

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_invalid_json_is_rejected() {
    let path = write_temp_file("pv_tracker_broken.geojson", "{ \"type\": \"FeatureCollection\", ");

    let result = SiteReader::new().read(&[&path]);
    assert!(matches!(result, Err(TrackerError::GeoJson { .. })));

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("pv_tracker_does_not_exist.geojson");
    let result = SiteReader::new().read(&[&path]);
    assert!(matches!(result, Err(TrackerError::Io(_))));
}
