// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use eframe::egui;
use egui::epaint::{PathShape, PathStroke};

use pv_string_tracker::editor::{BoxAction, Overlay};
use pv_string_tracker::geometry::Point;
use pv_string_tracker::notes::Note;
use pv_string_tracker::panel::{EndState, PanelEnd, PanelShape, PanelState};
use pv_string_tracker::selection::SelectionRect;
use pv_string_tracker::site::GeometryKind;
use pv_string_tracker::transform::ScreenTransform;

const PANEL_FILL: egui::Color32 = egui::Color32::from_rgb(38, 70, 110);
const PANEL_FILL_DONE: egui::Color32 = egui::Color32::from_rgb(46, 96, 60);
const PANEL_OUTLINE: egui::Color32 = egui::Color32::from_rgb(140, 170, 210);
const BOUNDARY_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 200, 120);
const MARKER_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 110, 200);
const NOTE_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 214, 79);

/// Labels are hidden below this many screen pixels per canvas unit.
const LABEL_MIN_SCALE: f64 = 1.5;

fn pos(p: Point) -> egui::Pos2 {
    egui::pos2(p.x as f32, p.y as f32)
}

pub fn end_state_color(state: EndState) -> egui::Color32 {
    match state {
        EndState::None => egui::Color32::from_rgb(150, 150, 150),
        EndState::Mc4Installed => egui::Color32::from_rgb(255, 152, 0),
        EndState::Terminated => egui::Color32::from_rgb(76, 175, 80),
    }
}

/// Draw text with a dark outline so it stays readable over fills.
pub fn text_with_outline(
    painter: &egui::Painter,
    at: egui::Pos2,
    anchor: egui::Align2,
    text: &str,
    font: egui::FontId,
    color: egui::Color32,
) {
    for (dx, dy) in [(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)] {
        painter.text(
            egui::pos2(at.x + dx, at.y + dy),
            anchor,
            text,
            font.clone(),
            egui::Color32::BLACK,
        );
    }
    painter.text(at, anchor, text, font, color);
}

/// One renderable geometry, dispatched by kind.
pub enum Drawable<'a> {
    Panel {
        shape: &'a PanelShape,
        state: PanelState,
    },
    Boundary(&'a [Point]),
    Marker {
        position: Point,
        name: Option<&'a str>,
    },
    Label {
        position: Point,
        text: &'a str,
    },
}

impl<'a> From<&'a Overlay> for Drawable<'a> {
    fn from(overlay: &'a Overlay) -> Self {
        match overlay {
            Overlay::Boundary(points) => Drawable::Boundary(points),
            Overlay::Marker { position, name } => Drawable::Marker {
                position: *position,
                name: name.as_deref(),
            },
            Overlay::Label { position, text } => Drawable::Label {
                position: *position,
                text,
            },
        }
    }
}

impl Drawable<'_> {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Drawable::Panel { .. } => GeometryKind::Panel,
            Drawable::Boundary(_) => GeometryKind::Boundary,
            Drawable::Marker { .. } => GeometryKind::Marker,
            Drawable::Label { .. } => GeometryKind::Label,
        }
    }

    pub fn draw(&self, painter: &egui::Painter, transform: &ScreenTransform) {
        match self {
            Drawable::Panel { shape, state } => draw_panel(painter, transform, shape, *state),
            Drawable::Boundary(points) => {
                let screen: Vec<egui::Pos2> =
                    points.iter().map(|p| pos(transform.to_screen(*p))).collect();
                if screen.len() >= 2 {
                    painter.add(egui::Shape::Path(PathShape::line(
                        screen,
                        PathStroke::new(1.5, BOUNDARY_COLOR),
                    )));
                }
            }
            Drawable::Marker { position, name } => {
                let at = pos(transform.to_screen(*position));
                painter.circle_filled(at, 4.0, MARKER_COLOR);
                painter.circle_stroke(at, 4.0, egui::Stroke::new(1.0, egui::Color32::WHITE));
                if let Some(name) = name {
                    if transform.scale() >= LABEL_MIN_SCALE {
                        text_with_outline(
                            painter,
                            egui::pos2(at.x + 6.0, at.y),
                            egui::Align2::LEFT_CENTER,
                            name,
                            egui::FontId::monospace(11.0),
                            egui::Color32::WHITE,
                        );
                    }
                }
            }
            Drawable::Label { position, text } => {
                if transform.scale() >= LABEL_MIN_SCALE {
                    text_with_outline(
                        painter,
                        pos(transform.to_screen(*position)),
                        egui::Align2::CENTER_CENTER,
                        text,
                        egui::FontId::proportional(12.0),
                        egui::Color32::WHITE,
                    );
                }
            }
        }
    }
}

fn draw_panel(
    painter: &egui::Painter,
    transform: &ScreenTransform,
    shape: &PanelShape,
    state: PanelState,
) {
    let fill = if state.left.is_terminated() && state.right.is_terminated() {
        PANEL_FILL_DONE
    } else {
        PANEL_FILL
    };

    if let Some(triangles) = &shape.fill {
        let mut mesh = egui::Mesh::default();
        for v in &triangles.vertices {
            mesh.colored_vertex(pos(transform.to_screen(*v)), fill);
        }
        for tri in triangles.indices.chunks_exact(3) {
            mesh.add_triangle(tri[0], tri[1], tri[2]);
        }
        painter.add(egui::Shape::mesh(mesh));
    }

    let outline: Vec<egui::Pos2> = shape
        .vertices
        .iter()
        .map(|p| pos(transform.to_screen(*p)))
        .collect();
    painter.add(egui::Shape::Path(PathShape::closed_line(
        outline,
        PathStroke::new(1.0, PANEL_OUTLINE),
    )));

    // Indicators keep a readable size when zoomed far out.
    let radius = (shape.ends.radius * transform.scale()).max(2.0) as f32;
    for end in PanelEnd::BOTH {
        let at = pos(transform.to_screen(shape.anchor(end)));
        painter.circle_filled(at, radius, end_state_color(state.get(end)));
        painter.circle_stroke(at, radius, egui::Stroke::new(1.0, egui::Color32::BLACK));
    }

    if let Some(label) = &shape.label {
        if transform.scale() >= LABEL_MIN_SCALE {
            text_with_outline(
                painter,
                pos(transform.to_screen(shape.ends.centroid)),
                egui::Align2::CENTER_CENTER,
                label,
                egui::FontId::monospace(10.0),
                egui::Color32::WHITE,
            );
        }
    }
}

pub fn draw_note(
    painter: &egui::Painter,
    transform: &ScreenTransform,
    note: &Note,
    selected: bool,
) {
    let at = pos(transform.to_screen(note.position));
    painter.circle_filled(at, 5.0, NOTE_COLOR);
    let ring = if selected {
        egui::Stroke::new(2.0, egui::Color32::from_rgb(33, 150, 243))
    } else {
        egui::Stroke::new(1.0, egui::Color32::BLACK)
    };
    painter.circle_stroke(at, 5.0, ring);

    if let Some(first_line) = note.text.lines().next().filter(|l| !l.is_empty()) {
        text_with_outline(
            painter,
            egui::pos2(at.x + 8.0, at.y - 8.0),
            egui::Align2::LEFT_BOTTOM,
            first_line,
            egui::FontId::proportional(12.0),
            NOTE_COLOR,
        );
    }
}

pub fn draw_selection(
    painter: &egui::Painter,
    transform: &ScreenTransform,
    rect: &SelectionRect,
    action: BoxAction,
) {
    let color = match action {
        BoxAction::Advance => egui::Color32::from_rgb(255, 152, 0),
        BoxAction::Reset => egui::Color32::from_rgb(244, 67, 54),
        BoxAction::SelectNotes => egui::Color32::from_rgb(33, 150, 243),
    };
    let screen_rect = egui::Rect::from_two_pos(
        pos(transform.to_screen(rect.min)),
        pos(transform.to_screen(rect.max)),
    );
    painter.rect_filled(screen_rect, 0.0, color.gamma_multiply(0.15));
    painter.rect_stroke(
        screen_rect,
        0.0,
        egui::Stroke::new(1.0, color),
        egui::StrokeKind::Middle,
    );
}
