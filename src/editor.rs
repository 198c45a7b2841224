// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! The interactive editor: gesture dispatch over panel state, notes and view.
//!
//! All pointer positions handed to the editor are screen pixels; the editor
//! converts them to canvas space through the current view. Every change to
//! panel state is recorded as exactly one history snapshot.

use crate::config::EditorConfig;
use crate::daily_log::{DailyLogRecord, DailyLogStore, LogDate};
use crate::error::Result;
use crate::geometry::{point_in_polygon, Point};
use crate::history::History;
use crate::notes::{NoteId, NoteLayer};
use crate::panel::{PanelEnd, PanelId, PanelShape, PanelStateMap, Progress, Transition};
use crate::selection::{select_panels, SelectionRect};
use crate::site::Site;
use crate::transform::{CanvasTransform, GeoBounds, GeoCoord, ScreenRect, ScreenTransform, ViewBox};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// What a finished box selection does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxAction {
    /// Primary button: advance every selected end one step.
    Advance,
    /// Secondary button: reset every selected end.
    Reset,
    /// Note mode: select notes.
    SelectNotes,
}

/// The single active pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionMode {
    Idle,
    Panning {
        /// Last pointer position in screen pixels.
        last: Point,
    },
    BoxSelecting {
        start: Point,
        current: Point,
        action: BoxAction,
    },
    NoteDragging {
        id: NoteId,
        origin: Point,
        /// Note position minus the grab point.
        offset: Point,
        moved: bool,
    },
}

/// Keyboard and menu commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    DeleteSelectedNotes,
    /// Abort the current gesture (a dragged note goes back), or cancel the
    /// open note editor.
    Cancel,
    ToggleNoteMode,
    FitView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndHit {
    pub panel: PanelId,
    pub end: PanelEnd,
}

#[derive(Debug, Clone, Copy)]
struct LastClick {
    hit: EndHit,
    time: f64,
    history_index: usize,
    /// Dirty flag before the click was committed.
    was_dirty: bool,
}

/// Non-interactive geometry in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Boundary(Vec<Point>),
    Marker { position: Point, name: Option<String> },
    Label { position: Point, text: String },
}

pub struct Editor {
    config: EditorConfig,
    transform: Option<CanvasTransform>,
    panels: Vec<PanelShape>,
    overlays: Vec<Overlay>,
    history: History<PanelStateMap>,
    notes: NoteLayer,
    mode: InteractionMode,
    view: ViewBox,
    screen: ScreenRect,
    note_mode: bool,
    last_click: Option<LastClick>,
    dirty: bool,
    fingerprint: Option<String>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let view = ViewBox::full(config.canvas_width, config.canvas_height);
        let screen = ScreenRect::new(0.0, 0.0, config.canvas_width, config.canvas_height);
        Self {
            config,
            transform: None,
            panels: Vec::new(),
            overlays: Vec::new(),
            history: History::default(),
            notes: NoteLayer::new(),
            mode: InteractionMode::Idle,
            view,
            screen,
            note_mode: false,
            last_click: None,
            dirty: false,
            fingerprint: None,
        }
    }

    /// Project a loaded site and reset all session state.
    /// Returns the number of valid (interactive) panels.
    pub fn load(&mut self, site: &Site) -> usize {
        let Some(bounds) = GeoBounds::from_coords(site.coords(), self.config.geo_padding) else {
            log::warn!("[WARN] Site has no usable coordinates");
            return 0;
        };
        let transform =
            CanvasTransform::new(bounds, self.config.canvas_width, self.config.canvas_height);

        self.panels = site
            .panels
            .iter()
            .filter_map(|panel| {
                let shape = PanelShape::build(panel, &transform);
                if shape.is_none() {
                    log::warn!("[WARN] Panel {} has invalid geometry, skipped", panel.id);
                }
                shape
            })
            .collect();

        let project = |c: &GeoCoord| transform.to_canvas(c.lng, c.lat);
        self.overlays = site
            .boundaries
            .iter()
            .map(|line| Overlay::Boundary(line.iter().map(project).collect()))
            .chain(site.markers.iter().map(|m| Overlay::Marker {
                position: project(&m.position),
                name: m.name.clone(),
            }))
            .chain(site.labels.iter().map(|l| Overlay::Label {
                position: project(&l.position),
                text: l.text.clone(),
            }))
            .collect();

        self.transform = Some(transform);
        self.history = History::default();
        self.notes = NoteLayer::new();
        self.mode = InteractionMode::Idle;
        self.view = ViewBox::full(self.config.canvas_width, self.config.canvas_height);
        self.last_click = None;
        self.dirty = false;
        self.fingerprint = Some(site.fingerprint.clone());

        log::info!(
            "[INFO] Editor ready: {} of {} panels interactive",
            self.panels.len(),
            site.panels.len()
        );
        self.panels.len()
    }

    // Read-only state

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_loading(&self) -> bool {
        self.transform.is_none()
    }

    /// Panel state changed since the last daily-log submission.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn canvas_transform(&self) -> Option<&CanvasTransform> {
        self.transform.as_ref()
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn panels(&self) -> &[PanelShape] {
        &self.panels
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn states(&self) -> &PanelStateMap {
        self.history.current()
    }

    pub fn progress(&self) -> Progress {
        Progress::count(self.history.current(), self.panels.iter().map(|p| p.id))
    }

    pub fn notes(&self) -> &NoteLayer {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut NoteLayer {
        &mut self.notes
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn note_mode(&self) -> bool {
        self.note_mode
    }

    pub fn set_note_mode(&mut self, enabled: bool) {
        if self.note_mode != enabled {
            self.note_mode = enabled;
            self.mode = InteractionMode::Idle;
            if !enabled {
                self.notes.clear_selection();
            }
        }
    }

    pub fn history_position(&self) -> (usize, usize) {
        self.history.position()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The in-progress drag rectangle, for drawing.
    pub fn selection_rect(&self) -> Option<(SelectionRect, BoxAction)> {
        match self.mode {
            InteractionMode::BoxSelecting {
                start,
                current,
                action,
            } => Some((SelectionRect::from_corners(start, current), action)),
            _ => None,
        }
    }

    // View

    pub fn view_box(&self) -> ViewBox {
        self.view
    }

    pub fn set_screen_rect(&mut self, screen: ScreenRect) {
        self.screen = screen;
    }

    pub fn screen_transform(&self) -> ScreenTransform {
        ScreenTransform::new(self.view, self.screen)
    }

    pub fn fit_view(&mut self) {
        self.view = ViewBox::full(self.config.canvas_width, self.config.canvas_height);
    }

    fn note_hit_radius(&self) -> f64 {
        self.screen_transform()
            .pixels_to_canvas(self.config.note_hit_radius_px)
    }

    /// Canvas size below which a drag counts as a click at the current zoom.
    fn click_threshold(&self) -> f64 {
        self.screen_transform()
            .pixels_to_canvas(self.config.click_slop_px)
            .max(self.config.min_drag_size)
    }

    // Panel state

    /// Record `next` as the new state if it differs from the current one.
    fn commit(&mut self, next: PanelStateMap) -> bool {
        if next == *self.history.current() {
            return false;
        }
        self.history.push(next);
        self.last_click = None;
        self.dirty = true;
        true
    }

    /// End under a canvas point: indicator discs first, then panel bodies
    /// (nearest end). Later panels are on top.
    pub fn hit_end(&self, p: Point) -> Option<EndHit> {
        for shape in self.panels.iter().rev() {
            for end in PanelEnd::BOTH {
                if shape.anchor(end).distance_to(p) <= shape.ends.radius {
                    return Some(EndHit {
                        panel: shape.id,
                        end,
                    });
                }
            }
        }

        self.panels
            .iter()
            .rev()
            .find(|shape| point_in_polygon(p, &shape.vertices))
            .map(|shape| {
                let left = shape.anchor(PanelEnd::Left).distance_to(p);
                let right = shape.anchor(PanelEnd::Right).distance_to(p);
                EndHit {
                    panel: shape.id,
                    end: if left <= right {
                        PanelEnd::Left
                    } else {
                        PanelEnd::Right
                    },
                }
            })
    }

    /// Single click on an end at time `time` (seconds). A second click on the
    /// same end within the double-click window turns the pair into one
    /// double click.
    pub fn click_end(&mut self, hit: EndHit, time: f64) {
        let first_click = self.last_click.filter(|last| {
            last.hit == hit
                && time >= last.time
                && time - last.time <= self.config.double_click_secs
                && last.history_index == self.history.position().0
        });

        if let Some(first) = first_click {
            // Fold the first click into the double click: at most one snapshot in total.
            self.history.undo();
            self.history.discard_redo();
            let mut next = self.history.current().clone();
            next.apply(hit.panel, hit.end, Transition::Terminate);
            if !self.commit(next) {
                self.last_click = None;
                self.dirty = first.was_dirty;
            }
            log::debug!("Double click: panel {} {:?} terminated", hit.panel, hit.end);
            return;
        }

        let was_dirty = self.dirty;
        let mut next = self.history.current().clone();
        next.apply(hit.panel, hit.end, Transition::Cycle);
        if self.commit(next) {
            self.last_click = Some(LastClick {
                hit,
                time,
                history_index: self.history.position().0,
                was_dirty,
            });
            log::debug!(
                "Click: panel {} {:?} -> {:?}",
                hit.panel,
                hit.end,
                self.states().end(hit.panel, hit.end)
            );
        }
    }

    /// Set an end straight to Terminated.
    pub fn double_click_end(&mut self, hit: EndHit) {
        let mut next = self.history.current().clone();
        next.apply(hit.panel, hit.end, Transition::Terminate);
        self.commit(next);
    }

    /// Apply a finished box selection. Returns the number of panels or notes selected.
    pub fn box_select(&mut self, rect: &SelectionRect, action: BoxAction) -> usize {
        let transition = match action {
            BoxAction::SelectNotes => return self.notes.box_select(rect),
            BoxAction::Advance => Transition::Cycle,
            BoxAction::Reset => Transition::Reset,
        };

        let ids = select_panels(
            rect,
            self.panels.iter().map(|p| (p.id, p.vertices.as_slice())),
        );
        let mut next = self.history.current().clone();
        next.apply_to_panels(&ids, transition);
        if self.commit(next) {
            log::debug!("Box selection {:?} on {} panels", action, ids.len());
        }
        ids.len()
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo().is_some();
        if undone {
            self.last_click = None;
            self.dirty = true;
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo().is_some();
        if redone {
            self.last_click = None;
            self.dirty = true;
        }
        redone
    }

    // Gestures

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton) {
        if self.is_loading() || self.mode != InteractionMode::Idle {
            return;
        }
        let canvas = self.screen_transform().to_canvas(screen);

        self.mode = match (button, self.note_mode) {
            (PointerButton::Middle, _) => InteractionMode::Panning { last: screen },
            (PointerButton::Primary, true) => {
                match self.notes.hit_test(canvas, self.note_hit_radius()) {
                    Some(id) => {
                        let position = self.notes.get(id).map_or(canvas, |n| n.position);
                        InteractionMode::NoteDragging {
                            id,
                            origin: canvas,
                            offset: Point::new(position.x - canvas.x, position.y - canvas.y),
                            moved: false,
                        }
                    }
                    None => InteractionMode::BoxSelecting {
                        start: canvas,
                        current: canvas,
                        action: BoxAction::SelectNotes,
                    },
                }
            }
            (PointerButton::Primary, false) => InteractionMode::BoxSelecting {
                start: canvas,
                current: canvas,
                action: BoxAction::Advance,
            },
            (PointerButton::Secondary, false) => InteractionMode::BoxSelecting {
                start: canvas,
                current: canvas,
                action: BoxAction::Reset,
            },
            (PointerButton::Secondary, true) => InteractionMode::Idle,
        };
    }

    pub fn pointer_move(&mut self, screen: Point) {
        let transform = self.screen_transform();
        let canvas = transform.to_canvas(screen);
        let min_drag = self.click_threshold();

        match &mut self.mode {
            InteractionMode::Idle => {}
            InteractionMode::Panning { last } => {
                let dx = transform.pixels_to_canvas(screen.x - last.x);
                let dy = transform.pixels_to_canvas(screen.y - last.y);
                self.view.pan_by(dx, dy);
                *last = screen;
            }
            InteractionMode::BoxSelecting { current, .. } => *current = canvas,
            InteractionMode::NoteDragging {
                id,
                origin,
                offset,
                moved,
            } => {
                if !*moved && SelectionRect::from_corners(*origin, canvas).is_click(min_drag) {
                    return;
                }
                *moved = true;
                self.notes
                    .move_to(*id, Point::new(canvas.x + offset.x, canvas.y + offset.y));
            }
        }
    }

    /// Finish the active gesture. Drags below the size threshold become clicks.
    pub fn pointer_up(&mut self, screen: Point, time: f64) {
        let canvas = self.screen_transform().to_canvas(screen);
        let mode = std::mem::replace(&mut self.mode, InteractionMode::Idle);

        match mode {
            InteractionMode::Idle | InteractionMode::Panning { .. } => {}
            InteractionMode::BoxSelecting { start, action, .. } => {
                let rect = SelectionRect::from_corners(start, canvas);
                if !rect.is_click(self.click_threshold()) {
                    self.box_select(&rect, action);
                    return;
                }
                match action {
                    BoxAction::Advance => {
                        if let Some(hit) = self.hit_end(start) {
                            self.click_end(hit, time);
                        }
                    }
                    BoxAction::SelectNotes => {
                        let radius = self.note_hit_radius();
                        self.notes.clear_selection();
                        self.notes.click(start, radius);
                    }
                    BoxAction::Reset => {}
                }
            }
            InteractionMode::NoteDragging { id, moved, .. } => {
                if !moved {
                    self.notes.open_editor(id);
                }
            }
        }
    }

    /// Explicit double click at a screen position.
    pub fn double_click(&mut self, screen: Point) {
        if self.is_loading() || self.note_mode || self.mode != InteractionMode::Idle {
            return;
        }
        let canvas = self.screen_transform().to_canvas(screen);
        if let Some(hit) = self.hit_end(canvas) {
            self.double_click_end(hit);
        }
    }

    /// Wheel zoom around the pointer; positive `delta` zooms in.
    pub fn wheel(&mut self, screen: Point, delta: f64) {
        if self.is_loading() || self.mode != InteractionMode::Idle || delta == 0.0 {
            return;
        }
        let anchor = self.screen_transform().to_canvas(screen);
        let factor = if delta > 0.0 {
            self.config.zoom_step
        } else {
            1.0 / self.config.zoom_step
        };
        self.view.zoom_at(
            anchor,
            factor,
            self.config.min_view_width(),
            self.config.canvas_width,
        );
    }

    /// Returns whether the command changed anything.
    pub fn command(&mut self, command: Command) -> bool {
        match command {
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::DeleteSelectedNotes => self.notes.delete_selected() > 0,
            Command::Cancel => match std::mem::replace(&mut self.mode, InteractionMode::Idle) {
                InteractionMode::Idle => self.notes.cancel_edit(),
                InteractionMode::NoteDragging {
                    id,
                    origin,
                    offset,
                    moved,
                } => {
                    if moved {
                        self.notes
                            .move_to(id, Point::new(origin.x + offset.x, origin.y + offset.y));
                    }
                    true
                }
                InteractionMode::Panning { .. } | InteractionMode::BoxSelecting { .. } => true,
            },
            Command::ToggleNoteMode => {
                self.set_note_mode(!self.note_mode);
                true
            }
            Command::FitView => {
                self.fit_view();
                true
            }
        }
    }

    // Daily log

    /// Append today's record with the current MC4 completion count.
    pub fn submit_daily_log<S: DailyLogStore + ?Sized>(
        &mut self,
        store: &mut S,
        date: LogDate,
        subcontractor: &str,
        workers: u32,
    ) -> Result<DailyLogRecord> {
        let record = DailyLogRecord {
            date,
            installed_panels: self.progress().mc4.completed,
            subcontractor: subcontractor.trim().to_string(),
            workers,
        };
        store.add_record(record.clone())?;
        self.dirty = false;
        log::info!(
            "[INFO] Logged {} installed on {} ({}, {} workers)",
            record.installed_panels,
            record.date,
            record.subcontractor,
            record.workers
        );
        Ok(record)
    }
}
