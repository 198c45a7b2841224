// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use pv_string_tracker::notes::NoteClick;
use pv_string_tracker::panel::Panel;
use pv_string_tracker::transform::GeoCoord;
use pv_string_tracker::{
    Command, DailyLogStore, Editor, EndState, InteractionMode, LogDate, MemoryLogStore, PanelEnd,
    Point, PointerButton, Site,
};

fn create_test_panel(id: usize, lng: f64, lat: f64) -> Panel {
    // 0.002° wide, 0.0005° tall: the short sides are left and right
    let (w, h) = (0.002, 0.0005);
    Panel {
        id,
        ring: vec![
            GeoCoord::new(lng, lat),
            GeoCoord::new(lng + w, lat),
            GeoCoord::new(lng + w, lat + h),
            GeoCoord::new(lng, lat + h),
            GeoCoord::new(lng, lat),
        ],
        label: None,
    }
}

fn create_test_site() -> Site {
    Site {
        panels: vec![
            create_test_panel(0, 10.000, 50.000),
            create_test_panel(1, 10.004, 50.004),
            create_test_panel(2, 10.008, 50.0095),
        ],
        fingerprint: "0123456789abcdef0123456789abcdef".to_string(),
        ..Default::default()
    }
}

fn loaded_editor() -> Editor {
    let mut editor = Editor::default();
    assert_eq!(editor.load(&create_test_site()), 3);
    editor
}

/// Screen position of a panel end indicator.
fn end_point(editor: &Editor, panel: usize, end: PanelEnd) -> Point {
    let shape = &editor.panels()[panel];
    editor.screen_transform().to_screen(shape.anchor(end))
}

fn click(editor: &mut Editor, at: Point, time: f64) {
    editor.pointer_down(at, PointerButton::Primary);
    editor.pointer_up(at, time);
}

fn drag(editor: &mut Editor, from: Point, to: Point, button: PointerButton) {
    editor.pointer_down(from, button);
    editor.pointer_move(Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0));
    editor.pointer_move(to);
    editor.pointer_up(to, 0.0);
}

fn select_all(editor: &mut Editor, button: PointerButton) {
    drag(editor, Point::new(1.0, 1.0), Point::new(999.0, 999.0), button);
}

#[test]
fn test_fresh_site_counters() {
    let editor = loaded_editor();
    let progress = editor.progress();

    assert_eq!(progress.mc4.total, 6);
    assert_eq!(progress.mc4.completed, 0);
    assert_eq!(progress.mc4.remaining(), 6);
    assert_eq!(progress.termination.completed, 0);
    assert!(!editor.is_dirty());
    assert!(!editor.can_undo());
}

#[test]
fn test_click_then_double_click() {
    let mut editor = loaded_editor();

    let left0 = end_point(&editor, 0, PanelEnd::Left);
    click(&mut editor, left0, 0.0);
    assert_eq!(editor.progress().mc4.completed, 1);
    assert_eq!(editor.states().end(0, PanelEnd::Left), EndState::Mc4Installed);

    // Two clicks within the double-click window on the same end
    let right1 = end_point(&editor, 1, PanelEnd::Right);
    click(&mut editor, right1, 1.0);
    click(&mut editor, right1, 1.15);

    let progress = editor.progress();
    assert_eq!(progress.mc4.completed, 2);
    assert_eq!(progress.termination.completed, 1);
    assert_eq!(editor.states().end(1, PanelEnd::Right), EndState::Terminated);

    // The double click is a single history step
    assert_eq!(editor.history_position(), (2, 3));
    assert!(editor.undo());
    assert_eq!(editor.states().end(1, PanelEnd::Right), EndState::None);
    assert_eq!(editor.states().end(0, PanelEnd::Left), EndState::Mc4Installed);
}

#[test]
fn test_slow_clicks_cycle() {
    let mut editor = loaded_editor();
    let at = end_point(&editor, 2, PanelEnd::Left);

    let mut seen = Vec::new();
    for step in 0..3 {
        click(&mut editor, at, step as f64 * 2.0);
        seen.push(editor.states().end(2, PanelEnd::Left));
    }
    assert_eq!(
        seen,
        [EndState::Mc4Installed, EndState::Terminated, EndState::None]
    );
    // Back to the baseline, so nothing is stored for the panel
    assert!(editor.states().is_empty());
}

#[test]
fn test_double_click_terminates_from_any_state() {
    let mut editor = loaded_editor();
    let at = end_point(&editor, 0, PanelEnd::Right);

    click(&mut editor, at, 0.0);
    click(&mut editor, at, 5.0);
    assert_eq!(editor.states().end(0, PanelEnd::Right), EndState::Terminated);

    editor.double_click(at);
    assert_eq!(editor.states().end(0, PanelEnd::Right), EndState::Terminated);
    // Already terminated: no extra snapshot
    assert_eq!(editor.history_position(), (2, 3));
}

#[test]
fn test_timed_double_click_on_terminated_end_adds_no_step() {
    let mut editor = loaded_editor();
    let mut store = MemoryLogStore::new();
    let at = end_point(&editor, 0, PanelEnd::Right);

    click(&mut editor, at, 0.0);
    click(&mut editor, at, 5.0);
    assert_eq!(editor.states().end(0, PanelEnd::Right), EndState::Terminated);
    let date: LogDate = "2025-06-02".parse().unwrap();
    editor
        .submit_daily_log(&mut store, date, "Helios Crew", 3)
        .unwrap();
    let before = editor.history_position();
    let states = editor.states().clone();

    // Two clicks inside the double-click window, no host double-click event
    click(&mut editor, at, 10.0);
    click(&mut editor, at, 10.1);

    assert_eq!(editor.history_position(), before);
    assert_eq!(*editor.states(), states);
    assert!(!editor.can_redo());
    assert!(!editor.is_dirty());

    // Undo still lands on the step before the termination
    assert!(editor.undo());
    assert_eq!(editor.states().end(0, PanelEnd::Right), EndState::Mc4Installed);
}

#[test]
fn test_box_select_twice() {
    let mut editor = loaded_editor();

    select_all(&mut editor, PointerButton::Primary);
    for panel in 0..3 {
        for end in PanelEnd::BOTH {
            assert_eq!(editor.states().end(panel, end), EndState::Mc4Installed);
        }
    }
    assert_eq!(editor.progress().mc4.completed, 6);

    select_all(&mut editor, PointerButton::Primary);
    assert_eq!(editor.progress().termination.completed, 6);
    assert_eq!(editor.history_position(), (2, 3));
}

#[test]
fn test_secondary_box_resets() {
    let mut editor = loaded_editor();
    select_all(&mut editor, PointerButton::Primary);
    assert_eq!(editor.progress().mc4.completed, 6);

    select_all(&mut editor, PointerButton::Secondary);
    assert_eq!(editor.progress().mc4.completed, 0);
    assert!(editor.states().is_empty());

    // Resetting an already clean site records nothing
    let before = editor.history_position();
    select_all(&mut editor, PointerButton::Secondary);
    assert_eq!(editor.history_position(), before);
}

#[test]
fn test_box_outside_panels_changes_nothing() {
    let mut editor = loaded_editor();
    drag(
        &mut editor,
        Point::new(500.0, 10.0),
        Point::new(520.0, 30.0),
        PointerButton::Primary,
    );
    assert!(editor.states().is_empty());
    assert!(!editor.can_undo());
    assert_eq!(editor.mode(), InteractionMode::Idle);
}

#[test]
fn test_undo_redo_restore_state() {
    let mut editor = loaded_editor();
    for (panel, end) in [
        (0, PanelEnd::Left),
        (1, PanelEnd::Right),
        (2, PanelEnd::Left),
    ] {
        let at = end_point(&editor, panel, end);
        click(&mut editor, at, panel as f64 * 10.0);
    }
    let after = editor.states().clone();

    for _ in 0..3 {
        assert!(editor.command(Command::Undo));
    }
    assert!(editor.states().is_empty());
    assert!(!editor.command(Command::Undo));

    for _ in 0..3 {
        assert!(editor.command(Command::Redo));
    }
    assert_eq!(*editor.states(), after);
    assert!(!editor.command(Command::Redo));
}

#[test]
fn test_new_change_discards_redo() {
    let mut editor = loaded_editor();
    let a = end_point(&editor, 0, PanelEnd::Left);
    let b = end_point(&editor, 1, PanelEnd::Left);

    click(&mut editor, a, 0.0);
    assert!(editor.undo());
    click(&mut editor, b, 5.0);

    assert!(!editor.redo());
    assert_eq!(editor.states().end(0, PanelEnd::Left), EndState::None);
    assert_eq!(editor.states().end(1, PanelEnd::Left), EndState::Mc4Installed);
}

#[test]
fn test_click_on_panel_body_picks_nearest_end() {
    let mut editor = loaded_editor();
    let shape = &editor.panels()[1];
    let left = shape.anchor(PanelEnd::Left);
    let right = shape.anchor(PanelEnd::Right);
    // A quarter of the way from the left indicator, inside the body
    let inside = Point::new(
        left.x + (right.x - left.x) * 0.25,
        left.y + (right.y - left.y) * 0.25,
    );
    let at = editor.screen_transform().to_screen(inside);

    click(&mut editor, at, 0.0);
    assert_eq!(editor.states().end(1, PanelEnd::Left), EndState::Mc4Installed);
    assert_eq!(editor.states().end(1, PanelEnd::Right), EndState::None);
}

#[test]
fn test_notes_click_policy() {
    let mut editor = loaded_editor();
    editor.set_note_mode(true);

    click(&mut editor, Point::new(100.0, 100.0), 0.0);
    assert_eq!(editor.notes().len(), 1);
    let first = editor.notes().notes()[0].id;
    assert_eq!(editor.notes().editor().map(|e| e.note_id), Some(first));
    editor.notes_mut().set_draft("Missing MC4 on row 3");
    assert!(editor.notes_mut().commit_edit());

    // Within 5 px: opens the existing note
    click(&mut editor, Point::new(103.0, 104.0), 1.0);
    assert_eq!(editor.notes().len(), 1);
    assert_eq!(editor.notes().editor().map(|e| e.note_id), Some(first));
    editor.notes_mut().commit_edit();

    // 50 px away: a second note
    click(&mut editor, Point::new(150.0, 100.0), 2.0);
    assert_eq!(editor.notes().len(), 2);

    // Notes never touch panel state
    assert!(editor.states().is_empty());
    assert!(!editor.can_undo());
}

#[test]
fn test_note_layer_click_creates_note() {
    let mut layer = pv_string_tracker::notes::NoteLayer::new();
    let created = layer.click(Point::new(100.0, 100.0), 5.0);
    assert!(matches!(created, NoteClick::Created(_)));
}

#[test]
fn test_note_drag_moves_note() {
    let mut editor = loaded_editor();
    editor.set_note_mode(true);
    click(&mut editor, Point::new(200.0, 200.0), 0.0);
    editor.notes_mut().commit_edit();

    drag(
        &mut editor,
        Point::new(201.0, 200.0),
        Point::new(301.0, 250.0),
        PointerButton::Primary,
    );
    let note = &editor.notes().notes()[0];
    assert!((note.position.x - 300.0).abs() < 1e-9);
    assert!((note.position.y - 250.0).abs() < 1e-9);
    // Dragging does not open the editor
    assert!(editor.notes().editor().is_none());
}

#[test]
fn test_jittered_click_is_still_a_click() {
    let mut editor = loaded_editor();
    let at = end_point(&editor, 1, PanelEnd::Left);

    // A pixel of travel between press and release
    editor.pointer_down(at, PointerButton::Primary);
    editor.pointer_move(Point::new(at.x + 1.0, at.y + 1.0));
    editor.pointer_up(Point::new(at.x + 1.0, at.y + 1.0), 0.0);

    assert_eq!(editor.states().end(1, PanelEnd::Left), EndState::Mc4Installed);
    assert_eq!(editor.states().end(1, PanelEnd::Right), EndState::None);
    assert_eq!(editor.progress().mc4.completed, 1);

    // Same slop after zooming in: the threshold follows the screen scale
    let target = end_point(&editor, 2, PanelEnd::Right);
    for _ in 0..10 {
        editor.wheel(target, 1.0);
    }
    let at = end_point(&editor, 2, PanelEnd::Right);
    editor.pointer_down(at, PointerButton::Primary);
    editor.pointer_up(Point::new(at.x + 2.0, at.y), 10.0);
    assert_eq!(editor.states().end(2, PanelEnd::Right), EndState::Mc4Installed);
    assert_eq!(editor.states().end(2, PanelEnd::Left), EndState::None);
}

#[test]
fn test_jittered_note_click_opens_editor() {
    let mut editor = loaded_editor();
    editor.set_note_mode(true);
    click(&mut editor, Point::new(200.0, 200.0), 0.0);
    editor.notes_mut().commit_edit();
    let id = editor.notes().notes()[0].id;

    editor.pointer_down(Point::new(200.0, 200.0), PointerButton::Primary);
    editor.pointer_move(Point::new(201.0, 201.0));
    editor.pointer_up(Point::new(201.0, 201.0), 1.0);

    let note = &editor.notes().notes()[0];
    assert!((note.position.x - 200.0).abs() < 1e-9);
    assert!((note.position.y - 200.0).abs() < 1e-9);
    assert_eq!(editor.notes().editor().map(|e| e.note_id), Some(id));
}

#[test]
fn test_escape_restores_dragged_note() {
    let mut editor = loaded_editor();
    editor.set_note_mode(true);
    click(&mut editor, Point::new(200.0, 200.0), 0.0);
    editor.notes_mut().commit_edit();

    editor.pointer_down(Point::new(202.0, 199.0), PointerButton::Primary);
    editor.pointer_move(Point::new(400.0, 350.0));
    assert!((editor.notes().notes()[0].position.x - 398.0).abs() < 1e-9);

    assert!(editor.command(Command::Cancel));
    assert_eq!(editor.mode(), InteractionMode::Idle);
    let note = &editor.notes().notes()[0];
    assert!((note.position.x - 200.0).abs() < 1e-9);
    assert!((note.position.y - 200.0).abs() < 1e-9);

    // The release after cancel neither moves the note nor opens its editor
    editor.pointer_up(Point::new(400.0, 350.0), 1.0);
    assert!((editor.notes().notes()[0].position.x - 200.0).abs() < 1e-9);
    assert!(editor.notes().editor().is_none());
}

#[test]
fn test_note_box_select_and_delete() {
    let mut editor = loaded_editor();
    editor.set_note_mode(true);
    for (i, x) in [100.0, 150.0, 600.0].into_iter().enumerate() {
        click(&mut editor, Point::new(x, 100.0), i as f64);
        editor.notes_mut().commit_edit();
    }
    assert_eq!(editor.notes().len(), 3);

    drag(
        &mut editor,
        Point::new(90.0, 90.0),
        Point::new(160.0, 110.0),
        PointerButton::Primary,
    );
    assert_eq!(editor.notes().selected().len(), 2);

    assert!(editor.command(Command::DeleteSelectedNotes));
    assert_eq!(editor.notes().len(), 1);
    assert!(!editor.command(Command::DeleteSelectedNotes));
}

#[test]
fn test_escape_cancels_box_selection() {
    let mut editor = loaded_editor();
    editor.pointer_down(Point::new(1.0, 1.0), PointerButton::Primary);
    editor.pointer_move(Point::new(999.0, 999.0));
    assert!(editor.selection_rect().is_some());

    assert!(editor.command(Command::Cancel));
    assert_eq!(editor.mode(), InteractionMode::Idle);
    editor.pointer_up(Point::new(999.0, 999.0), 0.0);
    assert!(editor.states().is_empty());
}

#[test]
fn test_gestures_ignored_before_load() {
    let mut editor = Editor::default();
    assert!(editor.is_loading());

    editor.pointer_down(Point::new(10.0, 10.0), PointerButton::Primary);
    assert_eq!(editor.mode(), InteractionMode::Idle);
    editor.pointer_up(Point::new(10.0, 10.0), 0.0);
    editor.wheel(Point::new(10.0, 10.0), 1.0);

    assert!(editor.hit_end(Point::new(10.0, 10.0)).is_none());
    assert_eq!(editor.progress().mc4.total, 0);
    assert_eq!(editor.view_box().width, 1000.0);
}

#[test]
fn test_wheel_zoom_and_pan() {
    let mut editor = loaded_editor();
    let anchor = Point::new(250.0, 400.0);

    editor.wheel(anchor, 1.0);
    let view = editor.view_box();
    assert!((view.width - 1000.0 / 1.1).abs() < 1e-9);
    // The canvas point under the cursor stays put
    let under = editor.screen_transform().to_canvas(anchor);
    assert!((under.x - 250.0).abs() < 1e-9);
    assert!((under.y - 400.0).abs() < 1e-9);

    // Middle-button drag pans without touching panel state
    let before = editor.view_box();
    drag(
        &mut editor,
        Point::new(500.0, 500.0),
        Point::new(550.0, 500.0),
        PointerButton::Middle,
    );
    assert!(editor.view_box().x < before.x);
    assert!(editor.states().is_empty());

    assert!(editor.command(Command::FitView));
    assert_eq!(editor.view_box().width, 1000.0);
    assert_eq!(editor.view_box().x, 0.0);
}

#[test]
fn test_submit_daily_log() {
    let mut editor = loaded_editor();
    let mut store = MemoryLogStore::new();

    select_all(&mut editor, PointerButton::Primary);
    let at = end_point(&editor, 0, PanelEnd::Left);
    editor.pointer_down(at, PointerButton::Secondary);
    editor.pointer_up(at, 0.0);
    assert!(editor.is_dirty());

    let date: LogDate = "2025-06-02".parse().unwrap();
    let record = editor
        .submit_daily_log(&mut store, date, " Helios Crew ", 5)
        .unwrap();

    assert_eq!(record.installed_panels, 6);
    assert_eq!(record.subcontractor, "Helios Crew");
    assert_eq!(store.records().len(), 1);
    assert!(!editor.is_dirty());

    click(&mut editor, at, 10.0);
    assert!(editor.is_dirty());
}

#[test]
fn test_reload_resets_session() {
    let mut editor = loaded_editor();
    select_all(&mut editor, PointerButton::Primary);
    editor.set_note_mode(true);
    click(&mut editor, Point::new(100.0, 100.0), 0.0);

    editor.load(&create_test_site());
    assert!(editor.states().is_empty());
    assert!(!editor.can_undo());
    assert!(editor.notes().is_empty());
    assert_eq!(
        editor.fingerprint(),
        Some("0123456789abcdef0123456789abcdef")
    );
}
