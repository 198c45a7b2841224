// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Sticky notes anchored to canvas coordinates.
//!
//! Notes live beside the panel state and are not part of the undo history.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::selection::SelectionRect;

/// A click this close to a note (in screen pixels) opens it instead of creating a new one.
pub const NOTE_HIT_RADIUS_PX: f64 = 5.0;

pub type NoteId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub position: Point,
    pub text: String,
}

/// Result of a plain click in note mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteClick {
    Opened(NoteId),
    Created(NoteId),
}

/// Keys the note editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Enter { shift: bool },
    Escape,
}

/// What a key press did to the open editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Committed,
    Cancelled,
    /// Shift+Enter: newline appended to the draft.
    Newline,
    NotEditing,
}

/// Open edit session for a single note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEditor {
    pub note_id: NoteId,
    /// Text at the moment the editor opened; restored on cancel.
    original: String,
}

impl NoteEditor {
    pub fn original(&self) -> &str {
        &self.original
    }
}

#[derive(Debug, Clone)]
pub struct NoteLayer {
    notes: Vec<Note>,
    next_id: NoteId,
    selected: BTreeSet<NoteId>,
    editor: Option<NoteEditor>,
}

impl Default for NoteLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteLayer {
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            next_id: 1,
            selected: BTreeSet::new(),
            editor: None,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn create(&mut self, position: Point, text: impl Into<String>) -> NoteId {
        let id = self.next_id;
        self.next_id += 1;
        self.notes.push(Note {
            id,
            position,
            text: text.into(),
        });
        log::debug!("Created note {id} at ({:.2}, {:.2})", position.x, position.y);
        id
    }

    /// Nearest note within `radius` canvas units of `point`.
    pub fn hit_test(&self, point: Point, radius: f64) -> Option<NoteId> {
        self.notes
            .iter()
            .map(|n| (n.id, n.position.distance_to(point)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Click policy: open a note under the pointer, otherwise create one.
    /// Either way the editor ends up open on the resulting note.
    pub fn click(&mut self, point: Point, radius: f64) -> NoteClick {
        if let Some(id) = self.hit_test(point, radius) {
            self.open_editor(id);
            return NoteClick::Opened(id);
        }
        let id = self.create(point, String::new());
        self.open_editor(id);
        NoteClick::Created(id)
    }

    pub fn move_to(&mut self, id: NoteId, position: Point) {
        if let Some(note) = self.get_mut(id) {
            note.position = position;
        }
    }

    pub fn delete(&mut self, id: NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == id)?;
        self.selected.remove(&id);
        if self.editor.as_ref().is_some_and(|e| e.note_id == id) {
            self.editor = None;
        }
        Some(self.notes.remove(index))
    }

    // Selection

    pub fn selected(&self) -> &BTreeSet<NoteId> {
        &self.selected
    }

    pub fn is_selected(&self, id: NoteId) -> bool {
        self.selected.contains(&id)
    }

    /// Replace the selection with every note whose position lies in `rect`.
    pub fn box_select(&mut self, rect: &SelectionRect) -> usize {
        self.selected = self
            .notes
            .iter()
            .filter(|n| rect.contains(n.position))
            .map(|n| n.id)
            .collect();
        self.selected.len()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn delete_selected(&mut self) -> usize {
        if self.selected.is_empty() {
            return 0;
        }
        let selected = std::mem::take(&mut self.selected);
        let before = self.notes.len();
        self.notes.retain(|n| !selected.contains(&n.id));
        if self
            .editor
            .as_ref()
            .is_some_and(|e| selected.contains(&e.note_id))
        {
            self.editor = None;
        }
        let removed = before - self.notes.len();
        log::debug!("Deleted {removed} selected notes");
        removed
    }

    // Editing

    pub fn editor(&self) -> Option<&NoteEditor> {
        self.editor.as_ref()
    }

    pub fn open_editor(&mut self, id: NoteId) -> bool {
        let Some(note) = self.get(id) else {
            return false;
        };
        self.editor = Some(NoteEditor {
            note_id: id,
            original: note.text.clone(),
        });
        true
    }

    /// Text of the note being edited.
    pub fn draft(&self) -> Option<&str> {
        let editor = self.editor.as_ref()?;
        self.get(editor.note_id).map(|n| n.text.as_str())
    }

    /// Replace the draft; the note text updates live.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let Some(id) = self.editor.as_ref().map(|e| e.note_id) {
            if let Some(note) = self.get_mut(id) {
                note.text = text.into();
            }
        }
    }

    pub fn commit_edit(&mut self) -> bool {
        self.editor.take().is_some()
    }

    /// Close the editor and restore the text the note had when it opened.
    pub fn cancel_edit(&mut self) -> bool {
        let Some(editor) = self.editor.take() else {
            return false;
        };
        if let Some(note) = self.get_mut(editor.note_id) {
            note.text = editor.original;
        }
        true
    }

    pub fn handle_editor_key(&mut self, key: EditorKey) -> EditOutcome {
        if self.editor.is_none() {
            return EditOutcome::NotEditing;
        }
        match key {
            EditorKey::Enter { shift: false } => {
                self.commit_edit();
                EditOutcome::Committed
            }
            EditorKey::Enter { shift: true } => {
                let draft = format!("{}\n", self.draft().unwrap_or_default());
                self.set_draft(draft);
                EditOutcome::Newline
            }
            EditorKey::Escape => {
                self.cancel_edit();
                EditOutcome::Cancelled
            }
        }
    }
}
