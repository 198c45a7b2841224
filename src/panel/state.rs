// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Per-end installation state and the transitions applied by gestures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PanelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EndState {
    #[default]
    None,
    Mc4Installed,
    Terminated,
}

impl EndState {
    /// Single-click cycle: None → Mc4Installed → Terminated → None.
    pub fn next(self) -> Self {
        match self {
            EndState::None => EndState::Mc4Installed,
            EndState::Mc4Installed => EndState::Terminated,
            EndState::Terminated => EndState::None,
        }
    }

    /// Terminated ends count as MC4 done as well.
    pub fn is_mc4_done(self) -> bool {
        matches!(self, EndState::Mc4Installed | EndState::Terminated)
    }

    pub fn is_terminated(self) -> bool {
        self == EndState::Terminated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelEnd {
    Left,
    Right,
}

impl PanelEnd {
    pub const BOTH: [PanelEnd; 2] = [PanelEnd::Left, PanelEnd::Right];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelState {
    pub left: EndState,
    pub right: EndState,
}

impl PanelState {
    pub fn get(&self, end: PanelEnd) -> EndState {
        match end {
            PanelEnd::Left => self.left,
            PanelEnd::Right => self.right,
        }
    }

    pub fn set(&mut self, end: PanelEnd, state: EndState) {
        match end {
            PanelEnd::Left => self.left = state,
            PanelEnd::Right => self.right = state,
        }
    }

    pub fn is_untouched(&self) -> bool {
        *self == PanelState::default()
    }
}

/// Gesture-level transitions over one or more panel ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Single click: one step through the cycle.
    Cycle,
    /// Double click: straight to Terminated.
    Terminate,
    /// Unselect box: back to None.
    Reset,
}

impl Transition {
    pub fn apply(self, state: EndState) -> EndState {
        match self {
            Transition::Cycle => state.next(),
            Transition::Terminate => EndState::Terminated,
            Transition::Reset => EndState::None,
        }
    }
}

/// Current state of every touched panel. Panels in the default
/// `(None, None)` state have no entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelStateMap {
    states: BTreeMap<PanelId, PanelState>,
}

impl PanelStateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PanelId) -> PanelState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    pub fn end(&self, id: PanelId, end: PanelEnd) -> EndState {
        self.get(id).get(end)
    }

    pub fn set_end(&mut self, id: PanelId, end: PanelEnd, state: EndState) {
        let mut panel = self.get(id);
        panel.set(end, state);
        if panel.is_untouched() {
            self.states.remove(&id);
        } else {
            self.states.insert(id, panel);
        }
    }

    pub fn apply(&mut self, id: PanelId, end: PanelEnd, transition: Transition) {
        let next = transition.apply(self.end(id, end));
        self.set_end(id, end, next);
    }

    /// Apply `transition` to both ends of every panel, each end on its own state.
    pub fn apply_to_panels(&mut self, ids: &[PanelId], transition: Transition) {
        for &id in ids {
            for end in PanelEnd::BOTH {
                self.apply(id, end, transition);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PanelId, PanelState)> + '_ {
        self.states.iter().map(|(id, state)| (*id, *state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressCounter {
    pub total: usize,
    pub completed: usize,
}

impl ProgressCounter {
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f32 * 100.0 / self.total as f32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub mc4: ProgressCounter,
    pub termination: ProgressCounter,
}

impl Progress {
    /// Count ends over `panels`; every panel contributes exactly two ends.
    pub fn count<I>(states: &PanelStateMap, panels: I) -> Self
    where
        I: IntoIterator<Item = PanelId>,
    {
        let mut progress = Progress::default();
        for id in panels {
            let panel = states.get(id);
            progress.mc4.total += 2;
            progress.termination.total += 2;
            for end in PanelEnd::BOTH {
                let state = panel.get(end);
                if state.is_mc4_done() {
                    progress.mc4.completed += 1;
                }
                if state.is_terminated() {
                    progress.termination.completed += 1;
                }
            }
        }
        progress
    }
}
