//! PV String Tracker Library
//!
//! This library provides the site-map editing core used to track field
//! installation of solar panel strings: coordinate transforms, panel end
//! resolution, hit-testing, the per-end state machine with undo/redo, notes,
//! and the daily progress log.

pub mod config;
pub mod daily_log;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod notes;
pub mod panel;
pub mod selection;
pub mod site;
pub mod tessellate;
pub mod transform;

// Re-export commonly used types
pub use config::EditorConfig;
pub use daily_log::{DailyLogRecord, DailyLogStore, FileLogStore, LogDate, MemoryLogStore};
pub use editor::{BoxAction, Command, Editor, EndHit, InteractionMode, Overlay, PointerButton};
pub use error::{Result, TrackerError};
pub use geometry::Point;
pub use panel::{EndState, PanelEnd, PanelState, Progress, ProgressCounter};
pub use site::{Site, SiteReader};
