//! # Undo/Redo History
//!
//! Linear list of snapshots with a cursor.
//!
//! ## Design
//!
//! - Each undoable edit records a snapshot of the page and selection
//! - Undo/redo move the cursor and hand back the snapshot to restore
//! - Recording after an undo discards every redo entry (new branch)
//! - The entry list is bounded; the oldest entries are evicted first
//!
//! Snapshots are cheap: pages share structure with the live tree, and the
//! entry list itself is a persistent vector, so cloning the whole state on
//! every dispatch stays O(1).
//!
//! ```text
//! record(s3)     [s0, s1, s2, s3]   cursor → s3
//! undo() x2      [s0, s1, s2, s3]   cursor → s1   (s2, s3 redoable)
//! record(s4)     [s0, s1, s4]       cursor → s4   (redo gone)
//! ```

use crate::errors::EngineError;
use crate::page_config::PageConfig;
use crate::selection::SelectedInfo;
use crate::state::State;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Immutable copy of the undoable part of the state
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub page_config: PageConfig,
    pub selected_info: Option<Arc<SelectedInfo>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum number of retained entries, current one included
    /// (0 = unlimited)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    100
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Snapshot history with a cursor
#[derive(Debug, Clone)]
pub struct History {
    entries: im::Vector<Arc<Snapshot>>,
    cursor: usize,
    config: HistoryConfig,
}

impl History {
    /// Start a history whose only entry is `initial`
    pub fn new(initial: Snapshot, config: HistoryConfig) -> Self {
        let mut entries = im::Vector::new();
        entries.push_back(Arc::new(initial));
        Self {
            entries,
            cursor: 0,
            config,
        }
    }

    /// Append a snapshot after the cursor, discarding redo entries
    pub fn record(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(Arc::new(snapshot));
        self.cursor = self.entries.len() - 1;
        self.enforce_depth();
    }

    /// Step back, returning the snapshot to restore
    pub fn undo(&mut self) -> Result<Arc<Snapshot>, EngineError> {
        if self.cursor == 0 {
            return Err(EngineError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(self.current())
    }

    /// Step forward, returning the snapshot to restore
    pub fn redo(&mut self) -> Result<Arc<Snapshot>, EngineError> {
        if self.cursor + 1 >= self.entries.len() {
            return Err(EngineError::NothingToRedo);
        }
        self.cursor += 1;
        Ok(self.current())
    }

    /// Snapshot at the cursor
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.entries[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of undo steps available
    pub fn undo_levels(&self) -> usize {
        self.cursor
    }

    /// Number of redo steps available
    pub fn redo_levels(&self) -> usize {
        self.entries.len() - self.cursor - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Same entries and cursor, without comparing snapshots
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.cursor == other.cursor && self.entries.ptr_eq(&other.entries)
    }

    fn enforce_depth(&mut self) {
        if self.config.max_depth == 0 {
            return;
        }
        while self.entries.len() > self.config.max_depth && self.cursor > 0 {
            self.entries.pop_front();
            self.cursor -= 1;
        }
    }
}

pub(crate) fn undo(state: &mut State) -> Result<(), EngineError> {
    let snapshot = state.history.undo()?;
    debug!(levels = state.history.undo_levels(), "undo");
    state.restore(&snapshot);
    Ok(())
}

pub(crate) fn redo(state: &mut State) -> Result<(), EngineError> {
    let snapshot = state.history.redo()?;
    debug!(levels = state.history.redo_levels(), "redo");
    state.restore(&snapshot);
    Ok(())
}
