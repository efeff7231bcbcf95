//! The observable engine state.
//!
//! Every field is either a persistent structure or sits behind an [`Arc`],
//! so cloning a state is cheap and slices that an action did not touch keep
//! their identity. Subscribers compare slices by pointer, never by value.

use crate::config::EngineConfig;
use crate::drag_drop::{DragSource, DropTarget};
use crate::history::{History, Snapshot};
use crate::key_generator::KeyGenerator;
use crate::node::Key;
use crate::page_config::PageConfig;
use crate::schema::ComponentRegistry;
use crate::selection::SelectedInfo;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Preview device the canvas is rendered for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    pub platform_name: String,
    /// Viewport `[width, height]`
    pub size: [u32; 2],
}

impl PlatformInfo {
    pub fn new(platform_name: impl Into<String>, size: [u32; 2]) -> Self {
        Self {
            platform_name: platform_name.into(),
            size,
        }
    }

    pub fn pc() -> Self {
        Self::new("PC", [1280, 800])
    }

    pub fn mobile() -> Self {
        Self::new("iPhone 8", [375, 667])
    }
}

impl Default for PlatformInfo {
    fn default() -> Self {
        Self::pc()
    }
}

#[derive(Debug, Clone)]
pub struct State {
    pub(crate) page_config: PageConfig,
    pub(crate) selected_info: Option<Arc<SelectedInfo>>,
    pub(crate) hover_key: Option<Key>,
    pub(crate) drag_source: Option<Arc<DragSource>>,
    pub(crate) drop_target: Option<Arc<DropTarget>>,
    pub(crate) platform_info: Arc<PlatformInfo>,
    pub(crate) history: History,
    pub(crate) keys: KeyGenerator,
    pub(crate) registry: Arc<ComponentRegistry>,
}

impl State {
    /// State over an empty page
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_page(PageConfig::new(), config)
    }

    /// State over an already validated page. The page becomes the first
    /// history entry.
    pub fn with_page(page_config: PageConfig, config: &EngineConfig) -> Self {
        let history = History::new(
            Snapshot {
                page_config: page_config.clone(),
                selected_info: None,
            },
            config.history,
        );

        Self {
            page_config,
            selected_info: None,
            hover_key: None,
            drag_source: None,
            drop_target: None,
            platform_info: Arc::new(config.platform.clone()),
            history,
            keys: KeyGenerator::new(config.key_seed.clone()),
            registry: Arc::new(config.registry()),
        }
    }

    pub fn page_config(&self) -> &PageConfig {
        &self.page_config
    }

    pub fn selected_info(&self) -> Option<&SelectedInfo> {
        self.selected_info.as_deref()
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.selected_info().map(|info| info.selected_key.as_str())
    }

    pub fn hover_key(&self) -> Option<&str> {
        self.hover_key.as_deref()
    }

    pub fn drag_source(&self) -> Option<&DragSource> {
        self.drag_source.as_deref()
    }

    pub fn drop_target(&self) -> Option<&DropTarget> {
        self.drop_target.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_source.is_some()
    }

    pub fn platform_info(&self) -> &PlatformInfo {
        &self.platform_info
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn key_generator(&self) -> &KeyGenerator {
        &self.keys
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            page_config: self.page_config.clone(),
            selected_info: self.selected_info.clone(),
        }
    }

    /// Bring back a history entry. Transient pointer state that refers to
    /// nodes the restored page lacks is dropped.
    pub(crate) fn restore(&mut self, snapshot: &Snapshot) {
        self.page_config = snapshot.page_config.clone();
        self.selected_info = snapshot.selected_info.clone();

        if let Some(hovered) = &self.hover_key {
            if !self.page_config.contains(hovered) {
                self.hover_key = None;
            }
        }

        let dragged_gone = self
            .drag_source
            .as_ref()
            .and_then(|source| source.key.as_ref())
            .is_some_and(|key| !self.page_config.contains(key));
        if dragged_gone {
            self.drag_source = None;
            self.drop_target = None;
        }

        let target_gone = self
            .drop_target
            .as_ref()
            .is_some_and(|target| !self.page_config.contains(&target.key));
        if target_gone {
            self.drop_target = None;
        }
    }
}

/// Independently observable part of [`State`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    PageConfig,
    SelectedInfo,
    HoverKey,
    DragSource,
    DropTarget,
    PlatformInfo,
    History,
}

impl Slice {
    pub const ALL: [Slice; 7] = [
        Slice::PageConfig,
        Slice::SelectedInfo,
        Slice::HoverKey,
        Slice::DragSource,
        Slice::DropTarget,
        Slice::PlatformInfo,
        Slice::History,
    ];

    /// Identity comparison of this slice between two states
    pub fn changed(&self, prev: &State, next: &State) -> bool {
        match self {
            Slice::PageConfig => !prev.page_config.ptr_eq(&next.page_config),
            Slice::SelectedInfo => !same_arc(&prev.selected_info, &next.selected_info),
            Slice::HoverKey => prev.hover_key != next.hover_key,
            Slice::DragSource => !same_arc(&prev.drag_source, &next.drag_source),
            Slice::DropTarget => !same_arc(&prev.drop_target, &next.drop_target),
            Slice::PlatformInfo => !Arc::ptr_eq(&prev.platform_info, &next.platform_info),
            Slice::History => !prev.history.ptr_eq(&next.history),
        }
    }
}

/// Every slice whose identity differs between the two states
pub fn changed_slices(prev: &State, next: &State) -> Vec<Slice> {
    Slice::ALL
        .into_iter()
        .filter(|slice| slice.changed(prev, next))
        .collect()
}

fn same_arc<T>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ChildNodes, Node, ROOT};

    fn page() -> PageConfig {
        PageConfig::from_nodes(vec![
            Node::new(ROOT, "div").with_child_nodes(ChildNodes::List(vec!["a".into()])),
            Node::new("a", "Button"),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_state_records_initial_entry() {
        let state = State::with_page(page(), &EngineConfig::default());
        assert_eq!(state.history().len(), 1);
        assert!(!state.history().can_undo());
        assert_eq!(state.platform_info(), &PlatformInfo::pc());
        assert!(!state.is_dragging());
    }

    #[test]
    fn test_clone_changes_nothing() {
        let state = State::with_page(page(), &EngineConfig::default());
        let copy = state.clone();
        assert!(changed_slices(&state, &copy).is_empty());
    }

    #[test]
    fn test_changed_slices_by_identity() {
        let state = State::with_page(page(), &EngineConfig::default());
        let mut next = state.clone();
        next.hover_key = Some("a".into());
        next.platform_info = Arc::new(PlatformInfo::pc());

        // Equal value behind a new Arc still counts as a change
        assert_eq!(
            changed_slices(&state, &next),
            vec![Slice::HoverKey, Slice::PlatformInfo]
        );
    }

    #[test]
    fn test_restore_prunes_vanished_hover() {
        let config = EngineConfig::default();
        let empty = State::new(&config);
        let mut state = State::with_page(page(), &config);
        state.hover_key = Some("a".into());

        state.restore(&empty.snapshot());
        assert!(state.page_config().is_empty());
        assert!(state.hover_key().is_none());
    }
}
