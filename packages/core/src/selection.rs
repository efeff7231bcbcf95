//! Selection and hover tracking.
//!
//! Both key off the page tree: the selection carries the root-to-node key
//! path that geometry code and the drop resolver read, and both are pruned
//! whenever a structural edit removes the node they point at.

use crate::errors::EngineError;
use crate::node::Key;
use crate::page_config::PageConfig;
use crate::state::State;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// The selected node and where it sits in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedInfo {
    pub selected_key: Key,

    /// Root first, ending with `selected_key`
    pub dom_tree_keys: Vec<Key>,

    pub parent_key: Option<Key>,

    /// Slot of the selected node the selection points into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop_name: Option<String>,
}

impl SelectedInfo {
    /// Selection info for `key`, or `None` when the key is not in the page.
    /// A `prop_name` the node does not declare is dropped.
    pub fn resolve(page: &PageConfig, key: &str, prop_name: Option<&str>) -> Option<Self> {
        let dom_tree_keys = page.path_to(key)?;
        let parent_key = page.parent_of(key).map(|parent| parent.key.clone());
        let prop_name = prop_name
            .filter(|name| page.children(key, Some(name)).is_some())
            .map(str::to_string);

        Some(Self {
            selected_key: key.to_string(),
            dom_tree_keys,
            parent_key,
            prop_name,
        })
    }
}

pub(crate) fn select_component(
    state: &mut State,
    key: &str,
    prop_name: Option<&str>,
) -> Result<(), EngineError> {
    let info = SelectedInfo::resolve(&state.page_config, key, prop_name)
        .ok_or_else(|| EngineError::NodeNotFound(key.to_string()))?;

    if state.selected_info.as_deref() != Some(&info) {
        debug!(key = %key, "component selected");
        state.selected_info = Some(Arc::new(info));
    }
    Ok(())
}

pub(crate) fn clear_selected_status(state: &mut State) {
    state.selected_info = None;
}

pub(crate) fn over_target(state: &mut State, key: &str) -> Result<(), EngineError> {
    if !state.page_config.contains(key) {
        return Err(EngineError::NodeNotFound(key.to_string()));
    }
    if state.hover_key.as_deref() != Some(key) {
        state.hover_key = Some(key.to_string());
    }
    Ok(())
}

pub(crate) fn clear_hovered(state: &mut State) {
    state.hover_key = None;
}

/// Recompute the selection path after a structural edit.
///
/// A selection whose node vanished is cleared rather than reported. The
/// previous `Arc` is kept when nothing about the selection changed so
/// subscribers are not woken.
pub(crate) fn refresh(state: &mut State) {
    if let Some(current) = state.selected_info.clone() {
        match SelectedInfo::resolve(
            &state.page_config,
            &current.selected_key,
            current.prop_name.as_deref(),
        ) {
            Some(info) if info == *current => {}
            Some(info) => state.selected_info = Some(Arc::new(info)),
            None => {
                debug!(key = %current.selected_key, "stale selection cleared");
                state.selected_info = None;
            }
        }
    }

    if let Some(hovered) = &state.hover_key {
        if !state.page_config.contains(hovered) {
            state.hover_key = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::node::{ChildNodes, Node, ROOT};

    fn state() -> State {
        let page = PageConfig::from_nodes(vec![
            Node::new(ROOT, "div").with_child_nodes(ChildNodes::List(vec!["a".into()])),
            Node::new("a", "div").with_child_nodes(ChildNodes::List(vec!["b".into()])),
            Node::new("b", "Button"),
        ])
        .unwrap();
        State::with_page(page, &EngineConfig::default())
    }

    #[test]
    fn test_select_records_path() {
        let mut state = state();
        select_component(&mut state, "b", None).unwrap();

        let info = state.selected_info().unwrap();
        assert_eq!(info.dom_tree_keys, vec![ROOT, "a", "b"]);
        assert_eq!(info.parent_key.as_deref(), Some("a"));
    }

    #[test]
    fn test_select_missing_key_keeps_selection() {
        let mut state = state();
        select_component(&mut state, "a", None).unwrap();

        let err = select_component(&mut state, "ghost", None).unwrap_err();
        assert_eq!(err, EngineError::NodeNotFound("ghost".into()));
        assert_eq!(state.selected_key(), Some("a"));
    }

    #[test]
    fn test_reselect_keeps_identity() {
        let mut state = state();
        select_component(&mut state, "a", None).unwrap();
        let before = state.selected_info.clone().unwrap();

        select_component(&mut state, "a", None).unwrap();
        assert!(Arc::ptr_eq(&before, state.selected_info.as_ref().unwrap()));
    }

    #[test]
    fn test_unknown_slot_is_dropped() {
        let mut state = state();
        select_component(&mut state, "a", Some("header")).unwrap();
        assert_eq!(state.selected_info().unwrap().prop_name, None);
    }

    #[test]
    fn test_refresh_clears_stale_selection_and_hover() {
        let mut state = state();
        select_component(&mut state, "b", None).unwrap();
        over_target(&mut state, "b").unwrap();

        state.page_config.remove_subtree("a");
        refresh(&mut state);

        assert!(state.selected_info().is_none());
        assert!(state.hover_key().is_none());
    }

    #[test]
    fn test_hover_is_independent_of_selection() {
        let mut state = state();
        select_component(&mut state, "a", None).unwrap();
        over_target(&mut state, "b").unwrap();
        clear_hovered(&mut state);

        assert_eq!(state.selected_key(), Some("a"));
        assert!(state.hover_key().is_none());
    }
}
