//! Structural edit handlers.
//!
//! Each handler applies one tree action to a working copy of the state. The
//! reducer decides afterwards whether the page actually changed and records
//! history; handlers never touch the history themselves.

use crate::errors::EngineError;
use crate::node::{Key, Props, ROOT};
use crate::state::State;
use tracing::{debug, info};

/// Insert a new `component_name` node. On an empty page, adding under
/// [`ROOT`] creates the root node itself.
pub(crate) fn add_component(
    state: &mut State,
    parent_key: &str,
    component_name: &str,
    index: Option<usize>,
    prop_name: Option<&str>,
    props: Option<&Props>,
) -> Result<Key, EngineError> {
    if state.page_config.is_empty() {
        if parent_key != ROOT {
            return Err(EngineError::InvalidParent(parent_key.to_string()));
        }
        let node = state.registry.instantiate(ROOT, component_name, props);
        state.page_config.insert_root(node)?;
        info!(component = %component_name, "page root created");
        return Ok(ROOT.to_string());
    }

    let parent = state
        .page_config
        .get(parent_key)
        .filter(|parent| parent.children(prop_name).is_some())
        .ok_or_else(|| EngineError::InvalidParent(parent_key.to_string()))?;
    if !state
        .registry
        .allows_nesting(&parent.component_name, component_name)
    {
        return Err(EngineError::NestingRule {
            parent: parent.component_name.clone(),
            child: component_name.to_string(),
        });
    }

    let key = state.keys.next_unused(&state.page_config);
    let node = state.registry.instantiate(&key, component_name, props);
    let at = state
        .page_config
        .insert_child(parent_key, prop_name, index, node)?;
    debug!(key = %key, parent = %parent_key, index = at, "component added");
    Ok(key)
}

/// Remove a subtree. The root and unknown keys are left alone.
pub(crate) fn delete_component(state: &mut State, key: &str) {
    if state.page_config.remove_subtree(key) {
        debug!(key = %key, "component deleted");
    }
}

/// Duplicate a subtree right after the original. The root and unknown keys
/// are left alone.
pub(crate) fn copy_component(state: &mut State, key: &str) -> Result<Option<Key>, EngineError> {
    if key == ROOT || !state.page_config.contains(key) {
        return Ok(None);
    }
    let clone = state.page_config.copy_subtree(key, &mut state.keys)?;
    debug!(key = %key, clone = %clone, "component copied");
    Ok(Some(clone))
}

pub(crate) fn clear_child_nodes(
    state: &mut State,
    key: &str,
    prop_name: Option<&str>,
) -> Result<(), EngineError> {
    if state.page_config.clear_children(key, prop_name)? {
        debug!(key = %key, "children cleared");
    }
    Ok(())
}

pub(crate) fn move_node(
    state: &mut State,
    source_key: &str,
    target_key: &str,
    prop_name: Option<&str>,
    index: Option<usize>,
) -> Result<(), EngineError> {
    let page = &state.page_config;
    if page.contains(source_key)
        && (source_key == target_key || page.is_descendant_of(target_key, source_key))
    {
        return Err(EngineError::CyclicMove {
            key: source_key.to_string(),
            target: target_key.to_string(),
        });
    }
    if let (Some(child), Some(parent)) = (page.get(source_key), page.get(target_key)) {
        if parent.is_container()
            && !state
                .registry
                .allows_nesting(&parent.component_name, &child.component_name)
        {
            return Err(EngineError::NestingRule {
                parent: parent.component_name.clone(),
                child: child.component_name.clone(),
            });
        }
    }

    if is_in_place(state, source_key, target_key, prop_name, index) {
        return Ok(());
    }

    let at = state
        .page_config
        .move_node(source_key, target_key, prop_name, index)?;
    debug!(key = %source_key, target = %target_key, index = at, "node moved");
    Ok(())
}

pub(crate) fn sort_children(
    state: &mut State,
    parent_key: &str,
    prop_name: Option<&str>,
    sort_keys: &[Key],
) -> Result<(), EngineError> {
    if state
        .page_config
        .reorder_children(parent_key, prop_name, sort_keys)?
    {
        debug!(parent = %parent_key, "children reordered");
    }
    Ok(())
}

/// Whether moving `key` would put it back exactly where it already is
fn is_in_place(
    state: &State,
    key: &str,
    target_key: &str,
    prop_name: Option<&str>,
    index: Option<usize>,
) -> bool {
    let page = &state.page_config;
    let Some(parent) = page.parent_of(key) else {
        return false;
    };
    if parent.key != target_key || parent.prop_name.as_deref() != prop_name {
        return false;
    }
    let Some(siblings) = page.children(target_key, prop_name) else {
        return false;
    };
    let Some(current) = siblings.iter().position(|k| k == key) else {
        return false;
    };
    let remaining = siblings.len() - 1;
    index.map_or(remaining, |i| i.min(remaining)) == current
}
