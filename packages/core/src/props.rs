//! Property and style handlers.
//!
//! All of them act on the selected node. A handler that would produce the
//! props the node already has leaves the page untouched, so no history entry
//! is recorded for it.

use crate::errors::EngineError;
use crate::node::{Key, Node, Props, STYLE};
use crate::resize::ResizePayload;
use crate::state::{PlatformInfo, State};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

fn selected_node(state: &State) -> Result<(Key, Node), EngineError> {
    let key = state.selected_key().ok_or(EngineError::NoSelection)?;
    let node = state
        .page_config
        .get(key)
        .ok_or_else(|| EngineError::NodeNotFound(key.to_string()))?;
    Ok((key.to_string(), node.clone()))
}

fn replace_props(
    state: &mut State,
    key: &str,
    current: &Props,
    next: Props,
) -> Result<(), EngineError> {
    if *current == next {
        return Ok(());
    }
    state.page_config.update_node(key, |node| node.props = next)?;
    debug!(key = %key, "props updated");
    Ok(())
}

/// Replace the selected node's props. Its style survives unless `props`
/// brings one.
pub(crate) fn change_props(state: &mut State, mut props: Props) -> Result<(), EngineError> {
    let (key, node) = selected_node(state)?;
    if !props.contains_key(STYLE) {
        if let Some(style) = node.props.get(STYLE) {
            props.insert(STYLE.to_string(), style.clone());
        }
    }
    replace_props(state, &key, &node.props, props)
}

/// Back to the component defaults, keeping the current style
pub(crate) fn reset_props(state: &mut State) -> Result<(), EngineError> {
    let (key, node) = selected_node(state)?;
    let mut props = state.registry.default_props(&node.component_name);
    props.remove(STYLE);
    if let Some(style) = node.props.get(STYLE) {
        props.insert(STYLE.to_string(), style.clone());
    }
    replace_props(state, &key, &node.props, props)
}

/// Shallow-merge into the style; `null` removes a property
pub(crate) fn change_styles(state: &mut State, style: Props) -> Result<(), EngineError> {
    let (key, node) = selected_node(state)?;
    let mut next = node.clone();

    let merged = next.style_mut();
    for (name, value) in style {
        if value.is_null() {
            merged.remove(&name);
        } else {
            merged.insert(name, value);
        }
    }
    if merged.is_empty() {
        next.props.remove(STYLE);
    }

    replace_props(state, &key, &node.props, next.props)
}

/// Back to the component's default style (none if it has no default)
pub(crate) fn reset_styles(state: &mut State) -> Result<(), EngineError> {
    let (key, node) = selected_node(state)?;
    let mut props = node.props.clone();
    match state.registry.default_style(&node.component_name) {
        Some(style) => {
            props.insert(STYLE.to_string(), Value::Object(style));
        }
        None => {
            props.remove(STYLE);
        }
    }
    replace_props(state, &key, &node.props, props)
}

/// Declare `prop_name` on the selected node. The config entry is stored as
/// given; the prop takes `value`, or keeps its current value (`null` if it
/// had none).
pub(crate) fn add_props_config(
    state: &mut State,
    prop_name: String,
    prop_config: Value,
    value: Option<Value>,
) -> Result<(), EngineError> {
    let (key, node) = selected_node(state)?;
    if prop_name == STYLE || node.props_config.contains_key(&prop_name) {
        return Err(EngineError::PropExists(prop_name));
    }

    let mut props = node.props;
    match value {
        Some(value) => {
            props.insert(prop_name.clone(), value);
        }
        None => {
            props.entry(prop_name.clone()).or_insert(Value::Null);
        }
    }
    state.page_config.update_node(&key, |node| {
        node.props = props;
        node.props_config.insert(prop_name.clone(), prop_config);
    })?;
    debug!(key = %key, prop = %prop_name, "prop config added");
    Ok(())
}

/// Remove a declared prop along with its value. Undeclared props are left
/// alone.
pub(crate) fn delete_props_config(state: &mut State, prop_name: &str) -> Result<(), EngineError> {
    let (key, node) = selected_node(state)?;
    if !node.props_config.contains_key(prop_name) {
        return Ok(());
    }
    state.page_config.update_node(&key, |node| {
        node.props_config.remove(prop_name);
        node.props.remove(prop_name);
    })?;
    debug!(key = %key, prop = %prop_name, "prop config deleted");
    Ok(())
}

pub(crate) fn resize_change(state: &mut State, payload: ResizePayload) -> Result<(), EngineError> {
    if payload.is_empty() {
        return Ok(());
    }

    let mut style = Props::new();
    if let Some(width) = payload.width {
        style.insert("width".to_string(), Value::String(width));
    }
    if let Some(height) = payload.height {
        style.insert("height".to_string(), Value::String(height));
    }
    change_styles(state, style)
}

pub(crate) fn change_platform(state: &mut State, platform_info: PlatformInfo) {
    if *state.platform_info != platform_info {
        debug!(platform = %platform_info.platform_name, "platform changed");
        state.platform_info = Arc::new(platform_info);
    }
}
