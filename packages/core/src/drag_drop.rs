//! # Drag/Drop Resolver
//!
//! Drag gesture lifecycle and drop-target resolution.
//!
//! ```text
//! Idle ──getDragSource──▶ Dragging ──onDrop──────────▶ Idle (committed)
//!                            │  ▲
//!                            │  └── getDropTarget (re-resolve on pointer move)
//!                            └────clearDragSource────▶ Idle (cancelled)
//! ```
//!
//! Resolution picks the deepest container that can accept the dragged
//! component at the pointer. Geometry comes from the host as a
//! [`LayoutSnapshot`]; nodes without a measured box still take part when
//! they lie on the candidate's ancestor path.

use crate::edits;
use crate::errors::EngineError;
use crate::geometry::{LayoutSnapshot, Point};
use crate::node::{ChildNodes, Key, Props, ROOT};
use crate::page_config::PageConfig;
use crate::schema::{modal_surface, ComponentRegistry};
use crate::state::State;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// What is being dragged: a palette entry (`key == None`) or an existing node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragSource {
    pub component_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,

    /// Props for a new node, layered over the component defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_props: Option<Props>,
}

impl DragSource {
    /// New component dragged from the palette
    pub fn component(component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            key: None,
            default_props: None,
        }
    }

    /// Existing node dragged within the page
    pub fn node(key: impl Into<Key>, component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            key: Some(key.into()),
            default_props: None,
        }
    }

    pub fn with_default_props(mut self, props: Props) -> Self {
        self.default_props = Some(props);
        self
    }
}

/// Resolved insertion point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    pub key: Key,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop_name: Option<String>,

    pub index: usize,
}

impl DropTarget {
    pub fn new(key: impl Into<Key>, prop_name: Option<&str>, index: usize) -> Self {
        Self {
            key: key.into(),
            prop_name: prop_name.map(str::to_string),
            index,
        }
    }
}

struct Candidate<'a> {
    key: &'a str,
    prop_name: Option<String>,
    depth: usize,
    distance: f64,
}

/// Find where `source` would land if dropped at `pointer`.
///
/// Candidates are `candidate_key` with its ancestors, plus every node whose
/// measured box contains the pointer. The deepest eligible container wins;
/// ties go to the container whose box center is closest to the pointer.
pub fn resolve_drop_target(
    page: &PageConfig,
    registry: &ComponentRegistry,
    source: &DragSource,
    candidate_key: Option<&str>,
    pointer: Point,
    layout: &LayoutSnapshot,
) -> Option<DropTarget> {
    // Only a new component can land on an empty page, and it becomes the root
    if page.is_empty() {
        return source.key.is_none().then(|| DropTarget::new(ROOT, None, 0));
    }

    let mut keys: BTreeSet<&str> = BTreeSet::new();
    let mut current = candidate_key.and_then(|key| page.get(key));
    while let Some(node) = current {
        keys.insert(node.key.as_str());
        current = page
            .parent_of(&node.key)
            .and_then(|parent| page.get(&parent.key));
    }
    for (key, rect) in &layout.nodes {
        if rect.contains(pointer) && page.contains(key) {
            keys.insert(key.as_str());
        }
    }

    let best = keys
        .into_iter()
        .filter_map(|key| {
            let prop_name = insertion_slot(page, registry, source, key, pointer, layout)?;
            Some(Candidate {
                key,
                prop_name,
                depth: page.depth(key)?,
                distance: layout
                    .node_box(key)
                    .map_or(f64::INFINITY, |rect| rect.center().distance(pointer)),
            })
        })
        .min_by(|a, b| {
            b.depth
                .cmp(&a.depth)
                .then(a.distance.total_cmp(&b.distance))
                .then_with(|| a.key.cmp(b.key))
        })?;

    let index = page
        .children(best.key, best.prop_name.as_deref())
        .map(|children| {
            children
                .iter()
                .filter(|child| source.key.as_ref() != Some(*child))
                .filter(|child| {
                    layout
                        .node_box(child)
                        .map_or(true, |rect| rect.precedes(pointer))
                })
                .count()
        })
        .unwrap_or(0);

    Some(DropTarget::new(best.key, best.prop_name.as_deref(), index))
}

/// The insertion point of `key` that can take `source` at `pointer`:
/// `Some(None)` for a list container, `Some(Some(slot))` for a slot
/// container, `None` when the node is not eligible.
fn insertion_slot(
    page: &PageConfig,
    registry: &ComponentRegistry,
    source: &DragSource,
    key: &str,
    pointer: Point,
    layout: &LayoutSnapshot,
) -> Option<Option<String>> {
    let node = page.get(key)?;
    let children = node.child_nodes.as_ref()?;

    if let Some(dragged) = &source.key {
        if key == dragged || page.is_descendant_of(key, dragged) {
            return None;
        }
    }
    if !registry.allows_nesting(&node.component_name, &source.component_name) {
        return None;
    }
    if modal_surface(page, registry, key) != layout.surface {
        return None;
    }

    match children {
        ChildNodes::List(_) => Some(None),
        ChildNodes::Slots(slots) if slots.len() == 1 => slots.keys().next().cloned().map(Some),
        ChildNodes::Slots(slots) => layout
            .slot_at(key, pointer)
            .filter(|name| slots.contains_key(*name))
            .map(|name| Some(name.to_string())),
    }
}

pub(crate) fn get_drag_source(state: &mut State, source: DragSource) -> Result<(), EngineError> {
    // The tree is authoritative for the component of an existing node
    let source = match source.key.clone() {
        Some(key) => {
            let node = state
                .page_config
                .get(&key)
                .ok_or_else(|| EngineError::NodeNotFound(key.clone()))?;
            let component_name = node.component_name.clone();
            DragSource::node(key, component_name)
        }
        None => source,
    };

    debug!(component = %source.component_name, "drag started");
    state.drag_source = Some(Arc::new(source));
    state.drop_target = None;
    Ok(())
}

pub(crate) fn get_drop_target(
    state: &mut State,
    candidate_key: Option<&str>,
    pointer: Point,
    layout: &LayoutSnapshot,
) -> Result<(), EngineError> {
    let source = state.drag_source.clone().ok_or(EngineError::NotDragging)?;

    match resolve_drop_target(
        &state.page_config,
        &state.registry,
        &source,
        candidate_key,
        pointer,
        layout,
    ) {
        Some(target) => {
            if state.hover_key.as_deref() != Some(target.key.as_str())
                && state.page_config.contains(&target.key)
            {
                state.hover_key = Some(target.key.clone());
            }
            if state.drop_target.as_deref() != Some(&target) {
                state.drop_target = Some(Arc::new(target));
            }
        }
        None => {
            state.drop_target = None;
            state.hover_key = None;
        }
    }
    Ok(())
}

/// Commit the pending drop. Drag state is cleared whether or not anything
/// was committed.
pub(crate) fn on_drop(state: &mut State) -> Result<(), EngineError> {
    let source = state.drag_source.take();
    let target = state.drop_target.take();
    state.hover_key = None;

    let (Some(source), Some(target)) = (source, target) else {
        debug!("drop without target");
        return Ok(());
    };

    match &source.key {
        Some(key) => edits::move_node(
            state,
            key,
            &target.key,
            target.prop_name.as_deref(),
            Some(target.index),
        ),
        None => edits::add_component(
            state,
            &target.key,
            &source.component_name,
            Some(target.index),
            target.prop_name.as_deref(),
            source.default_props.as_ref(),
        )
        .map(|_| ()),
    }
}

pub(crate) fn clear_drag_source(state: &mut State) {
    state.drag_source = None;
    state.drop_target = None;
    state.hover_key = None;
}

pub(crate) fn clear_drop_target(state: &mut State) {
    state.drop_target = None;
    state.hover_key = None;
}
