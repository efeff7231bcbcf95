//! # Actions
//!
//! The closed set of commands the engine accepts. Actions are plain data and
//! travel as JSON objects tagged by `type`:
//!
//! ```json
//! { "type": "addComponent", "parentKey": "root", "componentName": "Button" }
//! ```
//!
//! Tags the engine does not know decode to [`Action::Unknown`], which the
//! reducer treats as a no-op.

use crate::drag_drop::DragSource;
use crate::geometry::{LayoutSnapshot, Point};
use crate::node::{Key, Props};
use crate::resize::ResizePayload;
use crate::state::PlatformInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    // Tree edits
    #[serde(rename_all = "camelCase")]
    AddComponent {
        parent_key: Key,
        component_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prop_name: Option<String>,
    },

    DeleteComponent {
        key: Key,
    },

    CopyComponent {
        key: Key,
    },

    #[serde(rename_all = "camelCase")]
    ClearChildNodes {
        key: Key,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prop_name: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    MoveNode {
        source_key: Key,
        target_key: Key,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prop_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    #[serde(rename_all = "camelCase")]
    OnLayoutSortChange {
        parent_key: Key,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prop_name: Option<String>,
        sort_keys: Vec<Key>,
    },

    // Drag and drop
    GetDragSource(DragSource),

    #[serde(rename_all = "camelCase")]
    GetDropTarget {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        candidate_key: Option<Key>,
        pointer: Point,
        #[serde(default)]
        layout: Arc<LayoutSnapshot>,
    },

    OnDrop,
    ClearDragSource,
    ClearDropTarget,

    // Selection and hover
    OverTarget {
        key: Key,
    },

    ClearHovered,

    #[serde(rename_all = "camelCase")]
    SelectComponent {
        key: Key,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prop_name: Option<String>,
    },

    ClearSelectedStatus,

    // Props and styles of the selected node
    ChangeProps {
        props: Props,
    },

    ResetProps,

    ChangeStyles {
        style: Props,
    },

    ResetStyles,

    /// Declare a new prop on the selected node: store its config entry and
    /// set the prop (to `value`, or `null` when the node lacks it)
    #[serde(rename_all = "camelCase")]
    AddPropsConfig {
        prop_name: String,
        prop_config: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },

    /// Drop a declared prop and its value from the selected node
    #[serde(rename_all = "camelCase")]
    DeletePropsConfig {
        prop_name: String,
    },

    ResizeChange(ResizePayload),
    ChangePlatform(PlatformInfo),

    // History
    Undo,
    Redo,

    #[serde(other)]
    Unknown,
}

impl Action {
    /// The `type` tag of this action
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddComponent { .. } => "addComponent",
            Action::DeleteComponent { .. } => "deleteComponent",
            Action::CopyComponent { .. } => "copyComponent",
            Action::ClearChildNodes { .. } => "clearChildNodes",
            Action::MoveNode { .. } => "moveNode",
            Action::OnLayoutSortChange { .. } => "onLayoutSortChange",
            Action::GetDragSource(_) => "getDragSource",
            Action::GetDropTarget { .. } => "getDropTarget",
            Action::OnDrop => "onDrop",
            Action::ClearDragSource => "clearDragSource",
            Action::ClearDropTarget => "clearDropTarget",
            Action::OverTarget { .. } => "overTarget",
            Action::ClearHovered => "clearHovered",
            Action::SelectComponent { .. } => "selectComponent",
            Action::ClearSelectedStatus => "clearSelectedStatus",
            Action::ChangeProps { .. } => "changeProps",
            Action::ResetProps => "resetProps",
            Action::ChangeStyles { .. } => "changeStyles",
            Action::ResetStyles => "resetStyles",
            Action::AddPropsConfig { .. } => "addPropsConfig",
            Action::DeletePropsConfig { .. } => "deletePropsConfig",
            Action::ResizeChange(_) => "resizeChange",
            Action::ChangePlatform(_) => "changePlatform",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::Unknown => "unknown",
        }
    }

    /// Whether a successful page change by this action gets a history entry
    pub fn is_undoable(&self) -> bool {
        matches!(
            self,
            Action::AddComponent { .. }
                | Action::DeleteComponent { .. }
                | Action::CopyComponent { .. }
                | Action::ClearChildNodes { .. }
                | Action::MoveNode { .. }
                | Action::OnLayoutSortChange { .. }
                | Action::OnDrop
                | Action::ChangeProps { .. }
                | Action::ResetProps
                | Action::ChangeStyles { .. }
                | Action::ResetStyles
                | Action::AddPropsConfig { .. }
                | Action::DeletePropsConfig { .. }
                | Action::ResizeChange(_)
        )
    }

    pub fn add_component(parent_key: impl Into<Key>, component_name: impl Into<String>) -> Self {
        Action::AddComponent {
            parent_key: parent_key.into(),
            component_name: component_name.into(),
            index: None,
            prop_name: None,
        }
    }

    pub fn delete_component(key: impl Into<Key>) -> Self {
        Action::DeleteComponent { key: key.into() }
    }

    pub fn copy_component(key: impl Into<Key>) -> Self {
        Action::CopyComponent { key: key.into() }
    }

    pub fn move_node(
        source_key: impl Into<Key>,
        target_key: impl Into<Key>,
        index: Option<usize>,
    ) -> Self {
        Action::MoveNode {
            source_key: source_key.into(),
            target_key: target_key.into(),
            prop_name: None,
            index,
        }
    }

    pub fn select_component(key: impl Into<Key>) -> Self {
        Action::SelectComponent {
            key: key.into(),
            prop_name: None,
        }
    }

    pub fn get_drop_target(
        candidate_key: Option<&str>,
        pointer: Point,
        layout: LayoutSnapshot,
    ) -> Self {
        Action::GetDropTarget {
            candidate_key: candidate_key.map(str::to_string),
            pointer,
            layout: Arc::new(layout),
        }
    }
}
