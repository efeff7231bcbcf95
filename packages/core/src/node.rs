//! # Page Nodes
//!
//! A node is one component instance in the page tree: which renderer to use,
//! its opaque props, and the keys of its children. Children are stored by key
//! only; the nodes themselves live in the flat [`PageConfig`] mapping.
//!
//! [`PageConfig`]: crate::PageConfig

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Node identifier, unique within a page and stable for the node's lifetime
pub type Key = String;

/// Opaque component props (JSON object)
pub type Props = serde_json::Map<String, Value>;

/// Key of the page root
pub const ROOT: &str = "root";

/// Name of the nested style object inside props
pub const STYLE: &str = "style";

/// Child layout of a container node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildNodes {
    /// Single ordered insertion point
    List(Vec<Key>),

    /// Named slots, each with its own ordered children
    Slots(BTreeMap<String, Vec<Key>>),
}

impl ChildNodes {
    /// Ordered children of one insertion point.
    ///
    /// List containers only answer `None`; slot containers only answer a
    /// slot they declare.
    pub fn slot(&self, prop_name: Option<&str>) -> Option<&Vec<Key>> {
        match (self, prop_name) {
            (ChildNodes::List(keys), None) => Some(keys),
            (ChildNodes::Slots(slots), Some(name)) => slots.get(name),
            _ => None,
        }
    }

    pub fn slot_mut(&mut self, prop_name: Option<&str>) -> Option<&mut Vec<Key>> {
        match (self, prop_name) {
            (ChildNodes::List(keys), None) => Some(keys),
            (ChildNodes::Slots(slots), Some(name)) => slots.get_mut(name),
            _ => None,
        }
    }

    pub fn has_slot(&self, prop_name: Option<&str>) -> bool {
        self.slot(prop_name).is_some()
    }

    /// Every child key paired with the slot it lives in, in order
    pub fn entries(&self) -> Vec<(Option<&str>, &Key)> {
        match self {
            ChildNodes::List(keys) => keys.iter().map(|key| (None, key)).collect(),
            ChildNodes::Slots(slots) => slots
                .iter()
                .flat_map(|(name, keys)| keys.iter().map(move |key| (Some(name.as_str()), key)))
                .collect(),
        }
    }

    pub fn keys(&self) -> Vec<&Key> {
        self.entries().into_iter().map(|(_, key)| key).collect()
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChildNodes::List(keys) => keys.is_empty(),
            ChildNodes::Slots(slots) => slots.values().all(Vec::is_empty),
        }
    }

    /// Empty every insertion point, keeping the declared slots
    pub fn clear(&mut self) {
        match self {
            ChildNodes::List(keys) => keys.clear(),
            ChildNodes::Slots(slots) => slots.values_mut().for_each(Vec::clear),
        }
    }

    /// Rewrite every child key
    pub fn rename(&mut self, mut rename: impl FnMut(&str) -> Key) {
        let lists: Vec<&mut Vec<Key>> = match self {
            ChildNodes::List(keys) => vec![keys],
            ChildNodes::Slots(slots) => slots.values_mut().collect(),
        };
        for keys in lists {
            for key in keys.iter_mut() {
                let renamed = rename(key.as_str());
                *key = renamed;
            }
        }
    }
}

/// One component instance in the page tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Map key of this node (not serialized; the page mapping carries it)
    #[serde(skip)]
    pub key: Key,

    pub component_name: String,

    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub props: Props,

    /// `None` for leaf components that cannot hold children
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_nodes: Option<ChildNodes>,

    /// Editor-side config sheet for props added at design time, keyed by
    /// prop name. Opaque to the engine.
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub props_config: Props,
}

impl Node {
    pub fn new(key: impl Into<Key>, component_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            component_name: component_name.into(),
            props: Props::new(),
            child_nodes: None,
            props_config: Props::new(),
        }
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn with_child_nodes(mut self, child_nodes: ChildNodes) -> Self {
        self.child_nodes = Some(child_nodes);
        self
    }

    pub fn is_container(&self) -> bool {
        self.child_nodes.is_some()
    }

    pub fn style(&self) -> Option<&Props> {
        self.props.get(STYLE).and_then(Value::as_object)
    }

    /// Style object, created (or replaced, if props held a non-object) on demand
    pub fn style_mut(&mut self) -> &mut Props {
        let entry = self
            .props
            .entry(STYLE.to_string())
            .or_insert_with(|| Value::Object(Props::new()));
        if !entry.is_object() {
            *entry = Value::Object(Props::new());
        }
        match entry {
            Value::Object(style) => style,
            _ => unreachable!("style was just normalized to an object"),
        }
    }

    /// Children of one insertion point, if this node has it
    pub fn children(&self, prop_name: Option<&str>) -> Option<&Vec<Key>> {
        self.child_nodes.as_ref().and_then(|c| c.slot(prop_name))
    }
}
