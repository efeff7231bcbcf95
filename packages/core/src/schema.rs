//! # Component Registry
//!
//! Per-component metadata the engine needs to build and place nodes: whether
//! a component accepts children (and through which slots), its default props,
//! nesting rules, and whether it renders on its own modal surface.
//!
//! Props stay opaque. The registry never validates prop values.

use crate::node::{ChildNodes, Key, Node, Props, STYLE};
use crate::page_config::PageConfig;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// How a component holds children
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "slots")]
pub enum ContainerKind {
    /// Leaf component
    #[default]
    None,

    /// One ordered child list
    List,

    /// Named slots
    Slots(Vec<String>),
}

impl ContainerKind {
    /// Empty child layout for a freshly created node
    pub fn empty_child_nodes(&self) -> Option<ChildNodes> {
        match self {
            ContainerKind::None => None,
            ContainerKind::List => Some(ChildNodes::List(Vec::new())),
            ContainerKind::Slots(names) => Some(ChildNodes::Slots(
                names.iter().map(|name| (name.clone(), Vec::new())).collect(),
            )),
        }
    }
}

/// Metadata for one component name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSchema {
    #[serde(default)]
    pub container: ContainerKind,

    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub default_props: Props,

    /// Components allowed as children (`None` = any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_nodes_rule: Option<Vec<String>>,

    /// Components allowed as parent (`None` = any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_nodes_rule: Option<Vec<String>>,

    /// Renders on its own overlay surface; descendants render inside it
    #[serde(default)]
    pub is_modal: bool,
}

impl ComponentSchema {
    pub fn leaf() -> Self {
        Self::default()
    }

    pub fn list() -> Self {
        Self {
            container: ContainerKind::List,
            ..Self::default()
        }
    }

    pub fn slots<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            container: ContainerKind::Slots(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_default_props(mut self, props: Props) -> Self {
        self.default_props = props;
        self
    }

    pub fn with_child_rule<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.child_nodes_rule = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_parent_rule<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent_nodes_rule = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn modal(mut self) -> Self {
        self.is_modal = true;
        self
    }
}

/// Component name → schema. Unknown names behave as plain leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRegistry {
    schemas: BTreeMap<String, ComponentSchema>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Palette shipped with the engine
    pub fn builtin() -> Self {
        let mut button_props = Props::new();
        button_props.insert("children".into(), json!("Button"));
        let mut text_props = Props::new();
        text_props.insert("children".into(), json!("Text"));
        let mut modal_props = Props::new();
        modal_props.insert("visible".into(), json!(true));

        Self::new()
            .with("div", ComponentSchema::list())
            .with("span", ComponentSchema::list())
            .with("Button", ComponentSchema::leaf().with_default_props(button_props))
            .with("Text", ComponentSchema::leaf().with_default_props(text_props))
            .with("Image", ComponentSchema::leaf())
            .with("Input", ComponentSchema::leaf())
            .with(
                "Layout",
                ComponentSchema::slots(["header", "content", "footer"]),
            )
            .with(
                "Modal",
                ComponentSchema::list().modal().with_default_props(modal_props),
            )
            .with(
                "List",
                ComponentSchema::list().with_child_rule(["ListItem"]),
            )
            .with(
                "ListItem",
                ComponentSchema::list().with_parent_rule(["List"]),
            )
    }

    pub fn register(&mut self, name: impl Into<String>, schema: ComponentSchema) -> &mut Self {
        self.schemas.insert(name.into(), schema);
        self
    }

    pub fn with(mut self, name: impl Into<String>, schema: ComponentSchema) -> Self {
        self.register(name, schema);
        self
    }

    /// Register every schema of `other`, replacing same-named entries
    pub fn extend(&mut self, other: &ComponentRegistry) {
        for (name, schema) in &other.schemas {
            self.schemas.insert(name.clone(), schema.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&ComponentSchema> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn is_modal(&self, name: &str) -> bool {
        self.get(name).is_some_and(|schema| schema.is_modal)
    }

    /// Whether `child` may be placed directly inside `parent`
    pub fn allows_nesting(&self, parent: &str, child: &str) -> bool {
        let parent_admits = self
            .get(parent)
            .and_then(|schema| schema.child_nodes_rule.as_ref())
            .map_or(true, |allowed| allowed.iter().any(|name| name == child));
        let child_admits = self
            .get(child)
            .and_then(|schema| schema.parent_nodes_rule.as_ref())
            .map_or(true, |allowed| allowed.iter().any(|name| name == parent));
        parent_admits && child_admits
    }

    pub fn default_props(&self, name: &str) -> Props {
        self.get(name)
            .map(|schema| schema.default_props.clone())
            .unwrap_or_default()
    }

    /// Default style of a component, if its default props carry one
    pub fn default_style(&self, name: &str) -> Option<Props> {
        self.get(name)
            .and_then(|schema| schema.default_props.get(STYLE))
            .and_then(|style| style.as_object())
            .cloned()
    }

    /// Build a fresh node: default props, overlaid by `props`, and an empty
    /// child layout for containers
    pub fn instantiate(&self, key: &str, name: &str, props: Option<&Props>) -> Node {
        let mut node = Node::new(key, name).with_props(self.default_props(name));
        if let Some(props) = props {
            for (prop, value) in props {
                node.props.insert(prop.clone(), value.clone());
            }
        }
        node.child_nodes = self
            .get(name)
            .and_then(|schema| schema.container.empty_child_nodes());
        node
    }
}

/// Key of the closest modal at or above `key`, if any
pub fn modal_surface(
    page: &PageConfig,
    registry: &ComponentRegistry,
    key: &str,
) -> Option<Key> {
    page.path_to(key)?.into_iter().rev().find(|k| {
        page.get(k)
            .is_some_and(|node| registry.is_modal(&node.component_name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_instantiate_container_and_leaf() {
        let registry = ComponentRegistry::builtin();

        let layout = registry.instantiate("k1", "Layout", None);
        let children = layout.child_nodes.unwrap();
        assert!(children.has_slot(Some("header")));
        assert!(children.has_slot(Some("footer")));
        assert!(children.is_empty());

        let button = registry.instantiate("k2", "Button", None);
        assert!(button.child_nodes.is_none());
        assert_eq!(button.props.get("children"), Some(&json!("Button")));
    }

    #[test]
    fn test_instantiate_overlays_props() {
        let registry = ComponentRegistry::builtin();
        let mut props = Props::new();
        props.insert("children".into(), json!("Submit"));

        let button = registry.instantiate("k", "Button", Some(&props));
        assert_eq!(button.props.get("children"), Some(&json!("Submit")));
    }

    #[test]
    fn test_unknown_component_is_leaf() {
        let registry = ComponentRegistry::builtin();
        let node = registry.instantiate("k", "Mystery", None);
        assert!(!node.is_container());
        assert!(registry.allows_nesting("div", "Mystery"));
    }

    #[test]
    fn test_nesting_rules() {
        let registry = ComponentRegistry::builtin();
        assert!(registry.allows_nesting("List", "ListItem"));
        assert!(!registry.allows_nesting("List", "Button"));
        assert!(!registry.allows_nesting("div", "ListItem"));
    }

    #[test]
    fn test_schema_json_shape() {
        let schema: ComponentSchema = serde_json::from_value(json!({
            "container": { "kind": "slots", "slots": ["left", "right"] },
            "defaultProps": { "style": { "display": "flex" } },
            "isModal": false
        }))
        .unwrap();

        assert_eq!(
            schema.container,
            ContainerKind::Slots(vec!["left".into(), "right".into()])
        );

        let registry = ComponentRegistry::new().with("Split", schema);
        assert_eq!(
            registry.default_style("Split").unwrap().get("display"),
            Some(&json!("flex"))
        );
    }
}
