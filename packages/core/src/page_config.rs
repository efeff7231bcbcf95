//! # Page Tree Store
//!
//! The authoritative `key → node` mapping for a page, plus the structural
//! primitives every edit is built from.
//!
//! ## Design
//!
//! - Nodes live in a persistent map ([`im::HashMap`]) behind [`Arc`]. Cloning
//!   a page is O(1); editing a node copies only that node (`Arc::make_mut`)
//!   and the map path leading to it. Snapshots held by the history never
//!   observe later edits, and untouched nodes keep their identity.
//! - Parents are not stored on nodes. An explicit parent index
//!   (`key → (parent, slot)`) is updated inside every primitive that changes
//!   a child list, so ancestry walks cost O(depth).
//!
//! ## Invariants
//!
//! - Every key reachable from [`ROOT`] exists in the mapping
//! - Every key except [`ROOT`] has exactly one parent
//! - No key is its own ancestor
//!
//! Primitives validate before mutating; a failed primitive leaves the page
//! untouched.

use crate::errors::{EngineError, PageError};
use crate::key_generator::KeyGenerator;
use crate::node::{Key, Node, ROOT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Where a node is attached
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentRef {
    pub key: Key,
    /// Slot name when the parent has named slots
    pub prop_name: Option<String>,
}

impl ParentRef {
    fn new(key: &str, prop_name: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            prop_name: prop_name.map(str::to_string),
        }
    }
}

/// Flat page mapping with a distinguished [`ROOT`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Key, Node>", into = "BTreeMap<Key, Node>")]
pub struct PageConfig {
    nodes: im::HashMap<Key, Arc<Node>>,
    parents: im::HashMap<Key, ParentRef>,
}

impl PartialEq for PageConfig {
    fn eq(&self, other: &Self) -> bool {
        // The parent index is derived from the nodes
        self.nodes == other.nodes
    }
}

impl PageConfig {
    /// Empty page (no root yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a page from nodes, validating every structural invariant
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self, PageError> {
        let mut page = Self::new();
        for node in nodes {
            page.nodes.insert(node.key.clone(), Arc::new(node));
        }
        page.validate()?;
        page.rebuild_parents();
        Ok(page)
    }

    // ====================================================================
    // Queries
    // ====================================================================

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.nodes.get(key).map(Arc::as_ref)
    }

    /// Shared handle of a node, for identity comparisons
    pub fn get_arc(&self, key: &str) -> Option<&Arc<Node>> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn root(&self) -> Option<&Node> {
        self.get(ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.nodes.keys()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values().map(Arc::as_ref)
    }

    pub fn parent_of(&self, key: &str) -> Option<&ParentRef> {
        self.parents.get(key)
    }

    /// Ordered children of one insertion point of `key`
    pub fn children(&self, key: &str, prop_name: Option<&str>) -> Option<&Vec<Key>> {
        self.get(key).and_then(|node| node.children(prop_name))
    }

    /// Keys from the root down to `key`, inclusive
    pub fn path_to(&self, key: &str) -> Option<Vec<Key>> {
        if !self.contains(key) {
            return None;
        }

        let mut path = vec![key.to_string()];
        let mut current: &str = key;
        while let Some(parent) = self.parents.get(current) {
            path.push(parent.key.clone());
            current = &parent.key;
        }
        path.reverse();
        Some(path)
    }

    /// Number of ancestors of `key` (the root has depth 0)
    pub fn depth(&self, key: &str) -> Option<usize> {
        self.path_to(key).map(|path| path.len() - 1)
    }

    /// True when `ancestor` is a strict ancestor of `key`
    pub fn is_descendant_of(&self, key: &str, ancestor: &str) -> bool {
        let mut current: &str = key;
        while let Some(parent) = self.parents.get(current) {
            if parent.key == ancestor {
                return true;
            }
            current = &parent.key;
        }
        false
    }

    /// `key` and all of its descendants in pre-order
    pub fn subtree_keys(&self, key: &str) -> Vec<Key> {
        if !self.contains(key) {
            return Vec::new();
        }

        let mut keys = Vec::new();
        let mut stack = vec![key.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(children) = self.get(&current).and_then(|n| n.child_nodes.as_ref()) {
                stack.extend(children.keys().into_iter().rev().cloned());
            }
            keys.push(current);
        }
        keys
    }

    /// Whether both pages share the same underlying storage (O(1))
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.nodes.ptr_eq(&other.nodes)
    }

    /// Check every structural invariant, reporting the first violation
    pub fn validate(&self) -> Result<(), PageError> {
        if self.nodes.is_empty() {
            return Ok(());
        }
        if !self.nodes.contains_key(ROOT) {
            return Err(PageError::MissingRoot);
        }

        let mut keys: Vec<&Key> = self.nodes.keys().collect();
        keys.sort();

        let mut seen: HashSet<&str> = HashSet::new();
        for key in &keys {
            let Some(children) = self.nodes.get(key.as_str()).and_then(|n| n.child_nodes.as_ref())
            else {
                continue;
            };
            for child in children.keys() {
                if child == ROOT || child == *key {
                    return Err(PageError::Cycle(child.clone()));
                }
                if !self.nodes.contains_key(child.as_str()) {
                    return Err(PageError::DanglingKey {
                        parent: (*key).clone(),
                        child: child.clone(),
                    });
                }
                if !seen.insert(child.as_str()) {
                    return Err(PageError::MultipleParents(child.clone()));
                }
            }
        }

        let mut reachable: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![ROOT];
        while let Some(key) = stack.pop() {
            if !reachable.insert(key) {
                continue;
            }
            if let Some(children) = self.nodes.get(key).and_then(|n| n.child_nodes.as_ref()) {
                stack.extend(children.keys().into_iter().map(String::as_str));
            }
        }

        // Detached cycles show up here: each member has one parent but none
        // of them hangs off the root.
        match keys.into_iter().find(|key| !reachable.contains(key.as_str())) {
            Some(orphan) => Err(PageError::Orphan(orphan.clone())),
            None => Ok(()),
        }
    }

    // ====================================================================
    // Structural primitives
    // ====================================================================

    /// Install the root node of an empty page
    pub(crate) fn insert_root(&mut self, mut node: Node) -> Result<(), EngineError> {
        if self.nodes.contains_key(ROOT) {
            return Err(EngineError::DuplicateKey(ROOT.to_string()));
        }
        node.key = ROOT.to_string();
        self.nodes.insert(ROOT.to_string(), Arc::new(node));
        Ok(())
    }

    /// Insert a fresh node under `parent_key` (append when `index` is `None`
    /// or past the end). Returns the index it landed at.
    pub(crate) fn insert_child(
        &mut self,
        parent_key: &str,
        prop_name: Option<&str>,
        index: Option<usize>,
        node: Node,
    ) -> Result<usize, EngineError> {
        if self.nodes.contains_key(node.key.as_str()) {
            return Err(EngineError::DuplicateKey(node.key));
        }

        let key = node.key.clone();
        let at = self.attach(&key, parent_key, prop_name, index)?;
        self.nodes.insert(key, Arc::new(node));
        Ok(at)
    }

    /// Remove `key` and its descendants. The root and absent keys are left
    /// alone and report `false`.
    pub(crate) fn remove_subtree(&mut self, key: &str) -> bool {
        if key == ROOT || !self.contains(key) {
            return false;
        }

        let doomed = self.subtree_keys(key);
        self.detach(key);
        for k in &doomed {
            self.nodes.remove(k.as_str());
            self.parents.remove(k.as_str());
        }
        true
    }

    /// Deep-clone the subtree at `key` under fresh keys and insert the clone
    /// right after the original. Returns the clone's key.
    pub(crate) fn copy_subtree(
        &mut self,
        key: &str,
        keys: &mut KeyGenerator,
    ) -> Result<Key, EngineError> {
        let parent = self
            .parents
            .get(key)
            .cloned()
            .ok_or_else(|| EngineError::NodeNotFound(key.to_string()))?;

        let originals = self.subtree_keys(key);
        let mut renamed: HashMap<Key, Key> = HashMap::with_capacity(originals.len());
        for original in &originals {
            renamed.insert(original.clone(), keys.next_unused(self));
        }

        for original in &originals {
            let Some(source) = self.get(original) else {
                continue;
            };
            let mut clone = source.clone();
            let new_key = renamed[original].clone();
            clone.key = new_key.clone();

            if let Some(children) = clone.child_nodes.as_mut() {
                children.rename(|child| {
                    renamed
                        .get(child)
                        .cloned()
                        .unwrap_or_else(|| child.to_string())
                });
                for (slot, child) in children.entries() {
                    self.parents
                        .insert(child.clone(), ParentRef::new(&new_key, slot));
                }
            }
            self.nodes.insert(new_key, Arc::new(clone));
        }

        let clone_key = renamed[key].clone();
        let index = self
            .children(&parent.key, parent.prop_name.as_deref())
            .and_then(|list| list.iter().position(|k| k == key))
            .map(|position| position + 1);
        self.attach(&clone_key, &parent.key, parent.prop_name.as_deref(), index)?;
        Ok(clone_key)
    }

    /// Remove every descendant of `key` (or only those of one slot), keeping
    /// `key` with empty insertion points. Reports whether anything was removed.
    pub(crate) fn clear_children(
        &mut self,
        key: &str,
        prop_name: Option<&str>,
    ) -> Result<bool, EngineError> {
        let node = self
            .get(key)
            .ok_or_else(|| EngineError::NodeNotFound(key.to_string()))?;
        let Some(children) = &node.child_nodes else {
            return Ok(false);
        };

        let direct: Vec<Key> = match prop_name {
            Some(_) => children
                .slot(prop_name)
                .ok_or_else(|| EngineError::InvalidParent(key.to_string()))?
                .clone(),
            None => children.keys().into_iter().cloned().collect(),
        };
        if direct.is_empty() {
            return Ok(false);
        }

        let doomed: Vec<Key> = direct
            .iter()
            .flat_map(|child| self.subtree_keys(child))
            .collect();
        for k in &doomed {
            self.nodes.remove(k.as_str());
            self.parents.remove(k.as_str());
        }

        if let Some(children) = self.node_mut(key).and_then(|n| n.child_nodes.as_mut()) {
            match prop_name {
                Some(_) => {
                    if let Some(list) = children.slot_mut(prop_name) {
                        list.clear();
                    }
                }
                None => children.clear(),
            }
        }
        Ok(true)
    }

    /// Reattach the subtree at `key` under `target`.
    ///
    /// `index` counts positions in the target list after `key` has been
    /// detached, so moving within the same parent needs no adjustment.
    pub(crate) fn move_node(
        &mut self,
        key: &str,
        target: &str,
        prop_name: Option<&str>,
        index: Option<usize>,
    ) -> Result<usize, EngineError> {
        if !self.contains(key) {
            return Err(EngineError::NodeNotFound(key.to_string()));
        }
        if key == target || self.is_descendant_of(target, key) {
            return Err(EngineError::CyclicMove {
                key: key.to_string(),
                target: target.to_string(),
            });
        }
        self.check_slot(target, prop_name)?;

        self.detach(key);
        self.attach(key, target, prop_name, index)
    }

    /// Reorder the existing children of one insertion point.
    /// Reports whether the order actually changed.
    pub(crate) fn reorder_children(
        &mut self,
        parent_key: &str,
        prop_name: Option<&str>,
        ordered: &[Key],
    ) -> Result<bool, EngineError> {
        let current = self
            .children(parent_key, prop_name)
            .ok_or_else(|| EngineError::InvalidParent(parent_key.to_string()))?;
        if current.as_slice() == ordered {
            return Ok(false);
        }

        let mut existing = current.clone();
        existing.sort();
        let mut requested = ordered.to_vec();
        requested.sort();
        if existing != requested {
            return Err(EngineError::SetMismatch {
                parent: parent_key.to_string(),
            });
        }

        if let Some(list) = self.slot_mut(parent_key, prop_name) {
            *list = ordered.to_vec();
        }
        Ok(true)
    }

    /// Edit a node's non-structural data (props, style)
    pub(crate) fn update_node<R>(
        &mut self,
        key: &str,
        update: impl FnOnce(&mut Node) -> R,
    ) -> Result<R, EngineError> {
        let node = self
            .node_mut(key)
            .ok_or_else(|| EngineError::NodeNotFound(key.to_string()))?;
        Ok(update(node))
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn node_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.nodes.get_mut(key).map(Arc::make_mut)
    }

    fn slot_mut(&mut self, key: &str, prop_name: Option<&str>) -> Option<&mut Vec<Key>> {
        self.node_mut(key)?.child_nodes.as_mut()?.slot_mut(prop_name)
    }

    fn check_slot(&self, parent_key: &str, prop_name: Option<&str>) -> Result<(), EngineError> {
        match self.get(parent_key) {
            Some(parent) if parent.children(prop_name).is_some() => Ok(()),
            _ => Err(EngineError::InvalidParent(parent_key.to_string())),
        }
    }

    fn attach(
        &mut self,
        key: &str,
        parent_key: &str,
        prop_name: Option<&str>,
        index: Option<usize>,
    ) -> Result<usize, EngineError> {
        self.check_slot(parent_key, prop_name)?;

        let list = self
            .slot_mut(parent_key, prop_name)
            .ok_or_else(|| EngineError::InvalidParent(parent_key.to_string()))?;
        let at = index.map_or(list.len(), |i| i.min(list.len()));
        list.insert(at, key.to_string());

        self.parents
            .insert(key.to_string(), ParentRef::new(parent_key, prop_name));
        Ok(at)
    }

    fn detach(&mut self, key: &str) -> Option<ParentRef> {
        let parent = self.parents.remove(key)?;
        if let Some(list) = self.slot_mut(&parent.key, parent.prop_name.as_deref()) {
            list.retain(|k| k != key);
        }
        Some(parent)
    }

    fn rebuild_parents(&mut self) {
        let mut parents = im::HashMap::new();
        for (key, node) in self.nodes.iter() {
            if let Some(children) = &node.child_nodes {
                for (slot, child) in children.entries() {
                    parents.insert(child.clone(), ParentRef::new(key, slot));
                }
            }
        }
        self.parents = parents;
    }
}

impl TryFrom<BTreeMap<Key, Node>> for PageConfig {
    type Error = PageError;

    fn try_from(nodes: BTreeMap<Key, Node>) -> Result<Self, Self::Error> {
        Self::from_nodes(nodes.into_iter().map(|(key, mut node)| {
            node.key = key;
            node
        }))
    }
}

impl From<PageConfig> for BTreeMap<Key, Node> {
    fn from(page: PageConfig) -> Self {
        page.nodes
            .iter()
            .map(|(key, node)| (key.clone(), Node::clone(node)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ChildNodes;
    use serde_json::json;

    fn keys(list: &[&str]) -> Vec<Key> {
        list.iter().map(|k| k.to_string()).collect()
    }

    /// root ─┬─ a ── a1
    ///       └─ b
    fn sample_page() -> PageConfig {
        PageConfig::from_nodes(vec![
            Node::new(ROOT, "div").with_child_nodes(ChildNodes::List(keys(&["a", "b"]))),
            Node::new("a", "div").with_child_nodes(ChildNodes::List(keys(&["a1"]))),
            Node::new("a1", "span"),
            Node::new("b", "div").with_child_nodes(ChildNodes::List(vec![])),
        ])
        .unwrap()
    }

    #[test]
    fn test_path_and_depth() {
        let page = sample_page();
        assert_eq!(page.path_to("a1"), Some(keys(&[ROOT, "a", "a1"])));
        assert_eq!(page.depth("a1"), Some(2));
        assert_eq!(page.depth(ROOT), Some(0));
        assert!(page.is_descendant_of("a1", ROOT));
        assert!(!page.is_descendant_of("b", "a"));
        assert_eq!(page.path_to("missing"), None);
    }

    #[test]
    fn test_remove_subtree_drops_descendants() {
        let mut page = sample_page();
        assert!(page.remove_subtree("a"));

        assert!(!page.contains("a"));
        assert!(!page.contains("a1"));
        assert!(page.parent_of("a1").is_none());
        assert_eq!(page.children(ROOT, None), Some(&keys(&["b"])));
        page.validate().unwrap();
    }

    #[test]
    fn test_remove_root_is_refused() {
        let mut page = sample_page();
        assert!(!page.remove_subtree(ROOT));
        assert!(!page.remove_subtree("missing"));
        assert_eq!(page, sample_page());
    }

    #[test]
    fn test_move_into_descendant_is_cyclic() {
        let mut page = sample_page();
        let before = page.clone();

        let err = page.move_node("a", "a1", None, None).unwrap_err();
        assert!(matches!(err, EngineError::CyclicMove { .. }));
        let err = page.move_node("a", "a", None, None).unwrap_err();
        assert!(matches!(err, EngineError::CyclicMove { .. }));

        assert_eq!(page, before);
    }

    #[test]
    fn test_move_updates_parent_index() {
        let mut page = sample_page();
        page.move_node("a1", "b", None, Some(0)).unwrap();

        assert_eq!(page.parent_of("a1").unwrap().key, "b");
        assert_eq!(page.children("a", None), Some(&vec![]));
        assert_eq!(page.children("b", None), Some(&keys(&["a1"])));
        page.validate().unwrap();
    }

    #[test]
    fn test_move_within_same_parent_uses_post_detach_index() {
        let mut page = sample_page();
        page.move_node("a", ROOT, None, Some(1)).unwrap();
        assert_eq!(page.children(ROOT, None), Some(&keys(&["b", "a"])));
    }

    #[test]
    fn test_move_into_leaf_is_invalid_parent() {
        let mut page = sample_page();
        let err = page.move_node("b", "a1", None, None).unwrap_err();
        assert_eq!(err, EngineError::InvalidParent("a1".into()));
    }

    #[test]
    fn test_copy_assigns_fresh_keys_after_original() {
        let mut page = sample_page();
        let mut gen = KeyGenerator::new("copy");

        let clone = page.copy_subtree("a", &mut gen).unwrap();
        assert_eq!(clone, "copy-1");
        assert_eq!(page.children(ROOT, None), Some(&keys(&["a", "copy-1", "b"])));
        assert_eq!(page.children("copy-1", None), Some(&keys(&["copy-2"])));
        assert_eq!(page.get("copy-2").unwrap().component_name, "span");
        assert_eq!(page.parent_of("copy-2").unwrap().key, "copy-1");
        page.validate().unwrap();
    }

    #[test]
    fn test_reorder_requires_same_set() {
        let mut page = sample_page();
        assert!(page.reorder_children(ROOT, None, &keys(&["b", "a"])).unwrap());
        assert_eq!(page.children(ROOT, None), Some(&keys(&["b", "a"])));

        let err = page
            .reorder_children(ROOT, None, &keys(&["b", "a", "a1"]))
            .unwrap_err();
        assert_eq!(err, EngineError::SetMismatch { parent: ROOT.into() });
        let err = page.reorder_children(ROOT, None, &keys(&["b", "b"])).unwrap_err();
        assert_eq!(err, EngineError::SetMismatch { parent: ROOT.into() });
    }

    #[test]
    fn test_clear_children_of_one_slot() {
        let mut slots = BTreeMap::new();
        slots.insert("header".to_string(), keys(&["h"]));
        slots.insert("footer".to_string(), keys(&["f"]));
        let mut page = PageConfig::from_nodes(vec![
            Node::new(ROOT, "div").with_child_nodes(ChildNodes::List(keys(&["layout"]))),
            Node::new("layout", "Layout").with_child_nodes(ChildNodes::Slots(slots)),
            Node::new("h", "span"),
            Node::new("f", "span"),
        ])
        .unwrap();

        assert!(page.clear_children("layout", Some("header")).unwrap());
        assert!(!page.contains("h"));
        assert!(page.contains("f"));
        assert_eq!(page.children("layout", Some("header")), Some(&vec![]));
        assert!(!page.clear_children("layout", Some("header")).unwrap());
        page.validate().unwrap();
    }

    #[test]
    fn test_untouched_nodes_keep_identity() {
        let page = sample_page();
        let mut edited = page.clone();
        assert!(edited.ptr_eq(&page));

        edited
            .update_node("a1", |node| {
                node.props.insert("text".into(), json!("hi"));
            })
            .unwrap();

        assert!(!edited.ptr_eq(&page));
        assert!(Arc::ptr_eq(
            page.get_arc("b").unwrap(),
            edited.get_arc("b").unwrap()
        ));
        assert!(!Arc::ptr_eq(
            page.get_arc("a1").unwrap(),
            edited.get_arc("a1").unwrap()
        ));
        assert!(page.get("a1").unwrap().props.is_empty());
    }

    #[test]
    fn test_validate_reports_violations() {
        let dangling = PageConfig::from_nodes(vec![
            Node::new(ROOT, "div").with_child_nodes(ChildNodes::List(keys(&["ghost"]))),
        ]);
        assert!(matches!(dangling, Err(PageError::DanglingKey { .. })));

        let shared = PageConfig::from_nodes(vec![
            Node::new(ROOT, "div").with_child_nodes(ChildNodes::List(keys(&["a", "b"]))),
            Node::new("a", "div").with_child_nodes(ChildNodes::List(keys(&["b"]))),
            Node::new("b", "span"),
        ]);
        assert_eq!(shared.unwrap_err(), PageError::MultipleParents("b".into()));

        let detached_cycle = PageConfig::from_nodes(vec![
            Node::new(ROOT, "div").with_child_nodes(ChildNodes::List(vec![])),
            Node::new("x", "div").with_child_nodes(ChildNodes::List(keys(&["y"]))),
            Node::new("y", "div").with_child_nodes(ChildNodes::List(keys(&["x"]))),
        ]);
        assert_eq!(detached_cycle.unwrap_err(), PageError::Orphan("x".into()));

        let no_root = PageConfig::from_nodes(vec![Node::new("a", "div")]);
        assert_eq!(no_root.unwrap_err(), PageError::MissingRoot);
    }

    #[test]
    fn test_json_round_trip() {
        let source = json!({
            "root": { "componentName": "div", "childNodes": ["brick-1"] },
            "brick-1": {
                "componentName": "Button",
                "props": { "children": "Go", "style": { "width": "100px" } }
            }
        });

        let page: PageConfig = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(page.get("brick-1").unwrap().key, "brick-1");
        assert_eq!(page.parent_of("brick-1").unwrap().key, ROOT);
        assert_eq!(serde_json::to_value(&page).unwrap(), source);
    }

    #[test]
    fn test_json_rejects_invalid_tree() {
        let source = json!({
            "root": { "componentName": "div", "childNodes": ["root"] }
        });
        let result: Result<PageConfig, _> = serde_json::from_value(source);
        assert!(result.is_err());
    }
}
