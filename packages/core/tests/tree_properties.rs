//! Property-based invariant tests for the page tree.
//!
//! 1. Arbitrary edit sequences keep the tree valid (one parent per node,
//!    everything reachable from the root, no cycles).
//! 2. Moving a node under its own descendant is rejected and changes nothing.
//! 3. Undo after an edit restores the previous tree; redo restores the edit.
//! 4. Copies use fresh keys and never share edits with the original.

use brickd_core::{Action, ChildNodes, EngineConfig, EngineError, Node, PageConfig, Store, ROOT};
use proptest::prelude::*;
use serde_json::json;

// ── Helpers ─────────────────────────────────────────────────────────────

const COMPONENTS: [&str; 5] = ["div", "Button", "Layout", "Text", "span"];

#[derive(Debug, Clone)]
enum Op {
    Add { parent: usize, component: usize, index: usize },
    Delete(usize),
    Copy(usize),
    Move { source: usize, target: usize, index: usize },
    Clear(usize),
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<usize>(), 0..COMPONENTS.len(), 0usize..4)
            .prop_map(|(parent, component, index)| Op::Add { parent, component, index }),
        1 => any::<usize>().prop_map(Op::Delete),
        1 => any::<usize>().prop_map(Op::Copy),
        2 => (any::<usize>(), any::<usize>(), 0usize..4)
            .prop_map(|(source, target, index)| Op::Move { source, target, index }),
        1 => any::<usize>().prop_map(Op::Clear),
        1 => Just(Op::Undo),
        1 => Just(Op::Redo),
    ]
}

fn sorted_keys(page: &PageConfig) -> Vec<String> {
    let mut keys: Vec<String> = page.keys().cloned().collect();
    keys.sort();
    keys
}

fn pick(page: &PageConfig, n: usize) -> String {
    let keys = sorted_keys(page);
    keys[n % keys.len()].clone()
}

/// Slot to insert into: `None` for lists, the first declared slot otherwise
fn slot_of(page: &PageConfig, key: &str) -> Option<String> {
    match page.get(key).and_then(|node| node.child_nodes.as_ref()) {
        Some(ChildNodes::Slots(slots)) => slots.keys().next().cloned(),
        _ => None,
    }
}

fn to_action(page: &PageConfig, op: &Op) -> Action {
    match *op {
        Op::Add { parent, component, index } => {
            let parent = pick(page, parent);
            Action::AddComponent {
                prop_name: slot_of(page, &parent),
                parent_key: parent,
                component_name: COMPONENTS[component].to_string(),
                index: Some(index),
            }
        }
        Op::Delete(n) => Action::delete_component(pick(page, n)),
        Op::Copy(n) => Action::copy_component(pick(page, n)),
        Op::Move { source, target, index } => {
            let target = pick(page, target);
            Action::MoveNode {
                source_key: pick(page, source),
                prop_name: slot_of(page, &target),
                target_key: target,
                index: Some(index),
            }
        }
        Op::Clear(n) => Action::ClearChildNodes {
            key: pick(page, n),
            prop_name: None,
        },
        Op::Undo => Action::Undo,
        Op::Redo => Action::Redo,
    }
}

/// The root is part of the initial history entry, so undo never empties
/// the page
fn seeded_store() -> Store {
    let page = PageConfig::from_nodes(vec![
        Node::new(ROOT, "div").with_child_nodes(ChildNodes::List(vec![]))
    ])
    .unwrap();
    Store::with_page(page, &EngineConfig::default())
}

fn run(store: &mut Store, ops: &[Op]) {
    for op in ops {
        let action = to_action(store.page_config(), op);
        let _ = store.dispatch(action);
    }
}

fn assert_tree_valid(page: &PageConfig) -> Result<(), TestCaseError> {
    prop_assert_eq!(page.validate(), Ok(()));
    for key in page.keys() {
        let path = page.path_to(key);
        prop_assert!(path.is_some(), "no path to {}", key);
        let path = path.unwrap_or_default();
        prop_assert_eq!(path.first().map(String::as_str), Some(ROOT));
        if key != ROOT {
            let parent = page.parent_of(key);
            prop_assert!(parent.is_some(), "{} has no parent", key);
            if let Some(parent) = parent {
                let siblings = page.children(&parent.key, parent.prop_name.as_deref());
                prop_assert!(siblings.is_some_and(|list| list.contains(key)));
            }
        }
    }
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Tree invariant
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn edit_sequences_keep_tree_valid(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut store = seeded_store();
        for op in &ops {
            let action = to_action(store.page_config(), op);
            let _ = store.dispatch(action);
            assert_tree_valid(store.page_config())?;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Move cycle rejection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn move_under_descendant_is_rejected(
        ops in prop::collection::vec(op_strategy(), 1..30),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let mut store = seeded_store();
        run(&mut store, &ops);

        let page = store.page_config().clone();
        let source = pick(&page, a);
        let subtree = page.subtree_keys(&source);
        let target = subtree[b % subtree.len()].clone();

        let result = store.dispatch(Action::move_node(source.as_str(), target.as_str(), None));
        prop_assert!(
            matches!(result, Err(EngineError::CyclicMove { .. })),
            "moving {} under {} gave {:?}", source, target, result
        );
        prop_assert!(store.page_config().ptr_eq(&page));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Undo/redo round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn undo_redo_round_trip(
        ops in prop::collection::vec(op_strategy(), 0..30),
        edit in op_strategy(),
    ) {
        let mut store = seeded_store();
        run(&mut store, &ops);

        let before = store.page_config().clone();
        let action = to_action(&before, &edit);
        prop_assume!(!matches!(action, Action::Undo | Action::Redo));
        prop_assume!(store.dispatch(action).is_ok());
        prop_assume!(!store.page_config().ptr_eq(&before));
        let after = store.page_config().clone();

        store.dispatch(Action::Undo).unwrap();
        prop_assert_eq!(store.page_config(), &before);

        store.dispatch(Action::Redo).unwrap();
        prop_assert_eq!(store.page_config(), &after);
    }

    #[test]
    fn new_edit_after_undo_drops_redo(ops in prop::collection::vec(op_strategy(), 0..20)) {
        let mut store = seeded_store();
        run(&mut store, &ops);

        store.dispatch(Action::add_component(ROOT, "Button")).unwrap();
        store.dispatch(Action::Undo).unwrap();
        store.dispatch(Action::add_component(ROOT, "Text")).unwrap();

        prop_assert_eq!(store.dispatch(Action::Redo), Err(EngineError::NothingToRedo));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Copy independence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn copies_are_independent(
        ops in prop::collection::vec(op_strategy(), 1..30),
        n in any::<usize>(),
    ) {
        let mut store = seeded_store();
        run(&mut store, &ops);

        let keys = sorted_keys(store.page_config());
        let candidates: Vec<&String> = keys.iter().filter(|key| key.as_str() != ROOT).collect();
        prop_assume!(!candidates.is_empty());
        let original = candidates[n % candidates.len()].clone();

        let before = store.page_config().clone();
        store.dispatch(Action::copy_component(original.as_str())).unwrap();
        let page = store.page_config().clone();

        let parent = page.parent_of(&original).cloned().unwrap();
        let siblings = page.children(&parent.key, parent.prop_name.as_deref()).unwrap();
        let position = siblings.iter().position(|key| *key == original).unwrap();
        let clone = siblings[position + 1].clone();

        let original_keys = page.subtree_keys(&original);
        let clone_keys = page.subtree_keys(&clone);
        prop_assert_eq!(original_keys.len(), clone_keys.len());
        prop_assert!(clone_keys.iter().all(|key| !before.contains(key)));

        store.dispatch(Action::select_component(clone.as_str())).unwrap();
        let props = json!({ "marker": true }).as_object().cloned().unwrap();
        store.dispatch(Action::ChangeProps { props }).unwrap();

        let original_node = store.page_config().get(&original).unwrap();
        prop_assert!(!original_node.props.contains_key("marker"));
        prop_assert_eq!(original_node, before.get(&original).unwrap());
    }
}
