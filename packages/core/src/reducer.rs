//! # Reducer
//!
//! Pure transition function: `(state, action) → state`.
//!
//! The reducer works on a clone of the incoming state (cheap, see
//! [`State`]) and never mutates its input. Successful page edits are
//! followed by a selection refresh and a history entry; a rejected action
//! yields the incoming state unchanged, except that a failed drop still ends
//! the drag gesture.

use crate::actions::Action;
use crate::drag_drop;
use crate::edits;
use crate::errors::EngineError;
use crate::history;
use crate::props;
use crate::selection;
use crate::state::State;
use tracing::{debug, instrument, warn};

/// Result of applying one action
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: State,
    /// Why the action was refused, if it was
    pub rejection: Option<EngineError>,
}

/// Apply `action` to `state`, recovering from rejections
pub fn reducer(state: &State, action: Action) -> State {
    transition(state, action).state
}

/// Apply `action`, surfacing a rejection as an error
pub fn try_reduce(state: &State, action: Action) -> Result<State, EngineError> {
    let Transition { state, rejection } = transition(state, action);
    match rejection {
        Some(err) => Err(err),
        None => Ok(state),
    }
}

#[instrument(level = "debug", skip_all, fields(action = action.name()))]
pub fn transition(state: &State, action: Action) -> Transition {
    let undoable = action.is_undoable();
    let is_drop = matches!(action, Action::OnDrop);

    let mut next = state.clone();
    match apply(&mut next, action) {
        Ok(()) => {
            if undoable && !next.page_config.ptr_eq(&state.page_config) {
                commit(&mut next);
            }
            Transition {
                state: next,
                rejection: None,
            }
        }
        Err(err) => {
            warn!(error = %err, "action rejected");
            let mut recovered = state.clone();
            if is_drop {
                drag_drop::clear_drag_source(&mut recovered);
            }
            Transition {
                state: recovered,
                rejection: Some(err),
            }
        }
    }
}

/// Record an edit: fix up the selection against the new tree, then push a
/// snapshot
fn commit(state: &mut State) {
    selection::refresh(state);
    let snapshot = state.snapshot();
    state.history.record(snapshot);
    debug!(undo_levels = state.history.undo_levels(), "edit recorded");
}

fn apply(state: &mut State, action: Action) -> Result<(), EngineError> {
    match action {
        Action::AddComponent {
            parent_key,
            component_name,
            index,
            prop_name,
        } => edits::add_component(
            state,
            &parent_key,
            &component_name,
            index,
            prop_name.as_deref(),
            None,
        )
        .map(|_| ()),
        Action::DeleteComponent { key } => {
            edits::delete_component(state, &key);
            Ok(())
        }
        Action::CopyComponent { key } => edits::copy_component(state, &key).map(|_| ()),
        Action::ClearChildNodes { key, prop_name } => {
            edits::clear_child_nodes(state, &key, prop_name.as_deref())
        }
        Action::MoveNode {
            source_key,
            target_key,
            prop_name,
            index,
        } => edits::move_node(state, &source_key, &target_key, prop_name.as_deref(), index),
        Action::OnLayoutSortChange {
            parent_key,
            prop_name,
            sort_keys,
        } => edits::sort_children(state, &parent_key, prop_name.as_deref(), &sort_keys),

        Action::GetDragSource(source) => drag_drop::get_drag_source(state, source),
        Action::GetDropTarget {
            candidate_key,
            pointer,
            layout,
        } => drag_drop::get_drop_target(state, candidate_key.as_deref(), pointer, &layout),
        Action::OnDrop => drag_drop::on_drop(state),
        Action::ClearDragSource => {
            drag_drop::clear_drag_source(state);
            Ok(())
        }
        Action::ClearDropTarget => {
            drag_drop::clear_drop_target(state);
            Ok(())
        }

        Action::OverTarget { key } => selection::over_target(state, &key),
        Action::ClearHovered => {
            selection::clear_hovered(state);
            Ok(())
        }
        Action::SelectComponent { key, prop_name } => {
            selection::select_component(state, &key, prop_name.as_deref())
        }
        Action::ClearSelectedStatus => {
            selection::clear_selected_status(state);
            Ok(())
        }

        Action::ChangeProps { props } => props::change_props(state, props),
        Action::ResetProps => props::reset_props(state),
        Action::ChangeStyles { style } => props::change_styles(state, style),
        Action::ResetStyles => props::reset_styles(state),
        Action::AddPropsConfig {
            prop_name,
            prop_config,
            value,
        } => props::add_props_config(state, prop_name, prop_config, value),
        Action::DeletePropsConfig { prop_name } => props::delete_props_config(state, &prop_name),
        Action::ResizeChange(payload) => props::resize_change(state, payload),
        Action::ChangePlatform(platform_info) => {
            props::change_platform(state, platform_info);
            Ok(())
        }

        Action::Undo => history::undo(state),
        Action::Redo => history::redo(state),

        Action::Unknown => {
            debug!("unknown action ignored");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::drag_drop::{DragSource, DropTarget};
    use crate::node::ROOT;
    use crate::state::changed_slices;
    use std::sync::Arc;

    fn page_with_root() -> State {
        let state = State::new(&EngineConfig::default());
        reducer(&state, Action::add_component(ROOT, "div"))
    }

    #[test]
    fn test_reducer_does_not_mutate_input() {
        let state = page_with_root();
        let next = reducer(&state, Action::add_component(ROOT, "Button"));

        assert_eq!(state.page_config().len(), 1);
        assert_eq!(next.page_config().len(), 2);
        assert_eq!(next.history().undo_levels(), 2);
    }

    #[test]
    fn test_rejection_returns_input_state() {
        let state = page_with_root();
        let transition = transition(&state, Action::add_component("ghost", "Button"));

        assert_eq!(
            transition.rejection,
            Some(EngineError::InvalidParent("ghost".into()))
        );
        assert!(changed_slices(&state, &transition.state).is_empty());
    }

    #[test]
    fn test_unknown_action_is_identity() {
        let state = page_with_root();
        let next = try_reduce(&state, Action::Unknown).unwrap();
        assert!(changed_slices(&state, &next).is_empty());
    }

    #[test]
    fn test_noop_edit_records_nothing() {
        let state = page_with_root();
        let next = reducer(&state, Action::delete_component("ghost"));
        assert!(next.history().ptr_eq(state.history()));
    }

    #[test]
    fn test_failed_drop_ends_drag() {
        let state = page_with_root();
        let button = reducer(&state, Action::add_component(ROOT, "Button"));
        let key = button.page_config().children(ROOT, None).unwrap()[0].clone();

        // A leaf can never be resolved as a target; force one to make the
        // commit fail
        let mut forced = reducer(
            &button,
            Action::GetDragSource(DragSource::component("ListItem")),
        );
        forced.drop_target = Some(Arc::new(DropTarget::new(key.as_str(), None, 0)));

        let transition = transition(&forced, Action::OnDrop);
        assert!(transition.rejection.is_some());
        assert!(!transition.state.is_dragging());
        assert!(transition.state.drop_target().is_none());
        assert!(transition.state.page_config().ptr_eq(button.page_config()));
    }

    #[test]
    fn test_undo_restores_selection() {
        let state = page_with_root();
        let selected = reducer(&state, Action::select_component(ROOT));
        let edited = reducer(&selected, Action::add_component(ROOT, "Button"));
        let cleared = reducer(&edited, Action::ClearSelectedStatus);

        let undone = reducer(&cleared, Action::Undo);
        assert_eq!(undone.page_config().len(), 1);
        // Selection as it was when the restored entry was recorded
        assert!(undone.selected_info().is_none());

        let redone = reducer(&undone, Action::Redo);
        assert_eq!(redone.page_config().len(), 2);
        assert_eq!(redone.selected_key(), Some(ROOT));
    }
}
