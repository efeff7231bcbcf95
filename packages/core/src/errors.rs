//! Error types for the document engine

use crate::node::Key;
use thiserror::Error;

/// Rejection reasons for an action.
///
/// None of these escape the reducer: a rejected action leaves the state
/// unchanged (or minimally adjusted) and the error is only reported to
/// rejection listeners on the [`Store`](crate::Store).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid parent: {0}")]
    InvalidParent(Key),

    #[error("Node not found: {0}")]
    NodeNotFound(Key),

    #[error("Moving {key} under {target} would create a cycle")]
    CyclicMove { key: Key, target: Key },

    #[error("Reorder of {parent} does not match its current children")]
    SetMismatch { parent: Key },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("No component selected")]
    NoSelection,

    #[error("{child} is not allowed inside {parent}")]
    NestingRule { parent: String, child: String },

    #[error("No drag in progress")]
    NotDragging,

    #[error("Duplicate key: {0}")]
    DuplicateKey(Key),

    #[error("Prop {0} is already configured")]
    PropExists(String),
}

/// Structural invariant violations found when loading or validating a page
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    #[error("Page has nodes but no root")]
    MissingRoot,

    #[error("Node {parent} references missing child {child}")]
    DanglingKey { parent: Key, child: Key },

    #[error("Node {0} has more than one parent")]
    MultipleParents(Key),

    #[error("Node {0} is not reachable from root")]
    Orphan(Key),

    #[error("Node {0} is its own ancestor")]
    Cycle(Key),
}
