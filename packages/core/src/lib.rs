//! # Brickd Core
//!
//! Document state engine for a drag-and-drop page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: canvas, palette, property panels      │
//! │  - measures layout, emits Actions           │
//! └─────────────────────────────────────────────┘
//!                     ↓ dispatch
//! ┌─────────────────────────────────────────────┐
//! │ Store: current State + subscriptions        │
//! │  - reducer(state, action) → state           │
//! │  - slice change detection by identity       │
//! │  - resize gesture → resizeChange            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ State                                       │
//! │  - PageConfig (flat key → node tree)        │
//! │  - selection, hover, drag/drop              │
//! │  - History (snapshots sharing structure)    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Actions are data**: every change goes through one pure reducer
//! 2. **Structural sharing**: snapshots and untouched nodes are shared, never copied
//! 3. **Rejections are local**: an invalid action leaves the state as it was
//! 4. **Geometry is input**: the engine never measures, the host does
//!
//! ## Usage
//!
//! ```rust,ignore
//! use brickd_core::{Action, EngineConfig, Slice, Store, ROOT};
//!
//! let mut store = Store::new(&EngineConfig::default());
//! store.subscribe(&[Slice::PageConfig], |state, _| {
//!     println!("{} nodes", state.page_config().len());
//! });
//!
//! store.dispatch(Action::add_component(ROOT, "div"))?;
//! store.dispatch(Action::add_component(ROOT, "Button"))?;
//! store.dispatch(Action::Undo)?;
//! ```

mod actions;
mod config;
mod drag_drop;
mod edits;
mod errors;
mod geometry;
mod history;
mod key_generator;
mod node;
mod page_config;
mod props;
mod reducer;
mod resize;
mod schema;
mod selection;
mod state;
mod store;

pub use actions::Action;
pub use config::EngineConfig;
pub use drag_drop::{resolve_drop_target, DragSource, DropTarget};
pub use errors::{EngineError, PageError};
pub use geometry::{format_px, parse_unit, LayoutSnapshot, MeasuredSize, Point, Rect};
pub use history::{History, HistoryConfig, Snapshot};
pub use key_generator::{KeyGenerator, DEFAULT_SEED};
pub use node::{ChildNodes, Key, Node, Props, ROOT, STYLE};
pub use page_config::{PageConfig, ParentRef};
pub use reducer::{reducer, transition, try_reduce, Transition};
pub use resize::{Direction, ResizeCoordinator, ResizePayload, SizePreview};
pub use schema::{modal_surface, ComponentRegistry, ComponentSchema, ContainerKind};
pub use selection::SelectedInfo;
pub use state::{changed_slices, PlatformInfo, Slice, State};
pub use store::{Store, SubscriptionId};
