//! # Store
//!
//! Owns the current [`State`], runs actions through the reducer, and tells
//! subscribers which slices changed.
//!
//! ## Change detection
//!
//! After every dispatch the previous and next states are compared slice by
//! slice, by identity. A subscriber is called only when one of the slices it
//! asked for changed and its optional filter agrees.
//!
//! ## Gestures
//!
//! The resize gesture lives here rather than in [`State`]: it is host
//! pointer plumbing, not document state. Finishing a gesture dispatches a
//! `resizeChange` action; a gesture whose node stops being selected is
//! cancelled.

use crate::actions::Action;
use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::geometry::{MeasuredSize, Point};
use crate::page_config::PageConfig;
use crate::reducer::{transition, Transition};
use crate::resize::{Direction, ResizeCoordinator, SizePreview};
use crate::state::{changed_slices, Slice, State};
use tracing::{debug, warn};

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&State, &[Slice])>;
type Filter = Box<dyn Fn(&State, &State) -> bool>;
type RejectionListener = Box<dyn FnMut(&str, &EngineError)>;

struct Subscription {
    id: SubscriptionId,
    slices: Vec<Slice>,
    filter: Option<Filter>,
    listener: Listener,
}

pub struct Store {
    state: State,
    subscriptions: Vec<Subscription>,
    rejection_listeners: Vec<RejectionListener>,
    next_id: SubscriptionId,
    resize: ResizeCoordinator,
    torn_down: bool,
}

impl Store {
    /// Store over an empty page
    pub fn new(config: &EngineConfig) -> Self {
        Self::from_state(State::new(config))
    }

    pub fn with_page(page_config: PageConfig, config: &EngineConfig) -> Self {
        Self::from_state(State::with_page(page_config, config))
    }

    pub fn from_state(state: State) -> Self {
        Self {
            state,
            subscriptions: Vec::new(),
            rejection_listeners: Vec::new(),
            next_id: 1,
            resize: ResizeCoordinator::new(),
            torn_down: false,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn page_config(&self) -> &PageConfig {
        self.state.page_config()
    }

    /// Run `action` through the reducer and notify subscribers.
    ///
    /// A rejected action leaves the state as the reducer returned it and is
    /// reported both to rejection listeners and to the caller.
    pub fn dispatch(&mut self, action: Action) -> Result<(), EngineError> {
        if self.torn_down {
            warn!(action = action.name(), "dispatch after teardown ignored");
            return Ok(());
        }

        let name = action.name();
        let Transition { state, rejection } = transition(&self.state, action);
        let prev = std::mem::replace(&mut self.state, state);

        let resize_stale = self
            .resize
            .target()
            .is_some_and(|target| self.state.selected_key() != Some(target));
        if resize_stale {
            debug!("resize cancelled by selection change");
            self.resize.cancel();
        }

        self.notify(&prev);

        match rejection {
            Some(err) => {
                for listener in &mut self.rejection_listeners {
                    listener(name, &err);
                }
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Dispatch several actions in order. Rejections do not stop the batch;
    /// they are returned with the position of the action that caused them.
    pub fn dispatch_all(
        &mut self,
        actions: impl IntoIterator<Item = Action>,
    ) -> Vec<(usize, EngineError)> {
        actions
            .into_iter()
            .enumerate()
            .filter_map(|(position, action)| {
                self.dispatch(action).err().map(|err| (position, err))
            })
            .collect()
    }

    /// Call `listener` whenever one of `slices` changes (every slice when
    /// `slices` is empty)
    pub fn subscribe(
        &mut self,
        slices: &[Slice],
        listener: impl FnMut(&State, &[Slice]) + 'static,
    ) -> SubscriptionId {
        self.add_subscription(slices, None, Box::new(listener))
    }

    /// Like [`subscribe`](Self::subscribe), with a comparator that gets the
    /// previous and next state and decides whether the listener runs
    pub fn subscribe_with(
        &mut self,
        slices: &[Slice],
        filter: impl Fn(&State, &State) -> bool + 'static,
        listener: impl FnMut(&State, &[Slice]) + 'static,
    ) -> SubscriptionId {
        self.add_subscription(slices, Some(Box::new(filter)), Box::new(listener))
    }

    /// Returns `false` when no such subscription exists
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        self.subscriptions.len() != before
    }

    /// Listen for rejected actions (action name, reason)
    pub fn on_rejection(&mut self, listener: impl FnMut(&str, &EngineError) + 'static) {
        self.rejection_listeners.push(Box::new(listener));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Drop every listener and gesture. Later dispatches are ignored.
    pub fn teardown(&mut self) {
        debug!(subscribers = self.subscriptions.len(), "store torn down");
        self.subscriptions.clear();
        self.rejection_listeners.clear();
        self.resize.cancel();
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // ====================================================================
    // Resize gesture
    // ====================================================================

    /// Start resizing the selected node from one of its handles
    pub fn begin_resize(
        &mut self,
        direction: Direction,
        origin: Point,
        measured: MeasuredSize,
    ) -> Result<(), EngineError> {
        let key = self
            .state
            .selected_key()
            .ok_or(EngineError::NoSelection)?
            .to_string();
        debug!(key = %key, ?direction, "resize started");
        self.resize.start(key, direction, origin, measured);
        Ok(())
    }

    /// Live size for the current pointer position
    pub fn resize_move(&mut self, pointer: Point) -> Option<SizePreview> {
        self.resize.pointer_move(pointer)
    }

    /// Finish the gesture, committing the new size if anything changed
    pub fn end_resize(&mut self) -> Result<(), EngineError> {
        match self.resize.pointer_up() {
            Some(payload) => self.dispatch(Action::ResizeChange(payload)),
            None => Ok(()),
        }
    }

    pub fn cancel_resize(&mut self) {
        self.resize.cancel();
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_resizing()
    }

    fn add_subscription(
        &mut self,
        slices: &[Slice],
        filter: Option<Filter>,
        listener: Listener,
    ) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        let slices = if slices.is_empty() {
            Slice::ALL.to_vec()
        } else {
            slices.to_vec()
        };
        self.subscriptions.push(Subscription {
            id,
            slices,
            filter,
            listener,
        });
        id
    }

    fn notify(&mut self, prev: &State) {
        let changed = changed_slices(prev, &self.state);
        if changed.is_empty() {
            return;
        }

        for subscription in &mut self.subscriptions {
            let relevant: Vec<Slice> = changed
                .iter()
                .copied()
                .filter(|slice| subscription.slices.contains(slice))
                .collect();
            if relevant.is_empty() {
                continue;
            }
            if let Some(filter) = &subscription.filter {
                if !filter(prev, &self.state) {
                    continue;
                }
            }
            (subscription.listener)(&self.state, &relevant);
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("subscriptions", &self.subscriptions.len())
            .field("resize", &self.resize)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}
