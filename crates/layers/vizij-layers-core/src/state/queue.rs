//! Sequential playback: children play one after another at full weight.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::interp::EasingFn;
use crate::state::base::{StateCore, StateOptions};
use crate::state::container::StateContainer;
use crate::state::{SharedState, State};
use crate::tween::Tween;

/// Reported each time a queue moves to another child.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueAdvance {
    /// Child now playing, or the last child when the queue ended.
    pub name: String,
    /// Another child follows the current one.
    pub can_advance: bool,
    pub is_queue_end: bool,
}

pub type QueueCallback = Box<dyn FnMut(&QueueAdvance)>;

pub struct QueueState {
    core: StateCore,
    states: StateContainer,
    auto_advance: bool,
    cursor: usize,
    done: bool,
    on_next: Option<QueueCallback>,
}

impl fmt::Debug for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueState")
            .field("core", &self.core)
            .field("states", &self.states)
            .field("auto_advance", &self.auto_advance)
            .field("cursor", &self.cursor)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl QueueState {
    pub fn new(name: &str, options: StateOptions, states: impl IntoIterator<Item = State>) -> Self {
        Self {
            core: StateCore::new(name, &options),
            states: StateContainer::from_states(states),
            auto_advance: true,
            cursor: 0,
            done: false,
            on_next: None,
        }
    }

    #[inline]
    pub fn core(&self) -> &StateCore {
        &self.core
    }

    #[inline]
    pub(crate) fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    pub fn states(&self) -> &StateContainer {
        &self.states
    }

    pub fn state(&self, name: &str) -> Option<SharedState> {
        self.states.get(name).cloned()
    }

    pub fn state_names(&self) -> Vec<String> {
        self.states.names()
    }

    /// Append a state to the end of the queue.
    pub fn add_state(&mut self, state: State) -> String {
        self.states.add(state)
    }

    #[inline]
    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    /// When set, the queue moves on as soon as the current child finishes.
    pub fn set_auto_advance(&mut self, auto_advance: bool) {
        self.auto_advance = auto_advance;
    }

    pub fn set_on_next(&mut self, callback: Option<QueueCallback>) {
        self.on_next = callback;
    }

    /// True once the last child finished or the queue was stopped.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn current_state(&self) -> Option<SharedState> {
        if self.done {
            return None;
        }
        self.states.get_index(self.cursor).cloned()
    }

    pub fn current_state_name(&self) -> Option<String> {
        self.current_state().map(|s| s.borrow().name().to_string())
    }

    fn notify(&mut self, advance: QueueAdvance) {
        log::debug!(
            "Queue {:?} advanced to {:?} (end: {})",
            self.core.name(),
            advance.name,
            advance.is_queue_end
        );
        if let Some(callback) = self.on_next.as_mut() {
            callback(&advance);
        }
    }

    /// Give the child under the cursor full weight and play it.
    fn start_current(&mut self) -> Tween {
        let Some(state) = self.states.get_index(self.cursor).cloned() else {
            return Tween::resolved();
        };
        let mut state = state.borrow_mut();
        state.set_weight(1.0, 0.0, EasingFn::default());
        state.play()
    }

    fn retire_current(&self) {
        if let Some(state) = self.states.get_index(self.cursor) {
            let mut state = state.borrow_mut();
            state.stop();
            state.set_weight(0.0, 0.0, EasingFn::default());
            state.deactivate();
        }
    }

    fn finish_queue(&mut self) {
        self.done = true;
        self.core.play_tween().resolve();
    }

    /// Restart from the first child.
    pub fn play(&mut self) -> Tween {
        let finish = self.core.play();
        for state in self.states.values() {
            let mut state = state.borrow_mut();
            state.cancel();
            state.set_weight(0.0, 0.0, EasingFn::default());
            state.deactivate();
        }
        self.cursor = 0;
        self.done = false;

        if self.states.is_empty() {
            self.finish_queue();
            return finish;
        }
        self.start_current();
        finish
    }

    /// Move to the next child, or back to the first one when `wrap` is set and
    /// the end was reached. Returns the finish tween of the child now playing.
    pub fn next(&mut self, wrap: bool) -> Tween {
        if self.states.is_empty() {
            return Tween::rejected(AnimationError::invalid_operation(format!(
                "queue {:?} has no states",
                self.core.name()
            )));
        }
        if self.done && !wrap {
            return Tween::resolved();
        }

        self.retire_current();
        let len = self.states.len();
        let at_end = self.done || self.cursor + 1 >= len;
        if at_end && !wrap {
            let name = self.current_name_at(self.cursor);
            self.notify(QueueAdvance {
                name,
                can_advance: false,
                is_queue_end: true,
            });
            self.finish_queue();
            return Tween::resolved();
        }

        if self.done {
            self.core.play();
            self.done = false;
        }
        self.cursor = if at_end { 0 } else { self.cursor + 1 };
        let finish = self.start_current();
        let can_advance = self.cursor + 1 < len;
        let name = self.current_name_at(self.cursor);
        self.notify(QueueAdvance {
            name,
            can_advance,
            is_queue_end: !can_advance,
        });
        finish
    }

    fn current_name_at(&self, index: usize) -> String {
        self.states
            .get_index(index)
            .map(|s| s.borrow().name().to_string())
            .unwrap_or_default()
    }

    pub fn pause(&mut self) -> bool {
        self.core.pause();
        if let Some(state) = self.current_state() {
            state.borrow_mut().pause();
        }
        true
    }

    pub fn resume(&mut self) -> Tween {
        match self.core.resume() {
            Some(finish) => {
                if let Some(state) = self.current_state() {
                    state.borrow_mut().resume();
                }
                finish
            }
            None => self.play(),
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.core.cancel();
        self.states.cancel_all();
        true
    }

    pub fn stop(&mut self) -> bool {
        self.states.stop_all();
        self.core.stop();
        self.done = true;
        true
    }

    /// Cancel and remove every queued state.
    pub fn discard(&mut self) {
        self.core.cancel();
        self.states.discard();
        self.cursor = 0;
        self.done = true;
    }

    pub fn deactivate(&mut self) {
        self.core.deactivate();
        self.states.deactivate_all();
    }

    pub fn update_internal_weight(&mut self, factor: f32) {
        self.core.update_internal_weight(factor);
        let internal = self.core.internal_weight();
        for (index, state) in self.states.values().enumerate() {
            let mut state = state.borrow_mut();
            if !self.done && index == self.cursor {
                state.update_internal_weight(internal);
            } else {
                state.deactivate();
            }
        }
    }

    pub fn update(&mut self, delta_ms: f32) {
        self.core.update(delta_ms);
        let Some(current) = self.current_state() else {
            return;
        };
        current.borrow_mut().update(delta_ms);

        if self.auto_advance && !self.core.is_paused() {
            let finished = current.borrow().finish_tween().is_completed();
            if finished {
                self.next(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::clip::TimedClip;
    use crate::state::SingleState;

    fn clip(name: &str, seconds: f32) -> State {
        SingleState::new(name, TimedClip::new(seconds), StateOptions::default()).into()
    }

    #[test]
    fn plays_children_in_order_and_finishes() {
        let mut queue = QueueState::new(
            "greeting",
            StateOptions::weighted(1.0),
            [clip("wave", 1.0), clip("nod", 0.5)],
        );
        let advances = Rc::new(RefCell::new(Vec::new()));
        let sink = advances.clone();
        queue.set_on_next(Some(Box::new(move |advance: &QueueAdvance| {
            sink.borrow_mut().push(advance.clone());
        })));

        let finish = queue.play();
        assert_eq!(queue.current_state_name().as_deref(), Some("wave"));

        queue.update(1000.0);
        assert_eq!(queue.current_state_name().as_deref(), Some("nod"));
        assert!(finish.is_pending());

        queue.update(500.0);
        assert!(queue.is_done());
        assert!(finish.is_completed());

        let advances = advances.borrow();
        assert_eq!(advances.len(), 2);
        assert_eq!(advances[0].name, "nod");
        assert!(advances[0].is_queue_end);
        assert!(advances[1].is_queue_end);
        assert!(!advances[1].can_advance);
    }

    #[test]
    fn manual_advance_wraps_around() {
        let mut queue = QueueState::new(
            "idle_set",
            StateOptions::weighted(1.0),
            [clip("a", 1.0), clip("b", 1.0)],
        );
        queue.set_auto_advance(false);
        queue.play();

        queue.update(2000.0);
        assert_eq!(queue.current_state_name().as_deref(), Some("a"));

        queue.next(false);
        assert_eq!(queue.current_state_name().as_deref(), Some("b"));
        queue.next(true);
        assert_eq!(queue.current_state_name().as_deref(), Some("a"));
    }

    #[test]
    fn empty_queue_resolves_immediately() {
        let mut queue = QueueState::new("empty", StateOptions::default(), []);
        assert!(queue.play().is_completed());
        assert!(queue.next(false).is_rejected());
    }

    #[test]
    fn discard_removes_every_child() {
        let mut queue = QueueState::new("q", StateOptions::default(), [clip("a", 1.0)]);
        queue.discard();
        assert!(queue.states().is_empty());
    }
}
