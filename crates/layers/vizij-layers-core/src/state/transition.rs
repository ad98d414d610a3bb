//! Cross-fade between a set of source states and one target state.
//!
//! The transition does not own the states it fades: they stay in the layer's
//! container and are only referenced here for the duration of the fade.

use std::rc::Rc;

use crate::interp::EasingFn;
use crate::state::base::{StateCore, StateOptions};
use crate::state::{SharedState, State};
use crate::tween::Tween;

#[derive(Debug)]
pub struct TransitionState {
    core: StateCore,
    from: Vec<SharedState>,
    to: Option<SharedState>,
    transition: Tween,
    duration_ms: f32,
    elapsed_ms: f32,
}

impl TransitionState {
    pub fn new(name: &str, options: StateOptions) -> Self {
        Self {
            core: StateCore::new(name, &options),
            from: Vec::new(),
            to: None,
            transition: Tween::resolved(),
            duration_ms: 0.0,
            elapsed_ms: 0.0,
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

    pub fn from_states(&self) -> &[SharedState] {
        &self.from
    }

    pub fn to_state(&self) -> Option<&SharedState> {
        self.to.as_ref()
    }

    /// Tween settling when every weight fade has settled.
    pub fn transition_tween(&self) -> &Tween {
        &self.transition
    }

    /// True once the fade ran to completion without being interrupted.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.transition.is_completed()
    }

    /// Fraction of the fade time elapsed, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return if self.transition.is_pending() { 0.0 } else { 1.0 };
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    fn references(&self, state: &SharedState) -> bool {
        self.from.iter().any(|s| Rc::ptr_eq(s, state))
            || self.to.as_ref().is_some_and(|s| Rc::ptr_eq(s, state))
    }

    /// Start fading every state of `from` to weight 0 and `to` to weight 1.
    ///
    /// Any fade in flight is canceled first, and states referenced by it but not
    /// by the new fade are deactivated. `on_complete` runs only if every fade
    /// resolved without being canceled.
    pub fn configure(
        &mut self,
        from: Vec<SharedState>,
        to: SharedState,
        seconds: f32,
        easing: EasingFn,
        on_complete: Option<Box<dyn FnOnce()>>,
    ) -> Tween {
        self.transition.cancel();

        let previous: Vec<SharedState> = self.from.drain(..).chain(self.to.take()).collect();
        let from: Vec<SharedState> = from.into_iter().filter(|s| !Rc::ptr_eq(s, &to)).collect();
        self.from = from;
        self.to = Some(to.clone());
        for state in previous {
            if !self.references(&state) {
                state.borrow_mut().deactivate();
            }
        }

        let mut fades: Vec<Tween> = self
            .from
            .iter()
            .map(|state| state.borrow_mut().set_weight(0.0, seconds, easing.clone()))
            .collect();
        fades.push(to.borrow_mut().set_weight(1.0, seconds, easing));

        self.duration_ms = (seconds * 1000.0).max(0.0);
        self.elapsed_ms = 0.0;
        self.transition = Tween::all(fades);
        if let Some(callback) = on_complete {
            self.transition.on_resolve(callback);
        }

        log::debug!(
            "Transition {:?} fading {} state(s) into {:?} over {seconds}s",
            self.core.name(),
            self.from.len(),
            to.borrow().name()
        );
        self.transition.clone()
    }

    pub fn play(&mut self) -> Tween {
        let target = match &self.to {
            Some(to) => to.borrow_mut().play().follow(),
            None => Tween::resolved(),
        };
        self.core.play_with(Tween::all([self.transition.follow(), target]))
    }

    pub fn pause(&mut self) -> bool {
        self.core.pause();
        self.for_each_referenced(|state| {
            state.pause();
        });
        true
    }

    pub fn resume(&mut self) -> Tween {
        match self.core.resume() {
            Some(finish) => {
                self.for_each_referenced(|state| {
                    state.resume();
                });
                finish
            }
            None => self.play(),
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.core.cancel();
        self.transition.cancel();
        self.for_each_referenced(|state| {
            state.cancel();
        });
        true
    }

    pub fn stop(&mut self) -> bool {
        self.core.stop();
        self.for_each_referenced(|state| {
            state.stop();
        });
        true
    }

    /// Cancel and release the referenced states. They remain owned by the layer.
    pub fn discard(&mut self) {
        self.core.cancel();
        self.transition.cancel();
        self.from.clear();
        self.to = None;
    }

    /// Forget the referenced states once the fade is over, leaving the play
    /// cycle to follow the target alone.
    pub fn release(&mut self) {
        self.from.clear();
        self.to = None;
    }

    pub fn deactivate(&mut self) {
        self.core.deactivate();
        self.for_each_referenced(|state| state.deactivate());
    }

    pub fn update_internal_weight(&mut self, factor: f32) {
        self.core.update_internal_weight(factor);
        let internal = self.core.internal_weight();
        self.for_each_referenced(|state| state.update_internal_weight(internal));
    }

    pub fn update(&mut self, delta_ms: f32) {
        self.core.update(delta_ms);
        if !self.core.is_paused() && self.transition.is_pending() {
            self.elapsed_ms = (self.elapsed_ms + delta_ms).max(0.0);
        }
        self.for_each_referenced(|state| state.update(delta_ms));
    }

    fn for_each_referenced(&self, mut f: impl FnMut(&mut State)) {
        for state in self.from.iter().chain(self.to.iter()) {
            f(&mut *state.borrow_mut());
        }
    }
}
