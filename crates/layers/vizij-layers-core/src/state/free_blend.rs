//! Free blend: every child contributes its own authored weight.
//!
//! When the children's weights sum above 1 each contribution is scaled by
//! `1 / sum`, so the container never hands out more than its own internal weight.

use crate::error::{AnimationError, EntityKind};
use crate::interp::EasingFn;
use crate::state::base::{StateCore, StateOptions};
use crate::state::container::StateContainer;
use crate::state::{SharedState, State};
use crate::tween::Tween;
use crate::Result;

#[derive(Debug)]
pub struct FreeBlendState {
    core: StateCore,
    states: StateContainer,
}

impl FreeBlendState {
    pub fn new(name: &str, options: StateOptions, states: impl IntoIterator<Item = State>) -> Self {
        Self {
            core: StateCore::new(name, &options),
            states: StateContainer::from_states(states),
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

    pub fn add_state(&mut self, state: State) -> String {
        self.states.add(state)
    }

    pub fn remove_state(&mut self, name: &str) -> Result<()> {
        self.states.remove(name).map(|_| ())
    }

    pub fn rename_state(&mut self, current: &str, new_name: &str) -> Result<String> {
        self.states.rename(current, new_name)
    }

    /// Authored weight of the child `name`.
    pub fn blend_weight(&self, name: &str) -> Result<f32> {
        self.states.require(name).map(|s| s.borrow().weight())
    }

    /// Animate the authored weight of the child `name`.
    pub fn set_blend_weight(
        &mut self,
        name: &str,
        weight: f32,
        seconds: f32,
        easing: EasingFn,
    ) -> Tween {
        match self.states.get(name) {
            Some(state) => state.borrow_mut().set_weight(weight, seconds, easing),
            None => Tween::rejected(AnimationError::not_found(EntityKind::State, name)),
        }
    }

    pub fn play(&mut self) -> Tween {
        let children = self.states.play_all();
        self.core.play_with(Tween::all(children))
    }

    pub fn pause(&mut self) -> bool {
        self.core.pause();
        self.states.pause_all();
        true
    }

    pub fn resume(&mut self) -> Tween {
        match self.core.resume() {
            Some(finish) => {
                self.states.resume_all();
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
        self.core.stop();
        self.states.stop_all();
        true
    }

    pub fn discard(&mut self) {
        self.core.cancel();
        self.states.discard();
    }

    pub fn deactivate(&mut self) {
        self.core.deactivate();
        self.states.deactivate_all();
    }

    pub fn update_internal_weight(&mut self, factor: f32) {
        self.core.update_internal_weight(factor);
        let internal = self.core.internal_weight();
        let sum: f32 = self.states.values().map(|s| s.borrow().weight()).sum();
        let child_factor = if sum > 1.0 { internal / sum } else { internal };
        for state in self.states.values() {
            state.borrow_mut().update_internal_weight(child_factor);
        }
    }

    pub fn update(&mut self, delta_ms: f32) {
        self.core.update(delta_ms);
        self.states.update_all(delta_ms);
    }
}
