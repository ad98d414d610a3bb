//! A layer: named states, one of which is current, faded in and out through a
//! dedicated transition state.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::interp::{interpolate_property, Easing, EasingFn, InterpolateOptions, Property};
use crate::state::{SharedState, State, StateContainer, StateOptions, TransitionState};
use crate::tween::Tween;
use crate::Result;

/// How a layer combines with the layers below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Hides lower layers in proportion to the current state's weight.
    #[default]
    Override,
    /// Adds on top without reducing lower layers.
    Additive,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerOptions {
    pub weight: f32,
    pub blend_mode: BlendMode,
    /// Cross-fade time used when `play_animation` is given none.
    pub transition_seconds: f32,
    pub easing: Easing,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            weight: 1.0,
            blend_mode: BlendMode::Override,
            transition_seconds: 0.0,
            easing: Easing::Linear,
        }
    }
}

#[derive(Debug)]
pub struct Layer {
    name: String,
    weight: Property,
    weight_tween: Tween,
    internal_weight: f32,
    blend_mode: BlendMode,
    transition_seconds: f32,
    easing: Easing,
    states: StateContainer,
    transition: SharedState,
    current: Option<SharedState>,
}

impl Layer {
    pub fn new(name: &str, options: LayerOptions) -> Self {
        let transition = TransitionState::new(
            &format!("{name}/transition"),
            StateOptions::weighted(1.0),
        );
        Self {
            name: name.to_string(),
            weight: Property::clamped("weight", options.weight, 0.0, 1.0),
            weight_tween: Tween::resolved(),
            internal_weight: 0.0,
            blend_mode: options.blend_mode,
            transition_seconds: options.transition_seconds,
            easing: options.easing,
            states: StateContainer::new(),
            transition: State::from(transition).into_shared(),
            current: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight.get()
    }

    #[inline]
    pub fn weight_pending(&self) -> bool {
        self.weight_tween.is_pending()
    }

    #[inline]
    pub fn internal_weight(&self) -> f32 {
        self.internal_weight
    }

    /// Fixed when the layer is built.
    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    #[inline]
    pub fn transition_seconds(&self) -> f32 {
        self.transition_seconds
    }

    #[inline]
    pub fn easing(&self) -> Easing {
        self.easing
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

    /// State currently driven by the layer. While cross-fading this is the
    /// layer's transition state.
    pub fn current_state(&self) -> Option<SharedState> {
        self.current.clone()
    }

    /// Name of the current state, or of the target while cross-fading.
    pub fn current_state_name(&self) -> Option<String> {
        let current = self.current.as_ref()?;
        if Rc::ptr_eq(current, &self.transition) {
            let transition = current.borrow();
            let target = transition.as_transition()?.to_state()?.borrow().name().to_string();
            return Some(target);
        }
        let name = current.borrow().name().to_string();
        Some(name)
    }

    pub fn is_transitioning(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, &self.transition))
    }

    /// Add a state, renaming it on collision. Returns the final name.
    pub fn add_state(&mut self, state: State) -> String {
        self.states.add(state)
    }

    /// Remove and discard a state, dropping it from any fade in flight.
    pub fn remove_state(&mut self, name: &str) -> Result<()> {
        let state = self.states.require(name)?.clone();
        let referenced = self
            .transition
            .borrow()
            .as_transition()
            .is_some_and(|t| {
                t.to_state().is_some_and(|s| Rc::ptr_eq(s, &state))
                    || t.from_states().iter().any(|s| Rc::ptr_eq(s, &state))
            });
        if referenced {
            self.transition.borrow_mut().discard();
            if self.is_transitioning() {
                self.current = None;
            }
        }
        if self.current.as_ref().is_some_and(|c| Rc::ptr_eq(c, &state)) {
            self.current = None;
        }
        self.states.remove(name)?;
        Ok(())
    }

    pub fn rename_state(&mut self, current: &str, new_name: &str) -> Result<String> {
        self.states.rename(current, new_name)
    }

    /// Animate the layer weight, canceling any layer weight tween in flight.
    pub fn set_weight(&mut self, weight: f32, seconds: f32, easing: EasingFn) -> Tween {
        self.weight_tween.cancel();
        if weight.is_finite() && !(0.0..=1.0).contains(&weight) {
            log::warn!("Weight {weight} of layer {:?} clamped to [0, 1]", self.name);
        }
        self.weight_tween = interpolate_property(
            &self.weight,
            weight,
            InterpolateOptions::over(seconds, easing),
        );
        self.weight_tween.clone()
    }

    /// Make `name` the current state and play it, cross-fading over `seconds`
    /// (the layer default when `None`). The returned tween resolves when the
    /// animation finishes and is canceled when it is interrupted.
    pub fn play_animation(
        &mut self,
        name: &str,
        seconds: Option<f32>,
        easing: Option<EasingFn>,
    ) -> Tween {
        let target = match self.states.require(name) {
            Ok(state) => state.clone(),
            Err(err) => {
                log::warn!("Layer {:?} cannot play: {err}", self.name);
                return Tween::rejected(err);
            }
        };
        let seconds = seconds.unwrap_or(self.transition_seconds);
        let easing = easing.unwrap_or_else(|| self.easing.into());
        let playing = self.prepare_current_state(&target, seconds, easing);
        let finish = playing.borrow_mut().play();
        finish
    }

    /// Swap the current state for `target` and return the state to play.
    fn prepare_current_state(
        &mut self,
        target: &SharedState,
        seconds: f32,
        easing: EasingFn,
    ) -> SharedState {
        let previous = self.current.take();

        if seconds > 0.0 {
            let from: Vec<SharedState> = self
                .states
                .values()
                .filter(|s| !Rc::ptr_eq(s, target))
                .filter(|s| {
                    let s = s.borrow();
                    s.weight() != 0.0 || s.weight_pending()
                })
                .cloned()
                .collect();

            if let Some(previous) = previous {
                let stale = !Rc::ptr_eq(&previous, &self.transition)
                    && !Rc::ptr_eq(&previous, target)
                    && !from.iter().any(|s| Rc::ptr_eq(s, &previous));
                if stale {
                    let mut previous = previous.borrow_mut();
                    previous.cancel();
                    previous.deactivate();
                }
            }

            {
                let mut transition = self.transition.borrow_mut();
                transition.set_weight(1.0, 0.0, EasingFn::default());
                if let Some(transition) = transition.as_transition_mut() {
                    transition.configure(from, target.clone(), seconds, easing, None);
                }
            }
            log::debug!(
                "Layer {:?} cross-fading to {:?} over {seconds}s",
                self.name,
                target.borrow().name()
            );
            self.current = Some(self.transition.clone());
            return self.transition.clone();
        }

        if let Some(previous) = previous {
            if Rc::ptr_eq(&previous, &self.transition) {
                let referenced: Vec<SharedState> = {
                    let transition = previous.borrow();
                    transition
                        .as_transition()
                        .map(|t| t.from_states().iter().chain(t.to_state()).cloned().collect())
                        .unwrap_or_default()
                };
                previous.borrow_mut().discard();
                for state in referenced.iter().filter(|s| !Rc::ptr_eq(s, target)) {
                    retire(state);
                }
            } else if !Rc::ptr_eq(&previous, target) {
                retire(&previous);
            }
        }

        target.borrow_mut().set_weight(1.0, 0.0, EasingFn::default());
        self.current = Some(target.clone());
        target.clone()
    }

    /// Promote the target of a completed cross-fade to current.
    fn settle_transition(&mut self) {
        if !self.is_transitioning() {
            return;
        }
        let (from, to) = {
            let transition = self.transition.borrow();
            let Some(transition) = transition.as_transition() else {
                return;
            };
            if !transition.is_complete() {
                return;
            }
            (transition.from_states().to_vec(), transition.to_state().cloned())
        };

        for state in &from {
            let mut state = state.borrow_mut();
            state.cancel();
            state.deactivate();
        }
        if let Some(transition) = self.transition.borrow_mut().as_transition_mut() {
            transition.release();
        }
        log::debug!("Layer {:?} finished cross-fading", self.name);
        self.current = to;
    }

    /// Resolve the state addressed by an animation name: the transition while
    /// cross-fading into it, the state itself otherwise.
    fn animation_handle(&self, name: &str) -> Result<SharedState> {
        let state = self.states.require(name)?.clone();
        if self.is_transitioning() {
            let into_target = self
                .transition
                .borrow()
                .as_transition()
                .and_then(TransitionState::to_state)
                .is_some_and(|to| Rc::ptr_eq(to, &state));
            if into_target {
                return Ok(self.transition.clone());
            }
        }
        Ok(state)
    }

    /// Advance the queue `name` to its next child.
    pub fn play_next_animation(&mut self, name: &str, wrap: bool) -> Tween {
        let state = match self.states.require(name) {
            Ok(state) => state.clone(),
            Err(err) => return Tween::rejected(err),
        };
        let mut state = state.borrow_mut();
        match state.as_queue_mut() {
            Some(queue) => queue.next(wrap),
            None => Tween::rejected(AnimationError::invalid_operation(format!(
                "state {name:?} on layer {:?} is not a queue",
                self.name
            ))),
        }
    }

    pub fn pause_animation(&mut self, name: &str) -> Result<bool> {
        let handle = self.animation_handle(name)?;
        let paused = handle.borrow_mut().pause();
        Ok(paused)
    }

    /// Resume `name`, or the current state when `None`. A state that is not
    /// current is played, cross-fading over `seconds`.
    pub fn resume_animation(
        &mut self,
        name: Option<&str>,
        seconds: Option<f32>,
        easing: Option<EasingFn>,
    ) -> Tween {
        let name = match name.map(str::to_string).or_else(|| self.current_state_name()) {
            Some(name) => name,
            None => {
                return Tween::rejected(AnimationError::invalid_operation(format!(
                    "layer {:?} has no current state to resume",
                    self.name
                )))
            }
        };
        if self.current_state_name().as_deref() != Some(name.as_str()) {
            return self.play_animation(&name, seconds, easing);
        }
        match self.animation_handle(&name) {
            Ok(handle) => {
                let finish = handle.borrow_mut().resume();
                finish
            }
            Err(err) => Tween::rejected(err),
        }
    }

    /// Stop `name`. Returns true when a play cycle was still running; the
    /// stop resolves its finish tween.
    pub fn stop_animation(&mut self, name: &str) -> Result<bool> {
        let handle = self.animation_handle(name)?;
        let mut state = handle.borrow_mut();
        let running = state.finish_tween().is_pending();
        state.stop();
        Ok(running)
    }

    pub fn update_internal_weight(&mut self, factor: f32) {
        self.internal_weight = self.weight.get() * factor;
        if let Some(current) = &self.current {
            current.borrow_mut().update_internal_weight(self.internal_weight);
        }
    }

    /// Internal weight of the current state, after the layer's own weight.
    pub fn current_internal_weight(&self) -> Option<f32> {
        self.current.as_ref().map(|c| c.borrow().internal_weight())
    }

    pub fn update(&mut self, delta_ms: f32) {
        self.weight_tween.execute(delta_ms);
        if let Some(current) = self.current.clone() {
            current.borrow_mut().update(delta_ms);
            self.settle_transition();
        }
    }

    /// Cancel everything and drop every state.
    pub fn discard(&mut self) {
        self.weight_tween.cancel();
        self.transition.borrow_mut().discard();
        self.current = None;
        self.states.discard();
    }
}

/// Cancel a state that stops being current and zero its weight.
fn retire(state: &SharedState) {
    let mut state = state.borrow_mut();
    state.cancel();
    state.set_weight(0.0, 0.0, EasingFn::default());
    state.deactivate();
}
