//! 2D blend tree: children sit at fixed threshold points and the live blend
//! coordinate decides their weights.
//!
//! Weights come from [`geometry::blend_weights`](crate::geometry::blend_weights):
//! segment projection for two children, barycentric weights of the Delaunay
//! triangle holding the point for three or more, and the closest triangle edge
//! when the point is outside the hull.
//!
//! Phase matching: among children flagged for it, the one with the highest weight
//! leads and every other flagged child with non-zero weight is snapped to the
//! lead's normalized time each tick.

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::geometry::{blend_weights, triangulate, Vec2};
use crate::interp::{interpolate_property, EasingFn, InterpolateOptions, Property};
use crate::state::base::{StateCore, StateOptions};
use crate::state::container::StateContainer;
use crate::state::{SharedState, State};
use crate::tween::Tween;
use crate::Result;

const BLEND_X: &str = "blend_x";
const BLEND_Y: &str = "blend_y";

/// Axis of the blend coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendAxis {
    X,
    Y,
}

impl BlendAxis {
    fn key(self) -> &'static str {
        match self {
            Self::X => BLEND_X,
            Self::Y => BLEND_Y,
        }
    }
}

#[derive(Debug)]
pub struct Blend2dState {
    core: StateCore,
    states: StateContainer,
    /// Parallel to the container's insertion order.
    thresholds: Vec<Vec2>,
    phase_matches: Vec<bool>,
    triangles: Vec<[usize; 3]>,
    blend_x: Property,
    blend_y: Property,
    /// Blend coordinate the current child weights were computed for.
    applied: Option<Vec2>,
    phase_lead: Option<usize>,
}

impl Blend2dState {
    /// Build a blend tree. `thresholds` must match `states` one to one and be
    /// distinct; `phase_matches` is either empty (no phase matching) or the same
    /// length as `states`.
    pub fn new(
        name: &str,
        options: StateOptions,
        states: Vec<State>,
        thresholds: Vec<Vec2>,
        phase_matches: Vec<bool>,
    ) -> Result<Self> {
        if states.len() != thresholds.len() {
            return Err(AnimationError::validation(format!(
                "blend tree {name:?} has {} states but {} thresholds",
                states.len(),
                thresholds.len()
            )));
        }
        if !phase_matches.is_empty() && phase_matches.len() != states.len() {
            return Err(AnimationError::validation(format!(
                "blend tree {name:?} has {} states but {} phase match flags",
                states.len(),
                phase_matches.len()
            )));
        }
        if let Some(bad) = thresholds.iter().find(|t| !t[0].is_finite() || !t[1].is_finite()) {
            return Err(AnimationError::validation(format!(
                "blend tree {name:?} has non-numeric threshold {bad:?}"
            )));
        }
        for (i, a) in thresholds.iter().enumerate() {
            if thresholds[i + 1..].contains(a) {
                return Err(AnimationError::validation(format!(
                    "blend tree {name:?} has duplicate threshold {a:?}"
                )));
            }
        }

        let phase_matches = if phase_matches.is_empty() {
            vec![false; states.len()]
        } else {
            phase_matches
        };
        let triangles = triangulate(&thresholds);

        let mut blend = Self {
            core: StateCore::new(name, &options),
            states: StateContainer::from_states(states),
            thresholds,
            phase_matches,
            triangles,
            blend_x: Property::new(BLEND_X, 0.0),
            blend_y: Property::new(BLEND_Y, 0.0),
            applied: None,
            phase_lead: None,
        };
        blend.update_blend_weights();
        Ok(blend)
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

    pub fn rename_state(&mut self, current: &str, new_name: &str) -> Result<String> {
        self.states.rename(current, new_name)
    }

    pub fn thresholds(&self) -> &[Vec2] {
        &self.thresholds
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn blend_value(&self, axis: BlendAxis) -> f32 {
        match axis {
            BlendAxis::X => self.blend_x.get(),
            BlendAxis::Y => self.blend_y.get(),
        }
    }

    pub fn blend_value_pending(&self, axis: BlendAxis) -> bool {
        self.core.tween(axis.key()).is_some_and(Tween::is_pending)
    }

    /// Animate one axis of the blend coordinate.
    pub fn set_blend_value(
        &mut self,
        axis: BlendAxis,
        value: f32,
        seconds: f32,
        easing: EasingFn,
    ) -> Tween {
        let property = match axis {
            BlendAxis::X => &self.blend_x,
            BlendAxis::Y => &self.blend_y,
        };
        let tween = interpolate_property(property, value, InterpolateOptions::over(seconds, easing));
        self.core.replace_tween(axis.key(), tween.clone());
        self.update_blend_weights();
        tween
    }

    /// Name of the child currently leading phase matching.
    pub fn phase_lead(&self) -> Option<String> {
        self.phase_lead
            .and_then(|index| self.states.get_index(index))
            .map(|state| state.borrow().name().to_string())
    }

    /// Recompute child weights if the blend coordinate moved.
    fn update_blend_weights(&mut self) {
        let point = [self.blend_x.get(), self.blend_y.get()];
        if self.applied == Some(point) {
            return;
        }
        let weights = blend_weights(&self.thresholds, &self.triangles, point);
        for (state, weight) in self.states.values().zip(weights) {
            state.borrow().core().weight_property().set(weight);
        }
        self.applied = Some(point);
    }

    fn find_phase_lead(&self) -> Option<usize> {
        let mut lead: Option<(usize, f32)> = None;
        for (index, state) in self.states.values().enumerate() {
            if !self.phase_matches[index] {
                continue;
            }
            let weight = state.borrow().weight();
            if weight > lead.map_or(0.0, |(_, w)| w) {
                lead = Some((index, weight));
            }
        }
        lead.map(|(index, _)| index)
    }

    fn match_phases(&self, lead: usize) {
        let Some(lead_state) = self.states.get_index(lead) else {
            return;
        };
        let Some(time) = lead_state.borrow().normalized_time() else {
            return;
        };
        for (index, state) in self.states.values().enumerate() {
            if index == lead || !self.phase_matches[index] {
                continue;
            }
            let mut state = state.borrow_mut();
            if state.weight() != 0.0 {
                state.set_normalized_time(time);
            }
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
        self.thresholds.clear();
        self.phase_matches.clear();
        self.triangles.clear();
        self.phase_lead = None;
    }

    pub fn deactivate(&mut self) {
        self.core.deactivate();
        self.states.deactivate_all();
    }

    pub fn update_internal_weight(&mut self, factor: f32) {
        self.core.update_internal_weight(factor);
        let internal = self.core.internal_weight();
        for state in self.states.values() {
            state.borrow_mut().update_internal_weight(internal);
        }
    }

    pub fn update(&mut self, delta_ms: f32) {
        self.core.update(delta_ms);
        self.update_blend_weights();

        self.phase_lead = self.find_phase_lead();
        self.states.update_all(delta_ms);
        if let Some(lead) = self.phase_lead {
            self.match_phases(lead);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::TimedClip;
    use crate::state::SingleState;

    fn clip(name: &str) -> State {
        SingleState::new(name, TimedClip::looping(1.0), StateOptions::default()).into()
    }

    #[test]
    fn mismatched_thresholds_are_rejected() {
        let result = Blend2dState::new(
            "locomotion",
            StateOptions::default(),
            vec![clip("a"), clip("b")],
            vec![[0.0, 0.0]],
            vec![],
        );
        assert!(matches!(result, Err(AnimationError::Validation { .. })));
    }

    #[test]
    fn duplicate_thresholds_are_rejected() {
        let result = Blend2dState::new(
            "locomotion",
            StateOptions::default(),
            vec![clip("a"), clip("b")],
            vec![[1.0, 0.0], [1.0, 0.0]],
            vec![],
        );
        assert!(result.is_err());
    }

    #[test]
    fn single_child_takes_full_weight() {
        let blend = Blend2dState::new(
            "idle",
            StateOptions::default(),
            vec![clip("a")],
            vec![[3.0, 3.0]],
            vec![],
        )
        .unwrap();
        let a = blend.state("a").unwrap();
        assert_eq!(a.borrow().weight(), 1.0);
    }
}
