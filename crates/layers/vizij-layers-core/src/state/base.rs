//! Lifecycle and weight model shared by every state in the graph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::interp::{interpolate_property, EasingFn, InterpolateOptions, Property};
use crate::tween::Tween;

pub(crate) const PLAY: &str = "play";
pub(crate) const FINISH: &str = "finish";
pub(crate) const WEIGHT: &str = "weight";

/// Authoring options common to all states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateOptions {
    /// Initial authored weight, clamped to [0, 1].
    pub weight: f32,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self { weight: 0.0 }
    }
}

impl StateOptions {
    pub fn weighted(weight: f32) -> Self {
        Self { weight }
    }
}

/// Name, weights, paused flag and owned tweens of a state.
///
/// `internal_weight` is derived data: it is rewritten top-down every tick by
/// [`update_internal_weight`](Self::update_internal_weight) and never advanced
/// on its own.
#[derive(Debug)]
pub struct StateCore {
    name: String,
    weight: Property,
    internal_weight: f32,
    paused: bool,
    tweens: IndexMap<&'static str, Tween>,
}

impl StateCore {
    pub fn new(name: &str, options: &StateOptions) -> Self {
        let mut tweens = IndexMap::new();
        tweens.insert(PLAY, Tween::resolved());
        tweens.insert(FINISH, Tween::resolved());
        tweens.insert(WEIGHT, Tween::resolved());
        Self {
            name: name.to_string(),
            weight: Property::clamped(WEIGHT, options.weight, 0.0, 1.0),
            internal_weight: 0.0,
            paused: false,
            tweens,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight.get()
    }

    /// Shared handle to the authored weight, for tweens driving it.
    #[inline]
    pub fn weight_property(&self) -> &Property {
        &self.weight
    }

    #[inline]
    pub fn internal_weight(&self) -> f32 {
        self.internal_weight
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn weight_pending(&self) -> bool {
        self.tween(WEIGHT).is_some_and(Tween::is_pending)
    }

    /// True while the current play cycle has not finished.
    #[inline]
    pub fn is_playing(&self) -> bool {
        !self.paused && self.tween(FINISH).is_some_and(Tween::is_pending)
    }

    pub fn tween(&self, key: &str) -> Option<&Tween> {
        self.tweens.get(key)
    }

    /// Store `tween` under `key`, canceling whatever was there.
    pub fn replace_tween(&mut self, key: &'static str, tween: Tween) {
        if let Some(previous) = self.tweens.insert(key, tween) {
            previous.cancel();
        }
    }

    pub(crate) fn play_tween(&self) -> Tween {
        self.tweens.get(PLAY).cloned().unwrap_or_default()
    }

    pub(crate) fn finish_tween(&self) -> Tween {
        self.tweens.get(FINISH).cloned().unwrap_or_default()
    }

    /// Animate the authored weight, canceling any weight tween in flight.
    pub fn set_weight(&mut self, weight: f32, seconds: f32, easing: EasingFn) -> Tween {
        if let Some(previous) = self.tweens.get(WEIGHT) {
            previous.cancel();
        }
        if weight.is_finite() && !(0.0..=1.0).contains(&weight) {
            log::warn!("Weight {weight} of state {:?} clamped to [0, 1]", self.name);
        }
        let tween = interpolate_property(
            &self.weight,
            weight,
            InterpolateOptions::over(seconds, easing),
        );
        self.tweens.insert(WEIGHT, tween.clone());
        tween
    }

    pub fn update_internal_weight(&mut self, factor: f32) {
        self.internal_weight = self.weight.get() * factor;
    }

    /// Stop contributing without touching the authored weight.
    pub fn deactivate(&mut self) {
        self.internal_weight = 0.0;
    }

    /// Start a fresh play cycle; see [`play_with`](Self::play_with).
    pub fn play(&mut self) -> Tween {
        self.play_with(Tween::pending())
    }

    /// Start a fresh play cycle whose play tween is `play`.
    ///
    /// The finish tween resolves once `play` and any weight tween in flight have
    /// resolved.
    pub fn play_with(&mut self, play: Tween) -> Tween {
        self.paused = false;
        let weight = match self.tweens.get(WEIGHT) {
            Some(tween) if tween.is_pending() => tween.follow(),
            _ => Tween::resolved(),
        };
        let finish = Tween::all([play.clone(), weight]);
        if let Some(previous) = self.tweens.insert(PLAY, play) {
            previous.cancel();
        }
        if let Some(previous) = self.tweens.insert(FINISH, finish.clone()) {
            previous.cancel();
        }
        finish
    }

    pub fn pause(&mut self) -> bool {
        self.paused = true;
        true
    }

    /// Unpause, reusing the current play cycle when it is still pending.
    /// Returns `None` when a new cycle must be started instead.
    pub fn resume(&mut self) -> Option<Tween> {
        let finish = self.finish_tween();
        if self.play_tween().is_pending() && finish.is_pending() {
            self.paused = false;
            Some(finish)
        } else {
            None
        }
    }

    /// Pause and cancel every owned tween.
    pub fn cancel(&mut self) -> bool {
        self.paused = true;
        for tween in self.tweens.values() {
            tween.cancel();
        }
        true
    }

    /// Pause and resolve every owned tween.
    pub fn stop(&mut self) -> bool {
        self.paused = true;
        for tween in self.tweens.values() {
            tween.resolve();
        }
        true
    }

    /// Step owned tweens unless paused.
    pub fn update(&mut self, delta_ms: f32) {
        if self.paused {
            return;
        }
        let tweens: Vec<Tween> = self.tweens.values().cloned().collect();
        for tween in tweens {
            tween.execute(delta_ms);
        }
    }
}
