//! Leaf state: one playable clip driven through a [`ClipPlayer`].

use std::fmt;

use crate::clip::ClipPlayer;
use crate::interp::functions::saturate;
use crate::interp::{interpolate_property, EasingFn, InterpolateOptions, Property};
use crate::state::base::{StateCore, StateOptions};
use crate::tween::Tween;

const TIME_SCALE: &str = "time_scale";

pub struct SingleState {
    core: StateCore,
    clip: Box<dyn ClipPlayer>,
    time_scale: Property,
}

impl fmt::Debug for SingleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleState")
            .field("core", &self.core)
            .field("time_scale", &self.time_scale.get())
            .field("normalized_time", &self.clip.normalized_time())
            .finish()
    }
}

impl SingleState {
    pub fn new(name: &str, clip: impl ClipPlayer + 'static, options: StateOptions) -> Self {
        let time_scale = Property::new(TIME_SCALE, clip.time_scale());
        Self {
            core: StateCore::new(name, &options),
            clip: Box::new(clip),
            time_scale,
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

    pub fn clip(&self) -> &dyn ClipPlayer {
        self.clip.as_ref()
    }

    pub fn clip_mut(&mut self) -> &mut dyn ClipPlayer {
        self.clip.as_mut()
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale.get()
    }

    pub fn time_scale_pending(&self) -> bool {
        self.core.tween(TIME_SCALE).is_some_and(Tween::is_pending)
    }

    /// Animate the playback speed, canceling any time scale tween in flight.
    pub fn set_time_scale(&mut self, time_scale: f32, seconds: f32, easing: EasingFn) -> Tween {
        let tween = interpolate_property(
            &self.time_scale,
            time_scale,
            InterpolateOptions::over(seconds, easing),
        );
        self.clip.set_time_scale(self.time_scale.get());
        self.core.replace_tween(TIME_SCALE, tween.clone());
        tween
    }

    #[inline]
    pub fn loop_count(&self) -> Option<u32> {
        self.clip.loop_count()
    }

    pub fn set_loop_count(&mut self, count: Option<u32>) {
        self.clip.set_loop_count(count);
    }

    #[inline]
    pub fn normalized_time(&self) -> f32 {
        self.clip.normalized_time()
    }

    pub fn set_normalized_time(&mut self, time: f32) {
        self.clip.set_normalized_time(saturate(time));
    }

    pub fn play(&mut self) -> Tween {
        let finish = self.core.play();
        let play = self.core.play_tween();
        self.clip.set_finished_callback(Some(Box::new(move || {
            play.resolve();
        })));
        self.clip.set_time_scale(self.time_scale.get());
        self.clip.play();
        finish
    }

    pub fn pause(&mut self) -> bool {
        self.core.pause();
        self.clip.pause();
        true
    }

    pub fn resume(&mut self) -> Tween {
        match self.core.resume() {
            Some(finish) => {
                self.clip.resume();
                finish
            }
            None => self.play(),
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.core.cancel();
        self.clip.pause();
        true
    }

    pub fn stop(&mut self) -> bool {
        self.core.stop();
        self.clip.stop();
        true
    }

    pub fn discard(&mut self) {
        self.cancel();
        self.clip.set_finished_callback(None);
        self.clip.set_weight(0.0);
    }

    pub fn deactivate(&mut self) {
        self.core.deactivate();
        self.clip.set_weight(0.0);
    }

    pub fn update_internal_weight(&mut self, factor: f32) {
        self.core.update_internal_weight(factor);
        self.clip.set_weight(self.core.internal_weight());
    }

    pub fn update(&mut self, delta_ms: f32) {
        self.core.update(delta_ms);
        self.clip.set_time_scale(self.time_scale.get());
        self.clip.update(delta_ms);
    }
}
