//! Clip player seam between leaf states and the rendering engine.
//!
//! A [`ClipPlayer`] advances the actual joint poses; this crate only tells it
//! when to play, how fast, how many loops and with which effective weight.
//! [`TimedClip`] is an engine-agnostic implementation that just keeps time, which
//! is enough for hosts that sample clips themselves and for tests.

use std::fmt;

/// Invoked by the clip player when playback completes on its own.
pub type FinishedCallback = Box<dyn FnMut()>;

pub trait ClipPlayer {
    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);

    /// Playback position in [0, 1].
    fn normalized_time(&self) -> f32;
    fn set_normalized_time(&mut self, time: f32);

    fn time_scale(&self) -> f32;
    fn set_time_scale(&mut self, time_scale: f32);

    /// `None` loops forever.
    fn loop_count(&self) -> Option<u32>;
    fn set_loop_count(&mut self, count: Option<u32>);

    /// Effective weight after layer and blend composition.
    fn set_weight(&mut self, _weight: f32) {}

    fn set_finished_callback(&mut self, callback: Option<FinishedCallback>);

    /// Advance by `delta_ms`. Engines that tick their own mixer leave this empty.
    fn update(&mut self, _delta_ms: f32) {}
}

/// Clip player that only tracks time against a fixed duration.
pub struct TimedClip {
    duration_ms: f32,
    time_ms: f32,
    time_scale: f32,
    loop_count: Option<u32>,
    loops_done: u32,
    weight: f32,
    playing: bool,
    paused: bool,
    on_finished: Option<FinishedCallback>,
}

impl TimedClip {
    /// Clip lasting `duration_seconds` that plays once.
    pub fn new(duration_seconds: f32) -> Self {
        Self {
            duration_ms: (duration_seconds * 1000.0).max(0.0),
            time_ms: 0.0,
            time_scale: 1.0,
            loop_count: Some(1),
            loops_done: 0,
            weight: 0.0,
            playing: false,
            paused: false,
            on_finished: None,
        }
    }

    pub fn looping(duration_seconds: f32) -> Self {
        Self {
            loop_count: None,
            ..Self::new(duration_seconds)
        }
    }

    pub fn with_loop_count(mut self, count: Option<u32>) -> Self {
        self.loop_count = count;
        self
    }

    #[inline]
    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing && !self.paused
    }

    fn finish(&mut self) {
        self.playing = false;
        if let Some(cb) = self.on_finished.as_mut() {
            cb();
        }
    }
}

impl fmt::Debug for TimedClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedClip")
            .field("duration_ms", &self.duration_ms)
            .field("time_ms", &self.time_ms)
            .field("time_scale", &self.time_scale)
            .field("loop_count", &self.loop_count)
            .field("playing", &self.playing)
            .field("paused", &self.paused)
            .finish()
    }
}

impl ClipPlayer for TimedClip {
    fn play(&mut self) {
        self.time_ms = if self.time_scale < 0.0 {
            self.duration_ms
        } else {
            0.0
        };
        self.loops_done = 0;
        self.playing = true;
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.paused = false;
        self.time_ms = 0.0;
    }

    fn normalized_time(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        (self.time_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    fn set_normalized_time(&mut self, time: f32) {
        self.time_ms = time.clamp(0.0, 1.0) * self.duration_ms;
    }

    fn time_scale(&self) -> f32 {
        self.time_scale
    }

    fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    fn loop_count(&self) -> Option<u32> {
        self.loop_count
    }

    fn set_loop_count(&mut self, count: Option<u32>) {
        self.loop_count = count;
    }

    fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    fn set_finished_callback(&mut self, callback: Option<FinishedCallback>) {
        self.on_finished = callback;
    }

    fn update(&mut self, delta_ms: f32) {
        if !self.playing || self.paused {
            return;
        }
        if self.duration_ms <= 0.0 {
            self.finish();
            return;
        }

        self.time_ms += delta_ms * self.time_scale;
        if !self.time_ms.is_finite() {
            self.time_ms = if self.time_ms > 0.0 { self.duration_ms } else { 0.0 };
        }
        if (0.0..self.duration_ms).contains(&self.time_ms) {
            return;
        }

        // Periods crossed this tick: 1 for each boundary passed forward, and
        // at least 1 when running backwards past the start.
        let periods = (self.time_ms / self.duration_ms).floor().abs().max(1.0);
        // Float to int casts saturate.
        let crossed = periods as u32;
        self.loops_done = self.loops_done.saturating_add(crossed);
        if self.loop_count.is_some_and(|count| self.loops_done >= count) {
            self.time_ms = self.time_ms.clamp(0.0, self.duration_ms);
            self.finish();
        } else {
            self.time_ms = self.time_ms.rem_euclid(self.duration_ms);
        }
    }
}
