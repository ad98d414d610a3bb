//! Stack-wide defaults.

use serde::{Deserialize, Serialize};

use crate::interp::Easing;

/// Defaults applied by [`LayerStack`](crate::LayerStack) when a call does not
/// specify its own values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cross-fade time used by `play_animation` when none is given.
    pub transition_seconds: f32,
    /// Easing used by weight and blend tweens when none is given.
    pub easing: Easing,
    /// Capacity of an [`EventLog`](crate::EventLog) built with
    /// [`EventLog::from_config`](crate::EventLog::from_config). Oldest events are
    /// dropped past this bound.
    pub max_events: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transition_seconds: 0.0,
            easing: Easing::Linear,
            max_events: 1024,
        }
    }
}
