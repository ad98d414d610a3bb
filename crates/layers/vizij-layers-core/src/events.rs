//! Lifecycle notifications emitted by the layer stack.
//!
//! The stack never talks to a global bus: hosts inject a [`Messenger`] when
//! building it. [`EventLog`] is a bounded collector for hosts that prefer to
//! drain events once per frame.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Discrete signals about layers and animations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum AnimationEvent {
    AddLayer {
        layer: String,
        index: usize,
    },
    RemoveLayer {
        layer: String,
    },
    RenameLayer {
        old_name: String,
        new_name: String,
    },
    AddAnimation {
        layer: String,
        animation: String,
    },
    RemoveAnimation {
        layer: String,
        animation: String,
    },
    RenameAnimation {
        layer: String,
        old_name: String,
        new_name: String,
    },
    PlayAnimation {
        layer: String,
        animation: String,
        transition_seconds: f32,
    },
    /// A queue moved to its next child.
    PlayNextAnimation {
        layer: String,
        animation: String,
        child: String,
        can_advance: bool,
        is_queue_end: bool,
    },
    PauseAnimation {
        layer: String,
        animation: String,
    },
    ResumeAnimation {
        layer: String,
        animation: String,
    },
    /// A playing animation was replaced or canceled before it finished.
    InterruptAnimation {
        layer: String,
        animation: String,
    },
    /// A playing animation finished or was stopped.
    StopAnimation {
        layer: String,
        animation: String,
    },
    /// Host defined payloads.
    Custom {
        kind: String,
        data: serde_json::Value,
    },
}

impl AnimationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddLayer { .. } => "add_layer",
            Self::RemoveLayer { .. } => "remove_layer",
            Self::RenameLayer { .. } => "rename_layer",
            Self::AddAnimation { .. } => "add_animation",
            Self::RemoveAnimation { .. } => "remove_animation",
            Self::RenameAnimation { .. } => "rename_animation",
            Self::PlayAnimation { .. } => "play_animation",
            Self::PlayNextAnimation { .. } => "play_next_animation",
            Self::PauseAnimation { .. } => "pause_animation",
            Self::ResumeAnimation { .. } => "resume_animation",
            Self::InterruptAnimation { .. } => "interrupt_animation",
            Self::StopAnimation { .. } => "stop_animation",
            Self::Custom { .. } => "custom",
        }
    }
}

/// Receiver of [`AnimationEvent`]s.
pub trait Messenger {
    fn emit(&self, event: AnimationEvent);
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMessenger;

impl Messenger for NullMessenger {
    #[inline]
    fn emit(&self, _event: AnimationEvent) {}
}

/// Bounded in-memory event queue.
#[derive(Debug)]
pub struct EventLog {
    events: RefCell<VecDeque<AnimationEvent>>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: RefCell::new(VecDeque::new()),
            capacity,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_events)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<AnimationEvent> {
        self.events.borrow_mut().drain(..).collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Messenger for EventLog {
    fn emit(&self, event: AnimationEvent) {
        if self.capacity == 0 {
            return;
        }
        let mut events = self.events.borrow_mut();
        if events.len() >= self.capacity {
            events.pop_front();
            log::warn!("Event log full, dropping oldest event");
        }
        events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remove(layer: &str) -> AnimationEvent {
        AnimationEvent::RemoveLayer {
            layer: layer.to_string(),
        }
    }

    #[test]
    fn log_drops_oldest_past_capacity() {
        let log = EventLog::new(2);
        log.emit(remove("a"));
        log.emit(remove("b"));
        log.emit(remove("c"));
        assert_eq!(log.drain(), vec![remove("b"), remove("c")]);
        assert!(log.is_empty());
    }

    #[test]
    fn events_serialize_with_a_type_tag() {
        let json = serde_json::to_value(remove("face")).unwrap();
        assert_eq!(json["type"], "remove_layer");
        assert_eq!(json["layer"], "face");
    }
}
