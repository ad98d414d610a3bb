//! States of the blend graph.
//!
//! The graph is a closed set of variants dispatched through [`State`]:
//! a single clip, a free blend, a 2D blend tree, a transition and a queue.
//! Children are held as [`SharedState`] so a layer's transition can reference
//! states that the layer owns.

pub mod base;
pub mod blend2d;
pub mod container;
pub mod free_blend;
pub mod queue;
pub mod single;
pub mod transition;

use std::cell::RefCell;
use std::rc::Rc;

use crate::interp::EasingFn;
use crate::tween::Tween;

pub use base::{StateCore, StateOptions};
pub use blend2d::{Blend2dState, BlendAxis};
pub use container::StateContainer;
pub use free_blend::FreeBlendState;
pub use queue::{QueueAdvance, QueueState};
pub use single::SingleState;
pub use transition::TransitionState;

pub type SharedState = Rc<RefCell<State>>;

#[derive(Debug)]
pub enum State {
    Single(SingleState),
    FreeBlend(FreeBlendState),
    Blend2d(Blend2dState),
    Transition(TransitionState),
    Queue(QueueState),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            State::Single($s) => $body,
            State::FreeBlend($s) => $body,
            State::Blend2d($s) => $body,
            State::Transition($s) => $body,
            State::Queue($s) => $body,
        }
    };
}

impl State {
    pub fn into_shared(self) -> SharedState {
        Rc::new(RefCell::new(self))
    }

    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::FreeBlend(_) => "free_blend",
            Self::Blend2d(_) => "blend_2d",
            Self::Transition(_) => "transition",
            Self::Queue(_) => "queue",
        }
    }

    pub fn core(&self) -> &StateCore {
        dispatch!(self, s => s.core())
    }

    fn core_mut(&mut self) -> &mut StateCore {
        dispatch!(self, s => s.core_mut())
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.core().name()
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.core_mut().set_name(name);
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.core().weight()
    }

    #[inline]
    pub fn internal_weight(&self) -> f32 {
        self.core().internal_weight()
    }

    #[inline]
    pub fn weight_pending(&self) -> bool {
        self.core().weight_pending()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.core().is_paused()
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.core().is_playing()
    }

    /// Finish tween of the current play cycle.
    pub fn finish_tween(&self) -> Tween {
        self.core().finish_tween()
    }

    pub fn set_weight(&mut self, weight: f32, seconds: f32, easing: EasingFn) -> Tween {
        self.core_mut().set_weight(weight, seconds, easing)
    }

    /// Playback position in [0, 1]; only clips have one.
    pub fn normalized_time(&self) -> Option<f32> {
        match self {
            Self::Single(s) => Some(s.normalized_time()),
            Self::Transition(t) => Some(t.progress()),
            _ => None,
        }
    }

    /// Seek a clip. Ignored by other variants.
    pub fn set_normalized_time(&mut self, time: f32) {
        if let Self::Single(s) = self {
            s.set_normalized_time(time);
        }
    }

    pub fn play(&mut self) -> Tween {
        dispatch!(self, s => s.play())
    }

    pub fn pause(&mut self) -> bool {
        dispatch!(self, s => s.pause())
    }

    pub fn resume(&mut self) -> Tween {
        dispatch!(self, s => s.resume())
    }

    pub fn cancel(&mut self) -> bool {
        dispatch!(self, s => s.cancel())
    }

    pub fn stop(&mut self) -> bool {
        dispatch!(self, s => s.stop())
    }

    pub fn discard(&mut self) {
        dispatch!(self, s => s.discard())
    }

    pub fn deactivate(&mut self) {
        dispatch!(self, s => s.deactivate())
    }

    pub fn update_internal_weight(&mut self, factor: f32) {
        dispatch!(self, s => s.update_internal_weight(factor))
    }

    pub fn update(&mut self, delta_ms: f32) {
        dispatch!(self, s => s.update(delta_ms))
    }

    pub fn as_single(&self) -> Option<&SingleState> {
        match self {
            Self::Single(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_single_mut(&mut self) -> Option<&mut SingleState> {
        match self {
            Self::Single(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_free_blend_mut(&mut self) -> Option<&mut FreeBlendState> {
        match self {
            Self::FreeBlend(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_free_blend(&self) -> Option<&FreeBlendState> {
        match self {
            Self::FreeBlend(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blend2d(&self) -> Option<&Blend2dState> {
        match self {
            Self::Blend2d(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blend2d_mut(&mut self) -> Option<&mut Blend2dState> {
        match self {
            Self::Blend2d(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_transition(&self) -> Option<&TransitionState> {
        match self {
            Self::Transition(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_transition_mut(&mut self) -> Option<&mut TransitionState> {
        match self {
            Self::Transition(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_queue(&self) -> Option<&QueueState> {
        match self {
            Self::Queue(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_queue_mut(&mut self) -> Option<&mut QueueState> {
        match self {
            Self::Queue(s) => Some(s),
            _ => None,
        }
    }
}

impl From<SingleState> for State {
    fn from(state: SingleState) -> Self {
        Self::Single(state)
    }
}

impl From<FreeBlendState> for State {
    fn from(state: FreeBlendState) -> Self {
        Self::FreeBlend(state)
    }
}

impl From<Blend2dState> for State {
    fn from(state: Blend2dState) -> Self {
        Self::Blend2d(state)
    }
}

impl From<TransitionState> for State {
    fn from(state: TransitionState) -> Self {
        Self::Transition(state)
    }
}

impl From<QueueState> for State {
    fn from(state: QueueState) -> Self {
        Self::Queue(state)
    }
}
