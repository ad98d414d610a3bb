//! Vizij Layers Core (engine-agnostic)
//!
//! A layered animation blend graph driven by a cooperative tween scheduler.
//! Hosts build a [`LayerStack`], fill its layers with states (single clips,
//! free blends, 2D blend trees and queues), and call [`LayerStack::update`]
//! once per frame with the elapsed milliseconds. Clip playback itself is
//! delegated to a [`ClipPlayer`] per leaf; [`TimedClip`] keeps time for hosts
//! that sample clips on their own.

pub mod clip;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod interp;
pub mod layer;
pub mod names;
pub mod stack;
pub mod state;
pub mod tween;

// Re-exports for hosts
pub use clip::{ClipPlayer, FinishedCallback, TimedClip};
pub use config::Config;
pub use error::{AnimationError, EntityKind};
pub use events::{AnimationEvent, EventLog, Messenger, NullMessenger};
pub use interp::{interpolate_property, Easing, EasingFn, InterpolateOptions, Property};
pub use layer::{BlendMode, Layer, LayerOptions};
pub use stack::LayerStack;
pub use state::{
    Blend2dState, BlendAxis, FreeBlendState, QueueAdvance, QueueState, SharedState,
    SingleState, State, StateContainer, StateCore, StateOptions, TransitionState,
};
pub use tween::{Step, Tween, TweenStatus};

pub type Result<T> = core::result::Result<T, AnimationError>;
