//! Interpolation: easing curves, numeric helpers and the property tween builder.

pub mod easing;
pub mod functions;
pub mod property;

pub use easing::{Easing, EasingFn};
pub use property::{interpolate_property, InterpolateOptions, Property};
