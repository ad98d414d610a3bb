//! Animatable numeric properties and the tween that drives them toward a target.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::AnimationError;
use crate::interp::easing::EasingFn;
use crate::interp::functions::{clamp_f32, lerp_f32};
use crate::tween::{Step, Tween};

/// A named `f32` shared between its owner and the tweens animating it.
///
/// Values written through [`Property::set`] are clamped to the optional range.
#[derive(Clone)]
pub struct Property {
    name: Rc<str>,
    value: Rc<Cell<f32>>,
    range: Option<(f32, f32)>,
}

impl Property {
    pub fn new(name: &str, value: f32) -> Self {
        Self {
            name: Rc::from(name),
            value: Rc::new(Cell::new(value)),
            range: None,
        }
    }

    /// Property whose writes are clamped into `[min, max]`.
    pub fn clamped(name: &str, value: f32, min: f32, max: f32) -> Self {
        let property = Self {
            name: Rc::from(name),
            value: Rc::new(Cell::new(value)),
            range: Some((min, max)),
        };
        property.set(value);
        property
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.get()
    }

    #[inline]
    pub fn range(&self) -> Option<(f32, f32)> {
        self.range
    }

    /// Write a value, clamping it if the property has a range.
    #[inline]
    pub fn set(&self, value: f32) {
        let value = match self.range {
            Some((min, max)) if value.is_finite() => clamp_f32(value, min, max),
            _ => value,
        };
        self.value.set(value);
    }

    /// Clamp `value` the way [`set`](Self::set) would.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        match self.range {
            Some((min, max)) => clamp_f32(value, min, max),
            None => value,
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &&*self.name)
            .field("value", &self.value.get())
            .finish()
    }
}

type Callback = Box<dyn FnOnce()>;

/// Options for [`interpolate_property`].
pub struct InterpolateOptions {
    /// Duration in seconds; values `<= 0` apply the target immediately.
    pub seconds: f32,
    pub easing: EasingFn,
    pub on_finish: Option<Callback>,
    pub on_progress: Option<Box<dyn FnMut(f32)>>,
    pub on_cancel: Option<Callback>,
    pub on_error: Option<Box<dyn FnOnce(&AnimationError)>>,
}

impl Default for InterpolateOptions {
    fn default() -> Self {
        Self {
            seconds: 0.0,
            easing: EasingFn::default(),
            on_finish: None,
            on_progress: None,
            on_cancel: None,
            on_error: None,
        }
    }
}

impl InterpolateOptions {
    pub fn over(seconds: f32, easing: impl Into<EasingFn>) -> Self {
        Self {
            seconds,
            easing: easing.into(),
            ..Self::default()
        }
    }

    pub fn on_finish(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    pub fn on_progress(mut self, callback: impl FnMut(f32) + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn on_cancel(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(&AnimationError) + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

/// Animate `property` toward `target`.
///
/// The returned tween accumulates the delta time passed to `execute`, eases the
/// clamped linear progress and writes `lerp(start, target, eased)` into the
/// property. It resolves the first time linear progress reaches 1 and lands
/// exactly on `target`. Negative deltas rewind, but never past the start.
///
/// Non-finite values (or a non-finite easing result) reject the tween with
/// [`AnimationError::Validation`], also reported through `on_error`.
pub fn interpolate_property(
    property: &Property,
    target: f32,
    options: InterpolateOptions,
) -> Tween {
    let InterpolateOptions {
        seconds,
        easing,
        on_finish,
        mut on_progress,
        on_cancel,
        on_error,
    } = options;

    let start = property.get();
    let invalid = if !start.is_finite() {
        Some(format!(
            "property {:?} has non-numeric value {start}",
            property.name()
        ))
    } else if !target.is_finite() {
        Some(format!(
            "cannot interpolate property {:?} to non-numeric target {target}",
            property.name()
        ))
    } else if seconds.is_nan() || seconds == f32::INFINITY {
        Some(format!(
            "cannot interpolate property {:?} over {seconds} seconds",
            property.name()
        ))
    } else {
        None
    };
    if let Some(reason) = invalid {
        let err = AnimationError::validation(reason);
        log::warn!("{err}");
        if let Some(cb) = on_error {
            cb(&err);
        }
        return Tween::rejected(err);
    }

    let target = property.clamp(target);
    let tween = if seconds <= 0.0 || start == target {
        property.set(target);
        Tween::resolved()
    } else {
        let total_ms = seconds * 1000.0;
        let mut elapsed = 0.0f32;
        let property = property.clone();
        Tween::new(move |delta_ms| {
            elapsed = (elapsed + delta_ms).max(0.0);
            let linear = (elapsed / total_ms).clamp(0.0, 1.0);
            let eased = easing.apply(linear);
            if !eased.is_finite() {
                return Step::Reject(AnimationError::validation(format!(
                    "easing for property {:?} returned {eased} at {linear}",
                    property.name()
                )));
            }

            if linear >= 1.0 {
                property.set(target);
            } else {
                property.set(lerp_f32(start, target, eased));
            }
            if let Some(cb) = on_progress.as_mut() {
                cb(property.get());
            }

            if linear >= 1.0 {
                Step::Resolve
            } else {
                Step::Pending
            }
        })
    };

    if let Some(cb) = on_finish {
        tween.on_resolve(cb);
    }
    if let Some(cb) = on_cancel {
        tween.on_cancel(cb);
    }
    if let Some(cb) = on_error {
        tween.on_reject(cb);
    }
    tween
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::easing::Easing;

    #[test]
    fn clamped_property_limits_writes() {
        let weight = Property::clamped("weight", 3.0, 0.0, 1.0);
        assert_eq!(weight.get(), 1.0);
        weight.set(-2.0);
        assert_eq!(weight.get(), 0.0);
    }

    #[test]
    fn eased_progress_is_applied() {
        let value = Property::new("value", 0.0);
        let tween = interpolate_property(
            &value,
            10.0,
            InterpolateOptions::over(1.0, Easing::QuadraticIn),
        );
        tween.execute(500.0);
        assert!((value.get() - 2.5).abs() < 1e-5);
        tween.execute(500.0);
        assert_eq!(value.get(), 10.0);
        assert!(tween.is_completed());
    }

    #[test]
    fn non_finite_easing_rejects() {
        let value = Property::new("value", 0.0);
        let tween = interpolate_property(
            &value,
            1.0,
            InterpolateOptions::over(1.0, EasingFn::custom(|_| f32::NAN)),
        );
        tween.execute(100.0);
        assert!(tween.is_rejected());
        assert_eq!(value.get(), 0.0);
    }
}
