//! Easing curves mapping linear progress in [0, 1] to eased progress.
//!
//! Presets follow the usual Penner family (in / out / in-out). Every preset maps
//! 0 to 0 and 1 to 1; `Back` and `Elastic` overshoot in between.

use std::f32::consts::PI;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

const BACK_OVERSHOOT: f32 = 1.70158;
const BACK_OVERSHOOT_IN_OUT: f32 = BACK_OVERSHOOT * 1.525;

/// Built-in easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuarticIn,
    QuarticOut,
    QuarticInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    SinusoidalIn,
    SinusoidalOut,
    SinusoidalInOut,
    ExponentialIn,
    ExponentialOut,
    ExponentialInOut,
    CircularIn,
    CircularOut,
    CircularInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl Easing {
    pub fn apply(self, k: f32) -> f32 {
        match self {
            Self::Linear => k,

            Self::QuadraticIn => k * k,
            Self::QuadraticOut => k * (2.0 - k),
            Self::QuadraticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k
                } else {
                    let k = k - 1.0;
                    -0.5 * (k * (k - 2.0) - 1.0)
                }
            }

            Self::CubicIn => k * k * k,
            Self::CubicOut => {
                let k = k - 1.0;
                k * k * k + 1.0
            }
            Self::CubicInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k * k
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * k + 2.0)
                }
            }

            Self::QuarticIn => k.powi(4),
            Self::QuarticOut => 1.0 - (k - 1.0).powi(4),
            Self::QuarticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k.powi(4)
                } else {
                    -0.5 * ((k - 2.0).powi(4) - 2.0)
                }
            }

            Self::QuinticIn => k.powi(5),
            Self::QuinticOut => (k - 1.0).powi(5) + 1.0,
            Self::QuinticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k.powi(5)
                } else {
                    0.5 * ((k - 2.0).powi(5) + 2.0)
                }
            }

            Self::SinusoidalIn => 1.0 - (k * PI / 2.0).cos(),
            Self::SinusoidalOut => (k * PI / 2.0).sin(),
            Self::SinusoidalInOut => 0.5 * (1.0 - (PI * k).cos()),

            Self::ExponentialIn => {
                if k == 0.0 {
                    0.0
                } else {
                    1024f32.powf(k - 1.0)
                }
            }
            Self::ExponentialOut => {
                if k == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * k)
                }
            }
            Self::ExponentialInOut => {
                if k == 0.0 {
                    return 0.0;
                }
                if k == 1.0 {
                    return 1.0;
                }
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * 1024f32.powf(k - 1.0)
                } else {
                    0.5 * (-(2f32.powf(-10.0 * (k - 1.0))) + 2.0)
                }
            }

            Self::CircularIn => 1.0 - (1.0 - k * k).max(0.0).sqrt(),
            Self::CircularOut => {
                let k = k - 1.0;
                (1.0 - k * k).max(0.0).sqrt()
            }
            Self::CircularInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    -0.5 * ((1.0 - k * k).max(0.0).sqrt() - 1.0)
                } else {
                    let k = k - 2.0;
                    0.5 * ((1.0 - k * k).max(0.0).sqrt() + 1.0)
                }
            }

            Self::ElasticIn => {
                if k == 0.0 || k == 1.0 {
                    return k;
                }
                -(2f32.powf(10.0 * (k - 1.0))) * ((k - 1.1) * 5.0 * PI).sin()
            }
            Self::ElasticOut => {
                if k == 0.0 || k == 1.0 {
                    return k;
                }
                2f32.powf(-10.0 * k) * ((k - 0.1) * 5.0 * PI).sin() + 1.0
            }
            Self::ElasticInOut => {
                if k == 0.0 || k == 1.0 {
                    return k;
                }
                let k = k * 2.0;
                if k < 1.0 {
                    -0.5 * 2f32.powf(10.0 * (k - 1.0)) * ((k - 1.1) * 5.0 * PI).sin()
                } else {
                    0.5 * 2f32.powf(-10.0 * (k - 1.0)) * ((k - 1.1) * 5.0 * PI).sin() + 1.0
                }
            }

            Self::BackIn => {
                let s = BACK_OVERSHOOT;
                k * k * ((s + 1.0) * k - s)
            }
            Self::BackOut => {
                let s = BACK_OVERSHOOT;
                let k = k - 1.0;
                k * k * ((s + 1.0) * k + s) + 1.0
            }
            Self::BackInOut => {
                let s = BACK_OVERSHOOT_IN_OUT;
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * (k * k * ((s + 1.0) * k - s))
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * ((s + 1.0) * k + s) + 2.0)
                }
            }

            Self::BounceIn => 1.0 - bounce_out(1.0 - k),
            Self::BounceOut => bounce_out(k),
            Self::BounceInOut => {
                if k < 0.5 {
                    (1.0 - bounce_out(1.0 - k * 2.0)) * 0.5
                } else {
                    bounce_out(k * 2.0 - 1.0) * 0.5 + 0.5
                }
            }
        }
    }
}

fn bounce_out(k: f32) -> f32 {
    if k < 1.0 / 2.75 {
        7.5625 * k * k
    } else if k < 2.0 / 2.75 {
        let k = k - 1.5 / 2.75;
        7.5625 * k * k + 0.75
    } else if k < 2.5 / 2.75 {
        let k = k - 2.25 / 2.75;
        7.5625 * k * k + 0.9375
    } else {
        let k = k - 2.625 / 2.75;
        7.5625 * k * k + 0.984375
    }
}

/// Easing used by a tween: a preset or a caller supplied curve.
#[derive(Clone)]
pub enum EasingFn {
    Preset(Easing),
    Custom(Rc<dyn Fn(f32) -> f32>),
}

impl EasingFn {
    pub fn custom(f: impl Fn(f32) -> f32 + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }

    #[inline]
    pub fn apply(&self, k: f32) -> f32 {
        match self {
            Self::Preset(easing) => easing.apply(k),
            Self::Custom(f) => f(k),
        }
    }
}

impl Default for EasingFn {
    fn default() -> Self {
        Self::Preset(Easing::Linear)
    }
}

impl From<Easing> for EasingFn {
    fn from(easing: Easing) -> Self {
        Self::Preset(easing)
    }
}

impl fmt::Debug for EasingFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(easing) => f.debug_tuple("Preset").field(easing).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
