//! Easing curves and tweens
//!
//! Closed-form easing functions over normalized time, plus a pooled `Tween`
//! that drives a single value through one of them.

use std::f32::consts::PI;

use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::pool::Poolable;

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f32 = (2.0 * PI) / 4.5;

/// Easing curve selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    BackIn,
    BackOut,
    BackInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl Easing {
    /// Every curve, in declaration order
    pub const ALL: [Easing; 25] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::ElasticInOut,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::BounceInOut,
    ];

    /// Evaluate the curve at `t` (clamped to 0..=1)
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => power_out(t, 2),
            Easing::QuadInOut => power_in_out(t, 2),
            Easing::CubicIn => t.powi(3),
            Easing::CubicOut => power_out(t, 3),
            Easing::CubicInOut => power_in_out(t, 3),
            Easing::QuartIn => t.powi(4),
            Easing::QuartOut => power_out(t, 4),
            Easing::QuartInOut => power_in_out(t, 4),
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * t - 10.0)
                }
            }
            Easing::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::ExpoInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Easing::BackIn => BACK_C3 * t.powi(3) - BACK_C1 * t * t,
            Easing::BackOut => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u.powi(3) + BACK_C1 * u * u
            }
            Easing::BackInOut => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    let u = 2.0 * t - 2.0;
                    (u * u * ((BACK_C2 + 1.0) * u + BACK_C2) + 2.0) / 2.0
                }
            }
            Easing::ElasticIn => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    -2f32.powf(10.0 * t - 10.0) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
                }
            }
            Easing::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            Easing::ElasticInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    -(2f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin()) / 2.0
                } else {
                    (2f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin()) / 2.0
                        + 1.0
                }
            }
            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
            Easing::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

fn power_out(t: f32, power: i32) -> f32 {
    1.0 - (1.0 - t).powi(power)
}

fn power_in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Interpolate between two points with an eased factor
pub fn lerp_vec2(from: Vec2, to: Vec2, t: f32, easing: Easing) -> Vec2 {
    from + (to - from) * easing.apply(t)
}

/// Arguments for (re)initializing a [`Tween`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenArgs {
    pub from: f32,
    pub to: f32,
    /// Seconds from start to end (after the delay)
    pub duration: f32,
    /// Seconds to hold `from` before moving
    pub delay: f32,
    pub easing: Easing,
}

impl TweenArgs {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            delay: 0.0,
            easing,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

/// A single animated value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    delay: f32,
    easing: Easing,
    /// Seconds advanced so far, including the delay
    elapsed: f32,
    value: f32,
    finished: bool,
}

impl Tween {
    /// Advance by `dt` seconds and return the new value
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.finished {
            return self.value;
        }
        self.elapsed += dt.max(0.0);

        let local = (self.elapsed - self.delay).max(0.0);
        let progress = if self.duration <= 0.0 {
            if self.elapsed >= self.delay { 1.0 } else { 0.0 }
        } else {
            (local / self.duration).min(1.0)
        };

        self.value = self.from + (self.to - self.from) * self.easing.apply(progress);
        if self.elapsed >= self.delay + self.duration.max(0.0) {
            self.value = self.to;
            self.finished = true;
        }
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Normalized progress in 0..=1 (0 while delayed)
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.finished { 1.0 } else { 0.0 };
        }
        ((self.elapsed - self.delay).max(0.0) / self.duration).min(1.0)
    }
}

impl Poolable for Tween {
    type Args = TweenArgs;

    fn reuse(&mut self, args: TweenArgs) {
        self.from = args.from;
        self.to = args.to;
        self.duration = args.duration;
        self.delay = args.delay;
        self.easing = args.easing;
        self.elapsed = 0.0;
        self.value = args.from;
        self.finished = false;
    }

    fn clear_data(&mut self) {
        self.from = 0.0;
        self.to = 0.0;
        self.duration = 0.0;
        self.delay = 0.0;
        self.easing = Easing::Linear;
        self.elapsed = 0.0;
        self.value = 0.0;
        self.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_endpoints() {
        for easing in Easing::ALL {
            assert!(easing.apply(0.0).abs() < EPS, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < EPS, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Easing::QuadIn.apply(-2.0), 0.0);
        assert_eq!(Easing::QuadIn.apply(3.0), 1.0);
    }

    #[test]
    fn test_in_out_midpoints() {
        assert!((Easing::QuadInOut.apply(0.5) - 0.5).abs() < EPS);
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < EPS);
        assert!((Easing::SineInOut.apply(0.5) - 0.5).abs() < EPS);
        assert!((Easing::QuadIn.apply(0.5) - 0.25).abs() < EPS);
        assert!((Easing::QuadOut.apply(0.5) - 0.75).abs() < EPS);
    }

    #[test]
    fn test_back_overshoots() {
        assert!(Easing::BackIn.apply(0.2) < 0.0);
        assert!(Easing::BackOut.apply(0.8) > 1.0);
    }

    #[test]
    fn test_lerp_vec2() {
        let p = lerp_vec2(Vec2::new(0.0, 0.0), Vec2::new(10.0, 20.0), 0.5, Easing::Linear);
        assert!((p.x - 5.0).abs() < EPS);
        assert!((p.y - 10.0).abs() < EPS);
    }

    #[test]
    fn test_tween_runs_to_end() {
        let mut tween = Tween::create(TweenArgs::new(0.0, 100.0, 1.0, Easing::Linear));
        assert_eq!(tween.value(), 0.0);

        assert!((tween.advance(0.25) - 25.0).abs() < EPS);
        assert!(!tween.is_finished());
        tween.advance(1.0);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 100.0);
        assert_eq!(tween.advance(1.0), 100.0);
    }

    #[test]
    fn test_tween_delay_holds_start() {
        let mut tween =
            Tween::create(TweenArgs::new(10.0, 20.0, 1.0, Easing::Linear).with_delay(0.5));
        assert_eq!(tween.advance(0.4), 10.0);
        assert_eq!(tween.progress(), 0.0);
        assert!((tween.advance(0.6) - 15.0).abs() < EPS);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut tween = Tween::create(TweenArgs::new(1.0, 2.0, 0.0, Easing::QuadIn));
        assert_eq!(tween.advance(0.0), 2.0);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_reuse_after_clear_matches_fresh() {
        let args = TweenArgs::new(3.0, 9.0, 2.0, Easing::BounceOut);
        let mut tween = Tween::create(TweenArgs::new(0.0, 1.0, 1.0, Easing::Linear));
        tween.advance(0.7);
        tween.reuse(args);
        tween.clear_data();
        tween.reuse(args);

        assert_eq!(tween, Tween::create(args));
    }
}
