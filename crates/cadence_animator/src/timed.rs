//! Fixed-duration animations
//!
//! A small stock of concrete [`Animation`] types: scalar interpolation
//! over a fixed duration through an easing curve. Anything richer
//! (springs, keyframes, paths) lives with its consumer; the driver only
//! needs `advance` + `is_finished`.

use crate::animation::Animation;

/// Easing curve applied to normalized progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` through the curve. Cubic
    /// in/out shapes.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}

/// Interpolates between two values over a fixed duration in seconds.
///
/// A zero-duration animation is finished from the start, which makes
/// `start()` on its animator complete in the same call.
#[derive(Clone, Copy, Debug)]
pub struct TimedAnimation {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl TimedAnimation {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing: Easing::Linear,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Normalized progress through the duration, clamped to `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Current interpolated value.
    pub fn value(&self) -> f32 {
        let t = self.easing.apply(self.progress());
        self.from + (self.to - self.from) * t
    }
}

impl Animation for TimedAnimation {
    fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_is_finished_immediately() {
        let animation = TimedAnimation::new(0.0, 100.0, 0.0);
        assert!(animation.is_finished());
        assert_eq!(animation.progress(), 1.0);
        assert_eq!(animation.value(), 100.0);
    }

    #[test]
    fn progresses_linearly_and_finishes() {
        let mut animation = TimedAnimation::new(0.0, 100.0, 1.0);
        assert!(!animation.is_finished());
        assert_eq!(animation.value(), 0.0);

        animation.advance(0.5);
        assert!((animation.value() - 50.0).abs() < 1e-4);
        assert!(!animation.is_finished());

        animation.advance(0.5);
        assert!(animation.is_finished());
        assert_eq!(animation.value(), 100.0);
    }

    #[test]
    fn value_clamps_after_overshoot() {
        let mut animation = TimedAnimation::new(10.0, 20.0, 0.5);
        animation.advance(5.0);
        assert_eq!(animation.progress(), 1.0);
        assert_eq!(animation.value(), 20.0);
    }

    #[test]
    fn easing_curves_hit_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn ease_in_starts_slower_than_linear() {
        assert!(Easing::EaseIn.apply(0.25) < 0.25);
        assert!(Easing::EaseOut.apply(0.25) > 0.25);
    }

    #[test]
    fn eased_animation_interpolates_through_curve() {
        let mut animation = TimedAnimation::new(0.0, 1.0, 1.0).with_easing(Easing::EaseInOut);
        animation.advance(0.5);
        // Cubic in-out passes through the midpoint.
        assert!((animation.value() - 0.5).abs() < 1e-4);
    }
}
