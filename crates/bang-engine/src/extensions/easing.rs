// extensions/easing.rs
//
// Easing curves for fade interpolation.
// Every curve maps [0, 1] onto [0, 1] monotonically, so an eased fade can
// never overshoot its endpoints. Overshooting or bouncing curves are left out.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant rate (no easing).
    #[default]
    Linear,
    /// Slow start.
    QuadIn,
    /// Slow end.
    QuadOut,
    /// Slow start and end.
    QuadInOut,
    /// Stronger slow start.
    CubicIn,
    /// Stronger slow end.
    CubicOut,
    /// Stronger slow start and end.
    CubicInOut,
    SineIn,
    SineOut,
    SineInOut,
    /// Exponential easing (dramatic).
    ExpoIn,
    ExpoOut,
    ExpoInOut,
}

impl Easing {
    /// Apply the easing function to a normalized time value `t`, clamped to [0, 1].
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,

            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }

            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,

            Easing::ExpoIn => {
                if t == 0.0 { 0.0 } else { 2.0_f64.powf(10.0 * t - 10.0) }
            }
            Easing::ExpoOut => {
                if t == 1.0 { 1.0 } else { 1.0 - 2.0_f64.powf(-10.0 * t) }
            }
            Easing::ExpoInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
        }
    }
}

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease(a: f64, b: f64, t: f64, easing: Easing) -> f64 {
    lerp(a, b, easing.apply(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 13] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
    ];

    #[test]
    fn linear_endpoints() {
        assert_eq!(Easing::Linear.apply(0.0), 0.0);
        assert_eq!(Easing::Linear.apply(1.0), 1.0);
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
    }

    #[test]
    fn every_curve_is_monotonic_and_bounded() {
        for easing in ALL {
            let mut prev = easing.apply(0.0);
            assert!(prev.abs() < 1e-3, "{:?} starts at {}", easing, prev);
            for i in 1..=200 {
                let v = easing.apply(i as f64 / 200.0);
                assert!(v + 1e-12 >= prev, "{:?} decreased at step {}", easing, i);
                assert!((0.0..=1.0).contains(&v), "{:?} left [0, 1]: {}", easing, v);
                prev = v;
            }
            assert!((prev - 1.0).abs() < 1e-9, "{:?} ends at {}", easing, prev);
        }
    }

    #[test]
    fn quad_out_faster_start() {
        let mid = Easing::QuadOut.apply(0.5);
        assert!(mid > 0.5, "QuadOut at 0.5 should be > 0.5, got {}", mid);
    }

    #[test]
    fn ease_interpolates() {
        let result = ease(100.0, 200.0, 0.5, Easing::Linear);
        assert!((result - 150.0).abs() < 1e-9);
    }

    #[test]
    fn parses_snake_case() {
        let e: Easing = serde_json::from_str("\"quad_in_out\"").unwrap();
        assert_eq!(e, Easing::QuadInOut);
    }
}
