//! Easing functions for animations

use serde::{Deserialize, Serialize};

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Constant speed ("ease none")
    #[default]
    Linear,
    /// Slow start, fast finish (falling back toward rest)
    EaseInCubic,
    /// Fast start, slow finish (rising toward a turning point)
    EaseOutCubic,
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }

    /// Apply the easing to `elapsed` time out of `duration`.
    ///
    /// Progress saturates at both ends, and a zero duration counts as
    /// already finished.
    pub fn apply_timed(&self, elapsed: f32, duration: f32) -> f32 {
        self.apply(progress(elapsed, duration))
    }
}

/// Fraction of `duration` covered by `elapsed`, clamped to `0.0..=1.0`
pub fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Cubic ease-in over `(elapsed, duration)`: slow start, fast finish
pub fn ease_in_cubic(elapsed: f32, duration: f32) -> f32 {
    Easing::EaseInCubic.apply_timed(elapsed, duration)
}

/// Cubic ease-out over `(elapsed, duration)`: fast start, slow finish
pub fn ease_out_cubic(elapsed: f32, duration: f32) -> f32 {
    Easing::EaseOutCubic.apply_timed(elapsed, duration)
}
