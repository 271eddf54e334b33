//! Rotation keyframes
//!
//! A keyframe is a request to animate one element to a target value over a
//! duration with a given easing. Timelines turn a sequence of requests into
//! sampled motion.

use crate::easing::Easing;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the visual element a keyframe animates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// A single keyframe request
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Element being animated
    pub element: ElementId,
    /// Duration of the transition, in seconds
    pub duration: f32,
    /// Target value (rotation in degrees for bearings)
    pub value: f32,
    /// Easing used while transitioning TO `value`
    pub easing: Easing,
}

impl Keyframe {
    pub fn new(element: ElementId, duration: f32, value: f32, easing: Easing) -> Self {
        Self {
            element,
            duration,
            value,
            easing,
        }
    }

    /// Linear rotation to `degrees` over `duration` seconds
    pub fn rotate(element: ElementId, duration: f32, degrees: f32) -> Self {
        Self::new(element, duration, degrees, Easing::Linear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_defaults_to_linear() {
        let kf = Keyframe::rotate(ElementId(3), 1.0 / 60.0, 42.0);
        assert_eq!(kf.easing, Easing::Linear);
        assert_eq!(kf.element, ElementId(3));
        assert_eq!(kf.value, 42.0);
        assert_eq!(kf, Keyframe::new(ElementId(3), 1.0 / 60.0, 42.0, Easing::Linear));
    }

    #[test]
    fn element_ids_display_their_index() {
        assert_eq!(ElementId(4).to_string(), "element#4");
    }
}
