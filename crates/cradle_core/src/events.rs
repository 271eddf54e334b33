//! Drag gesture events
//!
//! The drag-gesture source is an external collaborator; it reports which
//! bearing was grabbed, the live rotation while dragging and the released
//! rotation. Everything the simulation consumes from it is modelled here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Token reported for a clockwise gesture
pub const CLOCKWISE: &str = "clockwise";
/// Token reported for a counter-clockwise gesture
pub const COUNTER_CLOCKWISE: &str = "counter-clockwise";

/// Direction reported by the gesture source for the current drag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureDirection {
    Clockwise,
    CounterClockwise,
}

impl GestureDirection {
    /// Signed weight of the direction: `1` clockwise, `-1` counter-clockwise
    pub fn weight(self) -> i8 {
        match self {
            GestureDirection::Clockwise => 1,
            GestureDirection::CounterClockwise => -1,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            GestureDirection::Clockwise => CLOCKWISE,
            GestureDirection::CounterClockwise => COUNTER_CLOCKWISE,
        }
    }
}

impl fmt::Display for GestureDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Unknown direction token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown gesture direction `{0}` (expected `clockwise` or `counter-clockwise`)")]
pub struct ParseDirectionError(pub String);

impl FromStr for GestureDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            CLOCKWISE | "cw" => Ok(GestureDirection::Clockwise),
            COUNTER_CLOCKWISE | "counterclockwise" | "ccw" => Ok(GestureDirection::CounterClockwise),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// A drag gesture event as delivered by the gesture source
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragEvent {
    /// Pointer grabbed a bearing and started moving
    Start {
        grabbed_index: usize,
        direction: GestureDirection,
    },
    /// Live rotation of the grabbed bearing, in degrees
    Drag { rotation: f32 },
    /// Pointer released
    End { rotation: f32, grabbed_index: usize },
}

impl DragEvent {
    /// Short name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            DragEvent::Start { .. } => "drag_start",
            DragEvent::Drag { .. } => "drag",
            DragEvent::End { .. } => "drag_end",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direction_tokens() {
        assert_eq!(
            "clockwise".parse::<GestureDirection>(),
            Ok(GestureDirection::Clockwise)
        );
        assert_eq!(
            " counter-clockwise ".parse::<GestureDirection>(),
            Ok(GestureDirection::CounterClockwise)
        );
        assert_eq!("ccw".parse::<GestureDirection>(), Ok(GestureDirection::CounterClockwise));
        assert!("sideways".parse::<GestureDirection>().is_err());
    }

    #[test]
    fn weight_matches_rotation_sign() {
        assert_eq!(GestureDirection::Clockwise.weight(), 1);
        assert_eq!(GestureDirection::CounterClockwise.weight(), -1);
        assert_eq!(GestureDirection::CounterClockwise.to_string(), COUNTER_CLOCKWISE);
    }

    #[test]
    fn drag_events_have_names() {
        let start = DragEvent::Start {
            grabbed_index: 4,
            direction: GestureDirection::Clockwise,
        };
        assert_eq!(start.name(), "drag_start");
        assert_eq!(DragEvent::Drag { rotation: 10.0 }.name(), "drag");
        assert_eq!(
            DragEvent::End {
                rotation: 10.0,
                grabbed_index: 4
            }
            .name(),
            "drag_end"
        );
    }
}
