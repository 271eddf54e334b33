//! Cradle error types

use crate::cradle::CradlePhase;
use thiserror::Error;

/// Errors raised by the swing engine.
///
/// None of these propagate past the gesture or scene that caused them: a bad
/// gesture is ignored, a bad scene never starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CradleError {
    /// A gesture referenced a bearing that does not exist
    #[error("Bearing index {index} is outside the cradle (0..{count})")]
    InvalidBearingIndex { index: usize, count: usize },

    /// A gesture carried a rotation that is not a finite number of degrees
    #[error("Rotation {rotation} is not a finite angle")]
    InvalidRotation { rotation: f32 },

    /// A drag ended on a different bearing than the one it grabbed
    #[error("Drag grabbed bearing {expected} but was released on bearing {found}")]
    GrabMismatch { expected: usize, found: usize },

    /// Scene geometry or tuning is malformed
    #[error("Invalid scene configuration: {0}")]
    Configuration(String),

    /// `swing` was called on a bearing that is still swinging
    #[error("Bearing {position} is already swinging")]
    BearingInMotion { position: usize },

    /// A drag arrived while a swing series is running
    #[error("Dragging is disabled while the cradle is swinging")]
    DragDisabled,

    /// A gesture event the lifecycle does not accept in its current phase
    #[error("Unexpected {event} event while {phase:?}")]
    UnexpectedEvent {
        event: &'static str,
        phase: CradlePhase,
    },
}

/// Result type for cradle operations
pub type Result<T> = std::result::Result<T, CradleError>;
