//! Cradle Physics
//!
//! The swing/collision engine behind the Newton's cradle scene.
//!
//! - **Bearings**: per-pendulum rotation state and the outward/return swing stepper
//! - **Collisions**: the cascade step that hands energy to the next group of bearings
//! - **Cradle**: the drag lifecycle (idle, dragging, swinging) and the swing series driver
//! - **Scene**: static geometry and tuning constants
//!
//! # Example
//!
//! ```rust
//! use cradle_core::GestureDirection;
//! use cradle_physics::{Cradle, CradlePhase, SceneConfig};
//!
//! let mut cradle = Cradle::from_scene(&SceneConfig::default()).unwrap();
//!
//! cradle.on_drag_start(4, GestureDirection::CounterClockwise).unwrap();
//! cradle.on_drag(-60.0).unwrap();
//! let series = cradle.on_drag_end(-60.0, 4).unwrap();
//!
//! assert_eq!(series.swings[0].position, 4);
//! assert_eq!(cradle.phase(), CradlePhase::Swinging);
//!
//! // play the series back; dragging is re-enabled at the end
//! assert!(cradle.advance(series.duration()));
//! assert_eq!(cradle.phase(), CradlePhase::Idle);
//! ```

pub mod bearing;
pub mod collision;
pub mod cradle;
pub mod error;
pub mod scene;

pub use bearing::{
    Bearing, ControlPoint, MotionState, Stepping, SwingDirection, SwingOptions, SwingOutcome,
};
pub use collision::{
    on_collision, CascadeHalt, CascadeStep, Collision, CollisionOptions, SwingRequest,
};
pub use cradle::{CascadeRecord, Cradle, CradlePhase, LifecycleEvent, SwingSeries};
pub use error::{CradleError, Result};
pub use scene::{BearingGeometry, SceneConfig};
