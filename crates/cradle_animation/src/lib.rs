//! Cradle Animation System
//!
//! Easing curves, rotation keyframes, and timeline composition.
//!
//! # Features
//!
//! - **Easing**: cubic in/out curves plus the time-based helpers the swing stepper uses
//! - **Keyframes**: `(element, duration, target, easing)` requests
//! - **Timelines**: per-element keyframe tracks composed into one master timeline

pub mod easing;
pub mod keyframe;
pub mod timeline;

pub use easing::{ease_in_cubic, ease_out_cubic, Easing};
pub use keyframe::{ElementId, Keyframe};
pub use timeline::{MasterTimeline, Timeline, TrackId};
