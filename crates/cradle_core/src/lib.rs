//! Cradle Core Runtime
//!
//! Foundational primitives shared by the Newton's cradle crates:
//!
//! - **State Machines**: table-driven lifecycle machines (idle, dragging, swinging)
//! - **Gesture Events**: the vocabulary a drag-gesture source reports
//!
//! # Example
//!
//! ```rust
//! use cradle_core::fsm::StateMachine;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Light { Off, On }
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Press { Toggle }
//!
//! let mut fsm = StateMachine::builder(Light::Off)
//!     .on(Light::Off, Press::Toggle, Light::On)
//!     .on(Light::On, Press::Toggle, Light::Off)
//!     .build();
//!
//! assert_eq!(fsm.send(Press::Toggle), Some(Light::On));
//! assert!(fsm.is_in(Light::On));
//! ```

pub mod events;
pub mod fsm;

pub use events::{DragEvent, GestureDirection, ParseDirectionError};
pub use fsm::{StateMachine, StateMachineBuilder, Transition};
