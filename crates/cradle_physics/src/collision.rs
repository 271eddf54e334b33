//! Collision cascades
//!
//! When a bearing that instigates a collision completes its return swing, the
//! energy it carried moves to a group of bearings at the far end of the
//! cradle. [`on_collision`] computes that hand-off as plain data: which
//! bearings swing next, in which direction, and with how much energy.

use crate::bearing::{SwingDirection, SwingOptions};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::ops::Range;

/// Swing requests produced by one cascade step, in array order
pub type SwingBatch = SmallVec<[SwingRequest; 5]>;

/// A completed return swing striking its neighbour
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Collision {
    /// Bearing that struck
    pub collider: usize,
    /// Direction the collider was moving when it struck
    pub direction_of_force: SwingDirection,
    /// Rotation the collider covered on its way back
    pub kinetic_energy_on_collision: f32,
    pub num_bearings_in_motion: usize,
    pub acceleration_transferred: f32,
    /// Simulated time of impact
    pub time: f32,
}

/// Tuning for energy hand-off
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionOptions {
    /// Energy lost per bearing set in motion by a collision
    #[serde(default)]
    pub energy_damping_decrement: f32,
}

/// A swing to run on one bearing
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SwingRequest {
    pub position: usize,
    pub direction: SwingDirection,
    pub options: SwingOptions,
}

/// Why a cascade branch stopped
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CascadeHalt {
    /// Damping consumed all remaining energy, or there was no finite energy
    /// to hand on
    EnergyUnderflow { energy: f32 },
    /// The collider was not moving in either direction
    NoForce,
    /// The collision asked for zero bearings
    EmptyGroup,
    /// The series hit its configured cascade limit
    StepLimit { steps: usize },
}

/// Result of one cascade step
#[derive(Clone, Debug, PartialEq)]
pub enum CascadeStep {
    Swing(SwingBatch),
    Halt(CascadeHalt),
}

/// Bearings picked up by a force travelling in `direction`.
///
/// Positive force takes the head of the cradle, negative force the tail.
pub fn find_bearings_to_swing(
    bearing_count: usize,
    direction: SwingDirection,
    group_size: usize,
) -> Range<usize> {
    let n = group_size.min(bearing_count);
    if direction.weight() > 0.0 {
        0..n
    } else {
        bearing_count - n..bearing_count
    }
}

/// Energy left for each bearing of a group of `group_len` after damping
pub fn transferred_energy(
    kinetic_energy_on_collision: f32,
    group_len: usize,
    options: &CollisionOptions,
) -> f32 {
    kinetic_energy_on_collision - options.energy_damping_decrement * group_len as f32
}

/// Compute the cascade step triggered by `collision`.
///
/// Every selected bearing takes the direction of force and the damped
/// energy. Only the trailing edge of the group (last bearing for positive
/// force, first for negative) instigates the next collision.
pub fn on_collision(
    collision: &Collision,
    bearing_count: usize,
    options: &CollisionOptions,
) -> CascadeStep {
    let direction = collision.direction_of_force;
    if direction == SwingDirection::Neutral {
        return CascadeStep::Halt(CascadeHalt::NoForce);
    }

    let group = find_bearings_to_swing(bearing_count, direction, collision.num_bearings_in_motion);
    if group.is_empty() {
        return CascadeStep::Halt(CascadeHalt::EmptyGroup);
    }

    let group_len = group.len();
    let energy = transferred_energy(collision.kinetic_energy_on_collision, group_len, options);
    if !energy.is_finite() || energy <= 0.0 {
        return CascadeStep::Halt(CascadeHalt::EnergyUnderflow { energy });
    }

    let trailing_edge = if direction.weight() > 0.0 {
        group_len - 1
    } else {
        0
    };

    let batch = group
        .enumerate()
        .map(|(idx, position)| SwingRequest {
            position,
            direction,
            options: SwingOptions {
                kinetic_energy_transferred: energy,
                return_angle: 0.0,
                acceleration_transferred: collision.acceleration_transferred,
                num_bearings_in_motion: collision.num_bearings_in_motion,
                will_instigate_collision: idx == trailing_edge,
                start_time: collision.time,
            },
        })
        .collect();

    CascadeStep::Swing(batch)
}
