//! Bearing model and swing stepper
//!
//! A bearing is one pendulum of the cradle. It owns its rotation state and a
//! private keyframe timeline. [`Bearing::swing`] integrates a full outward and
//! return motion up front and appends every step to that timeline.

use crate::collision::Collision;
use crate::error::{CradleError, Result};
use cradle_animation::{ease_in_cubic, ease_out_cubic, ElementId, Keyframe, Timeline};
use cradle_core::GestureDirection;
use serde::{Deserialize, Serialize};

/// Duration of the keyframe that echoes a live drag rotation, in seconds
pub const DRAG_ECHO_DURATION: f32 = 0.01;

/// Rotation direction of a bearing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwingDirection {
    CounterClockwise,
    #[default]
    Neutral,
    Clockwise,
}

impl SwingDirection {
    /// Signed weight: `1.0` clockwise, `-1.0` counter-clockwise, `0.0` neutral
    pub fn weight(self) -> f32 {
        match self {
            SwingDirection::CounterClockwise => -1.0,
            SwingDirection::Neutral => 0.0,
            SwingDirection::Clockwise => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SwingDirection::CounterClockwise => SwingDirection::Clockwise,
            SwingDirection::Neutral => SwingDirection::Neutral,
            SwingDirection::Clockwise => SwingDirection::CounterClockwise,
        }
    }

    /// Direction pointing along the sign of `delta`
    pub fn from_sign(delta: f32) -> Self {
        if delta > 0.0 {
            SwingDirection::Clockwise
        } else if delta < 0.0 {
            SwingDirection::CounterClockwise
        } else {
            SwingDirection::Neutral
        }
    }
}

impl From<GestureDirection> for SwingDirection {
    fn from(direction: GestureDirection) -> Self {
        match direction {
            GestureDirection::Clockwise => SwingDirection::Clockwise,
            GestureDirection::CounterClockwise => SwingDirection::CounterClockwise,
        }
    }
}

/// SVG rotation origin of a bearing
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f32,
    pub y: f32,
}

/// What a bearing is currently doing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    #[default]
    AtRest,
    /// Grabbed by an active drag, following the pointer
    Held,
    /// Between `swing` and `on_swing_complete`
    Swinging,
}

/// Fixed-step integration settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stepping {
    /// Simulated time per step (and per keyframe), in seconds
    pub frame_step: f32,
    /// Simulated duration of each swing phase, in seconds
    pub phase_duration: f32,
}

impl Stepping {
    /// Number of steps that make up one phase
    pub fn steps_per_phase(&self) -> u32 {
        (self.phase_duration / self.frame_step).round().max(1.0) as u32
    }
}

impl Default for Stepping {
    fn default() -> Self {
        Self {
            frame_step: 1.0 / 60.0,
            phase_duration: 2.0,
        }
    }
}

/// Inputs of a single swing
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SwingOptions {
    /// Energy inherited from the upstream collision (0 after a drag release)
    pub kinetic_energy_transferred: f32,
    /// Angle to settle back to
    pub return_angle: f32,
    /// Carried through the cascade, not used by the stepper
    pub acceleration_transferred: f32,
    /// Size of the group moving together
    pub num_bearings_in_motion: usize,
    /// Whether the return path ends in a collision with a neighbour
    pub will_instigate_collision: bool,
    /// Simulated time at which the swing may start
    pub start_time: f32,
}

/// What a swing computed and scheduled
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SwingOutcome {
    pub position: usize,
    pub outward_angle: f32,
    pub outward_rotation_amount: f32,
    pub fall_back_rotation_amount: f32,
    /// Keyframes appended to the bearing's timeline
    pub keyframes: usize,
    pub started_at: f32,
    pub finished_at: f32,
    pub will_instigate_collision: bool,
    pub num_bearings_in_motion: usize,
    pub acceleration_transferred: f32,
}

/// One pendulum of the cradle
#[derive(Clone, Debug)]
pub struct Bearing {
    position: usize,
    current_rotation: f32,
    min_rotation: f32,
    max_rotation: f32,
    swing_direction: SwingDirection,
    motion: MotionState,
    mass_kg: f32,
    bearing_length: f32,
    control_point: ControlPoint,
    stepping: Stepping,
    timeline: Timeline,
}

impl Bearing {
    /// Create a bearing at rest with symmetric bounds `±max_rotation`
    pub fn new(position: usize, max_rotation: f32, control_point: ControlPoint) -> Self {
        let max_rotation = max_rotation.abs();
        Self {
            position,
            current_rotation: 0.0,
            min_rotation: -max_rotation,
            max_rotation,
            swing_direction: SwingDirection::Neutral,
            motion: MotionState::AtRest,
            mass_kg: 0.5,
            bearing_length: 0.0,
            control_point,
            stepping: Stepping::default(),
            timeline: Timeline::new(0.0),
        }
    }

    /// Builder: set carried physical parameters
    pub fn with_physics(mut self, mass_kg: f32, bearing_length: f32) -> Self {
        self.mass_kg = mass_kg;
        self.bearing_length = bearing_length;
        self
    }

    /// Builder: set integration settings
    pub fn with_stepping(mut self, stepping: Stepping) -> Self {
        self.stepping = stepping;
        self
    }

    /// Builder: start from a resting rotation other than zero
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.current_rotation = self.clamp_rotation(degrees);
        self.timeline = Timeline::new(self.current_rotation);
        self
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn element(&self) -> ElementId {
        ElementId(self.position)
    }

    pub fn current_rotation(&self) -> f32 {
        self.current_rotation
    }

    pub fn min_rotation(&self) -> f32 {
        self.min_rotation
    }

    pub fn max_rotation(&self) -> f32 {
        self.max_rotation
    }

    pub fn swing_direction(&self) -> SwingDirection {
        self.swing_direction
    }

    pub fn set_direction(&mut self, direction: SwingDirection) {
        self.swing_direction = direction;
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    /// True while a swing has been scheduled but not completed
    pub fn is_in_motion(&self) -> bool {
        self.motion == MotionState::Swinging
    }

    pub fn is_held(&self) -> bool {
        self.motion == MotionState::Held
    }

    pub fn mass_kg(&self) -> f32 {
        self.mass_kg
    }

    pub fn bearing_length(&self) -> f32 {
        self.bearing_length
    }

    pub fn control_point(&self) -> ControlPoint {
        self.control_point
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    fn clamp_rotation(&self, degrees: f32) -> f32 {
        degrees.clamp(self.min_rotation, self.max_rotation)
    }

    /// Clamp `degrees` to the bounds, rejecting NaN and infinities
    fn finite_rotation(&self, degrees: f32) -> Result<f32> {
        if degrees.is_finite() {
            Ok(self.clamp_rotation(degrees))
        } else {
            Err(CradleError::InvalidRotation { rotation: degrees })
        }
    }

    /// Grab the bearing for a drag moving in `direction`
    pub fn hold(&mut self, direction: SwingDirection) {
        self.motion = MotionState::Held;
        self.swing_direction = direction;
    }

    /// Echo a live drag rotation, clamped to the bearing's bounds
    pub fn drag_to(&mut self, degrees: f32) -> Result<()> {
        let rotation = self.finite_rotation(degrees)?;
        self.current_rotation = rotation;
        let echo = Keyframe::rotate(self.element(), DRAG_ECHO_DURATION, rotation);
        self.timeline.push_keyframe(&echo, self.timeline.duration());
        Ok(())
    }

    /// Turning point of a swing fed with `kinetic_energy`.
    ///
    /// Clamped against `min_rotation` when moving counter-clockwise and
    /// against `max_rotation` when moving clockwise.
    pub fn outward_angle(&self, kinetic_energy: f32) -> f32 {
        let outward = self.current_rotation + self.swing_direction.weight() * kinetic_energy;
        match self.swing_direction {
            SwingDirection::CounterClockwise if outward < self.min_rotation => self.min_rotation,
            SwingDirection::Clockwise if outward > self.max_rotation => self.max_rotation,
            _ => outward,
        }
    }

    /// Integrate one outward+return swing and append it to the timeline.
    ///
    /// The outward phase eases out toward the turning point, the direction
    /// flips, and the return phase eases in toward `return_angle`. Each phase
    /// has a fixed number of steps and its last keyframe lands exactly on the
    /// phase target. A phase with no travel emits nothing.
    ///
    /// Fails with [`CradleError::BearingInMotion`] if a previous swing has not
    /// completed yet.
    pub fn swing(&mut self, options: &SwingOptions) -> Result<SwingOutcome> {
        if self.is_in_motion() {
            return Err(CradleError::BearingInMotion {
                position: self.position,
            });
        }
        let return_angle = self.finite_rotation(options.return_angle)?;
        self.motion = MotionState::Swinging;

        let starting_rotation = self.current_rotation;
        let kinetic_energy = if options.kinetic_energy_transferred.is_finite() {
            options.kinetic_energy_transferred.max(0.0)
        } else {
            0.0
        };

        let outward_angle = self.outward_angle(kinetic_energy);
        let outward_rotation_amount = (outward_angle - starting_rotation).abs();
        let fall_back_rotation_amount = (return_angle - outward_angle).abs();

        tracing::debug!(
            bearing = self.position,
            kinetic_energy,
            outward_angle,
            outward_rotation_amount,
            fall_back_rotation_amount,
            "swing"
        );

        let Stepping {
            frame_step,
            phase_duration,
        } = self.stepping;
        let steps = self.stepping.steps_per_phase();
        let element = self.element();

        let started_at = options.start_time.max(self.timeline.duration());
        let mut cursor = started_at;
        let mut keyframes = 0;

        if outward_rotation_amount > 0.0 {
            let travel = outward_rotation_amount * self.swing_direction.weight();
            for step in 0..=steps {
                self.current_rotation = if step == steps {
                    outward_angle
                } else {
                    let elapsed = phase_duration * step as f32 / steps as f32;
                    starting_rotation + travel * ease_out_cubic(elapsed, phase_duration)
                };
                let keyframe = Keyframe::rotate(element, frame_step, self.current_rotation);
                cursor = self.timeline.push_keyframe(&keyframe, cursor);
                keyframes += 1;
            }
        }

        if fall_back_rotation_amount > 0.0 {
            self.swing_direction = SwingDirection::from_sign(return_angle - outward_angle);
        } else if outward_rotation_amount > 0.0 {
            self.swing_direction = self.swing_direction.flipped();
        }

        if fall_back_rotation_amount > 0.0 {
            let travel = fall_back_rotation_amount * self.swing_direction.weight();
            for step in 1..=steps {
                self.current_rotation = if step == steps {
                    return_angle
                } else {
                    let elapsed = phase_duration * step as f32 / steps as f32;
                    outward_angle + travel * ease_in_cubic(elapsed, phase_duration)
                };
                let keyframe = Keyframe::rotate(element, frame_step, self.current_rotation);
                cursor = self.timeline.push_keyframe(&keyframe, cursor);
                keyframes += 1;
            }
        }

        Ok(SwingOutcome {
            position: self.position,
            outward_angle,
            outward_rotation_amount,
            fall_back_rotation_amount,
            keyframes,
            started_at,
            finished_at: cursor,
            will_instigate_collision: options.will_instigate_collision,
            num_bearings_in_motion: options.num_bearings_in_motion,
            acceleration_transferred: options.acceleration_transferred,
        })
    }

    /// Finish a swing.
    ///
    /// Clears the motion flag and, when the swing was flagged as instigating
    /// a collision, returns the collision carrying the return-path rotation
    /// as its energy.
    pub fn on_swing_complete(&mut self, outcome: &SwingOutcome) -> Option<Collision> {
        debug_assert_eq!(outcome.position, self.position);
        self.motion = MotionState::AtRest;

        tracing::trace!(bearing = self.position, "swing complete");

        outcome.will_instigate_collision.then(|| Collision {
            collider: self.position,
            direction_of_force: self.swing_direction,
            kinetic_energy_on_collision: outcome.fall_back_rotation_amount,
            num_bearings_in_motion: outcome.num_bearings_in_motion,
            acceleration_transferred: outcome.acceleration_transferred,
            time: outcome.finished_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bearing() -> Bearing {
        Bearing::new(0, 85.0, ControlPoint { x: 100.0, y: 20.0 })
    }

    fn energy(kinetic_energy: f32) -> SwingOptions {
        SwingOptions {
            kinetic_energy_transferred: kinetic_energy,
            num_bearings_in_motion: 1,
            ..Default::default()
        }
    }

    fn assert_within_bounds(b: &Bearing) {
        for entry in b.timeline().entries() {
            assert!(
                entry.end_value >= b.min_rotation() && entry.end_value <= b.max_rotation(),
                "keyframe {} outside bounds",
                entry.end_value
            );
        }
        assert!(b.current_rotation() >= b.min_rotation());
        assert!(b.current_rotation() <= b.max_rotation());
    }

    #[test]
    fn outward_angle_clamps_in_direction_of_travel() {
        let mut b = bearing().with_rotation(-80.0);
        b.set_direction(SwingDirection::CounterClockwise);
        assert_eq!(b.outward_angle(20.0), -85.0);

        b.set_direction(SwingDirection::Clockwise);
        assert_eq!(b.outward_angle(20.0), -60.0);

        let mut b = bearing().with_rotation(80.0);
        b.set_direction(SwingDirection::Clockwise);
        assert_eq!(b.outward_angle(20.0), 85.0);
    }

    #[test]
    fn clamped_swing_reports_exact_bound() {
        let mut b = bearing().with_rotation(-80.0);
        b.set_direction(SwingDirection::CounterClockwise);
        let outcome = b.swing(&energy(20.0)).unwrap();

        assert_eq!(outcome.outward_angle, -85.0);
        assert_eq!(outcome.outward_rotation_amount, 5.0);
        assert_eq!(outcome.fall_back_rotation_amount, 85.0);
        assert_within_bounds(&b);
    }

    #[test]
    fn swing_emits_two_closed_form_phases() {
        let mut b = bearing();
        b.set_direction(SwingDirection::Clockwise);
        let outcome = b.swing(&energy(40.0)).unwrap();

        // 121 outward keyframes (steps 0..=120) and 120 on the way back
        assert_eq!(outcome.keyframes, 241);
        assert_eq!(b.timeline().len(), 241);
        assert_eq!(outcome.outward_angle, 40.0);

        let entries = b.timeline().entries();
        assert_eq!(entries[120].end_value, 40.0);
        assert_eq!(entries[240].end_value, 0.0);
        assert_eq!(b.current_rotation(), 0.0);

        // direction flipped at the turning point
        assert_eq!(b.swing_direction(), SwingDirection::CounterClockwise);

        let expected_end = 241.0 / 60.0;
        assert!((outcome.finished_at - expected_end).abs() < 1e-3);
        assert_within_bounds(&b);
    }

    #[test]
    fn outward_phase_is_monotonic() {
        let mut b = bearing();
        b.set_direction(SwingDirection::CounterClockwise);
        b.swing(&energy(60.0)).unwrap();

        let entries = b.timeline().entries();
        for pair in entries[..121].windows(2) {
            assert!(pair[1].end_value <= pair[0].end_value);
        }
        for pair in entries[121..].windows(2) {
            assert!(pair[1].end_value >= pair[0].end_value);
        }
    }

    #[test]
    fn zero_energy_swing_at_return_angle_is_a_no_op() {
        let mut b = bearing();
        b.set_direction(SwingDirection::Clockwise);
        let outcome = b.swing(&energy(0.0)).unwrap();

        assert_eq!(outcome.keyframes, 0);
        assert!(b.timeline().is_empty());
        assert_eq!(outcome.started_at, outcome.finished_at);
        assert_eq!(b.swing_direction(), SwingDirection::Clockwise);
        assert_eq!(b.current_rotation(), 0.0);
    }

    #[test]
    fn released_swing_only_falls_back() {
        let mut b = bearing();
        b.hold(SwingDirection::CounterClockwise);
        b.drag_to(-120.0).unwrap();
        assert_eq!(b.current_rotation(), -85.0);

        let outcome = b.swing(&energy(0.0)).unwrap();
        assert_eq!(outcome.outward_angle, -85.0);
        assert_eq!(outcome.outward_rotation_amount, 0.0);
        assert_eq!(outcome.fall_back_rotation_amount, 85.0);
        // one drag echo plus the return phase
        assert_eq!(b.timeline().len(), 121);
        assert_eq!(outcome.started_at, DRAG_ECHO_DURATION);
        assert_eq!(b.swing_direction(), SwingDirection::Clockwise);
        assert_within_bounds(&b);
    }

    #[test]
    fn re_entrant_swing_is_rejected() {
        let mut b = bearing();
        b.set_direction(SwingDirection::Clockwise);
        let outcome = b.swing(&energy(30.0)).unwrap();
        assert!(b.is_in_motion());

        let err = b.swing(&energy(30.0)).unwrap_err();
        assert_eq!(err, CradleError::BearingInMotion { position: 0 });
        assert_eq!(b.timeline().len(), outcome.keyframes);

        b.on_swing_complete(&outcome);
        assert!(!b.is_in_motion());
        assert!(b.swing(&energy(30.0)).is_ok());
    }

    #[test]
    fn held_bearing_may_swing() {
        let mut b = bearing();
        b.hold(SwingDirection::Clockwise);
        assert!(b.is_held());
        assert!(!b.is_in_motion());
        assert!(b.swing(&energy(10.0)).is_ok());
        assert_eq!(b.motion(), MotionState::Swinging);
    }

    #[test]
    fn completion_reports_collision_only_for_instigator() {
        let mut b = bearing();
        b.set_direction(SwingDirection::Clockwise);
        let quiet = b.swing(&energy(30.0)).unwrap();
        assert!(b.on_swing_complete(&quiet).is_none());

        b.set_direction(SwingDirection::Clockwise);
        let loud = b
            .swing(&SwingOptions {
                will_instigate_collision: true,
                ..energy(30.0)
            })
            .unwrap();
        let collision = b.on_swing_complete(&loud).unwrap();

        assert_eq!(collision.collider, 0);
        assert_eq!(collision.direction_of_force, SwingDirection::CounterClockwise);
        assert_eq!(collision.kinetic_energy_on_collision, 30.0);
        assert_eq!(collision.time, loud.finished_at);
        assert_eq!(b.motion(), MotionState::AtRest);
    }

    #[test]
    fn later_swing_starts_after_previous_keyframes() {
        let mut b = bearing();
        b.set_direction(SwingDirection::Clockwise);
        let first = b.swing(&energy(30.0)).unwrap();
        b.on_swing_complete(&first);

        b.set_direction(SwingDirection::Clockwise);
        let second = b
            .swing(&SwingOptions {
                start_time: 0.5,
                ..energy(30.0)
            })
            .unwrap();
        assert_eq!(second.started_at, first.finished_at);
    }

    #[test]
    fn neutral_bearing_never_leaves_rest() {
        let mut b = bearing();
        let outcome = b.swing(&energy(50.0)).unwrap();
        assert_eq!(outcome.outward_rotation_amount, 0.0);
        assert_eq!(outcome.keyframes, 0);
    }

    #[test]
    fn non_finite_rotations_are_rejected() {
        let mut b = bearing();
        b.hold(SwingDirection::Clockwise);
        b.drag_to(30.0).unwrap();

        for rotation in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(matches!(
                b.drag_to(rotation),
                Err(CradleError::InvalidRotation { .. })
            ));
        }
        assert_eq!(b.current_rotation(), 30.0);
        assert_eq!(b.timeline().len(), 1);

        let err = b
            .swing(&SwingOptions {
                return_angle: f32::NAN,
                ..energy(10.0)
            })
            .unwrap_err();
        assert!(matches!(err, CradleError::InvalidRotation { .. }));
        assert!(b.is_held());

        let outcome = b.swing(&energy(f32::NAN)).unwrap();
        assert_eq!(outcome.outward_angle, 30.0);
        assert_within_bounds(&b);
    }

    #[test]
    fn steps_per_phase_rounds() {
        assert_eq!(Stepping::default().steps_per_phase(), 120);
        let coarse = Stepping {
            frame_step: 0.3,
            phase_duration: 1.0,
        };
        assert_eq!(coarse.steps_per_phase(), 3);
    }
}
