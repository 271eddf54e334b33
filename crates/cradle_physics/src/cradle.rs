//! Cradle controller
//!
//! Owns the bearings, turns drag gestures into swing series, and composes
//! the bearings' timelines for playback.
//!
//! A series is computed synchronously on release: every swing of a batch is
//! scheduled, then every swing of that batch completes in array order, and
//! only then does the cascade a completion triggered run as the next batch.
//! The cradle then stays in [`CradlePhase::Swinging`], with dragging
//! disabled, until [`Cradle::advance`] has played the series through.

use crate::bearing::{Bearing, SwingOptions, SwingOutcome};
use crate::collision::{
    on_collision, CascadeHalt, CascadeStep, Collision, CollisionOptions, SwingBatch, SwingRequest,
};
use crate::error::{CradleError, Result};
use crate::scene::SceneConfig;
use cradle_animation::MasterTimeline;
use cradle_core::{DragEvent, GestureDirection, StateMachine};
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::ops::Range;

/// Lifecycle phase of the cradle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CradlePhase {
    /// Draggable, nothing moving
    Idle,
    /// A pointer is moving a group of bearings
    Dragging,
    /// A swing series is in progress, dragging disabled
    Swinging,
}

/// Inputs of the lifecycle state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    DragStart,
    DragEnd,
    SeriesComplete,
}

/// A cascade step that set bearings in motion
#[derive(Clone, Debug, Serialize)]
pub struct CascadeRecord {
    pub collision: Collision,
    pub selected: Vec<usize>,
    pub energy: f32,
}

/// Everything one release produced
#[derive(Clone, Debug, Default, Serialize)]
pub struct SwingSeries {
    /// Swings in the order they completed
    pub swings: Vec<SwingOutcome>,
    pub cascades: Vec<CascadeRecord>,
    /// Why the last cascade branch stopped, if it did not simply run out of
    /// instigators
    pub halt: Option<CascadeHalt>,
    pub started_at: f32,
    pub finished_at: f32,
}

impl SwingSeries {
    /// Playback length of the series in seconds
    pub fn duration(&self) -> f32 {
        self.finished_at - self.started_at
    }
}

fn lifecycle() -> StateMachine<CradlePhase, LifecycleEvent> {
    StateMachine::builder(CradlePhase::Idle)
        .on(CradlePhase::Idle, LifecycleEvent::DragStart, CradlePhase::Dragging)
        .on(CradlePhase::Dragging, LifecycleEvent::DragEnd, CradlePhase::Swinging)
        .on(CradlePhase::Swinging, LifecycleEvent::SeriesComplete, CradlePhase::Idle)
        .build()
}

/// The bearings of one scene plus their drag/swing state
pub struct Cradle {
    bearings: Vec<Bearing>,
    objects_in_drag: Range<usize>,
    grabbed_index: Option<usize>,
    lifecycle: StateMachine<CradlePhase, LifecycleEvent>,
    draggable: bool,
    collision_options: CollisionOptions,
    max_cascade_steps: usize,
    /// Playback time left in the running series
    playback_remaining: f32,
}

impl Cradle {
    /// Create a cradle from bearings ordered left to right
    pub fn new(
        bearings: Vec<Bearing>,
        collision_options: CollisionOptions,
        max_cascade_steps: usize,
    ) -> Result<Self> {
        if bearings.is_empty() {
            return Err(CradleError::Configuration(
                "a cradle needs at least one bearing".to_string(),
            ));
        }
        if let Some((idx, b)) = bearings
            .iter()
            .enumerate()
            .find(|(idx, b)| b.position() != *idx)
        {
            return Err(CradleError::Configuration(format!(
                "bearing at slot {idx} reports position {}",
                b.position()
            )));
        }

        Ok(Self {
            bearings,
            objects_in_drag: 0..0,
            grabbed_index: None,
            lifecycle: lifecycle(),
            draggable: true,
            collision_options,
            max_cascade_steps,
            playback_remaining: 0.0,
        })
    }

    /// Build the cradle described by a scene
    pub fn from_scene(scene: &SceneConfig) -> Result<Self> {
        let bearings = scene.build_bearings()?;
        tracing::info!(bearings = bearings.len(), "cradle initialized");
        Self::new(bearings, scene.collision_options(), scene.max_cascade_steps)
    }

    pub fn bearings(&self) -> &[Bearing] {
        &self.bearings
    }

    pub fn bearing(&self, index: usize) -> Option<&Bearing> {
        self.bearings.get(index)
    }

    pub fn len(&self) -> usize {
        self.bearings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bearings.is_empty()
    }

    pub fn phase(&self) -> CradlePhase {
        self.lifecycle.current_state()
    }

    pub fn is_swinging(&self) -> bool {
        self.lifecycle.is_in(CradlePhase::Swinging)
    }

    /// Whether bearings currently accept pointer interaction
    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    /// Positions of the bearings moved by the active drag
    pub fn objects_in_drag(&self) -> Range<usize> {
        self.objects_in_drag.clone()
    }

    /// Seconds of the running series still to play
    pub fn playback_remaining(&self) -> f32 {
        self.playback_remaining
    }

    pub fn lifecycle_history(&self) -> &[(CradlePhase, LifecycleEvent, CradlePhase)] {
        self.lifecycle.history()
    }

    pub fn collision_options(&self) -> CollisionOptions {
        self.collision_options
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.bearings.len() {
            Ok(())
        } else {
            Err(CradleError::InvalidBearingIndex {
                index,
                count: self.bearings.len(),
            })
        }
    }

    fn check_rotation(rotation: f32) -> Result<()> {
        if rotation.is_finite() {
            Ok(())
        } else {
            Err(CradleError::InvalidRotation { rotation })
        }
    }

    fn expect_phase(&self, event: &'static str, phase: CradlePhase) -> Result<()> {
        match self.phase() {
            current if current == phase => Ok(()),
            CradlePhase::Swinging => Err(CradleError::DragDisabled),
            current => Err(CradleError::UnexpectedEvent {
                event,
                phase: current,
            }),
        }
    }

    /// Dispatch a gesture event. Returns the swing series on release.
    ///
    /// Drags arriving while a series plays fail with
    /// [`CradleError::DragDisabled`].
    pub fn handle(&mut self, event: DragEvent) -> Result<Option<SwingSeries>> {
        match event {
            DragEvent::Start {
                grabbed_index,
                direction,
            } => self.on_drag_start(grabbed_index, direction).map(|_| None),
            DragEvent::Drag { rotation } => self.on_drag(rotation).map(|_| None),
            DragEvent::End {
                rotation,
                grabbed_index,
            } => self.on_drag_end(rotation, grabbed_index).map(Some),
        }
    }

    /// Grab a bearing.
    ///
    /// A clockwise gesture carries every bearing up to and including the
    /// grabbed one; a counter-clockwise gesture carries it and every bearing
    /// after it.
    pub fn on_drag_start(&mut self, grabbed_index: usize, direction: GestureDirection) -> Result<()> {
        self.expect_phase("drag_start", CradlePhase::Idle)?;
        self.check_index(grabbed_index)?;

        let group = match direction {
            GestureDirection::Clockwise => 0..grabbed_index + 1,
            GestureDirection::CounterClockwise => grabbed_index..self.bearings.len(),
        };

        for bearing in &mut self.bearings[group.clone()] {
            bearing.hold(direction.into());
        }

        tracing::info!(grabbed_index, %direction, ?group, "drag start");

        self.objects_in_drag = group;
        self.grabbed_index = Some(grabbed_index);
        self.lifecycle.send(LifecycleEvent::DragStart);
        Ok(())
    }

    /// Echo the live rotation onto every dragged bearing
    pub fn on_drag(&mut self, rotation: f32) -> Result<()> {
        self.expect_phase("drag", CradlePhase::Dragging)?;
        Self::check_rotation(rotation)?;

        let group = self.objects_in_drag.clone();
        for bearing in &mut self.bearings[group] {
            bearing.drag_to(rotation)?;
        }
        Ok(())
    }

    /// Release the drag and compute the resulting swing series.
    ///
    /// `grabbed_index` must name the bearing grabbed at drag start. The
    /// cradle stays swinging until the series has been played with
    /// [`Cradle::advance`]; a series with nothing to play ends at once.
    pub fn on_drag_end(&mut self, rotation: f32, grabbed_index: usize) -> Result<SwingSeries> {
        self.expect_phase("drag_end", CradlePhase::Dragging)?;
        self.check_index(grabbed_index)?;
        Self::check_rotation(rotation)?;
        match self.grabbed_index {
            Some(expected) if expected != grabbed_index => {
                return Err(CradleError::GrabMismatch {
                    expected,
                    found: grabbed_index,
                });
            }
            _ => {}
        }

        let group = std::mem::replace(&mut self.objects_in_drag, 0..0);
        for bearing in &mut self.bearings[group] {
            bearing.drag_to(rotation)?;
        }
        self.grabbed_index = None;

        self.draggable = false;
        self.lifecycle.send(LifecycleEvent::DragEnd);

        let start_time = self
            .bearings
            .iter()
            .map(|b| b.timeline().duration())
            .fold(0.0, f32::max);

        let held: SmallVec<[usize; 5]> = self
            .bearings
            .iter()
            .filter(|b| b.is_held())
            .map(Bearing::position)
            .collect();
        let num_bearings_in_motion = held.len();

        tracing::info!(rotation, grabbed_index, num_bearings_in_motion, "drag end");

        let batch: SwingBatch = held
            .iter()
            .map(|&position| SwingRequest {
                position,
                direction: self.bearings[position].swing_direction(),
                options: SwingOptions {
                    kinetic_energy_transferred: 0.0,
                    return_angle: 0.0,
                    acceleration_transferred: 0.0,
                    num_bearings_in_motion,
                    will_instigate_collision: position == grabbed_index,
                    start_time,
                },
            })
            .collect();

        let series = self.run_series(batch, start_time);
        self.playback_remaining = series.duration();
        tracing::info!(
            swings = series.swings.len(),
            cascades = series.cascades.len(),
            duration = self.playback_remaining,
            "swing series scheduled"
        );
        if self.playback_remaining <= 0.0 {
            self.on_swing_series_end();
        }
        Ok(series)
    }

    /// Play the running series forward by `dt` seconds.
    ///
    /// Returns `true` when this call reached the end of the series, which
    /// returns the cradle to idle and re-enables dragging.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.is_swinging() {
            return false;
        }

        self.playback_remaining -= dt.max(0.0);
        if self.playback_remaining > 0.0 {
            return false;
        }

        self.playback_remaining = 0.0;
        self.on_swing_series_end();
        true
    }

    fn run_series(&mut self, initial: SwingBatch, start_time: f32) -> SwingSeries {
        let mut series = SwingSeries {
            started_at: start_time,
            finished_at: start_time,
            ..Default::default()
        };
        let mut queue = VecDeque::from([initial]);

        while let Some(batch) = queue.pop_front() {
            let mut outcomes: SmallVec<[SwingOutcome; 5]> = SmallVec::new();

            for request in &batch {
                let bearing = &mut self.bearings[request.position];
                bearing.set_direction(request.direction);
                match bearing.swing(&request.options) {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(err) => tracing::warn!(%err, "swing request dropped"),
                }
            }

            for outcome in outcomes {
                let collision = self.bearings[outcome.position].on_swing_complete(&outcome);
                series.finished_at = series.finished_at.max(outcome.finished_at);
                series.swings.push(outcome);

                let Some(collision) = collision else {
                    continue;
                };

                if series.cascades.len() >= self.max_cascade_steps {
                    tracing::warn!(
                        steps = series.cascades.len(),
                        "cascade step limit reached, stopping series"
                    );
                    series.halt = Some(CascadeHalt::StepLimit {
                        steps: series.cascades.len(),
                    });
                    continue;
                }

                match on_collision(&collision, self.bearings.len(), &self.collision_options) {
                    CascadeStep::Swing(next) => {
                        let energy = next
                            .first()
                            .map_or(0.0, |r| r.options.kinetic_energy_transferred);
                        let selected: Vec<usize> = next.iter().map(|r| r.position).collect();

                        tracing::info!(
                            collider = collision.collider,
                            direction = ?collision.direction_of_force,
                            energy,
                            ?selected,
                            "collision"
                        );

                        series.cascades.push(CascadeRecord {
                            collision,
                            selected,
                            energy,
                        });
                        queue.push_back(next);
                    }
                    CascadeStep::Halt(halt) => {
                        tracing::debug!(collider = collision.collider, ?halt, "cascade halted");
                        series.halt = Some(halt);
                    }
                }
            }
        }

        series
    }

    fn on_swing_series_end(&mut self) {
        if self.is_swinging() {
            self.lifecycle.send(LifecycleEvent::SeriesComplete);
            self.draggable = true;
            tracing::info!("swing series complete");
        }
    }

    /// Combine every bearing's timeline into one master timeline
    pub fn master_timeline(&self) -> MasterTimeline {
        let mut master = MasterTimeline::new();
        for bearing in &self.bearings {
            master.add(bearing.element(), bearing.timeline().clone());
        }
        master
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bearing::SwingDirection;

    fn cradle(damping: f32) -> Cradle {
        let scene = SceneConfig {
            energy_damping_decrement: damping,
            ..SceneConfig::default()
        };
        Cradle::from_scene(&scene).unwrap()
    }

    #[test]
    fn clockwise_drag_takes_prefix() {
        let mut c = cradle(15.0);
        c.on_drag_start(2, GestureDirection::Clockwise).unwrap();
        assert_eq!(c.objects_in_drag(), 0..3);
        assert_eq!(c.phase(), CradlePhase::Dragging);
        assert!(c.bearings()[..3].iter().all(Bearing::is_held));
        assert!(!c.bearings()[3].is_held());
        assert_eq!(c.bearings()[0].swing_direction(), SwingDirection::Clockwise);
    }

    #[test]
    fn counter_clockwise_drag_takes_suffix() {
        let mut c = cradle(15.0);
        c.on_drag_start(3, GestureDirection::CounterClockwise).unwrap();
        assert_eq!(c.objects_in_drag(), 3..5);

        c.on_drag(-30.0).unwrap();
        c.on_drag(-200.0).unwrap();
        assert_eq!(c.bearings()[3].current_rotation(), -85.0);
        assert_eq!(c.bearings()[4].current_rotation(), -85.0);
        assert_eq!(c.bearings()[2].current_rotation(), 0.0);
    }

    #[test]
    fn invalid_index_is_ignored() {
        let mut c = cradle(15.0);
        let err = c.on_drag_start(7, GestureDirection::Clockwise).unwrap_err();
        assert_eq!(err, CradleError::InvalidBearingIndex { index: 7, count: 5 });
        assert_eq!(c.phase(), CradlePhase::Idle);
        assert!(c.bearings().iter().all(|b| !b.is_held()));

        c.on_drag_start(4, GestureDirection::CounterClockwise).unwrap();
        let err = c.on_drag_end(-40.0, 9).unwrap_err();
        assert_eq!(err, CradleError::InvalidBearingIndex { index: 9, count: 5 });
        assert_eq!(c.phase(), CradlePhase::Dragging);
    }

    #[test]
    fn events_out_of_phase_are_rejected() {
        let mut c = cradle(15.0);
        assert_eq!(
            c.on_drag(10.0).unwrap_err(),
            CradleError::UnexpectedEvent {
                event: "drag",
                phase: CradlePhase::Idle
            }
        );

        c.on_drag_start(0, GestureDirection::Clockwise).unwrap();
        assert!(matches!(
            c.on_drag_start(1, GestureDirection::Clockwise),
            Err(CradleError::UnexpectedEvent { .. })
        ));
    }

    #[test]
    fn multi_bearing_release_moves_matching_group() {
        let mut c = cradle(10.0);
        c.on_drag_start(1, GestureDirection::Clockwise).unwrap();
        c.on_drag(60.0).unwrap();
        let series = c.on_drag_end(60.0, 1).unwrap();

        // bearings 0 and 1 fall back, then the tail pair flies out
        let first: Vec<usize> = series.swings[..2].iter().map(|s| s.position).collect();
        assert_eq!(first, vec![0, 1]);
        assert!(series.swings[1].will_instigate_collision);
        assert!(!series.swings[0].will_instigate_collision);

        let cascade = &series.cascades[0];
        assert_eq!(cascade.collision.collider, 1);
        assert_eq!(cascade.selected, vec![3, 4]);
        assert_eq!(cascade.energy, 40.0);

        assert!(c.advance(series.duration()));
        assert_eq!(c.phase(), CradlePhase::Idle);
        assert!(c.is_draggable());
    }

    #[test]
    fn series_stops_at_step_limit() {
        let scene = SceneConfig {
            energy_damping_decrement: 0.0,
            max_cascade_steps: 3,
            ..SceneConfig::default()
        };
        let mut c = Cradle::from_scene(&scene).unwrap();
        c.on_drag_start(4, GestureDirection::CounterClockwise).unwrap();
        let series = c.on_drag_end(-50.0, 4).unwrap();

        assert_eq!(series.cascades.len(), 3);
        assert_eq!(series.halt, Some(CascadeHalt::StepLimit { steps: 3 }));
        assert_eq!(c.phase(), CradlePhase::Swinging);
    }

    #[test]
    fn dragging_is_disabled_until_the_series_has_played() {
        let mut c = cradle(15.0);
        c.on_drag_start(4, GestureDirection::CounterClockwise).unwrap();
        c.on_drag(-60.0).unwrap();
        let series = c.on_drag_end(-60.0, 4).unwrap();

        assert!(series.duration() > 0.0);
        assert_eq!(c.phase(), CradlePhase::Swinging);
        assert!(!c.is_draggable());
        assert_eq!(c.playback_remaining(), series.duration());

        let start = DragEvent::Start {
            grabbed_index: 0,
            direction: GestureDirection::Clockwise,
        };
        assert_eq!(c.handle(start).unwrap_err(), CradleError::DragDisabled);
        assert_eq!(c.on_drag(10.0).unwrap_err(), CradleError::DragDisabled);

        assert!(!c.advance(series.duration() / 2.0));
        assert!(c.is_swinging());
        assert_eq!(c.handle(start).unwrap_err(), CradleError::DragDisabled);

        assert!(c.advance(series.duration()));
        assert_eq!(c.phase(), CradlePhase::Idle);
        assert!(c.is_draggable());
        assert_eq!(c.playback_remaining(), 0.0);
        assert!(!c.advance(1.0));
        assert!(c.handle(start).unwrap().is_none());
    }

    #[test]
    fn release_without_motion_ends_at_once() {
        let mut c = cradle(15.0);
        c.on_drag_start(2, GestureDirection::Clockwise).unwrap();
        let series = c.on_drag_end(0.0, 2).unwrap();

        assert_eq!(series.duration(), 0.0);
        assert_eq!(c.phase(), CradlePhase::Idle);
        assert!(c.is_draggable());
    }

    #[test]
    fn non_finite_rotations_are_rejected() {
        let mut c = cradle(15.0);
        c.on_drag_start(4, GestureDirection::CounterClockwise).unwrap();
        c.on_drag(-40.0).unwrap();

        assert_eq!(
            c.on_drag(f32::INFINITY).unwrap_err(),
            CradleError::InvalidRotation {
                rotation: f32::INFINITY
            }
        );
        assert!(matches!(
            c.on_drag_end(f32::NAN, 4),
            Err(CradleError::InvalidRotation { .. })
        ));
        assert_eq!(c.phase(), CradlePhase::Dragging);
        assert_eq!(c.bearings()[4].current_rotation(), -40.0);

        let series = c.on_drag_end(-40.0, 4).unwrap();
        assert!(series.halt.is_some());
        assert!(series.cascades.len() < 64);
        for bearing in c.bearings() {
            let rotation = bearing.current_rotation();
            assert!(rotation.is_finite());
            assert!((bearing.min_rotation()..=bearing.max_rotation()).contains(&rotation));
        }
    }

    #[test]
    fn release_must_name_the_grabbed_bearing() {
        let mut c = cradle(15.0);
        c.on_drag_start(1, GestureDirection::Clockwise).unwrap();
        c.on_drag(50.0).unwrap();

        assert_eq!(
            c.on_drag_end(50.0, 0).unwrap_err(),
            CradleError::GrabMismatch {
                expected: 1,
                found: 0
            }
        );
        assert_eq!(c.phase(), CradlePhase::Dragging);
        assert_eq!(c.objects_in_drag(), 0..2);

        let series = c.on_drag_end(50.0, 1).unwrap();
        let instigators: Vec<usize> = series.swings[..2]
            .iter()
            .filter(|s| s.will_instigate_collision)
            .map(|s| s.position)
            .collect();
        assert_eq!(instigators, vec![1]);
    }

    #[test]
    fn handle_dispatches_gesture_events() {
        let mut c = cradle(30.0);
        assert!(c
            .handle(DragEvent::Start {
                grabbed_index: 0,
                direction: GestureDirection::Clockwise,
            })
            .unwrap()
            .is_none());
        assert!(c.handle(DragEvent::Drag { rotation: 45.0 }).unwrap().is_none());

        let series = c
            .handle(DragEvent::End {
                rotation: 45.0,
                grabbed_index: 0,
            })
            .unwrap()
            .unwrap();
        assert_eq!(series.swings[0].position, 0);
        assert_eq!(series.cascades[0].selected, vec![4]);
    }

    #[test]
    fn master_timeline_has_a_track_per_bearing() {
        let mut c = cradle(30.0);
        c.on_drag_start(0, GestureDirection::Clockwise).unwrap();
        c.on_drag(45.0).unwrap();
        let series = c.on_drag_end(45.0, 0).unwrap();

        let master = c.master_timeline();
        assert_eq!(master.track_count(), 5);
        assert!((master.duration() - series.finished_at).abs() < 1e-4);

        let settled = master.sample_at(master.duration());
        assert!(settled.iter().all(|(_, rotation)| *rotation == 0.0));
    }
}
