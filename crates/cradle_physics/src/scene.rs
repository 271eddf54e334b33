//! Scene configuration
//!
//! Static geometry (rotation origins and ball positions) and the tuning
//! constants of the swing engine. Read once at startup; nothing here changes
//! while the scene runs.

use crate::bearing::{Bearing, ControlPoint, Stepping};
use crate::collision::CollisionOptions;
use crate::error::{CradleError, Result};
use serde::{Deserialize, Serialize};

/// Geometry of one bearing, as laid out in the scene markup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingGeometry {
    /// Left-to-right index of the bearing
    pub index: usize,
    /// Rotation origin x
    pub control_x: f32,
    /// Rotation origin y
    pub control_y: f32,
    /// Ball centre y
    pub ball_y: f32,
}

impl BearingGeometry {
    pub fn control_point(&self) -> ControlPoint {
        ControlPoint {
            x: self.control_x,
            y: self.control_y,
        }
    }

    /// Distance from the rotation origin to the ball centre
    pub fn length(&self) -> f32 {
        (self.ball_y - self.control_y).abs()
    }

    fn is_finite(&self) -> bool {
        self.control_x.is_finite() && self.control_y.is_finite() && self.ball_y.is_finite()
    }
}

/// Top-level scene configuration (cradle.toml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Angular bound on either side of rest, in degrees
    #[serde(default = "default_max_rotation")]
    pub max_rotation: f32,
    #[serde(default = "default_mass_kg")]
    pub mass_kg: f32,
    /// Simulated seconds per integration step
    #[serde(default = "default_frame_step")]
    pub frame_step: f32,
    /// Simulated seconds per swing phase
    #[serde(default = "default_phase_duration")]
    pub phase_duration: f32,
    /// Energy lost per bearing set in motion by a collision; no damping when
    /// omitted
    #[serde(default)]
    pub energy_damping_decrement: f32,
    /// Upper bound on cascade steps per release
    #[serde(default = "default_max_cascade_steps")]
    pub max_cascade_steps: usize,
    #[serde(default = "default_bearings")]
    pub bearings: Vec<BearingGeometry>,
}

fn default_max_rotation() -> f32 {
    85.0
}

fn default_mass_kg() -> f32 {
    0.5
}

fn default_frame_step() -> f32 {
    1.0 / 60.0
}

fn default_phase_duration() -> f32 {
    2.0
}

fn default_max_cascade_steps() -> usize {
    64
}

fn default_bearings() -> Vec<BearingGeometry> {
    (0..5)
        .map(|index| BearingGeometry {
            index,
            control_x: 200.0 + 50.0 * index as f32,
            control_y: 40.0,
            ball_y: 290.0,
        })
        .collect()
}

/// Damping of the reference scene written by `cradle init`
pub const REFERENCE_ENERGY_DAMPING_DECREMENT: f32 = 15.0;

/// Longest phase the stepper will integrate, in steps
const MAX_STEPS_PER_PHASE: f32 = 100_000.0;

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_rotation: default_max_rotation(),
            mass_kg: default_mass_kg(),
            frame_step: default_frame_step(),
            phase_duration: default_phase_duration(),
            energy_damping_decrement: REFERENCE_ENERGY_DAMPING_DECREMENT,
            max_cascade_steps: default_max_cascade_steps(),
            bearings: default_bearings(),
        }
    }
}

impl SceneConfig {
    /// Parse and validate a scene from TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let scene: SceneConfig =
            toml::from_str(input).map_err(|e| CradleError::Configuration(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CradleError::Configuration(e.to_string()))
    }

    pub fn stepping(&self) -> Stepping {
        Stepping {
            frame_step: self.frame_step,
            phase_duration: self.phase_duration,
        }
    }

    pub fn collision_options(&self) -> CollisionOptions {
        CollisionOptions {
            energy_damping_decrement: self.energy_damping_decrement,
        }
    }

    /// Check that the scene can start
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(CradleError::Configuration(msg));

        if self.bearings.is_empty() {
            return fail("scene has no bearings".to_string());
        }
        if !(self.max_rotation > 0.0 && self.max_rotation < 180.0) {
            return fail(format!(
                "max_rotation must be within (0, 180) degrees, got {}",
                self.max_rotation
            ));
        }
        if !(self.frame_step > 0.0 && self.frame_step.is_finite()) {
            return fail(format!("frame_step must be positive, got {}", self.frame_step));
        }
        if !(self.phase_duration > 0.0 && self.phase_duration.is_finite()) {
            return fail(format!(
                "phase_duration must be positive, got {}",
                self.phase_duration
            ));
        }
        if self.phase_duration / self.frame_step > MAX_STEPS_PER_PHASE {
            return fail(format!(
                "phase_duration / frame_step exceeds {MAX_STEPS_PER_PHASE} steps"
            ));
        }
        if !(self.energy_damping_decrement >= 0.0 && self.energy_damping_decrement.is_finite()) {
            return fail(format!(
                "energy_damping_decrement must be non-negative, got {}",
                self.energy_damping_decrement
            ));
        }
        if !(self.mass_kg >= 0.0 && self.mass_kg.is_finite()) {
            return fail(format!("mass_kg must be non-negative, got {}", self.mass_kg));
        }
        if self.max_cascade_steps == 0 {
            return fail("max_cascade_steps must be at least 1".to_string());
        }

        if let Some(geometry) = self.bearings.iter().find(|g| !g.is_finite()) {
            return fail(format!(
                "bearing {} has non-finite coordinates",
                geometry.index
            ));
        }

        let mut indices: Vec<usize> = self.bearings.iter().map(|g| g.index).collect();
        indices.sort_unstable();
        if let Some((expected, &found)) = indices
            .iter()
            .enumerate()
            .find(|(expected, found)| *expected != **found)
        {
            return fail(format!(
                "bearing indices must run 0..{} without gaps or duplicates (expected {expected}, found {found})",
                indices.len()
            ));
        }

        Ok(())
    }

    /// Create the bearings of this scene, ordered by their index
    pub fn build_bearings(&self) -> Result<Vec<Bearing>> {
        self.validate()?;

        let mut geometry = self.bearings.clone();
        geometry.sort_by_key(|g| g.index);

        let stepping = self.stepping();
        Ok(geometry
            .iter()
            .map(|g| {
                Bearing::new(g.index, self.max_rotation, g.control_point())
                    .with_physics(self.mass_kg, g.length())
                    .with_stepping(stepping)
            })
            .collect())
    }
}
