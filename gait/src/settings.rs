/*!
Gait configuration.

[`GaitSettings`] is a plain value type. Every field has a default taken from
[`crate::constants`], and the whole struct deserializes with `#[serde(default)]`,
so a TOML table only needs to name what it changes:

```toml
step_height = 0.4
velocity_clamp = 6.0
timings = { manual = [0.0, 0.0, 0.5, 0.5] }

[ground]
ray_offset = 0.3
ray_length = 0.5
sphere_radius = 0.15
```
*/

use serde::{Deserialize, Serialize};

use crate::{constants::*, curve::Curve, error::GaitError, ground::GroundProbe};

/// How each leg's phase timer is seeded (at startup, on resync and on timing refresh).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timings {
    /// Leg `i` starts at `i * offset`.
    Offset(f32),
    /// Explicit per-leg values; the table length must equal the leg count.
    Manual(Vec<f32>),
}

impl Default for Timings {
    fn default() -> Self {
        Self::Offset(DEFAULT_TIMINGS_OFFSET)
    }
}

/// What to do when stepping resumes after being suspended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResyncSettings {
    /// Resync when the engine is re-enabled or the body lands.
    pub on_enable_and_land: bool,
    /// Legs farther than this from their anchor are teleported to it (meters).
    pub snap_distance: f32,
    /// Fit the anchor to the ground before comparing/teleporting.
    pub snap_to_ground: bool,
}

impl Default for ResyncSettings {
    fn default() -> Self {
        Self {
            on_enable_and_land: true,
            snap_distance: DEFAULT_RESYNC_SNAP_DISTANCE,
            snap_to_ground: true,
        }
    }
}

/// Body support probe used to gate stepping while airborne.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyGroundCheck {
    pub only_step_when_grounded: bool,
    /// Probe start above the body origin (meters).
    pub offset: f32,
    /// Probe length (meters).
    pub distance: f32,
}

impl Default for BodyGroundCheck {
    fn default() -> Self {
        Self {
            only_step_when_grounded: true,
            offset: DEFAULT_BODY_GROUND_CHECK_OFFSET,
            distance: DEFAULT_BODY_GROUND_CHECK_DISTANCE,
        }
    }
}

/// Surfaces on which the body slides rather than walks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideSettings {
    /// Surface tag that disables stepping; `None` turns the rule off.
    pub tag: Option<String>,
    /// Cancel in-flight steps when the body enters a slide surface.
    pub cancel_steps: bool,
}

impl Default for SlideSettings {
    fn default() -> Self {
        Self {
            tag: None,
            cancel_steps: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitSettings {
    /// Reference step length for arc height scaling (meters).
    pub step_distance: f32,
    /// Peak lift of a full-length step (meters).
    pub step_height: f32,
    /// Arc progress per second (`1 / step duration`).
    pub step_speed: f32,
    pub velocity_multiplier: f32,
    pub velocity_clamp: f32,
    /// Max change of the smoothed body velocity per second.
    pub velocity_smoothing: f32,
    pub cycle_speed: f32,
    pub cycle_limit: f32,
    pub timings: Timings,
    /// Reset phase timers to their offsets this often (seconds); `None` never refreshes.
    pub refresh_timing_interval: Option<f32>,
    /// Vertical lift over normalized step time.
    pub arc_curve: Curve,
    /// Horizontal progress over normalized step time.
    pub easing_curve: Curve,
    pub ground: GroundProbe,
    pub resync: ResyncSettings,
    pub body_ground_check: BodyGroundCheck,
    pub slide: SlideSettings,
    /// Completed steps at or below this anchor distance raise no event (meters).
    pub step_event_min_distance: f32,
}

impl Default for GaitSettings {
    fn default() -> Self {
        Self {
            step_distance: DEFAULT_STEP_DISTANCE,
            step_height: DEFAULT_STEP_HEIGHT,
            step_speed: DEFAULT_STEP_SPEED,
            velocity_multiplier: DEFAULT_VELOCITY_MULTIPLIER,
            velocity_clamp: DEFAULT_VELOCITY_CLAMP,
            velocity_smoothing: DEFAULT_VELOCITY_SMOOTHING,
            cycle_speed: DEFAULT_CYCLE_SPEED,
            cycle_limit: DEFAULT_CYCLE_LIMIT,
            timings: Timings::default(),
            refresh_timing_interval: Some(DEFAULT_REFRESH_TIMING_INTERVAL),
            arc_curve: Curve::step_arc(),
            easing_curve: Curve::ease_in_out(0.0, 0.0, 1.0, 1.0),
            ground: GroundProbe::default(),
            resync: ResyncSettings::default(),
            body_ground_check: BodyGroundCheck::default(),
            slide: SlideSettings::default(),
            step_event_min_distance: DEFAULT_STEP_EVENT_MIN_DISTANCE,
        }
    }
}

/// Live replacements for the speed-dependent tunables (e.g. walk vs. sprint).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaitOverrides {
    pub velocity_multiplier: f32,
    pub cycle_speed: f32,
    pub velocity_clamp: f32,
}

impl GaitSettings {
    /// Parse a (possibly partial) TOML document and validate it.
    pub fn from_toml_str(src: &str) -> Result<Self, GaitError> {
        let settings: Self = toml::from_str(src)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the engine cannot run with.
    ///
    /// The manual timing table is not checked here because it depends on the leg
    /// count; see [`GaitSettings::check_timings`].
    pub fn validate(&self) -> Result<(), GaitError> {
        positive("step_distance", self.step_distance)?;
        positive("step_speed", self.step_speed)?;
        positive("cycle_limit", self.cycle_limit)?;
        non_negative("step_height", self.step_height)?;
        non_negative("velocity_multiplier", self.velocity_multiplier)?;
        non_negative("velocity_clamp", self.velocity_clamp)?;
        non_negative("velocity_smoothing", self.velocity_smoothing)?;
        non_negative("cycle_speed", self.cycle_speed)?;
        non_negative("ground.ray_length", self.ground.ray_length)?;
        non_negative("ground.sphere_radius", self.ground.sphere_radius)?;
        non_negative("resync.snap_distance", self.resync.snap_distance)?;
        non_negative("body_ground_check.distance", self.body_ground_check.distance)?;
        non_negative("step_event_min_distance", self.step_event_min_distance)?;
        if let Some(interval) = self.refresh_timing_interval {
            positive("refresh_timing_interval", interval)?;
        }
        if let Timings::Offset(offset) = self.timings {
            finite("timings.offset", offset)?;
        }
        self.arc_curve.validate()?;
        self.easing_curve.validate()?;
        Ok(())
    }

    /// Check that a manual timing table matches `leg_count`.
    pub fn check_timings(&self, leg_count: usize) -> Result<(), GaitError> {
        match &self.timings {
            Timings::Manual(table) if table.len() != leg_count => {
                Err(GaitError::ManualTimingsLength {
                    expected: leg_count,
                    actual: table.len(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Initial phase timer per leg.
    ///
    /// A mismatched manual table is logged and replaced by the default offset pattern.
    pub fn phase_offsets(&self, leg_count: usize) -> Vec<f32> {
        match &self.timings {
            Timings::Manual(table) if table.len() == leg_count => table.clone(),
            Timings::Manual(_) => {
                if let Err(err) = self.check_timings(leg_count) {
                    log::error!("{err}; falling back to offsets of {DEFAULT_TIMINGS_OFFSET}s");
                }
                offset_pattern(leg_count, DEFAULT_TIMINGS_OFFSET)
            }
            Timings::Offset(offset) => offset_pattern(leg_count, *offset),
        }
    }
}

impl GaitOverrides {
    /// Same bounds as the matching [`GaitSettings`] fields.
    pub fn validate(&self) -> Result<(), GaitError> {
        non_negative("overrides.velocity_multiplier", self.velocity_multiplier)?;
        non_negative("overrides.cycle_speed", self.cycle_speed)?;
        non_negative("overrides.velocity_clamp", self.velocity_clamp)?;
        Ok(())
    }
}

fn offset_pattern(leg_count: usize, offset: f32) -> Vec<f32> {
    (0..leg_count).map(|i| i as f32 * offset).collect()
}

fn positive(name: &'static str, value: f32) -> Result<(), GaitError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GaitError::InvalidSetting { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), GaitError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GaitError::InvalidSetting { name, value })
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), GaitError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GaitError::InvalidSetting { name, value })
    }
}
