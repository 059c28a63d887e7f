/*!
Gait tuning defaults and tolerances.

These constants are the defaults behind [`crate::settings::GaitSettings`].
Keeping them together makes tuning easier; per-creature values should come
from configuration and fall back to these.

Notes
- Distances are in meters, time in seconds.
- "Cycle" values are in phase-timer units: a timer advancing at
  `cycle_speed = 1.0` gains one unit per second.
*/

/// Reference step length used to scale the foot-lift arc (meters).
/// Steps shorter than this lift the foot proportionally lower.
pub const DEFAULT_STEP_DISTANCE: f32 = 1.0;

/// Peak foot lift of a full-length step (meters).
pub const DEFAULT_STEP_HEIGHT: f32 = 1.0;

/// Step arc progress per second. A step lasts `1 / DEFAULT_STEP_SPEED` seconds.
pub const DEFAULT_STEP_SPEED: f32 = 5.0;

/// How far ahead of its anchor a foot lands per unit of (clamped) body speed.
pub const DEFAULT_VELOCITY_MULTIPLIER: f32 = 0.4;

/// Body speed at which the step length and cycle rate saturate (m/s).
pub const DEFAULT_VELOCITY_CLAMP: f32 = 4.0;

/// Maximum change of the smoothed body velocity per second (m/s^2).
/// Keeps collision-response spikes out of footfall prediction.
pub const DEFAULT_VELOCITY_SMOOTHING: f32 = 45.0;

/// Phase-timer gain per second at rest.
pub const DEFAULT_CYCLE_SPEED: f32 = 1.0;

/// Phase-timer value at which a leg becomes due to step.
pub const DEFAULT_CYCLE_LIMIT: f32 = 1.0;

/// Phase offset between consecutive legs when no manual table is given.
pub const DEFAULT_TIMINGS_OFFSET: f32 = 0.25;

/// Height above a probe origin where downward leg casts start (meters).
pub const DEFAULT_LEG_RAY_OFFSET: f32 = 3.0;

/// Length of downward leg casts (meters).
pub const DEFAULT_LEG_RAY_LENGTH: f32 = 6.0;

/// Radius of the fallback sphere cast used when the thin ray misses (meters).
pub const DEFAULT_SPHERE_CAST_RADIUS: f32 = 1.0;

/// Phase timers are reset to their offsets this often (seconds).
pub const DEFAULT_REFRESH_TIMING_INTERVAL: f32 = 60.0;

/// On resync, legs farther than this from their anchor are teleported (meters).
pub const DEFAULT_RESYNC_SNAP_DISTANCE: f32 = 1.25;

/// Start of the body ground probe above the body origin (meters).
pub const DEFAULT_BODY_GROUND_CHECK_OFFSET: f32 = 0.2;

/// Length of the body ground probe (meters).
pub const DEFAULT_BODY_GROUND_CHECK_DISTANCE: f32 = 1.2;

/// Completed steps whose anchor-to-foot distance is at or below this do not
/// produce a step-finished event (meters).
pub const DEFAULT_STEP_EVENT_MIN_DISTANCE: f32 = 0.3;

/// Squared planar speed below which the body is treated as not moving (m^2/s^2).
pub const MIN_VELOCITY_SQ: f32 = 1.0e-4;

/// Lower bound for divisors that come from configuration.
pub const DIVISOR_EPS: f32 = 1.0e-4;

/// Lift above a candidate point for the "inside a collider" overlap test (meters).
pub const VALIDATION_OVERLAP_LIFT: f32 = 0.01;

/// Length of the upward "under a collider" validation ray (meters).
pub const VALIDATION_UP_RAY_LENGTH: f32 = 1.0;

/// Foot-height probe: start above the foot and maximum downward reach (meters).
pub const FOOT_HEIGHT_PROBE_OFFSET: f32 = 0.1;
pub const FOOT_HEIGHT_PROBE_DISTANCE: f32 = 10.0;

/// Footstep surface lookup: start above the foot and downward reach (meters).
pub const FOOTSTEP_PROBE_OFFSET: f32 = 0.15;
pub const FOOTSTEP_PROBE_DISTANCE: f32 = 0.6;
