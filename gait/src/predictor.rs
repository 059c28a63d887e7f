/*!
Footfall prediction.

A leg that is due to step lands ahead of its neutral anchor along the planar
body velocity. The step length grows with speed and saturates at
`velocity_clamp`:

```text
divider = remap(speed, 0, velocity_clamp, 1, 2)
length  = clamp(speed, 0, velocity_clamp) / divider * velocity_multiplier
```

The raw target is then fitted to the ground and validated. A target that fails
validation is a missed step, not an error.
*/

use crate::{
    constants::{DIVISOR_EPS, MIN_VELOCITY_SQ},
    ground::{GroundProbe, GroundQuery, fit_to_ground, is_valid_step_point},
    leg::Leg,
    math::{Iso, Point3, Vec3, remap, to_planar},
};

/// Tunables the predictor reads, with runtime overrides already applied.
#[derive(Clone, Copy, Debug)]
pub struct PredictParams<'a> {
    pub velocity_multiplier: f32,
    pub velocity_clamp: f32,
    pub step_distance: f32,
    pub probe: &'a GroundProbe,
}

/// A validated landing spot for one leg.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footfall {
    pub target: Point3,
    /// Lift multiplier for this step, in `[0, 1]`.
    pub arc_height_scale: f32,
    /// Anchor-to-foot distance when the step began.
    pub last_step_distance: f32,
}

/// Cycle-rate multiplier for a body moving at `speed`: 1 at rest, 2 at `velocity_clamp`.
#[inline]
pub fn cycle_multiplier(speed: f32, velocity_clamp: f32) -> f32 {
    remap(speed, 0.0, velocity_clamp, 1.0, 2.0)
}

/// How far ahead of the anchor a foot lands for a body moving at `speed`.
#[inline]
pub fn step_length(speed: f32, velocity_clamp: f32, velocity_multiplier: f32) -> f32 {
    let clamp = velocity_clamp.max(0.0);
    speed.clamp(0.0, clamp) / cycle_multiplier(speed, clamp) * velocity_multiplier
}

/// Predict where `leg` should land for a body at `pose` moving with `velocity`.
pub fn predict_footfall<G: GroundQuery + ?Sized>(
    leg: &Leg,
    pose: &Iso,
    velocity: &Vec3,
    params: &PredictParams<'_>,
    ground: &G,
) -> Option<Footfall> {
    let anchor = leg.world_anchor(pose);

    let planar = to_planar(velocity);
    let direction = if planar.norm_squared() > MIN_VELOCITY_SQ {
        planar.normalize()
    } else {
        Vec3::zeros()
    };
    let length = step_length(
        planar.norm(),
        params.velocity_clamp,
        params.velocity_multiplier,
    );
    let raw = anchor + direction * length;

    let target = fit_to_ground(ground, &raw, params.probe).point;
    if !is_valid_step_point(ground, &target, params.probe) {
        return None;
    }

    let current = leg.position();
    Some(Footfall {
        target,
        arc_height_scale: ((current - target).norm() / params.step_distance.max(DIVISOR_EPS))
            .clamp(0.0, 1.0),
        last_step_distance: (current - anchor).norm(),
    })
}
