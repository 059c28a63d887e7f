use crate::{
    math::{Point3, lerp_points, up},
    settings::GaitSettings,
};

/// One foot's arc from its settled position to a footfall target.
///
/// Plain polled state: the scheduler calls [`StepMotion::advance`] once per tick
/// until it reports `finished`, or drops the motion to cancel it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepMotion {
    from: Point3,
    to: Point3,
    arc_height_scale: f32,
    t: f32,
}

/// Foot position produced by one [`StepMotion::advance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSample {
    pub position: Point3,
    pub finished: bool,
}

impl StepMotion {
    /// `arc_height_scale` is clamped to `[0, 1]`.
    pub fn new(from: Point3, to: Point3, arc_height_scale: f32) -> Self {
        Self {
            from,
            to,
            arc_height_scale: arc_height_scale.clamp(0.0, 1.0),
            t: 0.0,
        }
    }

    #[inline]
    pub fn from(&self) -> Point3 {
        self.from
    }

    #[inline]
    pub fn target(&self) -> Point3 {
        self.to
    }

    /// Normalized progress in `[0, 1]`.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.t.min(1.0)
    }

    /// Move the arc forward by `dt * step_speed`.
    pub fn advance(&mut self, dt: f32, settings: &GaitSettings) -> StepSample {
        self.t += dt.max(0.0) * settings.step_speed;
        if self.t >= 1.0 {
            self.t = 1.0;
            return StepSample {
                position: self.to,
                finished: true,
            };
        }
        StepSample {
            position: self.sample(self.t, settings),
            finished: false,
        }
    }

    /// Foot position at normalized time `t` (no state change).
    pub fn sample(&self, t: f32, settings: &GaitSettings) -> Point3 {
        let lift = settings.arc_curve.evaluate(t) * settings.step_height * self.arc_height_scale;
        let lifted_target = self.to + up() * lift;
        lerp_points(&self.from, &lifted_target, settings.easing_curve.evaluate(t))
    }
}
