use crate::{
    math::{Iso, Point3},
    step::StepMotion,
};

/// Externally owned foot handle (an IK target, a debug marker, ...).
///
/// The engine reads `position` once at construction and writes it every tick.
pub trait LegTarget {
    fn position(&self) -> Point3;
    fn set_position(&mut self, position: Point3);
}

impl LegTarget for Point3 {
    fn position(&self) -> Point3 {
        *self
    }

    fn set_position(&mut self, position: Point3) {
        *self = position;
    }
}

/// Transform handle: only the translation is driven, rotation is left alone.
impl LegTarget for Iso {
    fn position(&self) -> Point3 {
        Point3::from(self.translation.vector)
    }

    fn set_position(&mut self, position: Point3) {
        self.translation.vector = position.coords;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LegPhase {
    /// Planted and ground-snapped every tick.
    #[default]
    Idle,
    Stepping(StepMotion),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Leg {
    /// Neutral foot placement in body space. Fixed for the leg's lifetime.
    rest_anchor_local: Point3,
    pub(crate) position: Point3,
    /// Last committed position: where idle snapping and the next arc start from.
    pub(crate) settled: Point3,
    pub(crate) phase_timer: f32,
    pub(crate) last_step_distance: f32,
    pub(crate) arc_height_scale: f32,
    pub(crate) phase: LegPhase,
}

impl Leg {
    /// A leg whose foot currently sits at world `position` under a body at `body_pose`.
    pub fn new(body_pose: &Iso, position: Point3, phase_timer: f32) -> Self {
        Self {
            rest_anchor_local: body_pose.inverse_transform_point(&position),
            position,
            settled: position,
            phase_timer,
            last_step_distance: 0.0,
            arc_height_scale: 0.0,
            phase: LegPhase::Idle,
        }
    }

    #[inline]
    pub fn rest_anchor_local(&self) -> Point3 {
        self.rest_anchor_local
    }

    /// The neutral foot placement for a body at `body_pose`.
    #[inline]
    pub fn world_anchor(&self, body_pose: &Iso) -> Point3 {
        body_pose.transform_point(&self.rest_anchor_local)
    }

    #[inline]
    pub fn position(&self) -> Point3 {
        self.position
    }

    #[inline]
    pub fn settled(&self) -> Point3 {
        self.settled
    }

    #[inline]
    pub fn phase_timer(&self) -> f32 {
        self.phase_timer
    }

    /// Anchor-to-foot distance recorded when the current or last step began.
    #[inline]
    pub fn last_step_distance(&self) -> f32 {
        self.last_step_distance
    }

    #[inline]
    pub fn arc_height_scale(&self) -> f32 {
        self.arc_height_scale
    }

    #[inline]
    pub fn phase(&self) -> &LegPhase {
        &self.phase
    }

    #[inline]
    pub fn is_stepping(&self) -> bool {
        matches!(self.phase, LegPhase::Stepping(_))
    }

    /// Drop any in-flight arc, leaving the foot where it is.
    pub(crate) fn cancel_step(&mut self) -> bool {
        if self.is_stepping() {
            self.phase = LegPhase::Idle;
            self.settled = self.position;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Quat, Vec3};

    #[test]
    fn rest_anchor_follows_body_pose() {
        let spawn = Iso::translation(1.0, 0.0, 0.0);
        let leg = Leg::new(&spawn, Point3::new(1.5, 0.0, 1.0), 0.0);
        assert!((leg.rest_anchor_local() - Point3::new(0.5, 0.0, 1.0)).norm() < 1.0e-6);

        // Quarter turn about +Y maps local +Z onto world +X.
        let turned = Iso::from_parts(
            Vec3::new(10.0, 0.0, 0.0).into(),
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2),
        );
        let anchor = leg.world_anchor(&turned);
        assert!((anchor - Point3::new(11.0, 0.0, -0.5)).norm() < 1.0e-5);
    }

    #[test]
    fn cancel_freezes_foot_in_place() {
        let mut leg = Leg::new(&Iso::identity(), Point3::origin(), 0.0);
        assert!(!leg.cancel_step());

        leg.phase = LegPhase::Stepping(StepMotion::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            1.0,
        ));
        leg.position = Point3::new(0.4, 0.3, 0.0);

        assert!(leg.cancel_step());
        assert!(!leg.is_stepping());
        assert_eq!(leg.settled(), Point3::new(0.4, 0.3, 0.0));
    }

    #[test]
    fn transform_target_keeps_rotation() {
        let rot = Quat::from_axis_angle(&Vec3::x_axis(), 0.3);
        let mut handle = Iso::from_parts(Vec3::zeros().into(), rot);
        handle.set_position(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(LegTarget::position(&handle), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(handle.rotation, rot);
    }
}
