//! Body motion sources and the per-tick body sample.
//!
//! The engine never owns the body. It reads a pose and (optionally) a velocity
//! from a [`BodyMotionSource`] once per tick and turns them into a
//! [`BodySample`] that every leg predicts against.

use rapier3d::dynamics::RigidBody;

use crate::math::{Iso, Point3, Vec3, move_towards};

/// Anything that can report where the creature's body is and how fast it moves.
pub trait BodyMotionSource {
    /// World pose of the body origin.
    fn pose(&self) -> Iso;

    /// World linear velocity, if the source knows it.
    ///
    /// `None` means the engine derives velocity from position deltas between ticks.
    fn linear_velocity(&self) -> Option<Vec3> {
        None
    }
}

/// A plain transform: velocity is derived from how it moves between ticks.
impl BodyMotionSource for Iso {
    fn pose(&self) -> Iso {
        *self
    }
}

/// A physics-driven body.
impl BodyMotionSource for RigidBody {
    fn pose(&self) -> Iso {
        *self.position()
    }

    fn linear_velocity(&self) -> Option<Vec3> {
        Some(*self.linvel())
    }
}

/// Controller-style body: a pose plus the velocity its controller last applied.
#[derive(Clone, Copy, Debug)]
pub struct KinematicBody {
    pub pose: Iso,
    pub velocity: Vec3,
}

impl KinematicBody {
    pub fn new(pose: Iso, velocity: Vec3) -> Self {
        Self { pose, velocity }
    }
}

impl BodyMotionSource for KinematicBody {
    fn pose(&self) -> Iso {
        self.pose
    }

    fn linear_velocity(&self) -> Option<Vec3> {
        Some(self.velocity)
    }
}

/// Body state shared by every leg within one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySample {
    pub pose: Iso,
    /// Velocity as reported (or derived) this tick.
    pub raw_velocity: Vec3,
    /// Rate-limited velocity used for prediction.
    pub velocity: Vec3,
}

impl BodySample {
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }
}

/// Velocity history used to produce smoothed body samples.
#[derive(Clone, Copy, Debug)]
pub struct VelocityTracker {
    last_position: Point3,
    last_velocity: Vec3,
}

impl VelocityTracker {
    pub fn new(position: Point3) -> Self {
        Self {
            last_position: position,
            last_velocity: Vec3::zeros(),
        }
    }

    /// Forget motion history so the next sample starts from rest at `position`.
    pub fn reset(&mut self, position: Point3) {
        self.last_position = position;
        self.last_velocity = Vec3::zeros();
    }

    /// Sample `body`, moving the smoothed velocity toward the raw one by at most
    /// `dt * smoothing`.
    pub fn sample<B: BodyMotionSource + ?Sized>(
        &mut self,
        body: &B,
        dt: f32,
        smoothing: f32,
    ) -> BodySample {
        let pose = body.pose();
        let position = Point3::from(pose.translation.vector);

        let raw_velocity = body.linear_velocity().unwrap_or_else(|| {
            if dt > 0.0 {
                (position - self.last_position) / dt
            } else {
                Vec3::zeros()
            }
        });
        let velocity = move_towards(self.last_velocity, raw_velocity, dt.max(0.0) * smoothing);

        self.last_position = position;
        self.last_velocity = velocity;

        BodySample {
            pose,
            raw_velocity,
            velocity,
        }
    }
}
