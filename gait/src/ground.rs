/*!
Ground queries.

[`GroundQuery`] is the seam to whatever owns the collision geometry: it only
needs three primitive casts. The gait-level probes built on top of them
(ground fitting, step validation, body support, foot height, surface lookup)
live here as free functions so every backend behaves the same.
*/

use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_LEG_RAY_LENGTH, DEFAULT_LEG_RAY_OFFSET, DEFAULT_SPHERE_CAST_RADIUS,
        FOOT_HEIGHT_PROBE_DISTANCE, FOOT_HEIGHT_PROBE_OFFSET, FOOTSTEP_PROBE_DISTANCE,
        FOOTSTEP_PROBE_OFFSET, VALIDATION_OVERLAP_LIFT, VALIDATION_UP_RAY_LENGTH,
    },
    math::{Point3, Vec3, up},
    surface::SurfaceTag,
};

/// Result of a downward ground cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundHit {
    /// Contact point on the surface (world space).
    pub point: Point3,
    /// Surface normal at the contact, facing the caster.
    pub normal: Vec3,
    /// Distance travelled by the cast before contact (meters).
    pub distance: f32,
    pub tag: Option<SurfaceTag>,
}

/// Primitive spatial queries against solid (non-trigger) world geometry.
///
/// Layer filtering is the implementor's concern: a backend hands out a view that
/// already carries its layer mask.
pub trait GroundQuery {
    /// Cast straight down from `origin` up to `max_distance`.
    ///
    /// `radius = None` casts a ray and reports the contact point. `Some(r)` sweeps a
    /// sphere of radius `r` and reports its lowest point at contact. `distance` is
    /// always how far the origin travelled.
    fn cast_down(&self, origin: &Point3, max_distance: f32, radius: Option<f32>)
    -> Option<GroundHit>;

    /// Whether `point` lies inside any solid collider.
    fn contains_point(&self, point: &Point3) -> bool;

    /// Whether a ray cast straight up from `origin` hits anything within `max_distance`.
    fn cast_up(&self, origin: &Point3, max_distance: f32) -> bool;

    /// Human-readable name of an interned surface tag.
    fn tag_name(&self, _tag: SurfaceTag) -> Option<&str> {
        None
    }
}

/// Leg cast parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundProbe {
    /// Casts start this far above the probed point (meters).
    pub ray_offset: f32,
    /// Downward reach of each cast (meters).
    pub ray_length: f32,
    /// Radius of the fallback sphere cast (meters); 0 disables it.
    pub sphere_radius: f32,
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self {
            ray_offset: DEFAULT_LEG_RAY_OFFSET,
            ray_length: DEFAULT_LEG_RAY_LENGTH,
            sphere_radius: DEFAULT_SPHERE_CAST_RADIUS,
        }
    }
}

impl GroundProbe {
    #[inline]
    fn start(&self, point: &Point3) -> Point3 {
        point + up() * self.ray_offset
    }

    #[inline]
    fn sphere(&self) -> Option<f32> {
        (self.sphere_radius > 0.0).then_some(self.sphere_radius)
    }
}

/// Outcome of [`fit_to_ground`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundFit {
    /// The grounded point, or the unmodified origin when nothing was hit.
    pub point: Point3,
    pub hit: Option<GroundHit>,
}

/// Snap `origin` onto the ground below it.
///
/// - Casts a thin ray from `origin + up * ray_offset`.
/// - If that misses, retries with a sphere cast of `sphere_radius`.
/// - If both miss, returns `origin` unchanged (`hit = None`).
pub fn fit_to_ground<G: GroundQuery + ?Sized>(
    ground: &G,
    origin: &Point3,
    probe: &GroundProbe,
) -> GroundFit {
    let start = probe.start(origin);
    let hit = ground.cast_down(&start, probe.ray_length, None).or_else(|| {
        probe
            .sphere()
            .and_then(|r| ground.cast_down(&start, probe.ray_length, Some(r)))
    });

    GroundFit {
        point: hit.map_or(*origin, |h| h.point),
        hit,
    }
}

/// Whether a foot may be planted at `point`.
///
/// Accepts the point if a downward sphere cast from above finds ground, or, failing
/// that, if the point sits just inside a collider or directly under one. Both
/// fallback probes start slightly above `point` so the surface it rests on does
/// not count as a ceiling.
pub fn is_valid_step_point<G: GroundQuery + ?Sized>(
    ground: &G,
    point: &Point3,
    probe: &GroundProbe,
) -> bool {
    if ground
        .cast_down(&probe.start(point), probe.ray_length, probe.sphere())
        .is_some()
    {
        return true;
    }

    let lifted = point + up() * VALIDATION_OVERLAP_LIFT;
    ground.contains_point(&lifted) || ground.cast_up(&lifted, VALIDATION_UP_RAY_LENGTH)
}

/// Body support probe: a ray from `body + up * offset` reaching `distance` down.
pub fn probe_body<G: GroundQuery + ?Sized>(
    ground: &G,
    body: &Point3,
    offset: f32,
    distance: f32,
) -> Option<GroundHit> {
    ground.cast_down(&(body + up() * offset), distance.max(0.0), None)
}

/// Distance from `foot` down to the ground, 0 when no ground is found nearby.
pub fn height_above_ground<G: GroundQuery + ?Sized>(ground: &G, foot: &Point3) -> f32 {
    let start = foot + up() * FOOT_HEIGHT_PROBE_OFFSET;
    ground
        .cast_down(&start, FOOT_HEIGHT_PROBE_DISTANCE, None)
        .map_or(0.0, |hit| (foot - hit.point).norm())
}

/// Tag of the surface directly under `point`, if any.
pub fn surface_tag_at<G: GroundQuery + ?Sized>(ground: &G, point: &Point3) -> Option<SurfaceTag> {
    let start = point + up() * FOOTSTEP_PROBE_OFFSET;
    ground
        .cast_down(&start, FOOTSTEP_PROBE_DISTANCE, None)
        .and_then(|hit| hit.tag)
}

/// Deterministic ground used by unit tests across the crate.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Infinite floor at `height`, optionally missing over an X interval and
    /// optionally tagged over another X interval.
    #[derive(Clone, Debug, Default)]
    pub struct FlatGround {
        pub height: f32,
        /// No geometry for `min_x <= x <= max_x`.
        pub gap: Option<(f32, f32)>,
        /// Floor tagged `tag` for `min_x <= x <= max_x`.
        pub tagged: Option<(f32, f32, SurfaceTag, &'static str)>,
    }

    impl FlatGround {
        pub fn at(height: f32) -> Self {
            Self {
                height,
                ..Self::default()
            }
        }

        fn solid_at(&self, x: f32) -> bool {
            self.gap.is_none_or(|(lo, hi)| x < lo || x > hi)
        }

        fn tag_at(&self, x: f32) -> Option<SurfaceTag> {
            self.tagged
                .and_then(|(lo, hi, tag, _)| (x >= lo && x <= hi).then_some(tag))
        }
    }

    impl GroundQuery for FlatGround {
        fn cast_down(
            &self,
            origin: &Point3,
            max_distance: f32,
            radius: Option<f32>,
        ) -> Option<GroundHit> {
            if !self.solid_at(origin.x) {
                return None;
            }
            let distance = origin.y - radius.unwrap_or(0.0) - self.height;
            (distance >= 0.0 && distance <= max_distance).then(|| GroundHit {
                point: Point3::new(origin.x, self.height, origin.z),
                normal: Vec3::y(),
                distance,
                tag: self.tag_at(origin.x),
            })
        }

        fn contains_point(&self, point: &Point3) -> bool {
            self.solid_at(point.x) && point.y < self.height
        }

        fn cast_up(&self, _origin: &Point3, _max_distance: f32) -> bool {
            false
        }

        fn tag_name(&self, tag: SurfaceTag) -> Option<&str> {
            self.tagged
                .and_then(|(_, _, t, name)| (t == tag).then_some(name))
        }
    }
}
