//! Rapier-backed ground for the gait engine.
//!
//! Builds an in-memory Rapier scene from static collider definitions and answers
//! [`GroundQuery`] casts against it. The scene is collision-detection only: no
//! dynamics ever run, and statics are assumed not to move after construction.
//!
//! Surfaces
//! - Every collider carries a layer membership mask and an optional surface tag,
//!   packed into its `user_data` (see [`crate::surface`]).
//! - Tag names are interned at build time; ids start at 1 in first-seen order.
//! - Sensor colliders (triggers) are kept in the scene but ignored by all queries.

// Re-export Rapier so downstream crates can describe worlds without depending on
// `rapier3d` directly.
pub use rapier3d;

use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;

use crate::{
    ground::{GroundHit, GroundQuery},
    math::{Point3, Vec3},
    surface::{
        ALL_LAYERS, LayerMask, SurfaceTag, matches_mask, pack_surface, unpack_tag, validate_surface,
    },
};

/// Canonical definition of an immutable world collider.
///
/// Conventions
/// - Units are meters.
/// - Rotation is a unit quaternion.
/// - Planes use a pose-derived normal: `normal = rotation * +Y`, with
///   `dist = dot(normal, translation) + offset_along_normal`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    pub translation: Vector<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub shape: ColliderShapeDef,
    pub surface: SurfaceDef,
}

/// Query-facing properties of a static collider.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceDef {
    pub layers: LayerMask,
    /// Surface tag such as `"Grass"` or `"Slide"`.
    pub tag: Option<String>,
    /// Triggers never count as ground.
    pub sensor: bool,
}

impl Default for SurfaceDef {
    fn default() -> Self {
        Self {
            layers: 1,
            tag: None,
            sensor: false,
        }
    }
}

impl SurfaceDef {
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space), offset along its pose-derived normal.
    Plane { offset_along_normal: f32 },

    /// Oriented cuboid with given half-extents.
    Cuboid { half_extents: Vector<f32> },

    Sphere { radius: f32 },

    /// Y-aligned capsule.
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder.
    CylinderY { radius: f32, half_height: f32 },

    /// Cuboid with all edges rounded by `border_radius`.
    RoundCuboid {
        half_extents: Vector<f32>,
        border_radius: f32,
    },
}

/// Static ground scene: Rapier sets plus the interned surface tag names.
pub struct RapierGroundWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    tag_names: Vec<String>,
}

impl RapierGroundWorld {
    /// Build a ground world from static collider definitions.
    ///
    /// The input is sorted by `id` before insertion so equal inputs build equal scenes.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut tag_names: Vec<String> = Vec::new();

        for def in defs.into_iter() {
            let tag = def.surface.tag.as_deref().map(|name| intern(&mut tag_names, name));

            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
            let rb_handle = bodies.insert(RigidBodyBuilder::fixed().pose(iso).build());

            let mut collider = collider_from_def(&def);
            collider.user_data = pack_surface(def.surface.layers, tag);
            debug_assert_eq!(validate_surface(collider.user_data), Ok(()));
            collider.set_sensor(def.surface.sensor);
            colliders.insert_with_parent(collider, rb_handle, &mut bodies);
        }

        // Collision detection only, to populate the broad-phase BVH for queries.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        log::debug!(
            "ground world built: {} colliders, {} surface tags",
            colliders.len(),
            tag_names.len()
        );

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
            tag_names,
        }
    }

    /// A query view restricted to colliders sharing a layer with `mask`.
    pub fn view(&self, mask: LayerMask) -> GroundView<'_> {
        GroundView { world: self, mask }
    }

    /// Look up the interned id of a tag name.
    pub fn tag(&self, name: &str) -> Option<SurfaceTag> {
        self.tag_names
            .iter()
            .position(|n| n == name)
            .map(|i| SurfaceTag(i as u16 + 1))
    }

    fn tag_name_of(&self, tag: SurfaceTag) -> Option<&str> {
        let index = usize::from(tag.0).checked_sub(1)?;
        self.tag_names.get(index).map(String::as_str)
    }

    fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    fn tag_of(&self, handle: ColliderHandle) -> Option<SurfaceTag> {
        self.colliders.get(handle).and_then(|c| unpack_tag(c.user_data))
    }
}

impl GroundQuery for RapierGroundWorld {
    fn cast_down(&self, origin: &Point3, max_distance: f32, radius: Option<f32>) -> Option<GroundHit> {
        self.view(ALL_LAYERS).cast_down(origin, max_distance, radius)
    }

    fn contains_point(&self, point: &Point3) -> bool {
        self.view(ALL_LAYERS).contains_point(point)
    }

    fn cast_up(&self, origin: &Point3, max_distance: f32) -> bool {
        self.view(ALL_LAYERS).cast_up(origin, max_distance)
    }

    fn tag_name(&self, tag: SurfaceTag) -> Option<&str> {
        self.tag_name_of(tag)
    }
}

/// Borrowed, layer-filtered view of a [`RapierGroundWorld`].
#[derive(Clone, Copy)]
pub struct GroundView<'a> {
    world: &'a RapierGroundWorld,
    mask: LayerMask,
}

impl GroundView<'_> {
    fn with_pipeline<R>(&self, f: impl FnOnce(&QueryPipeline<'_>) -> R) -> R {
        let mask = self.mask;
        let predicate = move |_: ColliderHandle, c: &Collider| matches_mask(c.user_data, mask);
        let filter = QueryFilter::default().exclude_sensors().predicate(&predicate);
        f(&self.world.query_pipeline(filter))
    }
}

impl GroundQuery for GroundView<'_> {
    fn cast_down(&self, origin: &Point3, max_distance: f32, radius: Option<f32>) -> Option<GroundHit> {
        let down = -Vector::y();
        let max_distance = max_distance.max(0.0);

        let (handle, point, normal, distance) = self.with_pipeline(|pipeline| match radius {
            None => {
                let ray = Ray::new(*origin, down);
                pipeline
                    .cast_ray_and_get_normal(&ray, max_distance, true)
                    .map(|(handle, hit)| {
                        (
                            handle,
                            ray.point_at(hit.time_of_impact),
                            hit.normal,
                            hit.time_of_impact,
                        )
                    })
            }
            Some(r) => {
                let ball = Ball::new(r);
                let start = Isometry::translation(origin.x, origin.y, origin.z);
                // Colliders already overlapping the sphere at its start are not ground.
                let mut opts = ShapeCastOptions::with_max_time_of_impact(max_distance);
                opts.stop_at_penetration = false;
                pipeline
                    .cast_shape(&start, &down, &ball, opts)
                    .map(|(handle, hit)| {
                        let center = origin + down * hit.time_of_impact;
                        (
                            handle,
                            center + down * r,
                            hit.normal1.into_inner(),
                            hit.time_of_impact,
                        )
                    })
            }
        })?;

        Some(GroundHit {
            point,
            normal: face_up(normal),
            distance,
            tag: self.world.tag_of(handle),
        })
    }

    fn contains_point(&self, point: &Point3) -> bool {
        self.with_pipeline(|pipeline| pipeline.intersect_point(*point).next().is_some())
    }

    fn cast_up(&self, origin: &Point3, max_distance: f32) -> bool {
        let ray = Ray::new(*origin, Vector::y());
        self.with_pipeline(|pipeline| {
            pipeline
                .cast_ray(&ray, max_distance.max(0.0), true)
                .is_some()
        })
    }

    fn tag_name(&self, tag: SurfaceTag) -> Option<&str> {
        self.world.tag_name_of(tag)
    }
}

/// A downward cast's normal should face back up toward the caster.
#[inline]
fn face_up(n: Vec3) -> Vec3 {
    if n.y < 0.0 { -n } else { n }
}

fn intern(names: &mut Vec<String>, name: &str) -> SurfaceTag {
    let index = match names.iter().position(|n| n == name) {
        Some(i) => i,
        None => {
            names.push(name.to_owned());
            names.len() - 1
        }
    };
    SurfaceTag(index as u16 + 1)
}

/// Build a Rapier collider from a `WorldStaticDef`.
///
/// The pose lives on the parent rigid-body, so colliders get an identity local
/// transform (except planes, which encode their offset in the translation).
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // The parent body carries the pose, so the half-space is +Y in body space.
            let local_normal = UnitVector::new_normalize(Vector::y());
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(local_normal)))
                .translation(Vector::y() * *offset_along_normal)
                .build()
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build()
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius).build(),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius).build(),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius).build(),

        ColliderShapeDef::RoundCuboid {
            half_extents,
            border_radius,
        } => ColliderBuilder::round_cuboid(
            half_extents.x,
            half_extents.y,
            half_extents.z,
            *border_radius,
        )
        .build(),
    }
}
