//! Headless quadruped walk across a small Rapier course.
//!
//! Course along +X: grass floor, a stone step at x in [6, 8], a trigger volume
//! at x = 11 that must be ignored, and a slide patch at x in [13, 17].

use std::collections::BTreeMap;

use anyhow::Result;
use gait::{
    ColliderShapeDef, GaitEngine, GroundProbe, KinematicBody, RapierGroundWorld, SurfaceDef,
    WorldStaticDef, fit_to_ground, resolve_footstep,
    rapier_world::rapier3d::na::{UnitQuaternion, Vector3},
};
use nalgebra::{Isometry3, Point3, Vector3 as Vec3};

use crate::config::{ScenarioConfig, SimConfig};

/// Counts gathered over one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    pub steps_started: usize,
    pub steps_missed: usize,
    pub footsteps: usize,
    pub airborne_ticks: u32,
    pub slide_ticks: u32,
    /// Footstep count per surface name ("untagged" for bare ground).
    pub surfaces: BTreeMap<String, usize>,
    pub final_average_leg_height: f32,
}

pub fn course() -> Vec<WorldStaticDef> {
    let identity = UnitQuaternion::identity();
    vec![
        WorldStaticDef {
            id: 1,
            translation: Vector3::zeros(),
            rotation: identity,
            shape: ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
            surface: SurfaceDef::tagged("Grass"),
        },
        WorldStaticDef {
            id: 2,
            translation: Vector3::new(7.0, 0.15, 0.0),
            rotation: identity,
            shape: ColliderShapeDef::Cuboid {
                half_extents: Vector3::new(1.0, 0.15, 2.0),
            },
            surface: SurfaceDef::tagged("Stone"),
        },
        WorldStaticDef {
            id: 3,
            translation: Vector3::new(11.0, 1.0, 0.0),
            rotation: identity,
            shape: ColliderShapeDef::Cuboid {
                half_extents: Vector3::new(0.5, 1.0, 2.0),
            },
            surface: SurfaceDef {
                sensor: true,
                ..SurfaceDef::tagged("Checkpoint")
            },
        },
        WorldStaticDef {
            id: 4,
            translation: Vector3::new(15.0, 0.025, 0.0),
            rotation: identity,
            shape: ColliderShapeDef::Cuboid {
                half_extents: Vector3::new(2.0, 0.025, 2.0),
            },
            surface: SurfaceDef::tagged("Slide"),
        },
    ]
}

/// Scripted body: planar speed from the sprint window, height from the ground
/// under it plus the jump arc.
struct BodyScript<'a> {
    scenario: &'a ScenarioConfig,
    probe: GroundProbe,
    x: f32,
}

impl BodyScript<'_> {
    fn is_sprinting(&self, time: f32) -> bool {
        time >= self.scenario.sprint_start && time < self.scenario.sprint_end
    }

    fn speed(&self, time: f32) -> f32 {
        if self.is_sprinting(time) {
            self.scenario.sprint_speed
        } else {
            self.scenario.walk_speed
        }
    }

    /// Jump lift and its rate of change at `time`.
    fn jump(&self, time: f32) -> (f32, f32) {
        let s = (time - self.scenario.jump_at) / self.scenario.jump_duration;
        if !(0.0..=1.0).contains(&s) {
            return (0.0, 0.0);
        }
        let h = self.scenario.jump_height;
        (
            4.0 * h * s * (1.0 - s),
            4.0 * h * (1.0 - 2.0 * s) / self.scenario.jump_duration,
        )
    }

    fn body_at(&mut self, world: &RapierGroundWorld, time: f32, dt: f32) -> KinematicBody {
        let speed = self.speed(time);
        self.x += speed * dt;

        let ground = fit_to_ground(world, &Point3::new(self.x, 0.0, 0.0), &self.probe).point;
        let (lift, lift_rate) = self.jump(time);
        let y = ground.y + self.scenario.body_height + lift;

        KinematicBody::new(
            Isometry3::translation(self.x, y, 0.0),
            Vec3::new(speed, lift_rate, 0.0),
        )
    }
}

pub fn run(config: &SimConfig) -> Result<Summary> {
    let scenario = &config.scenario;
    let world = RapierGroundWorld::build(course());

    let mut script = BodyScript {
        scenario,
        probe: config.gait.ground.clone(),
        x: 0.0,
    };
    let start = script.body_at(&world, 0.0, 0.0);

    let (l, w) = (scenario.stance_length, scenario.stance_width);
    let mut feet: Vec<Point3<f32>> = [(l, w), (l, -w), (-l, w), (-l, -w)]
        .into_iter()
        .map(|(dx, dz)| Point3::new(dx, 0.0, dz))
        .collect();

    let mut engine = GaitEngine::new(config.gait.clone(), &start.pose, &feet)?;
    log::info!(
        "walking {} legs for {} ticks at {:.0} Hz",
        engine.leg_count(),
        scenario.ticks,
        1.0 / scenario.dt
    );

    let mut summary = Summary::default();
    let mut sprinting = false;

    for tick in 0..scenario.ticks {
        let time = tick as f32 * scenario.dt;

        let now_sprinting = script.is_sprinting(time);
        if now_sprinting != sprinting {
            sprinting = now_sprinting;
            engine.set_overrides(sprinting.then_some(scenario.sprint_overrides))?;
            log::info!("t={time:.2}s sprint {}", if sprinting { "on" } else { "off" });
        }

        let body = script.body_at(&world, time, scenario.dt);
        let report = engine.tick(scenario.dt, &body, &world, &mut feet);

        summary.steps_started += report.steps_started.len();
        summary.steps_missed += report.steps_missed.len();
        if !report.grounded {
            summary.airborne_ticks += 1;
        }
        if report.on_slide {
            summary.slide_ticks += 1;
        }

        for event in &report.step_finished {
            let cue = resolve_footstep(event, &world);
            let surface = cue.surface.clone().unwrap_or_else(|| "untagged".to_owned());
            let sound = config.footsteps.sound_for(&cue, summary.footsteps);
            log::debug!(
                "t={time:.2}s leg {} landed on {surface} at ({:.2}, {:.2}, {:.2}) sound={}",
                cue.leg,
                cue.position.x,
                cue.position.y,
                cue.position.z,
                sound.unwrap_or("-")
            );
            *summary.surfaces.entry(surface).or_default() += 1;
            summary.footsteps += 1;
        }
    }

    summary.final_average_leg_height = engine.average_leg_height(&world);
    log::info!(
        "done: {} footsteps, {} steps started, {} missed, {} airborne ticks, {} slide ticks",
        summary.footsteps,
        summary.steps_started,
        summary.steps_missed,
        summary.airborne_ticks,
        summary.slide_ticks
    );
    for (surface, count) in &summary.surfaces {
        log::info!("  {surface}: {count}");
    }
    log::info!("average foot height at the end: {:.3}", summary.final_average_leg_height);

    Ok(summary)
}
