use crate::{
    body::{BodyMotionSource, VelocityTracker},
    error::GaitError,
    ground::{GroundQuery, fit_to_ground, height_above_ground, probe_body},
    leg::{Leg, LegPhase, LegTarget},
    math::{Iso, Point3},
    predictor::{PredictParams, cycle_multiplier, predict_footfall},
    settings::{GaitOverrides, GaitSettings},
    step::StepMotion,
    surface::SurfaceTag,
};

/// A leg completed a step that moved it meaningfully.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepFinished {
    pub leg: usize,
    /// Where the foot came to rest (world space).
    pub position: Point3,
}

/// What happened during one [`GaitEngine::tick`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Completed steps above the event threshold, in leg order.
    pub step_finished: Vec<StepFinished>,
    /// Legs whose prediction produced a step this tick.
    pub steps_started: Vec<usize>,
    /// Legs whose timer expired but found no footing.
    pub steps_missed: Vec<usize>,
    /// Body support as seen by the ground check this tick.
    pub grounded: bool,
    pub on_slide: bool,
}

/// Speed-dependent tunables after overrides.
#[derive(Clone, Copy, Debug)]
struct Tuning {
    velocity_multiplier: f32,
    cycle_speed: f32,
    velocity_clamp: f32,
}

/// Drives every leg of one creature.
///
/// Per tick:
/// 0. Timing refresh and body support check (grounded gating, slide surfaces).
/// 1. One body sample shared by all legs.
/// 2. Idle legs are snapped to the ground.
/// 3. Each leg's phase timer advances; an idle leg whose timer expires gets a
///    new footfall, a leg already stepping advances its arc. A step started this
///    tick first moves on the next one. On a slide surface timers hold and no
///    new step starts, but arcs in flight still land.
/// 4. Foot positions are written to the targets.
#[derive(Clone, Debug)]
pub struct GaitEngine {
    settings: GaitSettings,
    overrides: Option<GaitOverrides>,
    legs: Vec<Leg>,
    offsets: Vec<f32>,
    tracker: VelocityTracker,
    enabled: bool,
    was_grounded: bool,
    on_slide: bool,
    pending_resync: bool,
    refresh_elapsed: f32,
}

impl GaitEngine {
    /// Build an engine for a body at `body_pose` whose feet currently sit at `targets`.
    ///
    /// Each leg's rest anchor is fixed here from its target's position. A manual
    /// timing table that does not match the leg count is logged and replaced by
    /// the default offset pattern.
    pub fn new<T: LegTarget>(
        settings: GaitSettings,
        body_pose: &Iso,
        targets: &[T],
    ) -> Result<Self, GaitError> {
        if targets.is_empty() {
            return Err(GaitError::NoLegs);
        }
        settings.validate()?;

        let offsets = settings.phase_offsets(targets.len());
        let legs = targets
            .iter()
            .zip(&offsets)
            .map(|(target, &offset)| Leg::new(body_pose, target.position(), offset))
            .collect();
        let pending_resync = settings.resync.on_enable_and_land;

        log::debug!("gait engine created with {} legs", targets.len());

        Ok(Self {
            settings,
            overrides: None,
            legs,
            offsets,
            tracker: VelocityTracker::new(Point3::from(body_pose.translation.vector)),
            enabled: true,
            was_grounded: true,
            on_slide: false,
            pending_resync,
            refresh_elapsed: 0.0,
        })
    }

    /// Advance the gait by `dt` seconds and write every foot position to `targets`.
    ///
    /// `targets` is matched to legs by index; extra entries on either side are ignored.
    pub fn tick<B, G, T>(&mut self, dt: f32, body: &B, ground: &G, targets: &mut [T]) -> TickReport
    where
        B: BodyMotionSource + ?Sized,
        G: GroundQuery + ?Sized,
        T: LegTarget,
    {
        let mut report = TickReport {
            grounded: self.was_grounded,
            on_slide: self.on_slide,
            ..TickReport::default()
        };
        if !self.enabled {
            return report;
        }

        let dt = dt.max(0.0);
        let pose = body.pose();
        let body_pos = Point3::from(pose.translation.vector);

        // 0) Periodic realignment of phase timers.
        if let Some(interval) = self.settings.refresh_timing_interval {
            self.refresh_elapsed += dt;
            if self.refresh_elapsed >= interval {
                self.refresh_elapsed = 0.0;
                self.reset_timers();
                log::debug!("phase timers refreshed");
            }
        }

        // 0.1) Body support and slide surfaces.
        let check = &self.settings.body_ground_check;
        let support = probe_body(ground, &body_pos, check.offset, check.distance);
        let grounded = support.is_some();
        let on_slide = support.is_some_and(|hit| self.is_slide(ground, hit.tag));
        report.grounded = grounded;
        report.on_slide = on_slide;

        if on_slide && !self.on_slide {
            self.on_slide = true;
            log::info!("entered slide surface, stepping disabled");
            if self.settings.slide.cancel_steps {
                self.cancel_steps();
                self.reset_timers();
            }
        } else if !on_slide && self.on_slide {
            self.on_slide = false;
            log::info!("left slide surface");
            self.resync(&pose, ground);
        }

        // 0.2) Grounded gating: airborne freezes everything in place.
        if self.settings.body_ground_check.only_step_when_grounded {
            if !grounded {
                if self.was_grounded {
                    log::info!("body airborne, steps suspended");
                }
                self.was_grounded = false;
                self.cancel_steps();
                self.tracker.reset(body_pos);
                self.write_targets(targets);
                return report;
            }
            if !self.was_grounded {
                self.was_grounded = true;
                log::info!("body landed");
                if self.settings.resync.on_enable_and_land {
                    self.pending_resync = true;
                }
            }
        } else {
            self.was_grounded = grounded;
        }

        if self.pending_resync {
            self.pending_resync = false;
            self.resync(&pose, ground);
        }

        // 1) One body sample for every leg.
        let sample = self
            .tracker
            .sample(body, dt, self.settings.velocity_smoothing);
        let tuning = self.tuning();

        // 2) Keep idle feet on the ground. On a slide they follow their anchors.
        let probe = &self.settings.ground;
        for leg in self.legs.iter_mut().filter(|leg| !leg.is_stepping()) {
            if self.on_slide {
                let planted = fit_to_ground(ground, &leg.world_anchor(&pose), probe).point;
                leg.position = planted;
                leg.settled = planted;
                leg.last_step_distance = 0.0;
                leg.arc_height_scale = 0.0;
            } else {
                leg.position = fit_to_ground(ground, &leg.settled, probe).point;
            }
        }

        // 3) Phase timers, new footfalls, arcs in flight. On a slide only the arcs
        // already in flight move.
        let stepping = !self.on_slide;
        let params = PredictParams {
            velocity_multiplier: tuning.velocity_multiplier,
            velocity_clamp: tuning.velocity_clamp,
            step_distance: self.settings.step_distance,
            probe,
        };
        let timer_gain = if stepping {
            dt * tuning.cycle_speed * cycle_multiplier(sample.speed(), tuning.velocity_clamp)
        } else {
            0.0
        };

        for (index, leg) in self.legs.iter_mut().enumerate() {
            leg.phase_timer += timer_gain;

            let advanced = match &mut leg.phase {
                LegPhase::Idle => None,
                LegPhase::Stepping(motion) => {
                    Some((motion.advance(dt, &self.settings), motion.target()))
                }
            };

            match advanced {
                None if stepping && leg.phase_timer >= self.settings.cycle_limit => {
                    leg.phase_timer = 0.0;
                    match predict_footfall(leg, &sample.pose, &sample.velocity, &params, ground) {
                        Some(footfall) => {
                            leg.last_step_distance = footfall.last_step_distance;
                            leg.arc_height_scale = footfall.arc_height_scale;
                            leg.phase = LegPhase::Stepping(StepMotion::new(
                                leg.position,
                                footfall.target,
                                footfall.arc_height_scale,
                            ));
                            report.steps_started.push(index);
                            log::debug!("leg {index} stepping to {:?}", footfall.target);
                        }
                        None => {
                            report.steps_missed.push(index);
                            log::debug!("leg {index} found no footing, step skipped");
                        }
                    }
                }
                None => {}
                Some((step, _)) if !step.finished => leg.position = step.position,
                Some((_, target)) => {
                    leg.position = target;
                    leg.settled = target;
                    leg.phase = LegPhase::Idle;
                    if leg.last_step_distance > self.settings.step_event_min_distance {
                        report.step_finished.push(StepFinished {
                            leg: index,
                            position: target,
                        });
                    }
                }
            }
        }

        // 4) Publish.
        self.write_targets(targets);
        report
    }

    /// Suspend or resume stepping.
    ///
    /// Disabling cancels every in-flight step. Re-enabling resyncs the legs on
    /// the next tick when `resync.on_enable_and_land` is set.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.refresh_elapsed = 0.0;
            self.pending_resync |= self.settings.resync.on_enable_and_land;
            log::info!("gait enabled");
        } else {
            self.cancel_steps();
            log::info!("gait disabled");
        }
    }

    /// Replace (or with `None`, restore) the speed-dependent tunables.
    ///
    /// Invalid overrides are rejected and the current ones stay in place.
    pub fn set_overrides(&mut self, overrides: Option<GaitOverrides>) -> Result<(), GaitError> {
        if let Some(o) = &overrides {
            o.validate()?;
        }
        self.overrides = overrides;
        Ok(())
    }

    /// Re-anchor every leg under a body at `pose`.
    ///
    /// Steps are cancelled, velocity history is dropped and timers go back to their
    /// offsets. Legs farther than `resync.snap_distance` from their (optionally
    /// ground-fitted) anchor are teleported onto it.
    pub fn resync<G: GroundQuery + ?Sized>(&mut self, pose: &Iso, ground: &G) {
        self.tracker.reset(Point3::from(pose.translation.vector));
        self.cancel_steps();

        let resync = &self.settings.resync;
        let mut snapped = 0usize;
        for (leg, &offset) in self.legs.iter_mut().zip(&self.offsets) {
            let anchor = leg.world_anchor(pose);
            let desired = if resync.snap_to_ground {
                fit_to_ground(ground, &anchor, &self.settings.ground).point
            } else {
                anchor
            };
            if (leg.position - desired).norm() > resync.snap_distance {
                leg.position = desired;
                snapped += 1;
            }
            leg.settled = leg.position;
            leg.phase_timer = offset;
            leg.last_step_distance = 0.0;
            leg.arc_height_scale = 0.0;
        }

        log::info!("legs resynced, {snapped} snapped to their anchors");
    }

    /// Settings the engine was built with.
    pub fn settings(&self) -> &GaitSettings {
        &self.settings
    }

    /// Active speed overrides, if any.
    pub fn overrides(&self) -> Option<&GaitOverrides> {
        self.overrides.as_ref()
    }

    /// Phase timer each leg returns to on resync and refresh.
    pub fn phase_offsets(&self) -> &[f32] {
        &self.offsets
    }

    /// Number of legs driven.
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Every leg, in target order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Leg `index`, or [`GaitError::LegIndex`] when out of range.
    pub fn leg(&self, index: usize) -> Result<&Leg, GaitError> {
        self.legs.get(index).ok_or(GaitError::LegIndex {
            index,
            count: self.legs.len(),
        })
    }

    /// `false` for an out-of-range index.
    pub fn is_leg_moving(&self, index: usize) -> bool {
        self.legs.get(index).is_some_and(Leg::is_stepping)
    }

    /// Current world position of foot `index`.
    pub fn leg_position(&self, index: usize) -> Option<Point3> {
        self.legs.get(index).map(Leg::position)
    }

    /// Height of a foot above the ground below it; 0 with no ground in reach.
    pub fn distance_to_ground<G: GroundQuery + ?Sized>(
        &self,
        index: usize,
        ground: &G,
    ) -> Result<f32, GaitError> {
        Ok(height_above_ground(ground, &self.leg(index)?.position))
    }

    /// Mean [`distance_to_ground`](Self::distance_to_ground) over all legs.
    pub fn average_leg_height<G: GroundQuery + ?Sized>(&self, ground: &G) -> f32 {
        let total: f32 = self
            .legs
            .iter()
            .map(|leg| height_above_ground(ground, &leg.position))
            .sum();
        total / self.legs.len() as f32
    }

    /// Whether ticks currently drive the legs.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Body support seen by the last tick.
    pub fn was_grounded(&self) -> bool {
        self.was_grounded
    }

    /// Whether the body currently stands on a slide surface.
    pub fn is_on_slide(&self) -> bool {
        self.on_slide
    }

    fn tuning(&self) -> Tuning {
        match self.overrides {
            Some(o) => Tuning {
                velocity_multiplier: o.velocity_multiplier,
                cycle_speed: o.cycle_speed,
                velocity_clamp: o.velocity_clamp,
            },
            None => Tuning {
                velocity_multiplier: self.settings.velocity_multiplier,
                cycle_speed: self.settings.cycle_speed,
                velocity_clamp: self.settings.velocity_clamp,
            },
        }
    }

    fn is_slide<G: GroundQuery + ?Sized>(&self, ground: &G, tag: Option<SurfaceTag>) -> bool {
        match (self.settings.slide.tag.as_deref(), tag) {
            (Some(slide), Some(tag)) => ground.tag_name(tag) == Some(slide),
            _ => false,
        }
    }

    fn cancel_steps(&mut self) {
        let cancelled = self
            .legs
            .iter_mut()
            .map(Leg::cancel_step)
            .filter(|&cancelled| cancelled)
            .count();
        if cancelled > 0 {
            log::debug!("cancelled {cancelled} steps");
        }
    }

    fn reset_timers(&mut self) {
        for (leg, &offset) in self.legs.iter_mut().zip(&self.offsets) {
            leg.phase_timer = offset;
        }
    }

    fn write_targets<T: LegTarget>(&self, targets: &mut [T]) {
        for (leg, target) in self.legs.iter().zip(targets.iter_mut()) {
            target.set_position(leg.position);
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        body::KinematicBody,
        ground::test_support::FlatGround,
        math::Vec3,
        settings::{ResyncSettings, SlideSettings, Timings},
    };

    const DT: f32 = 0.01;

    fn quad_feet() -> Vec<Point3> {
        vec![
            Point3::new(0.5, 0.0, 0.5),
            Point3::new(-0.5, 0.0, 0.5),
            Point3::new(0.5, 0.0, -0.5),
            Point3::new(-0.5, 0.0, -0.5),
        ]
    }

    fn body_at(x: f32) -> Iso {
        Iso::translation(x, 0.5, 0.0)
    }

    fn engine(settings: GaitSettings, feet: &[Point3]) -> GaitEngine {
        GaitEngine::new(settings, &body_at(0.0), feet).unwrap()
    }

    /// Tick until leg `index` has started a step, returning the elapsed time.
    fn run_until_started(
        engine: &mut GaitEngine,
        body: &Iso,
        ground: &FlatGround,
        feet: &mut [Point3],
        index: usize,
    ) -> f32 {
        let mut elapsed = 0.0;
        for _ in 0..1000 {
            elapsed += DT;
            if engine.tick(DT, body, ground, feet).steps_started.contains(&index) {
                return elapsed;
            }
        }
        panic!("leg {index} never stepped");
    }

    #[test]
    fn rejects_empty_leg_list() {
        let feet: Vec<Point3> = Vec::new();
        assert!(matches!(
            GaitEngine::new(GaitSettings::default(), &Iso::identity(), &feet),
            Err(GaitError::NoLegs)
        ));
    }

    #[test]
    fn first_step_triggers_after_one_cycle() {
        let ground = FlatGround::at(0.0);
        let mut feet = vec![Point3::new(0.5, 0.0, 0.5)];
        let mut engine = engine(GaitSettings::default(), &feet);

        let elapsed = run_until_started(&mut engine, &body_at(0.0), &ground, &mut feet, 0);
        assert!((elapsed - 1.0).abs() <= DT + 1.0e-4, "elapsed {elapsed}");
    }

    #[test]
    fn offsets_stagger_four_legs() {
        let ground = FlatGround::at(0.0);
        let mut feet = quad_feet();
        let mut engine = engine(GaitSettings::default(), &feet);
        assert_eq!(engine.phase_offsets(), &[0.0, 0.25, 0.5, 0.75]);

        // Timers count up toward the limit, so the leg with the largest offset fires first.
        let mut fired = [0usize; 4];
        let body = body_at(0.0);
        for _ in 0..76 {
            let report = engine.tick(DT, &body, &ground, &mut feet);
            for &leg in report.steps_started.iter().chain(&report.steps_missed) {
                fired[leg] += 1;
            }
        }

        assert_eq!(fired, [0, 1, 1, 1]);
        assert!(engine.legs()[0].phase_timer() < 1.0);
    }

    #[test]
    fn airborne_freezes_mid_arc() {
        let mut ground = FlatGround::at(0.0);
        let mut feet = quad_feet();
        let mut engine = engine(GaitSettings::default(), &feet);

        // Move the body so leg 2's next step has somewhere to go.
        let body = body_at(0.8);
        run_until_started(&mut engine, &body, &ground, &mut feet, 2);

        // step_speed 5 at dt 0.01: eight more ticks reach t = 0.4.
        for _ in 0..8 {
            engine.tick(DT, &body, &ground, &mut feet);
        }
        let LegPhase::Stepping(motion) = engine.legs()[2].phase() else {
            panic!("leg 2 should be mid-arc");
        };
        assert!((motion.progress() - 0.4).abs() < 1.0e-4);
        let frozen = feet[2];
        assert!(frozen.y > 0.0, "foot should be lifted");
        let timers: Vec<f32> = engine.legs().iter().map(Leg::phase_timer).collect();

        // Pull the ground away from under the body.
        ground.height = -10.0;
        for _ in 0..20 {
            let report = engine.tick(DT, &body, &ground, &mut feet);
            assert!(!report.grounded);
        }

        assert!(!engine.is_leg_moving(2));
        assert_eq!(feet[2], frozen);
        assert_eq!(engine.legs()[2].settled(), frozen);
        let after: Vec<f32> = engine.legs().iter().map(Leg::phase_timer).collect();
        assert_eq!(timers, after);
        assert!(!engine.was_grounded());
    }

    #[test]
    fn landing_resync_teleports_far_legs_only() {
        let mut ground = FlatGround::at(-10.0);
        let mut feet = quad_feet();
        let settings = GaitSettings {
            resync: ResyncSettings {
                snap_distance: 1.25,
                ..Default::default()
            },
            ..GaitSettings::default()
        };
        let mut engine = engine(settings, &feet);

        // Airborne: nothing moves.
        let start = body_at(0.0);
        engine.tick(DT, &start, &ground, &mut feet);
        assert!(!engine.was_grounded());

        // Land two units away: every anchor is now 2.0 from its foot.
        ground.height = 0.0;
        feet[1] = Point3::new(-0.5, 0.0, 0.5) + Vec3::new(1.0, 0.0, 0.0);
        engine.legs[1].position = feet[1];
        let landed = body_at(2.0);
        let report = engine.tick(DT, &landed, &ground, &mut feet);

        assert!(report.grounded);
        assert!(engine.was_grounded());
        assert_eq!(feet[0], Point3::new(2.5, 0.0, 0.5));
        // Leg 1 was only 1.0 from its anchor and stays put.
        assert_eq!(feet[1], Point3::new(0.5, 0.0, 0.5));
        assert!(!engine.legs().iter().any(Leg::is_stepping));
        // Timers restarted from their offsets before this tick advanced them.
        assert!((engine.legs()[3].phase_timer() - 0.76).abs() < 1.0e-5);
    }

    #[test]
    fn short_steps_raise_no_event() {
        let ground = FlatGround::at(0.0);
        let mut feet = vec![Point3::new(0.5, 0.0, 0.5)];
        let mut engine = engine(GaitSettings::default(), &feet);

        // 0.1 from the anchor: a real step, but below the 0.3 threshold.
        let body = body_at(0.1);
        run_until_started(&mut engine, &body, &ground, &mut feet, 0);
        assert!((engine.legs()[0].last_step_distance() - 0.1).abs() < 1.0e-4);

        let mut events = Vec::new();
        while engine.is_leg_moving(0) {
            events.extend(engine.tick(DT, &body, &ground, &mut feet).step_finished);
        }
        assert!(events.is_empty());
        assert!((feet[0] - Point3::new(0.6, 0.0, 0.5)).norm() < 1.0e-5);
    }

    #[test]
    fn long_steps_raise_an_event_at_the_landing_point() {
        let ground = FlatGround::at(0.0);
        let mut feet = vec![Point3::new(0.5, 0.0, 0.5)];
        let mut engine = engine(GaitSettings::default(), &feet);

        let body = body_at(0.5);
        run_until_started(&mut engine, &body, &ground, &mut feet, 0);

        let mut events = Vec::new();
        while engine.is_leg_moving(0) {
            events.extend(engine.tick(DT, &body, &ground, &mut feet).step_finished);
        }
        assert_eq!(
            events,
            vec![StepFinished {
                leg: 0,
                position: Point3::new(1.0, 0.0, 0.5)
            }]
        );
    }

    #[test]
    fn missed_step_leaves_leg_idle() {
        let mut ground = FlatGround::at(0.0);
        let mut feet = vec![Point3::new(0.5, 0.0, 0.5)];
        let mut engine = engine(GaitSettings::default(), &feet);

        // Body support stays, but the leg's target is over a hole.
        ground.gap = Some((0.3, 10.0));
        let body = Iso::translation(0.0, 0.5, 0.0);
        let mut missed = false;
        for _ in 0..120 {
            let report = engine.tick(DT, &body, &ground, &mut feet);
            if report.steps_missed.contains(&0) {
                missed = true;
                assert!(!engine.is_leg_moving(0));
                assert_eq!(engine.legs()[0].phase_timer(), 0.0);
            }
            assert!(report.steps_started.is_empty());
        }
        assert!(missed);
        assert_eq!(feet[0], Point3::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn never_more_than_one_step_per_leg() {
        let ground = FlatGround::at(0.0);
        let mut feet = quad_feet();
        // Fast cycling with slow steps: timers expire long before arcs finish.
        let settings = GaitSettings {
            cycle_speed: 10.0,
            step_speed: 0.5,
            ..GaitSettings::default()
        };
        let mut engine = engine(settings, &feet);
        let mut body = KinematicBody::new(body_at(0.0), Vec3::new(1.0, 0.0, 0.0));

        let mut in_flight = [false; 4];
        for i in 0..600 {
            body.pose = body_at(i as f32 * DT);
            let report = engine.tick(DT, &body, &ground, &mut feet);
            for &leg in &report.steps_started {
                assert!(!in_flight[leg], "leg {leg} double-triggered");
            }
            for (leg, flag) in in_flight.iter_mut().enumerate() {
                *flag = engine.is_leg_moving(leg);
            }
        }
    }

    #[test]
    fn stepping_back_and_forth_lands_on_the_same_points() {
        let ground = FlatGround::at(0.25);
        let mut feet = vec![Point3::new(0.5, 0.25, 0.5)];
        let mut engine = engine(GaitSettings::default(), &feet);

        let there = body_at(1.0);
        let back = body_at(0.0);
        let mut landings = Vec::new();
        for cycle in 0..6 {
            let body = if cycle % 2 == 0 { there } else { back };
            run_until_started(&mut engine, &body, &ground, &mut feet, 0);
            while engine.is_leg_moving(0) {
                engine.tick(DT, &body, &ground, &mut feet);
            }
            landings.push(feet[0]);
        }

        for pair in landings.chunks(2) {
            assert_eq!(pair[0], Point3::new(1.5, 0.25, 0.5));
            assert_eq!(pair[1], Point3::new(0.5, 0.25, 0.5));
        }
    }

    #[test]
    fn idle_feet_follow_the_terrain() {
        let mut ground = FlatGround::at(0.0);
        let mut feet = vec![Point3::new(0.5, 0.0, 0.5)];
        let mut engine = engine(GaitSettings::default(), &feet);
        let body = body_at(0.0);

        engine.tick(DT, &body, &ground, &mut feet);
        ground.height = 0.2;
        engine.tick(DT, &body, &ground, &mut feet);
        assert!((feet[0].y - 0.2).abs() < 1.0e-6);
    }

    #[test]
    fn disable_cancels_and_enable_resyncs() {
        let ground = FlatGround::at(0.0);
        let mut feet = vec![Point3::new(0.5, 0.0, 0.5)];
        let mut engine = engine(GaitSettings::default(), &feet);

        run_until_started(&mut engine, &body_at(0.8), &ground, &mut feet, 0);
        assert!(engine.is_leg_moving(0));

        engine.set_enabled(false);
        assert!(!engine.is_enabled());
        assert!(!engine.is_leg_moving(0));

        // Disabled ticks are no-ops even when the body moves far away.
        let far = body_at(5.0);
        let report = engine.tick(DT, &far, &ground, &mut feet);
        assert!(report.steps_started.is_empty());
        assert!(feet[0].x < 2.0);

        engine.set_enabled(true);
        engine.tick(DT, &far, &ground, &mut feet);
        assert_eq!(feet[0], Point3::new(5.5, 0.0, 0.5));
    }

    #[test]
    fn mismatched_timing_table_falls_back_to_offsets() {
        let feet = quad_feet();
        let settings = GaitSettings {
            timings: Timings::Manual(vec![0.0, 0.5]),
            ..GaitSettings::default()
        };
        let engine = engine(settings, &feet);
        assert_eq!(engine.phase_offsets(), &[0.0, 0.25, 0.5, 0.75]);
        assert_eq!(engine.legs()[2].phase_timer(), 0.5);
    }

    #[test]
    fn overrides_speed_up_cycling() {
        let ground = FlatGround::at(0.0);
        let mut feet = vec![Point3::new(0.5, 0.0, 0.5)];
        let mut engine = engine(GaitSettings::default(), &feet);
        engine
            .set_overrides(Some(GaitOverrides {
                velocity_multiplier: 0.4,
                cycle_speed: 4.0,
                velocity_clamp: 4.0,
            }))
            .unwrap();

        let elapsed = run_until_started(&mut engine, &body_at(0.0), &ground, &mut feet, 0);
        assert!((elapsed - 0.25).abs() <= DT + 1.0e-4, "elapsed {elapsed}");

        engine.set_overrides(None).unwrap();
        assert!(engine.overrides().is_none());
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let feet = vec![Point3::new(0.5, 0.0, 0.5)];
        let mut engine = engine(GaitSettings::default(), &feet);
        let sprint = GaitOverrides {
            velocity_multiplier: 0.5,
            cycle_speed: 1.6,
            velocity_clamp: 6.0,
        };
        engine.set_overrides(Some(sprint)).unwrap();

        let stalled = GaitOverrides {
            cycle_speed: -1.0,
            ..sprint
        };
        assert!(matches!(
            engine.set_overrides(Some(stalled)),
            Err(GaitError::InvalidSetting {
                name: "overrides.cycle_speed",
                ..
            })
        ));
        let unbounded = GaitOverrides {
            velocity_clamp: f32::NAN,
            ..sprint
        };
        assert!(engine.set_overrides(Some(unbounded)).is_err());
        assert_eq!(engine.overrides(), Some(&sprint));
    }

    #[test]
    fn timers_refresh_periodically() {
        let ground = FlatGround::at(0.0);
        let mut feet = quad_feet();
        let settings = GaitSettings {
            refresh_timing_interval: Some(0.1),
            ..GaitSettings::default()
        };
        let mut engine = engine(settings, &feet);
        let body = body_at(0.0);

        for _ in 0..9 {
            engine.tick(DT, &body, &ground, &mut feet);
        }
        assert!(engine.legs()[0].phase_timer() > 0.05);

        // Refresh happens before this tick's timers advance.
        engine.tick(DT, &body, &ground, &mut feet);
        engine.tick(DT, &body, &ground, &mut feet);
        assert!(engine.legs()[0].phase_timer() < 0.05);
    }

    #[test]
    fn slide_surface_plants_feet_under_anchors() {
        let ground = FlatGround {
            tagged: Some((-100.0, 100.0, SurfaceTag(1), "Slide")),
            ..FlatGround::at(0.0)
        };
        let mut feet = vec![Point3::new(0.5, 0.0, 0.5)];
        let settings = GaitSettings {
            slide: SlideSettings {
                tag: Some("Slide".to_owned()),
                cancel_steps: true,
            },
            ..GaitSettings::default()
        };
        let mut engine = engine(settings, &feet);

        let mut x = 0.0;
        for _ in 0..300 {
            x += 0.02;
            let report = engine.tick(DT, &body_at(x), &ground, &mut feet);
            assert!(report.on_slide);
            assert!(report.steps_started.is_empty());
        }
        assert!(engine.is_on_slide());
        assert!((feet[0] - Point3::new(x + 0.5, 0.0, 0.5)).norm() < 1.0e-4);
    }

    #[test]
    fn step_in_flight_lands_on_a_slide_without_cancellation() {
        let ground = FlatGround {
            tagged: Some((1.0, 100.0, SurfaceTag(1), "Slide")),
            ..FlatGround::at(0.0)
        };
        let mut feet = vec![Point3::new(0.5, 0.0, 0.5)];
        let settings = GaitSettings {
            slide: SlideSettings {
                tag: Some("Slide".to_owned()),
                cancel_steps: false,
            },
            ..GaitSettings::default()
        };
        let mut engine = engine(settings, &feet);

        let body = body_at(0.8);
        run_until_started(&mut engine, &body, &ground, &mut feet, 0);
        for _ in 0..8 {
            engine.tick(DT, &body, &ground, &mut feet);
        }
        let LegPhase::Stepping(motion) = engine.legs()[0].phase() else {
            panic!("leg 0 should be mid-arc");
        };
        let target = motion.target();
        assert!(feet[0].y > 0.0, "foot should be lifted");
        let timer = engine.legs()[0].phase_timer();

        // The body slides on while the foot is still in the air.
        let slide_body = body_at(1.5);
        let mut landed = None;
        for _ in 0..50 {
            let report = engine.tick(DT, &slide_body, &ground, &mut feet);
            assert!(report.on_slide);
            assert!(report.steps_started.is_empty());
            if !engine.is_leg_moving(0) {
                landed = Some(report);
                break;
            }
        }
        let report = landed.expect("step should finish on the slide");
        assert!((feet[0] - target).norm() < 1.0e-5);
        assert_eq!(engine.legs()[0].settled(), target);
        assert_eq!(
            report.step_finished,
            vec![StepFinished {
                leg: 0,
                position: target
            }]
        );
        assert_eq!(engine.legs()[0].phase_timer(), timer);

        // Once idle, the foot is planted under its anchor like the others.
        for _ in 0..10 {
            engine.tick(DT, &slide_body, &ground, &mut feet);
        }
        assert!((feet[0] - Point3::new(2.0, 0.0, 0.5)).norm() < 1.0e-4);
        assert!(!engine.is_leg_moving(0));
    }

    #[test]
    fn height_accessors() {
        let ground = FlatGround::at(0.0);
        let feet = vec![Point3::new(0.5, 0.2, 0.5), Point3::new(-0.5, 0.4, 0.5)];
        let engine = GaitEngine::new(
            GaitSettings {
                resync: ResyncSettings {
                    on_enable_and_land: false,
                    ..Default::default()
                },
                ..GaitSettings::default()
            },
            &body_at(0.0),
            &feet,
        )
        .unwrap();

        assert!((engine.distance_to_ground(1, &ground).unwrap() - 0.4).abs() < 1.0e-5);
        assert!((engine.average_leg_height(&ground) - 0.3).abs() < 1.0e-5);
        assert!(matches!(
            engine.distance_to_ground(7, &ground),
            Err(GaitError::LegIndex { index: 7, count: 2 })
        ));
        assert!(!engine.is_leg_moving(7));
        assert_eq!(engine.leg_position(1), Some(Point3::new(-0.5, 0.4, 0.5)));
    }
}
