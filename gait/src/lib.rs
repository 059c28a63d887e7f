pub mod body;
pub mod constants;
pub mod curve;
pub mod error;
pub mod footstep;
pub mod ground;
pub mod leg;
pub mod math;
pub mod predictor;
pub mod rapier_world;
pub mod scheduler;
pub mod settings;
pub mod step;
pub mod surface;

pub use body::{BodyMotionSource, BodySample, KinematicBody, VelocityTracker};
pub use curve::{Curve, Keyframe};
pub use error::GaitError;
pub use footstep::{FootstepCue, FootstepSet, FootstepSets, resolve_footstep};
pub use ground::{
    GroundFit, GroundHit, GroundProbe, GroundQuery, fit_to_ground, height_above_ground,
    is_valid_step_point, probe_body, surface_tag_at,
};
pub use leg::{Leg, LegPhase, LegTarget};
pub use predictor::{Footfall, PredictParams, cycle_multiplier, predict_footfall, step_length};
pub use rapier_world::{
    ColliderShapeDef, GroundView, RapierGroundWorld, SurfaceDef, WorldStaticDef,
};
pub use scheduler::{GaitEngine, StepFinished, TickReport};
pub use settings::{
    BodyGroundCheck, GaitOverrides, GaitSettings, ResyncSettings, SlideSettings, Timings,
};
pub use step::{StepMotion, StepSample};
pub use surface::{ALL_LAYERS, LayerMask, SurfaceTag};
