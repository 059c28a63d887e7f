//! Footstep cues: what surface a finished step landed on, and which sound set
//! a listener should pick for it.

use serde::{Deserialize, Serialize};

use crate::{
    ground::{GroundQuery, surface_tag_at},
    math::Point3,
    scheduler::StepFinished,
    surface::SurfaceTag,
};

#[derive(Clone, Debug, PartialEq)]
pub struct FootstepCue {
    pub leg: usize,
    pub position: Point3,
    pub tag: Option<SurfaceTag>,
    /// Tag name, when the ground knows it.
    pub surface: Option<String>,
}

/// Look up the surface under a finished step.
pub fn resolve_footstep<G: GroundQuery + ?Sized>(event: &StepFinished, ground: &G) -> FootstepCue {
    let tag = surface_tag_at(ground, &event.position);
    FootstepCue {
        leg: event.leg,
        position: event.position,
        tag,
        surface: tag
            .and_then(|tag| ground.tag_name(tag))
            .map(str::to_owned),
    }
}

/// Sounds for one surface tag.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FootstepSet {
    pub tag: String,
    pub sounds: Vec<String>,
}

/// Surface tag to sound lookup. Tags compare case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FootstepSets(pub Vec<FootstepSet>);

impl FootstepSets {
    /// Sound for `cue`, cycling through the set with `variant`.
    ///
    /// `None` for untagged ground or a tag with no (non-empty) set.
    pub fn sound_for(&self, cue: &FootstepCue, variant: usize) -> Option<&str> {
        let surface = cue.surface.as_deref()?;
        self.0
            .iter()
            .filter(|set| !set.sounds.is_empty())
            .find(|set| set.tag.eq_ignore_ascii_case(surface))
            .map(|set| set.sounds[variant % set.sounds.len()].as_str())
    }
}
