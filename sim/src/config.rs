use std::{fs, path::Path};

use anyhow::{Context, Result};
use gait::{FootstepSet, FootstepSets, GaitOverrides, GaitSettings, SlideSettings};
use serde::Deserialize;

/// Whole simulator configuration. Every table is optional.
///
/// ```toml
/// [gait]
/// step_height = 0.4
///
/// [scenario]
/// ticks = 900
/// walk_speed = 1.5
///
/// [[footsteps]]
/// tag = "Grass"
/// sounds = ["grass_01", "grass_02"]
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub gait: GaitSettings,
    pub scenario: ScenarioConfig,
    pub footsteps: FootstepSets,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gait: GaitSettings {
                slide: SlideSettings {
                    tag: Some("Slide".into()),
                    ..SlideSettings::default()
                },
                ..GaitSettings::default()
            },
            scenario: ScenarioConfig::default(),
            footsteps: FootstepSets(vec![
                FootstepSet {
                    tag: "Grass".into(),
                    sounds: vec!["grass_01".into(), "grass_02".into()],
                },
                FootstepSet {
                    tag: "Stone".into(),
                    sounds: vec!["stone_01".into()],
                },
            ]),
        }
    }
}

/// Scripted body path: walk along +X, sprint for a while, jump once.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub ticks: u32,
    /// Fixed tick length (seconds).
    pub dt: f32,
    /// Body origin height above the ground under it (meters).
    pub body_height: f32,
    /// Foot offsets from the body origin on X and Z (meters).
    pub stance_length: f32,
    pub stance_width: f32,
    pub walk_speed: f32,
    pub sprint_speed: f32,
    /// Sprint window `[start, end)` in seconds.
    pub sprint_start: f32,
    pub sprint_end: f32,
    pub sprint_overrides: GaitOverrides,
    /// Jump start (seconds), duration (seconds) and apex above the walking height (meters).
    pub jump_at: f32,
    pub jump_duration: f32,
    pub jump_height: f32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            ticks: 1200,
            dt: 1.0 / 60.0,
            body_height: 0.5,
            stance_length: 0.6,
            stance_width: 0.5,
            walk_speed: 1.5,
            sprint_speed: 4.0,
            sprint_start: 8.0,
            sprint_end: 11.0,
            sprint_overrides: GaitOverrides {
                velocity_multiplier: 0.5,
                cycle_speed: 1.6,
                velocity_clamp: 6.0,
            },
            jump_at: 2.5,
            jump_duration: 0.8,
            jump_height: 1.5,
        }
    }
}

impl SimConfig {
    /// Defaults when `path` is `None`, otherwise the (possibly partial) TOML file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let src = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml_str(&src)
            .with_context(|| format!("loading config {}", path.display()))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(src: &str) -> Result<Self> {
        let config: Self = toml::from_str(src)?;
        config.gait.validate()?;
        config.scenario.validate()?;
        Ok(config)
    }
}

impl ScenarioConfig {
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.dt > 0.0, "scenario.dt must be positive, got {}", self.dt);
        anyhow::ensure!(
            self.jump_duration > 0.0,
            "scenario.jump_duration must be positive, got {}",
            self.jump_duration
        );
        Ok(())
    }
}
