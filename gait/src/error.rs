/// Errors reported while setting up a gait engine or loading its configuration.
///
/// Nothing that happens during a tick is an error: missed steps, standing still
/// and being airborne are all normal states.
#[derive(Debug, thiserror::Error)]
pub enum GaitError {
    #[error("a gait needs at least one leg")]
    NoLegs,

    #[error("manual timing table has {actual} entries but there are {expected} legs")]
    ManualTimingsLength { expected: usize, actual: usize },

    #[error("invalid setting `{name}`: {value}")]
    InvalidSetting { name: &'static str, value: f32 },

    #[error("invalid curve: {0}")]
    InvalidCurve(&'static str),

    #[error("leg index {index} out of range ({count} legs)")]
    LegIndex { index: usize, count: usize },

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
}
