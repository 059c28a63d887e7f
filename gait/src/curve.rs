//! Keyframed animation curves used to shape the step arc.
//!
//! A [`Curve`] is a sequence of [`Keyframe`]s joined by cubic Hermite segments.
//! Tangents are slopes in value-per-time, so a key's `out_tangent` and the next
//! key's `in_tangent` are scaled by the segment length before blending.
//! Evaluation outside the key range clamps to the first/last value.

use serde::{Deserialize, Serialize};

use crate::error::GaitError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    /// Key with flat tangents.
    pub const fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    pub const fn with_tangents(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    /// Build a curve from keys sorted by strictly increasing time.
    pub fn new(keys: Vec<Keyframe>) -> Result<Self, GaitError> {
        let curve = Self { keys };
        curve.validate()?;
        Ok(curve)
    }

    /// The default foot-lift bump: 0 at both ends, 1 at the midpoint.
    pub fn step_arc() -> Self {
        Self {
            keys: vec![
                Keyframe::with_tangents(0.0, 0.0, 0.0, 2.5),
                Keyframe::new(0.5, 1.0),
                Keyframe::with_tangents(1.0, 0.0, -2.5, 0.0),
            ],
        }
    }

    /// Smooth ease-in/ease-out from `(start_time, start_value)` to `(end_time, end_value)`.
    pub fn ease_in_out(start_time: f32, start_value: f32, end_time: f32, end_value: f32) -> Self {
        Self {
            keys: vec![
                Keyframe::new(start_time, start_value),
                Keyframe::new(end_time, end_value),
            ],
        }
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Keys must be finite and strictly increasing in time.
    pub fn validate(&self) -> Result<(), GaitError> {
        for key in &self.keys {
            let finite = key.time.is_finite()
                && key.value.is_finite()
                && key.in_tangent.is_finite()
                && key.out_tangent.is_finite();
            if !finite {
                return Err(GaitError::InvalidCurve("non-finite keyframe"));
            }
        }
        if self.keys.windows(2).any(|w| w[1].time <= w[0].time) {
            return Err(GaitError::InvalidCurve("keyframe times must increase"));
        }
        Ok(())
    }

    /// Sample the curve at `t`.
    ///
    /// An empty curve evaluates to 0.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after `t`; `t` is inside the range so 1 <= idx < len.
        let idx = self.keys.partition_point(|k| k.time <= t);
        let k0 = &self.keys[idx - 1];
        let k1 = &self.keys[idx];

        let span = k1.time - k0.time;
        let s = (t - k0.time) / span;
        hermite(k0.value, k0.out_tangent * span, k1.value, k1.in_tangent * span, s)
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::step_arc()
    }
}

#[inline]
fn hermite(p0: f32, m0: f32, p1: f32, m1: f32, s: f32) -> f32 {
    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}
