//! Keyframed conversion curves
//!
//! Slides convert a blocked unit into a fraction of a perpendicular unit. The
//! fraction comes from a curve sampled at the steepness of the surface, so the
//! feel of slopes is data rather than code.

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, PhysicsResult};

/// A curve key with Hermite tangents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    pub fn with_tangents(mut self, in_tangent: f32, out_tangent: f32) -> Self {
        self.in_tangent = in_tangent;
        self.out_tangent = out_tangent;
        self
    }
}

/// Piecewise cubic Hermite curve, clamped outside its keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    /// Build a curve; keys must be finite with strictly increasing times
    pub fn new(keys: Vec<Keyframe>) -> PhysicsResult<Self> {
        if keys.is_empty() {
            return Err(PhysicsError::InvalidCurve("a curve needs at least one key".to_string()));
        }
        for key in &keys {
            let values = [key.time, key.value, key.in_tangent, key.out_tangent];
            if values.iter().any(|value| !value.is_finite()) {
                return Err(PhysicsError::InvalidCurve(format!(
                    "key at time {} is not finite",
                    key.time
                )));
            }
        }
        for pair in keys.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(PhysicsError::InvalidCurve(format!(
                    "key times must increase, found {} after {}",
                    pair[1].time, pair[0].time
                )));
            }
        }
        Ok(Self { keys })
    }

    /// A curve that returns `value` everywhere
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, value)],
        }
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Sample the curve; NaN input samples the last key
    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        if !(time < last.time) {
            return last.value;
        }

        let upper = self.keys.partition_point(|key| key.time <= time);
        let (start, end) = (self.keys[upper - 1], self.keys[upper]);
        let span = end.time - start.time;
        let s = (time - start.time) / span;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * start.value + h10 * span * start.out_tangent + h01 * end.value + h11 * span * end.in_tangent
    }
}

impl TryFrom<Vec<Keyframe>> for Curve {
    type Error = PhysicsError;

    fn try_from(keys: Vec<Keyframe>) -> PhysicsResult<Self> {
        Curve::new(keys)
    }
}

impl From<Curve> for Vec<Keyframe> {
    fn from(curve: Curve) -> Self {
        curve.keys
    }
}

/// Falls from full conversion on flat ground to none at a steepness of 6
impl Default for Curve {
    fn default() -> Self {
        Self {
            keys: vec![
                Keyframe::new(0.0, 1.0).with_tangents(0.0, -0.45),
                Keyframe::new(6.0, 0.0),
            ],
        }
    }
}
