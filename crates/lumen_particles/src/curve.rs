//! Piecewise-linear value-over-life curves.

use serde::{Deserialize, Serialize};

use crate::error::{ParticleError, ParticleResult};

/// One key of a curve. `time` is normalised particle age (0-1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Normalised age.
    pub time: f32,
    /// Value at that age.
    pub value: f32,
}

/// A value sampled over a particle's normalised lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCurve {
    /// Keys in ascending time order.
    pub list: Vec<CurveKey>,
    /// Hold each key's value until the next key instead of interpolating.
    #[serde(default)]
    pub stepped: bool,
}

impl ValueCurve {
    /// A curve that always returns `value`.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self {
            list: vec![CurveKey { time: 0.0, value }],
            stepped: false,
        }
    }

    /// Checks the keys are non-empty, inside 0-1 and ascending.
    pub fn validate(&self, name: &str) -> ParticleResult<()> {
        if self.list.is_empty() {
            return Err(ParticleError::InvalidConfig(format!("{name}: curve has no keys")));
        }
        let mut prev = f32::NEG_INFINITY;
        for key in &self.list {
            if !(0.0..=1.0).contains(&key.time) {
                return Err(ParticleError::InvalidConfig(format!(
                    "{name}: key time {} outside 0..=1",
                    key.time
                )));
            }
            if key.time < prev {
                return Err(ParticleError::InvalidConfig(format!(
                    "{name}: key times must ascend"
                )));
            }
            prev = key.time;
        }
        Ok(())
    }

    /// Samples the curve at normalised age `t`.
    #[must_use]
    pub fn sample(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let Some(first) = self.list.first() else {
            return 0.0;
        };
        if t <= first.time {
            return first.value;
        }

        for pair in self.list.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.time {
                if self.stepped {
                    return a.value;
                }
                let span = b.time - a.time;
                if span <= f32::EPSILON {
                    return b.value;
                }
                let local = (t - a.time) / span;
                return a.value + (b.value - a.value) * local;
            }
        }

        self.list.last().map_or(first.value, |k| k.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fade() -> ValueCurve {
        ValueCurve {
            list: vec![
                CurveKey { time: 0.0, value: 0.0 },
                CurveKey { time: 0.5, value: 1.0 },
                CurveKey { time: 1.0, value: 0.0 },
            ],
            stepped: false,
        }
    }

    #[test]
    fn test_sample_interpolates() {
        let curve = fade();
        assert!((curve.sample(0.25) - 0.5).abs() < 1e-6);
        assert!((curve.sample(0.5) - 1.0).abs() < 1e-6);
        assert!((curve.sample(0.75) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_clamps_outside_range() {
        let curve = fade();
        assert_eq!(curve.sample(-3.0), 0.0);
        assert_eq!(curve.sample(7.0), 0.0);
    }

    #[test]
    fn test_stepped_holds_previous_key() {
        let mut curve = fade();
        curve.stepped = true;
        assert_eq!(curve.sample(0.4), 0.0);
        assert_eq!(curve.sample(0.6), 1.0);
    }

    #[test]
    fn test_validate_rejects_descending_keys() {
        let curve = ValueCurve {
            list: vec![
                CurveKey { time: 0.6, value: 0.0 },
                CurveKey { time: 0.2, value: 1.0 },
            ],
            stepped: false,
        };
        assert!(curve.validate("alpha").is_err());
        assert!(fade().validate("alpha").is_ok());
    }
}
