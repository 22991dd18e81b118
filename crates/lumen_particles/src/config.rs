//! # Emitter Configuration
//!
//! Static parameter blob, loaded once. The built-in config ships inside the
//! binary; [`EmitterConfig::from_toml_str`] accepts the same shape from any
//! other source.
//!
//! ```toml
//! frequency = 0.01
//! particles_per_wave = 1
//! max_particles = 600
//!
//! [lifetime]
//! min = 1.5
//! max = 4.0
//!
//! [[behaviors]]
//! type = "alpha"
//! list = [{ time = 0.0, value = 0.0 }, { time = 1.0, value = 1.0 }]
//! ```

use serde::{Deserialize, Serialize};

use crate::behavior::SpawnShape;
use crate::curve::ValueCurve;
use crate::error::{ParticleError, ParticleResult};

const BUILTIN_CONFIG: &str = include_str!("../assets/particle_emitter.toml");

/// Particle lifetime range in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimeRange {
    /// Shortest lifetime.
    pub min: f32,
    /// Longest lifetime.
    pub max: f32,
}

/// One behaviour entry of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorConfig {
    /// Alpha over life.
    Alpha {
        /// The curve.
        list: Vec<crate::curve::CurveKey>,
    },
    /// Scale over life, multiplied by a per-particle random factor in `min_mult..=1`.
    Scale {
        /// The curve.
        list: Vec<crate::curve::CurveKey>,
        /// Smallest random multiplier.
        #[serde(default = "one")]
        min_mult: f32,
    },
    /// Movement speed (px/s) over life.
    MoveSpeed {
        /// The curve.
        list: Vec<crate::curve::CurveKey>,
    },
    /// Initial movement direction, degrees (0 = +x, 90 = down).
    Direction {
        /// Smallest angle.
        min_angle: f32,
        /// Largest angle.
        max_angle: f32,
    },
    /// Initial sprite rotation, degrees.
    StartRotation {
        /// Smallest rotation.
        min: f32,
        /// Largest rotation.
        max: f32,
    },
    /// Where particles appear relative to the spawn position.
    SpawnShape {
        /// The shape.
        shape: SpawnShape,
    },
    /// Every particle uses the same texture.
    TextureSingle {
        /// Texture key; must be one of the textures handed to the emitter.
        texture: String,
    },
}

fn one() -> f32 {
    1.0
}

fn default_chance() -> f32 {
    1.0
}

fn default_emitter_lifetime() -> f32 {
    -1.0
}

/// Full emitter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Particle lifetime range.
    pub lifetime: LifetimeRange,
    /// Seconds between spawn waves.
    pub frequency: f32,
    /// Particles attempted per wave.
    #[serde(default = "default_wave")]
    pub particles_per_wave: u32,
    /// Probability (0-1) that each attempted particle is actually spawned.
    #[serde(default = "default_chance")]
    pub spawn_chance: f32,
    /// Pool capacity; waves are skipped while the pool is full.
    pub max_particles: usize,
    /// Seconds the emitter keeps emitting; negative means forever.
    #[serde(default = "default_emitter_lifetime")]
    pub emitter_lifetime: f32,
    /// Behaviours, applied in order.
    #[serde(default)]
    pub behaviors: Vec<BehaviorConfig>,
}

fn default_wave() -> u32 {
    1
}

impl EmitterConfig {
    /// Parses and validates a TOML config.
    pub fn from_toml_str(text: &str) -> ParticleResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The config compiled into the crate.
    pub fn builtin() -> ParticleResult<Self> {
        Self::from_toml_str(BUILTIN_CONFIG)
    }

    /// Checks ranges and curves.
    pub fn validate(&self) -> ParticleResult<()> {
        if !(self.frequency > 0.0 && self.frequency.is_finite()) {
            return Err(ParticleError::InvalidConfig(format!(
                "frequency must be positive, got {}",
                self.frequency
            )));
        }
        if self.lifetime.min <= 0.0 || self.lifetime.max < self.lifetime.min {
            return Err(ParticleError::InvalidConfig(format!(
                "lifetime range {}..{} is empty",
                self.lifetime.min, self.lifetime.max
            )));
        }
        if !(0.0..=1.0).contains(&self.spawn_chance) {
            return Err(ParticleError::InvalidConfig(format!(
                "spawn_chance {} outside 0..=1",
                self.spawn_chance
            )));
        }
        if self.max_particles == 0 {
            return Err(ParticleError::InvalidConfig("max_particles must be > 0".into()));
        }

        for behavior in &self.behaviors {
            match behavior {
                BehaviorConfig::Alpha { list } => curve(list).validate("alpha")?,
                BehaviorConfig::MoveSpeed { list } => curve(list).validate("move_speed")?,
                BehaviorConfig::Scale { list, min_mult } => {
                    curve(list).validate("scale")?;
                    if !(0.0..=1.0).contains(min_mult) {
                        return Err(ParticleError::InvalidConfig(format!(
                            "scale.min_mult {min_mult} outside 0..=1"
                        )));
                    }
                }
                BehaviorConfig::SpawnShape { shape } => shape.validate()?,
                BehaviorConfig::Direction { .. }
                | BehaviorConfig::StartRotation { .. }
                | BehaviorConfig::TextureSingle { .. } => {}
            }
        }
        Ok(())
    }

    /// Texture keys referenced by the behaviours.
    pub fn texture_keys(&self) -> impl Iterator<Item = &str> {
        self.behaviors.iter().filter_map(|b| match b {
            BehaviorConfig::TextureSingle { texture } => Some(texture.as_str()),
            _ => None,
        })
    }
}

pub(crate) fn curve(list: &[crate::curve::CurveKey]) -> ValueCurve {
    ValueCurve {
        list: list.to_vec(),
        stepped: false,
    }
}
