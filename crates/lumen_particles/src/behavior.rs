//! Emitter behaviours.
//!
//! Init behaviours run once when a particle spawns. Update behaviours run
//! every tick for every live particle.

use lumen_core::{Rect, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::curve::ValueCurve;
use crate::error::{ParticleError, ParticleResult};
use crate::particle::Particle;

/// Region in which new particles appear, relative to the spawn position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpawnShape {
    /// Exactly at the spawn position (plus offset).
    Point {
        /// X offset.
        #[serde(default)]
        x: f32,
        /// Y offset.
        #[serde(default)]
        y: f32,
    },
    /// Uniformly inside a rectangle.
    Rect(Rect),
    /// Uniformly inside a ring.
    Circle {
        /// Centre x offset.
        #[serde(default)]
        x: f32,
        /// Centre y offset.
        #[serde(default)]
        y: f32,
        /// Outer radius.
        radius: f32,
        /// Inner radius (0 for a full disc).
        #[serde(default)]
        inner_radius: f32,
    },
}

impl SpawnShape {
    /// Checks the shape has usable extents.
    pub fn validate(&self) -> ParticleResult<()> {
        match *self {
            Self::Point { .. } => Ok(()),
            Self::Rect(r) if r.width < 0.0 || r.height < 0.0 => Err(ParticleError::InvalidConfig(
                format!("spawn rect has negative size {}x{}", r.width, r.height),
            )),
            Self::Rect(_) => Ok(()),
            Self::Circle {
                radius,
                inner_radius,
                ..
            } if radius < 0.0 || inner_radius < 0.0 || inner_radius > radius => {
                Err(ParticleError::InvalidConfig(format!(
                    "spawn ring {inner_radius}..{radius} is empty"
                )))
            }
            Self::Circle { .. } => Ok(()),
        }
    }

    /// Returns the rectangle if this is a rectangular shape.
    #[must_use]
    pub fn as_rect(&self) -> Option<&Rect> {
        match self {
            Self::Rect(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the rectangle mutably if this is a rectangular shape.
    pub fn as_rect_mut(&mut self) -> Option<&mut Rect> {
        match self {
            Self::Rect(r) => Some(r),
            _ => None,
        }
    }

    /// Picks a random offset inside the shape.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        match *self {
            Self::Point { x, y } => Vec2::new(x, y),
            Self::Rect(r) => r.point_at(rng.gen::<f32>(), rng.gen::<f32>()),
            Self::Circle {
                x,
                y,
                radius,
                inner_radius,
            } => {
                let angle = rng.gen::<f32>() * std::f32::consts::TAU;
                // Uniform over the ring's area.
                let inner_sq = inner_radius * inner_radius;
                let r = (inner_sq + rng.gen::<f32>() * (radius * radius - inner_sq)).sqrt();
                Vec2::new(x + r * angle.cos(), y + r * angle.sin())
            }
        }
    }
}

/// Runs once per particle at spawn.
#[derive(Debug, Clone, PartialEq)]
pub enum InitBehavior {
    /// Positions the particle inside a shape.
    SpawnShape(SpawnShape),
    /// Random movement direction in `min..=max` degrees.
    Direction {
        /// Smallest angle.
        min_angle: f32,
        /// Largest angle.
        max_angle: f32,
    },
    /// Random starting rotation in `min..=max` degrees.
    StartRotation {
        /// Smallest rotation.
        min: f32,
        /// Largest rotation.
        max: f32,
    },
    /// Fixed texture index.
    Texture {
        /// Index into the emitter's texture list.
        index: usize,
    },
}

impl InitBehavior {
    /// The spawn shape, if this behaviour has one.
    #[must_use]
    pub fn shape(&self) -> Option<&SpawnShape> {
        match self {
            Self::SpawnShape(shape) => Some(shape),
            _ => None,
        }
    }

    /// The spawn shape, mutably.
    pub fn shape_mut(&mut self) -> Option<&mut SpawnShape> {
        match self {
            Self::SpawnShape(shape) => Some(shape),
            _ => None,
        }
    }

    pub(crate) fn init<R: Rng + ?Sized>(&self, particle: &mut Particle, rng: &mut R) {
        match self {
            Self::SpawnShape(shape) => {
                particle.position = particle.position + shape.sample(rng);
            }
            Self::Direction { min_angle, max_angle } => {
                let angle = lerp(*min_angle, *max_angle, rng.gen::<f32>());
                particle.direction = Vec2::from_angle_degrees(angle);
            }
            Self::StartRotation { min, max } => {
                particle.rotation = lerp(*min, *max, rng.gen::<f32>());
            }
            Self::Texture { index } => particle.texture = *index,
        }
    }
}

/// Runs every tick on every live particle.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateBehavior {
    /// Alpha over life.
    Alpha(ValueCurve),
    /// Scale over life, times the particle's random multiplier.
    Scale(ValueCurve),
    /// Speed over life (px/s).
    MoveSpeed(ValueCurve),
}

impl UpdateBehavior {
    pub(crate) fn update(&self, particle: &mut Particle, life: f32) {
        match self {
            Self::Alpha(curve) => particle.alpha = curve.sample(life),
            Self::Scale(curve) => particle.scale = curve.sample(life) * particle.scale_mult,
            Self::MoveSpeed(curve) => particle.speed = curve.sample(life),
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
