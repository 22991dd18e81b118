//! # LUMEN Particles
//!
//! A small CPU particle emitter driven entirely by its owner:
//!
//! ```text
//! ┌──────────────┐   update(dt)   ┌─────────────┐
//! │ owner clock  │ ─────────────▶ │   Emitter   │
//! └──────────────┘                │  ├─ waves   │──▶ ParticlePool (recycled slots)
//!   update_spawn_pos / shapes ──▶ │  ├─ init    │
//!                                 │  └─ update  │
//!                                 └─────────────┘
//! ```
//!
//! The emitter is built from an [`EmitterConfig`] (TOML) and a list of
//! texture keys. It does not render anything; the owner walks
//! [`Emitter::particles`] and draws them however it likes.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod behavior;
pub mod config;
pub mod curve;
pub mod emitter;
pub mod error;
pub mod particle;

pub use behavior::{InitBehavior, SpawnShape, UpdateBehavior};
pub use config::{BehaviorConfig, EmitterConfig, LifetimeRange};
pub use curve::{CurveKey, ValueCurve};
pub use emitter::{Emitter, EmitterStats};
pub use error::{ParticleError, ParticleResult};
pub use particle::{Particle, ParticlePool};
