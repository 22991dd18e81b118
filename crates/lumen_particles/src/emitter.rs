//! The particle emitter.
//!
//! Spawns waves of particles every `frequency` seconds at the spawn position
//! (offset by the spawn shape), ages them, and recycles their slots once they
//! expire. The owner calls [`Emitter::update`] with delta seconds; nothing
//! happens between calls.

use lumen_core::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::behavior::{InitBehavior, UpdateBehavior};
use crate::config::{curve, BehaviorConfig, EmitterConfig};
use crate::error::{ParticleError, ParticleResult};
use crate::particle::{Particle, ParticlePool};

/// Running counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    /// Particles spawned since creation.
    pub spawned: u64,
    /// Particles that reached the end of their life.
    pub retired: u64,
    /// Waves skipped because the pool was full.
    pub skipped_waves: u64,
}

/// A config-driven particle emitter.
#[derive(Debug)]
pub struct Emitter {
    config: EmitterConfig,
    textures: Vec<String>,
    init_behaviors: Vec<InitBehavior>,
    update_behaviors: Vec<UpdateBehavior>,
    scale_min_mult: f32,
    pool: ParticlePool,
    spawn_pos: Vec2,
    emit: bool,
    auto_update: bool,
    spawn_timer: f32,
    /// Remaining emission time; negative means forever.
    emitter_life: f32,
    rng: ChaCha8Rng,
    expired: Vec<usize>,
    stats: EmitterStats,
    destroyed: bool,
}

impl Emitter {
    /// Builds an emitter from a config and the texture keys it may use.
    ///
    /// Emission is off until [`Emitter::set_emit`] is called.
    pub fn new(config: EmitterConfig, textures: Vec<String>) -> ParticleResult<Self> {
        Self::with_rng(config, textures, ChaCha8Rng::from_entropy())
    }

    /// Builds an emitter with a deterministic random stream.
    pub fn with_seed(config: EmitterConfig, textures: Vec<String>, seed: u64) -> ParticleResult<Self> {
        Self::with_rng(config, textures, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: EmitterConfig, textures: Vec<String>, rng: ChaCha8Rng) -> ParticleResult<Self> {
        config.validate()?;
        if textures.is_empty() {
            return Err(ParticleError::NoTextures);
        }

        let mut init_behaviors = Vec::new();
        let mut update_behaviors = Vec::new();
        let mut scale_min_mult = 1.0;

        for behavior in &config.behaviors {
            match behavior {
                BehaviorConfig::Alpha { list } => update_behaviors.push(UpdateBehavior::Alpha(curve(list))),
                BehaviorConfig::Scale { list, min_mult } => {
                    scale_min_mult = *min_mult;
                    update_behaviors.push(UpdateBehavior::Scale(curve(list)));
                }
                BehaviorConfig::MoveSpeed { list } => {
                    update_behaviors.push(UpdateBehavior::MoveSpeed(curve(list)));
                }
                BehaviorConfig::Direction { min_angle, max_angle } => {
                    init_behaviors.push(InitBehavior::Direction {
                        min_angle: *min_angle,
                        max_angle: *max_angle,
                    });
                }
                BehaviorConfig::StartRotation { min, max } => {
                    init_behaviors.push(InitBehavior::StartRotation { min: *min, max: *max });
                }
                BehaviorConfig::SpawnShape { shape } => {
                    init_behaviors.push(InitBehavior::SpawnShape(*shape));
                }
                BehaviorConfig::TextureSingle { texture } => {
                    let index = textures
                        .iter()
                        .position(|t| t == texture)
                        .ok_or_else(|| ParticleError::MissingTexture(texture.clone()))?;
                    init_behaviors.push(InitBehavior::Texture { index });
                }
            }
        }

        tracing::debug!(
            max_particles = config.max_particles,
            frequency = config.frequency,
            init = init_behaviors.len(),
            update = update_behaviors.len(),
            "emitter created"
        );

        Ok(Self {
            pool: ParticlePool::new(config.max_particles),
            emitter_life: config.emitter_lifetime,
            config,
            textures,
            init_behaviors,
            update_behaviors,
            scale_min_mult,
            spawn_pos: Vec2::ZERO,
            emit: false,
            auto_update: false,
            spawn_timer: 0.0,
            rng,
            expired: Vec::new(),
            stats: EmitterStats::default(),
            destroyed: false,
        })
    }

    /// Advances every particle by `dt` seconds and spawns due waves.
    pub fn update(&mut self, dt: f32) {
        if self.destroyed {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.age_particles(dt);

        if !self.emit {
            return;
        }

        self.spawn_timer -= dt;
        while self.spawn_timer <= 0.0 {
            if self.emitter_life >= 0.0 {
                self.emitter_life -= self.config.frequency;
                if self.emitter_life <= 0.0 {
                    self.spawn_timer = 0.0;
                    self.emitter_life = 0.0;
                    self.emit = false;
                    tracing::debug!("emitter lifetime elapsed");
                    break;
                }
            }

            if self.pool.is_full() {
                self.stats.skipped_waves += 1;
            } else {
                // Waves that were due earlier in this tick start partly aged.
                let pre_age = -self.spawn_timer;
                self.spawn_wave(pre_age);
            }
            self.spawn_timer += self.config.frequency;
        }
    }

    fn age_particles(&mut self, dt: f32) {
        self.expired.clear();
        for (index, particle) in self.pool.iter_mut_indexed() {
            particle.age += dt;
            if particle.age >= particle.max_life {
                self.expired.push(index);
                continue;
            }
            let life = particle.life();
            for behavior in &self.update_behaviors {
                behavior.update(particle, life);
            }
            particle.position = particle.position + particle.direction.scaled(particle.speed * dt);
        }

        for &index in &self.expired {
            self.pool.retire(index);
        }
        self.stats.retired += self.expired.len() as u64;
    }

    fn spawn_wave(&mut self, pre_age: f32) {
        let (min, max) = (self.config.lifetime.min, self.config.lifetime.max);

        for _ in 0..self.config.particles_per_wave {
            if self.config.spawn_chance < 1.0 && self.rng.gen::<f32>() >= self.config.spawn_chance {
                continue;
            }
            let max_life = min + (max - min) * self.rng.gen::<f32>();
            if pre_age >= max_life {
                continue;
            }
            let scale_mult = self.scale_min_mult + (1.0 - self.scale_min_mult) * self.rng.gen::<f32>();

            let Some((_, particle)) = self.pool.spawn() else {
                break;
            };
            particle.position = self.spawn_pos;
            particle.max_life = max_life;
            particle.age = pre_age;
            particle.scale_mult = scale_mult;
            particle.scale = scale_mult;

            for behavior in &self.init_behaviors {
                behavior.init(particle, &mut self.rng);
            }
            let life = particle.life();
            for behavior in &self.update_behaviors {
                behavior.update(particle, life);
            }
            if pre_age > 0.0 {
                particle.position = particle.position + particle.direction.scaled(particle.speed * pre_age);
            }
            self.stats.spawned += 1;
        }
    }

    /// Moves the point particles spawn around.
    pub fn update_spawn_pos(&mut self, x: f32, y: f32) {
        self.spawn_pos = Vec2::new(x, y);
    }

    /// Current spawn position.
    #[must_use]
    pub fn spawn_pos(&self) -> Vec2 {
        self.spawn_pos
    }

    /// Init behaviours, in config order.
    #[must_use]
    pub fn init_behaviors(&self) -> &[InitBehavior] {
        &self.init_behaviors
    }

    /// Init behaviours, mutably (spawn shapes are resized by the owner).
    pub fn init_behaviors_mut(&mut self) -> impl Iterator<Item = &mut InitBehavior> {
        self.init_behaviors.iter_mut()
    }

    /// Per-tick behaviours.
    #[must_use]
    pub fn update_behaviors(&self) -> &[UpdateBehavior] {
        &self.update_behaviors
    }

    /// Turns emission on or off. Live particles keep ageing either way.
    pub fn set_emit(&mut self, emit: bool) {
        if self.destroyed {
            return;
        }
        self.emit = emit;
    }

    /// Is the emitter spawning?
    #[must_use]
    pub fn is_emitting(&self) -> bool {
        self.emit
    }

    /// Records whether the emitter is expected to tick itself.
    ///
    /// This emitter never does; the flag exists so owners can state intent
    /// and inspect it later.
    pub fn set_auto_update(&mut self, auto_update: bool) {
        self.auto_update = auto_update;
    }

    /// See [`Emitter::set_auto_update`].
    #[must_use]
    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    /// Live particles.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.pool.iter()
    }

    /// Number of live particles.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.pool.alive_count()
    }

    /// Texture keys, indexed by [`Particle::texture`].
    #[must_use]
    pub fn textures(&self) -> &[String] {
        &self.textures
    }

    /// The config this emitter was built from.
    #[must_use]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Running counters.
    #[must_use]
    pub fn stats(&self) -> EmitterStats {
        self.stats
    }

    /// Stops emission and releases every particle. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.emit = false;
        self.pool.clear();
        self.init_behaviors.clear();
        self.update_behaviors.clear();
        self.expired = Vec::new();
        self.destroyed = true;
        tracing::debug!(spawned = self.stats.spawned, "emitter destroyed");
    }

    /// Has [`Emitter::destroy`] run?
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::SpawnShape;
    use crate::config::LifetimeRange;
    use crate::curve::CurveKey;
    use lumen_core::Rect;

    const DOT: &str = "img/dot.png";

    fn config(frequency: f32, max_particles: usize, life: f32) -> EmitterConfig {
        EmitterConfig {
            lifetime: LifetimeRange { min: life, max: life },
            frequency,
            particles_per_wave: 1,
            spawn_chance: 1.0,
            max_particles,
            emitter_lifetime: -1.0,
            behaviors: vec![
                BehaviorConfig::SpawnShape {
                    shape: SpawnShape::Rect(Rect::new(-10.0, -10.0, 20.0, 10.0)),
                },
                BehaviorConfig::TextureSingle { texture: DOT.into() },
            ],
        }
    }

    fn emitter(config: EmitterConfig) -> Emitter {
        let mut emitter = Emitter::with_seed(config, vec![DOT.into()], 42).expect("valid emitter");
        emitter.set_emit(true);
        emitter
    }

    #[test]
    fn test_spawns_one_wave_per_frequency() {
        let mut emitter = emitter(config(0.1, 100, 10.0));
        // First wave is due immediately, then one every 0.1s.
        emitter.update(0.25);
        assert_eq!(emitter.particle_count(), 3);
    }

    #[test]
    fn test_particles_expire_and_slots_recycle() {
        let mut emitter = emitter(config(0.1, 5, 0.3));
        for _ in 0..60 {
            emitter.update(1.0 / 60.0);
        }
        // 0.3s of life at 10 waves/s never exceeds 3-4 live particles.
        assert!(emitter.particle_count() <= 4);
        assert!(emitter.stats().retired > 0);
    }

    #[test]
    fn test_full_pool_skips_waves() {
        let mut emitter = emitter(config(0.01, 3, 100.0));
        emitter.update(0.5);
        assert_eq!(emitter.particle_count(), 3);
        assert!(emitter.stats().skipped_waves > 0);
    }

    #[test]
    fn test_spawn_follows_spawn_pos_and_shape() {
        let mut emitter = emitter(config(1.0, 10, 10.0));
        emitter.update_spawn_pos(500.0, 200.0);
        for behavior in emitter.init_behaviors_mut() {
            if let Some(rect) = behavior.shape_mut().and_then(SpawnShape::as_rect_mut) {
                *rect = Rect::new(-500.0, -200.0, 1000.0, 200.0);
            }
        }
        emitter.update(0.0);

        let particle = emitter.particles().next().expect("one particle");
        assert!((0.0..=1000.0).contains(&particle.position.x));
        assert!((0.0..=200.0).contains(&particle.position.y));
        assert_eq!(particle.texture, 0);
    }

    #[test]
    fn test_curves_drive_alpha_and_motion() {
        let mut cfg = config(10.0, 1, 1.0);
        cfg.behaviors.push(BehaviorConfig::Alpha {
            list: vec![
                CurveKey { time: 0.0, value: 1.0 },
                CurveKey { time: 1.0, value: 0.0 },
            ],
        });
        cfg.behaviors.push(BehaviorConfig::MoveSpeed {
            list: vec![CurveKey { time: 0.0, value: 100.0 }],
        });
        cfg.behaviors.push(BehaviorConfig::Direction {
            min_angle: 0.0,
            max_angle: 0.0,
        });
        let mut emitter = emitter(cfg);

        emitter.update(0.0);
        let start = emitter.particles().next().expect("spawned").position;
        emitter.update(0.5);
        let particle = emitter.particles().next().expect("still alive");

        assert!((particle.alpha - 0.5).abs() < 1e-4);
        assert!((particle.position.x - start.x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_emitter_lifetime_stops_emission() {
        let mut cfg = config(0.1, 100, 10.0);
        cfg.emitter_lifetime = 0.35;
        let mut emitter = emitter(cfg);
        emitter.update(1.0);
        assert!(!emitter.is_emitting());
        let count = emitter.particle_count();
        emitter.update(1.0);
        assert_eq!(emitter.particle_count(), count);
    }

    #[test]
    fn test_missing_texture_rejected() {
        let result = Emitter::with_seed(config(0.1, 1, 1.0), vec!["img/other.png".into()], 1);
        assert!(matches!(result, Err(ParticleError::MissingTexture(_))));
        let result = Emitter::with_seed(config(0.1, 1, 1.0), Vec::new(), 1);
        assert!(matches!(result, Err(ParticleError::NoTextures)));
    }

    #[test]
    fn test_destroy_is_idempotent_and_final() {
        let mut emitter = emitter(config(0.1, 10, 10.0));
        emitter.update(0.5);
        emitter.destroy();
        emitter.destroy();
        assert!(emitter.is_destroyed());
        assert_eq!(emitter.particle_count(), 0);

        emitter.set_emit(true);
        emitter.update(1.0);
        assert_eq!(emitter.particle_count(), 0);
        assert!(!emitter.is_emitting());
    }
}
