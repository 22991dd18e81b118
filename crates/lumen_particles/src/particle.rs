//! Particles and the fixed-capacity pool that recycles them.
//!
//! Slots are allocated once up to the pool capacity. A retired particle's
//! slot goes on a free list and is reused by the next spawn, so steady-state
//! emission does not allocate.

use lumen_core::Vec2;

/// A single live (or recyclable) particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in the owner's coordinate space.
    pub position: Vec2,
    /// Unit movement direction.
    pub direction: Vec2,
    /// Current speed (px/s).
    pub speed: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Current uniform scale.
    pub scale: f32,
    /// Random multiplier applied to the scale curve.
    pub scale_mult: f32,
    /// Current alpha.
    pub alpha: f32,
    /// Seconds since spawn.
    pub age: f32,
    /// Seconds this particle lives.
    pub max_life: f32,
    /// Index into the emitter's texture list.
    pub texture: usize,
    alive: bool,
}

impl Particle {
    /// A dead particle (used for pool slots).
    #[must_use]
    pub const fn dead() -> Self {
        Self {
            position: Vec2::ZERO,
            direction: Vec2::new(1.0, 0.0),
            speed: 0.0,
            rotation: 0.0,
            scale: 1.0,
            scale_mult: 1.0,
            alpha: 1.0,
            age: 0.0,
            max_life: 0.0,
            texture: 0,
            alive: false,
        }
    }

    /// Is this particle alive?
    #[inline]
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Normalised age (0-1).
    #[inline]
    #[must_use]
    pub fn life(&self) -> f32 {
        if self.max_life <= 0.0 {
            1.0
        } else {
            (self.age / self.max_life).min(1.0)
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::dead()
    }
}

/// Fixed-capacity particle storage with slot recycling.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    free: Vec<usize>,
    capacity: usize,
    alive: usize,
}

impl ParticlePool {
    /// Creates an empty pool that will hold at most `capacity` particles.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            capacity,
            alive: 0,
        }
    }

    /// Claims a slot and returns it reset to a fresh live particle.
    ///
    /// Returns `None` when every slot is in use.
    pub fn spawn(&mut self) -> Option<(usize, &mut Particle)> {
        let index = if let Some(index) = self.free.pop() {
            index
        } else if self.slots.len() < self.capacity {
            self.slots.push(Particle::dead());
            self.slots.len() - 1
        } else {
            return None;
        };

        self.alive += 1;
        let slot = &mut self.slots[index];
        *slot = Particle {
            alive: true,
            ..Particle::dead()
        };
        Some((index, slot))
    }

    /// Returns a slot to the free list.
    pub fn retire(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.alive {
                slot.alive = false;
                self.alive -= 1;
                self.free.push(index);
            }
        }
    }

    /// Iterates live particles.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter(|p| p.alive)
    }

    /// Iterates live particles with their slot index.
    pub fn iter_mut_indexed(&mut self) -> impl Iterator<Item = (usize, &mut Particle)> {
        self.slots.iter_mut().enumerate().filter(|(_, p)| p.alive)
    }

    /// Number of live particles.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Maximum number of live particles.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when no slot is free.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.alive >= self.capacity
    }

    /// Drops every particle and releases slot storage.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.slots.shrink_to_fit();
        self.free.clear();
        self.alive = 0;
    }
}
